//! Line-oriented key input

use std::io::BufRead;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::tasks::{AppEvent, UserCommand};

/// Map a key to its command
pub fn parse_key(key: &str) -> Option<UserCommand> {
    match key {
        "q" => Some(UserCommand::Quit),
        "s" => Some(UserCommand::Toggle),
        "p" => Some(UserCommand::Pause),
        "S" => Some(UserCommand::Stop),
        "P" => Some(UserCommand::LoadSnapshot),
        "m" => Some(UserCommand::Subscribe),
        "n" => Some(UserCommand::Notify {
            title: "Test".to_string(),
            body: "Hello world".to_string(),
        }),
        _ => None,
    }
}

/// Read keys from `reader`, one per line, until EOF or quit.
///
/// Blocking; run it on its own thread. EOF is treated as quit.
pub fn read_keys(reader: impl BufRead, events: UnboundedSender<AppEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read input: {}", e);
                break;
            }
        };
        let key = line.trim();
        if key.is_empty() {
            continue;
        }
        let Some(command) = parse_key(key) else {
            debug!("Unbound key {:?}", key);
            continue;
        };
        let quit = command == UserCommand::Quit;
        if events.send(command.into()).is_err() || quit {
            return;
        }
    }
    let _ = events.send(UserCommand::Quit.into());
}

/// Spawn [`read_keys`] over stdin on a dedicated thread
pub fn spawn_stdin_reader(events: UnboundedSender<AppEvent>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("stdin-keys".to_string())
        .spawn(move || read_keys(std::io::stdin().lock(), events))?;
    Ok(())
}
