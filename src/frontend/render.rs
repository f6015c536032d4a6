//! Plain-text status line

use std::io::Write;

use tokio::sync::watch;
use tracing::debug;

use crate::state::{AppState, SubscriptionStatus};

const BAR_WIDTH: usize = 30;

pub const HELP: &str = "q quit • s ⏵ • p ⏸ • S ⏹ • P load data • m monitor • n notify";

/// Render the model as one line of text
pub fn render_line(state: &AppState) -> String {
    let timer = state.timer();
    let mut line = String::new();

    line.push_str(&progress_bar(state.ratio().clamped()));
    line.push_str(&format!(" {:>3.0}%", state.ratio().clamped() * 100.0));

    if timer.is_paused {
        line.push_str(" ⏸");
    }
    let label = timer.phase_kind().label();
    if !label.is_empty() {
        line.push_str(&format!(" [{}]", label));
    }
    if let Some(remaining) = timer.remaining_seconds() {
        let remaining = remaining as u64;
        line.push_str(&format!(" {:02}:{:02} left", remaining / 60, remaining % 60));
    }

    match &state.subscription {
        SubscriptionStatus::Live => line.push_str(" • live"),
        SubscriptionStatus::SetupFailed(_) | SubscriptionStatus::Ended(_) => {
            line.push_str(" • snapshot only")
        }
        SubscriptionStatus::Inactive | SubscriptionStatus::Stopped => {}
    }

    if let Some(status) = &state.status {
        let marker = if status.is_error { "!" } else { "·" };
        line.push_str(&format!("  {} {}", marker, status.text));
    }
    line
}

fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Redraw the status line every time a new model is published
pub async fn render_task(mut states: watch::Receiver<AppState>) {
    println!("{}", HELP);
    loop {
        let line = render_line(&states.borrow_and_update());
        print!("\r\x1b[2K{}", line);
        if std::io::stdout().flush().is_err() {
            break;
        }
        if states.changed().await.is_err() {
            debug!("State publisher gone, stopping renderer");
            break;
        }
    }
    println!();
}
