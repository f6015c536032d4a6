//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook_tokio::Signals;
use tracing::info;

/// Resolve on the first SIGTERM or SIGINT.
///
/// Fails only if the signal handlers cannot be registered.
pub async fn shutdown_signal() -> std::io::Result<()> {
    let mut signals = Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ])?;

    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
    }
    signals.handle().close();
    Ok(())
}
