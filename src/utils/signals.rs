//! Signal handling for graceful shutdown

use std::io;

use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Cancel `shutdown` on the first SIGTERM or SIGINT
pub async fn watch_shutdown_signals(shutdown: CancellationToken) -> io::Result<()> {
    let mut signals = Signals::new([SIGTERM, SIGINT])?;
    let handle = signals.handle();

    tokio::select! {
        Some(signal) = signals.next() => {
            info!("Received signal: {}", signal);
            shutdown.cancel();
        }
        _ = shutdown.cancelled() => {}
    }

    handle.close();
    Ok(())
}
