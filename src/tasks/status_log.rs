//! Logs presentation state transitions

use tokio::sync::watch;
use tracing::{debug, info};

use crate::state::PresentationState;

/// Log each change of presentation state kind; label updates go to debug
pub async fn status_log_task(mut rx: watch::Receiver<PresentationState>) {
    info!("Starting status log task");

    let mut last_kind = rx.borrow_and_update().kind();

    while rx.changed().await.is_ok() {
        let current = rx.borrow_and_update().clone();
        if current.kind() != last_kind {
            match current.label() {
                Some(label) => info!("Valve is {} ({})", current.kind(), label),
                None => info!("Valve is {}", current.kind()),
            }
            last_kind = current.kind();
        } else if let Some(label) = current.label() {
            debug!("Valve {}: {}", current.kind(), label);
        }
    }

    debug!("Presentation channel closed, status log task exiting");
}
