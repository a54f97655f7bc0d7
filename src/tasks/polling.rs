//! Polling tick driver

use std::sync::Arc;
use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    error::Result,
    state::{AppState, PresentationState},
};

/// Result of a single tick
#[derive(Debug)]
pub struct TickOutcome {
    pub presentation: PresentationState,
    /// Fetch started by this tick, if one was due
    pub fetch: Option<JoinHandle<()>>,
}

/// Run one tick: start a fetch when due, then republish the presentation
/// state against the current time. Never waits on the network.
pub fn tick(state: &Arc<AppState>) -> Result<TickOutcome> {
    let now = state.clock.now();

    let fetch = state.begin_fetch_if_due(now)?.map(|ticket| {
        debug!("Starting fetch for {} (session {})", ticket.name, ticket.epoch);
        let state = Arc::clone(state);
        tokio::spawn(async move {
            if let Err(e) = state.perform_fetch(ticket).await {
                error!("Failed to apply fetch result: {}", e);
            }
        })
    });

    let presentation = state.publish(now)?;
    Ok(TickOutcome { presentation, fetch })
}

/// Tick on a fixed cadence until cancelled
pub async fn polling_task(state: Arc<AppState>, token: CancellationToken) {
    info!("Starting polling task");

    let mut ticker = interval(state.polling.tick_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                info!("Polling task cancelled");
                break;
            }
            _ = ticker.tick() => {
                // A failed tick is logged and the next one tries again
                if let Err(e) = tick(&state) {
                    error!("Tick failed: {}", e);
                }
            }
        }
    }
}
