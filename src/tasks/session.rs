//! Session lifecycle: start, pause, resume and rename

use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    error::{AppError, Result},
    state::AppState,
};
use super::polling::{polling_task, tick};

struct Driver {
    token: CancellationToken,
    _handle: JoinHandle<()>,
}

/// Owns the tick driver handle for the shared [`AppState`]
pub struct SessionController {
    state: Arc<AppState>,
    driver: Mutex<Option<Driver>>,
}

impl SessionController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            driver: Mutex::new(None),
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.driver
            .lock()
            .map(|driver| driver.is_some())
            .unwrap_or(false)
    }

    /// Start a fresh session and its tick driver. The first tick fires
    /// immediately, so a fetch is issued right away.
    pub fn resume(&self) -> Result<()> {
        let mut driver = self.driver.lock().map_err(|_| AppError::StateLock)?;
        if let Some(old) = driver.take() {
            old.token.cancel();
        }

        self.state.resume()?;

        let token = CancellationToken::new();
        let handle = tokio::spawn(polling_task(Arc::clone(&self.state), token.clone()));
        *driver = Some(Driver { token, _handle: handle });
        Ok(())
    }

    /// Stop ticking and drop the held snapshot. An in-flight fetch is left
    /// to finish; its result is discarded.
    pub fn pause(&self) -> Result<()> {
        let mut driver = self.driver.lock().map_err(|_| AppError::StateLock)?;
        match driver.take() {
            Some(old) => old.token.cancel(),
            None => warn!("Pause requested but session is not running"),
        }
        self.state.pause()
    }

    /// Rename the valve and fetch under the new name straight away
    pub fn rename(&self, name: &str) -> Result<()> {
        self.state.rename_valve(name)?;

        if self.is_running() {
            tick(&self.state)?;
        }
        Ok(())
    }

    /// Cancel the tick driver for good
    pub fn shutdown(&self) {
        if let Ok(mut driver) = self.driver.lock() {
            if let Some(old) = driver.take() {
                old.token.cancel();
                info!("Session driver stopped");
            }
        }
    }
}
