//! Session state shared between the tick driver, network tasks and the API

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    config::PollingConfig,
    error::{AppError, RemoteError, Result, ValidationError},
    services::{RemoteTimerClient, SettingsStore, DEFAULT_LENGTH_KEY, VALVE_NAME_KEY},
};
use super::{presentation::resolve, PresentationState, RunLength, TimerRecord, TimerSnapshot};

/// Scheduler phase of the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    /// Nothing fetched yet this session
    Uninitialized,
    /// A fetch is in flight
    Syncing,
    /// At least one fetch succeeded this session
    Synced,
}

/// Fallbacks used when the settings store holds nothing
#[derive(Debug, Clone)]
pub struct SessionDefaults {
    pub valve_name: String,
    pub length_minutes: u32,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            valve_name: "valve".to_string(),
            length_minutes: 10,
        }
    }
}

/// Permission to run one fetch, tagged with the session it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub epoch: u64,
    pub name: String,
}

#[derive(Debug)]
struct Session {
    /// Bumped on every reset; results from older epochs are dropped
    epoch: u64,
    active: bool,
    valve_name: String,
    snapshot: Option<TimerSnapshot>,
    fetch_in_flight: bool,
    write_in_flight: bool,
    last_successful_fetch: Option<i64>,
}

impl Session {
    fn reset(&mut self) {
        self.epoch += 1;
        self.snapshot = None;
        self.fetch_in_flight = false;
        self.write_in_flight = false;
        self.last_successful_fetch = None;
    }

    fn phase(&self) -> SyncPhase {
        if self.fetch_in_flight {
            SyncPhase::Syncing
        } else if self.last_successful_fetch.is_some() {
            SyncPhase::Synced
        } else {
            SyncPhase::Uninitialized
        }
    }
}

/// Main application state: the single current snapshot slot plus the
/// collaborators needed to refresh and update it
pub struct AppState {
    session: Mutex<Session>,
    pub remote: Arc<dyn RemoteTimerClient>,
    pub settings: Arc<dyn SettingsStore>,
    pub clock: Arc<dyn Clock>,
    pub polling: PollingConfig,
    defaults: SessionDefaults,
    pub start_time: Instant,
    /// Latest resolved presentation state
    presentation_tx: watch::Sender<PresentationState>,
    /// Keep the receiver alive to prevent channel closure
    _presentation_rx: watch::Receiver<PresentationState>,
}

impl AppState {
    /// Create a paused session; the valve name comes from the settings store
    pub fn new(
        remote: Arc<dyn RemoteTimerClient>,
        settings: Arc<dyn SettingsStore>,
        clock: Arc<dyn Clock>,
        polling: PollingConfig,
        defaults: SessionDefaults,
    ) -> Self {
        let valve_name = settings.get_string(VALVE_NAME_KEY, &defaults.valve_name);
        let (presentation_tx, presentation_rx) = watch::channel(PresentationState::Connecting);

        Self {
            session: Mutex::new(Session {
                epoch: 0,
                active: false,
                valve_name,
                snapshot: None,
                fetch_in_flight: false,
                write_in_flight: false,
                last_successful_fetch: None,
            }),
            remote,
            settings,
            clock,
            polling,
            defaults,
            start_time: Instant::now(),
            presentation_tx,
            _presentation_rx: presentation_rx,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Session>> {
        self.session.lock().map_err(|_| AppError::StateLock)
    }

    pub fn valve_name(&self) -> Result<String> {
        Ok(self.lock()?.valve_name.clone())
    }

    pub fn snapshot(&self) -> Result<Option<TimerSnapshot>> {
        Ok(self.lock()?.snapshot.clone())
    }

    pub fn phase(&self) -> Result<SyncPhase> {
        Ok(self.lock()?.phase())
    }

    pub fn last_successful_fetch(&self) -> Result<Option<i64>> {
        Ok(self.lock()?.last_successful_fetch)
    }

    pub fn write_in_flight(&self) -> Result<bool> {
        Ok(self.lock()?.write_in_flight)
    }

    /// Default run length, falling back when the stored value is unusable
    pub fn default_length(&self) -> RunLength {
        let fallback = i64::from(self.defaults.length_minutes);
        let stored = self.settings.get_int(DEFAULT_LENGTH_KEY, fallback);
        RunLength::new(stored)
            .or_else(|_| RunLength::new(fallback))
            .unwrap_or(RunLength::MIN)
    }

    pub fn set_default_length(&self, length: RunLength) -> Result<()> {
        self.settings.put_int(DEFAULT_LENGTH_KEY, i64::from(length.minutes()))?;
        info!("Default run length set to {} minutes", length.minutes());
        Ok(())
    }

    /// Start a fresh session: no snapshot, scheduler back to uninitialized
    pub fn resume(&self) -> Result<()> {
        let mut session = self.lock()?;
        session.reset();
        session.active = true;
        info!("Session {} started for valve {}", session.epoch, session.valve_name);
        drop(session);

        self.publish(self.clock.now())?;
        Ok(())
    }

    /// Pause the session and discard the held snapshot
    pub fn pause(&self) -> Result<()> {
        let mut session = self.lock()?;
        session.reset();
        session.active = false;
        info!("Session paused");
        drop(session);

        self.publish(self.clock.now())?;
        Ok(())
    }

    /// Persist a new valve name and restart the session under it
    pub fn rename_valve(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        self.settings.put_string(VALVE_NAME_KEY, name)?;

        let mut session = self.lock()?;
        session.valve_name = name.to_string();
        session.reset();
        info!("Valve renamed to {}, session {} started", name, session.epoch);
        drop(session);

        self.publish(self.clock.now())?;
        Ok(())
    }

    /// Claim the single fetch slot if the poll interval has elapsed
    pub fn begin_fetch_if_due(&self, now: i64) -> Result<Option<FetchTicket>> {
        let mut session = self.lock()?;
        if !session.active || session.fetch_in_flight {
            return Ok(None);
        }

        let due = match session.last_successful_fetch {
            Some(last) => now - last >= self.polling.poll_interval_seconds,
            None => true,
        };
        if !due {
            return Ok(None);
        }

        session.fetch_in_flight = true;
        Ok(Some(FetchTicket {
            epoch: session.epoch,
            name: session.valve_name.clone(),
        }))
    }

    /// Apply a fetch result; returns whether it replaced the snapshot.
    ///
    /// Failures leave the held snapshot and the last fetch time untouched.
    pub fn complete_fetch(
        &self,
        ticket: &FetchTicket,
        result: std::result::Result<TimerRecord, RemoteError>,
        now: i64,
    ) -> Result<bool> {
        let mut session = self.lock()?;
        if session.epoch != ticket.epoch {
            debug!(
                "Discarding fetch result from session {} (current {})",
                ticket.epoch, session.epoch
            );
            return Ok(false);
        }
        session.fetch_in_flight = false;

        match result {
            Ok(record) => {
                session.snapshot = Some(TimerSnapshot::from_record(ticket.name.clone(), record));
                session.last_successful_fetch = Some(now);
                debug!("Fetched timer for {}", ticket.name);
                Ok(true)
            }
            Err(RemoteError::NotFound) => {
                warn!("No timer record named {}", ticket.name);
                Ok(false)
            }
            Err(e) => {
                warn!("Failed to fetch timer for {}: {}", ticket.name, e);
                Ok(false)
            }
        }
    }

    /// Run a claimed fetch against the backend and apply its result
    pub async fn perform_fetch(&self, ticket: FetchTicket) -> Result<bool> {
        let result = self.remote.fetch(&ticket.name).await;
        self.complete_fetch(&ticket, result, self.clock.now())
    }

    /// Resolve the presentation state at `now` and publish it
    pub fn publish(&self, now: i64) -> Result<PresentationState> {
        let presentation = {
            let session = self.lock()?;
            resolve(
                session.snapshot.as_ref(),
                now,
                self.polling.last_seen_threshold_seconds,
            )
        };

        self.presentation_tx.send_replace(presentation.clone());
        Ok(presentation)
    }

    /// Most recently published presentation state
    pub fn presentation(&self) -> PresentationState {
        self.presentation_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PresentationState> {
        self.presentation_tx.subscribe()
    }

    /// Run the valve for `length`, counted from now
    pub async fn set_run_length(&self, length: RunLength) -> Result<TimerSnapshot> {
        info!("Setting timer to {} minutes", length.minutes());
        self.write_end(length.seconds()).await
    }

    /// Turn the valve off by ending the run now
    pub async fn stop(&self) -> Result<TimerSnapshot> {
        info!("Stopping timer");
        self.write_end(0).await
    }

    async fn write_end(&self, seconds_from_now: i64) -> Result<TimerSnapshot> {
        let (epoch, id, name) = {
            let mut session = self.lock()?;
            if !session.active {
                return Err(AppError::SessionPaused);
            }
            if session.write_in_flight {
                return Err(AppError::WriteInProgress);
            }
            let snapshot = session.snapshot.as_ref().ok_or(AppError::NotConnected)?;
            let claimed = (session.epoch, snapshot.id().to_string(), session.valve_name.clone());
            session.write_in_flight = true;
            claimed
        };

        let end_epoch = self.clock.now() + seconds_from_now;
        let result = self.remote.set_end(&id, end_epoch).await;

        let mut session = self.lock()?;
        if session.epoch != epoch {
            info!(
                "Timer update for {} finished after session {} was reset (current {}), not applied",
                name, epoch, session.epoch
            );
            result?;
            return Err(AppError::SessionReset);
        }
        session.write_in_flight = false;

        let record = result.map_err(|e| {
            warn!("Failed to set timer end for {}: {}", name, e);
            e
        })?;
        // The server's record is authoritative, not the requested end time
        let snapshot = TimerSnapshot::from_record(name, record);
        session.snapshot = Some(snapshot.clone());
        drop(session);

        self.publish(self.clock.now())?;
        Ok(snapshot)
    }

    /// Calculate uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
