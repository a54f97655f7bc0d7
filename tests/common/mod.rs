#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use valve_timer::clock::ManualClock;
use valve_timer::config::PollingConfig;
use valve_timer::error::RemoteError;
use valve_timer::services::{MemorySettingsStore, RemoteTimerClient};
use valve_timer::state::{AppState, SessionDefaults, TimerRecord};

pub const START: i64 = 1_700_000_000;

/// In-process backend keyed by valve name
pub struct FakeRemote {
    records: Mutex<HashMap<String, TimerRecord>>,
    /// Seconds the backend adds to every requested end time
    pub skew: i64,
    pub fail_fetches: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fetches: AtomicUsize,
    pub writes: AtomicUsize,
    fetched_names: Mutex<Vec<String>>,
    fetch_gate: Semaphore,
    write_gate: Semaphore,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            skew: 0,
            fail_fetches: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            fetched_names: Mutex::new(Vec::new()),
            fetch_gate: Semaphore::new(Semaphore::MAX_PERMITS),
            write_gate: Semaphore::new(Semaphore::MAX_PERMITS),
        }
    }

    pub fn with_skew(mut self, skew: i64) -> Self {
        self.skew = skew;
        self
    }

    /// Hold every fetch until [`FakeRemote::release_fetches`]
    pub fn hold_fetches(mut self) -> Self {
        self.fetch_gate = Semaphore::new(0);
        self
    }

    pub fn release_fetches(&self, count: usize) {
        self.fetch_gate.add_permits(count);
    }

    /// Hold every write until [`FakeRemote::release_writes`]
    pub fn hold_writes(mut self) -> Self {
        self.write_gate = Semaphore::new(0);
        self
    }

    pub fn release_writes(&self, count: usize) {
        self.write_gate.add_permits(count);
    }

    pub fn insert(&self, name: &str, id: &str, end: i64, last_seen: i64) {
        self.records.lock().unwrap().insert(
            name.to_string(),
            TimerRecord {
                id: id.to_string(),
                end,
                last_seen,
            },
        );
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Valve names requested so far, in call order
    pub fn fetched_names(&self) -> Vec<String> {
        self.fetched_names.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteTimerClient for FakeRemote {
    async fn fetch(&self, name: &str) -> Result<TimerRecord, RemoteError> {
        self.fetched_names.lock().unwrap().push(name.to_string());
        self.fetch_gate
            .acquire()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?
            .forget();
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(RemoteError::Transport("connection refused".to_string()));
        }
        self.records
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or(RemoteError::NotFound)
    }

    async fn set_end(&self, id: &str, end_epoch: i64) -> Result<TimerRecord, RemoteError> {
        self.write_gate
            .acquire()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?
            .forget();
        self.writes.fetch_add(1, Ordering::SeqCst);

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RemoteError::Transport("backend returned 500".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .values_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| RemoteError::Transport(format!("no record with id {}", id)))?;
        record.end = end_epoch + self.skew;
        Ok(record.clone())
    }
}

pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub remote: Arc<FakeRemote>,
    pub settings: Arc<MemorySettingsStore>,
    pub state: Arc<AppState>,
}

pub fn polling_config() -> PollingConfig {
    PollingConfig {
        poll_interval_seconds: 10,
        last_seen_threshold_seconds: 10,
        tick_period: Duration::from_millis(10),
    }
}

/// Build a harness; `setup` customises the fake backend before it is shared
pub fn harness(setup: impl FnOnce(FakeRemote) -> FakeRemote) -> Harness {
    let clock = Arc::new(ManualClock::new(START));
    let remote = Arc::new(setup(FakeRemote::new()));
    let settings = Arc::new(MemorySettingsStore::new());
    let state = Arc::new(AppState::new(
        remote.clone(),
        settings.clone(),
        clock.clone(),
        polling_config(),
        SessionDefaults {
            valve_name: "garden".to_string(),
            length_minutes: 10,
        },
    ));

    Harness {
        clock,
        remote,
        settings,
        state,
    }
}
