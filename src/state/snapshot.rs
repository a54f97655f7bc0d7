//! Timer snapshot: one fetched or written state of the remote valve

use serde::{Deserialize, Serialize};

/// Timer record as stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRecord {
    #[serde(rename = "_id")]
    pub id: String,
    /// Epoch second at which the current run ends
    pub end: i64,
    /// Epoch second of the device's most recent check-in
    pub last_seen: i64,
}

/// Immutable point-in-time view of a valve.
///
/// A fetch or a write always produces a new snapshot; derived values are
/// evaluated against the caller's `now` and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    id: String,
    name: String,
    end_epoch: i64,
    last_seen_epoch: i64,
}

impl TimerSnapshot {
    pub fn new(id: impl Into<String>, name: impl Into<String>, end_epoch: i64, last_seen_epoch: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            end_epoch,
            last_seen_epoch,
        }
    }

    /// Attach the session's valve name to a backend record
    pub fn from_record(name: impl Into<String>, record: TimerRecord) -> Self {
        Self::new(record.id, name, record.end, record.last_seen)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn end_epoch(&self) -> i64 {
        self.end_epoch
    }

    pub fn last_seen_epoch(&self) -> i64 {
        self.last_seen_epoch
    }

    /// Seconds left in the current run, zero when the valve is off
    pub fn remaining_seconds(&self, now: i64) -> i64 {
        (self.end_epoch - now).max(0)
    }

    /// Seconds since the device last checked in with the backend
    pub fn since_last_seen(&self, now: i64) -> i64 {
        now - self.last_seen_epoch
    }
}
