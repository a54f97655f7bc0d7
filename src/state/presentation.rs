//! Valve state resolution
//!
//! Maps the held snapshot (or its absence) and the current time to one of
//! four mutually exclusive presentation states.

use serde::Serialize;

use super::TimerSnapshot;

/// Default staleness threshold in seconds
pub const LAST_SEEN_THRESHOLD_SECONDS: i64 = 10;

const ONE_HOUR: i64 = 3600;
const TWO_HOURS: i64 = 7200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PresentationState {
    /// No data yet
    Connecting,
    /// Device has not checked in recently
    Disconnected { offline_seconds: i64, label: String },
    On { remaining_seconds: i64, label: String },
    Off,
}

impl PresentationState {
    pub fn kind(&self) -> &'static str {
        match self {
            PresentationState::Connecting => "connecting",
            PresentationState::Disconnected { .. } => "disconnected",
            PresentationState::On { .. } => "on",
            PresentationState::Off => "off",
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            PresentationState::Disconnected { label, .. } | PresentationState::On { label, .. } => {
                Some(label)
            }
            _ => None,
        }
    }
}

/// Resolve the presentation state; first matching branch wins.
pub fn resolve(snapshot: Option<&TimerSnapshot>, now: i64, last_seen_threshold: i64) -> PresentationState {
    let Some(snapshot) = snapshot else {
        return PresentationState::Connecting;
    };

    let offline = snapshot.since_last_seen(now);
    if offline >= last_seen_threshold {
        return PresentationState::Disconnected {
            offline_seconds: offline,
            label: offline_label(offline),
        };
    }

    match snapshot.remaining_seconds(now) {
        0 => PresentationState::Off,
        remaining => PresentationState::On {
            remaining_seconds: remaining,
            label: remaining_label(remaining),
        },
    }
}

/// Human label for how long the device has been offline
pub fn offline_label(seconds: i64) -> String {
    if seconds < ONE_HOUR {
        format!("{} minutes, {} seconds", seconds / 60, seconds % 60)
    } else if seconds < TWO_HOURS {
        "offline for one hour".to_string()
    } else {
        format!("{} hours", seconds / ONE_HOUR)
    }
}

/// Human label for the remaining run time
pub fn remaining_label(seconds: i64) -> String {
    if seconds == 1 {
        "one moment".to_string()
    } else if seconds < 60 {
        format!("{} seconds", seconds)
    } else {
        format!("{}:{:02}", seconds / 60, seconds % 60)
    }
}
