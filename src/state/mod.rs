//! State management module
//! 
//! Timer snapshots, presentation state resolution and the shared session
//! slot they flow through.

pub mod app_state;
pub mod presentation;
pub mod run_length;
pub mod snapshot;

// Re-export main types
pub use app_state::{AppState, FetchTicket, SessionDefaults, SyncPhase};
pub use presentation::{resolve, PresentationState, LAST_SEEN_THRESHOLD_SECONDS};
pub use run_length::RunLength;
pub use snapshot::{TimerRecord, TimerSnapshot};
