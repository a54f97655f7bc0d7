//! Background tasks module
//! 
//! The polling tick driver, the session handle that starts and stops it,
//! and a logger for presentation state transitions.

pub mod polling;
pub mod session;
pub mod status_log;

// Re-export main functions
pub use polling::{polling_task, tick, TickOutcome};
pub use session::SessionController;
pub use status_log::status_log_task;
