//! Utility functions module

pub mod signals;

pub use signals::watch_shutdown_signals;
