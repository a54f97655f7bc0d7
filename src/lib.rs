//! Valve Timer - remote control client for a network-attached irrigation valve
//!
//! This library polls a REST backend for a named valve's timer, resolves
//! the fetched snapshot into a presentation state every tick, and sequences
//! user writes (run for N minutes, stop, rename) against the shared
//! snapshot slot.

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::{Config, PollingConfig};
pub use error::{AppError, RemoteError, ValidationError};
pub use state::{AppState, PresentationState, TimerSnapshot};
pub use tasks::SessionController;
