//! External collaborators
//!
//! The remote timer backend and the settings store, each behind a trait so
//! the session logic can run against in-process fakes.

pub mod remote;
pub mod settings;

// Re-export main types
pub use remote::{RemoteTimerClient, RestDbClient};
pub use settings::{FileSettingsStore, MemorySettingsStore, SettingsStore, DEFAULT_LENGTH_KEY, VALVE_NAME_KEY};
