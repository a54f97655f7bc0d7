//! Error taxonomy for the valve timer client

use thiserror::Error;

/// Failures reported by the remote timer boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// No server record matches the requested valve name
    #[error("no timer record found for valve")]
    NotFound,

    /// Network, HTTP status or decoding failure
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Transport(format!("malformed response: {}", err))
    }
}

/// Rejected user input, never sent to the remote service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid timer length: {0:?} is not a number")]
    NotANumber(String),

    #[error("invalid timer length: {0} must be positive")]
    NotPositive(i64),

    #[error("valve name must not be empty")]
    EmptyName,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced to the initiator of a user action
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("valve is not connected yet")]
    NotConnected,

    #[error("another timer update is still in progress")]
    WriteInProgress,

    #[error("session is paused")]
    SessionPaused,

    #[error("session was reset before the timer update completed")]
    SessionReset,

    #[error("failed to lock session state")]
    StateLock,
}

pub type Result<T> = std::result::Result<T, AppError>;
