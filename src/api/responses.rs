//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, RemoteError, ValidationError},
    state::{PresentationState, RunLength, SyncPhase, TimerSnapshot},
};

/// Run length as typed by a user: a JSON number or a string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LengthInput {
    Number(i64),
    Text(String),
    /// Anything else, such as a fraction or a boolean
    Other(serde_json::Value),
}

impl LengthInput {
    pub fn validate(&self) -> Result<RunLength, ValidationError> {
        match self {
            LengthInput::Number(minutes) => RunLength::new(*minutes),
            LengthInput::Text(text) => RunLength::parse(text),
            LengthInput::Other(value) => Err(ValidationError::NotANumber(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetTimerRequest {
    /// Falls back to the saved default length when absent
    #[serde(default)]
    pub minutes: Option<LengthInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefaultLengthRequest {
    pub minutes: LengthInput,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

/// Response for user actions
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub presentation: PresentationState,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>, presentation: PresentationState) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            presentation,
        }
    }
}

/// Full session status
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub valve_name: String,
    pub default_length_minutes: u32,
    pub running: bool,
    pub phase: SyncPhase,
    pub write_pending: bool,
    pub presentation: PresentationState,
    pub snapshot: Option<TimerSnapshot>,
    pub last_successful_fetch: Option<i64>,
    pub uptime: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Remote(RemoteError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Remote(RemoteError::Transport(_)) => StatusCode::BAD_GATEWAY,
            AppError::NotConnected
            | AppError::WriteInProgress
            | AppError::SessionPaused
            | AppError::SessionReset => StatusCode::CONFLICT,
            AppError::Settings(_) | AppError::StateLock => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.to_string(),
            timestamp: Utc::now(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
