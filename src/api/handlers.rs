//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{extract::State, response::Json};
use tracing::{error, info, warn};

use crate::{error::AppError, tasks::SessionController};
use super::responses::{
    ApiResponse, DefaultLengthRequest, HealthResponse, RenameRequest, SetTimerRequest, StatusResponse,
};

type Session = State<Arc<SessionController>>;

/// Handle GET /status - Current session and valve state
pub async fn status_handler(State(session): Session) -> Result<Json<StatusResponse>, AppError> {
    let state = session.state();

    Ok(Json(StatusResponse {
        valve_name: state.valve_name()?,
        default_length_minutes: state.default_length().minutes(),
        running: session.is_running(),
        phase: state.phase()?,
        write_pending: state.write_in_flight()?,
        presentation: state.presentation(),
        snapshot: state.snapshot()?,
        last_successful_fetch: state.last_successful_fetch()?,
        uptime: state.get_uptime(),
    }))
}

/// Handle POST /timer - Run the valve for the given or default length
pub async fn set_timer_handler(
    State(session): Session,
    Json(request): Json<SetTimerRequest>,
) -> Result<Json<ApiResponse>, AppError> {
    let state = session.state();
    let length = match &request.minutes {
        Some(input) => input.validate().map_err(|e| {
            warn!("Rejected timer length: {}", e);
            e
        })?,
        None => state.default_length(),
    };

    let snapshot = state.set_run_length(length).await.map_err(|e| {
        error!("Failed to set timer: {}", e);
        e
    })?;
    info!("Timer set, ends at {}", snapshot.end_epoch());

    Ok(Json(ApiResponse::ok(
        format!("Timer set to {} minutes", length.minutes()),
        state.presentation(),
    )))
}

/// Handle POST /timer/stop - Turn the valve off
pub async fn stop_timer_handler(State(session): Session) -> Result<Json<ApiResponse>, AppError> {
    let state = session.state();
    state.stop().await.map_err(|e| {
        error!("Failed to stop timer: {}", e);
        e
    })?;

    Ok(Json(ApiResponse::ok("Timer stopped", state.presentation())))
}

/// Handle PUT /settings/name - Rename the valve
pub async fn rename_handler(
    State(session): Session,
    Json(request): Json<RenameRequest>,
) -> Result<Json<ApiResponse>, AppError> {
    session.rename(&request.name)?;

    Ok(Json(ApiResponse::ok(
        format!("Valve name set to {}", request.name.trim()),
        session.state().presentation(),
    )))
}

/// Handle PUT /settings/default-length - Save the default run length
pub async fn default_length_handler(
    State(session): Session,
    Json(request): Json<DefaultLengthRequest>,
) -> Result<Json<ApiResponse>, AppError> {
    let length = request.minutes.validate()?;
    session.state().set_default_length(length)?;

    Ok(Json(ApiResponse::ok(
        format!("Default length set to {} minutes", length.minutes()),
        session.state().presentation(),
    )))
}

/// Handle POST /session/pause - Stop polling and drop the snapshot
pub async fn pause_handler(State(session): Session) -> Result<Json<ApiResponse>, AppError> {
    session.pause()?;
    Ok(Json(ApiResponse::ok("Session paused", session.state().presentation())))
}

/// Handle POST /session/resume - Start a fresh session
pub async fn resume_handler(State(session): Session) -> Result<Json<ApiResponse>, AppError> {
    session.resume()?;
    Ok(Json(ApiResponse::ok("Session resumed", session.state().presentation())))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
