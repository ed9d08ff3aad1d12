//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::{
    error::TimerError,
    state::{AppState, TimerState},
};
use super::responses::{
    ApiResponse, HealthResponse, HistoryResponse, ResetRequest, StatusResponse,
};

/// Turn a driver reply into a handler result, tracking the action on success
fn control_response(
    state: &AppState,
    action: &str,
    message: &str,
    result: Result<TimerState, TimerError>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match result {
        Ok(timer) => {
            state.record_action(action);
            info!("{} endpoint called - {}", action, message);
            Ok(Json(ApiResponse::new(message.to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to {} meeting: {}", action, e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle POST /meeting/reset - Configure a new meeting
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResetRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let result = state
        .meeting
        .reset(request.length_in_minutes, request.speakers)
        .await;
    control_response(&state, "reset", "Meeting reset", result)
}

/// Handle POST /meeting/start - Start the meeting with the first speaker
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let result = state.meeting.start().await;
    control_response(&state, "start", "Meeting started", result)
}

/// Handle POST /meeting/skip - Move on to the next speaker
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let result = state.meeting.skip().await;
    control_response(&state, "skip", "Speaker skipped", result)
}

/// Handle POST /meeting/stop - Stop the meeting, keeping its counters
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let result = state.meeting.stop().await;
    control_response(&state, "stop", "Meeting stopped", result)
}

/// Handle GET /status - Return the current timer state
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.meeting.state().into(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /history - Return recorded meetings, newest first
pub async fn history_handler(State(state): State<Arc<AppState>>) -> Result<Json<HistoryResponse>, StatusCode> {
    match state.get_history() {
        Ok(meetings) => Ok(Json(HistoryResponse { meetings })),
        Err(e) => {
            error!("Failed to read meeting history: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
