// HTTP request handlers
use crate::application::polling_service::{CycleOutcome, ForecastSnapshot};
use crate::application::preferences::{
    data_collection_consent, load_preferences, reset_to_defaults, save_preferences,
    set_data_collection_consent,
};
use crate::domain::alert::AlertPreferences;
use crate::domain::reading::{FatigueReading, TimeRange};
use crate::error::SettingsError;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::infrastructure::ndjson_stream::stream_from_receiver;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub range: Option<TimeRange>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub range: TimeRange,
    pub readings: Vec<FatigueReading>,
}

#[derive(Serialize, Deserialize)]
pub struct ConsentBody {
    pub data_collection_consent: bool,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub updated: bool,
    pub snapshot: ForecastSnapshot,
}

fn respond(result: Result<Response, StatusCode>) -> Response {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current forecast, connection state and fatigue level
pub async fn get_forecast(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state.controller.snapshot();
    respond(json_response(&snapshot, accepts_brotli(&headers)).await)
}

/// Historical readings for a chart range, oldest first
pub async fn get_history(
    Query(query): Query<HistoryQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let range = query.range.unwrap_or_default();
    let history = HistoryResponse {
        range,
        readings: state.controller.history(range),
    };
    respond(json_response(&history, accepts_brotli(&headers)).await)
}

/// Live poll events as newline-delimited JSON
pub async fn stream_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    stream_from_receiver(state.controller.subscribe())
}

/// Run a poll cycle now
pub async fn refresh(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let outcome = state.controller.poll_now().await;
    let response = RefreshResponse {
        updated: matches!(outcome, CycleOutcome::Updated { .. }),
        snapshot: state.controller.snapshot(),
    };
    respond(json_response(&response, accepts_brotli(&headers)).await)
}

pub async fn get_preferences(State(state): State<Arc<AppState>>) -> Json<AlertPreferences> {
    Json(load_preferences(state.controller.settings().as_ref()))
}

/// Explicit user save of alert preferences
pub async fn put_preferences(
    State(state): State<Arc<AppState>>,
    Json(prefs): Json<AlertPreferences>,
) -> Response {
    match save_preferences(state.controller.settings().as_ref(), &prefs) {
        Ok(()) => Json(prefs).into_response(),
        Err(SettingsError::Invalid(e)) => {
            tracing::warn!("Rejected preferences: {}", e);
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Error saving preferences: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn reset_preferences(State(state): State<Arc<AppState>>) -> Response {
    match reset_to_defaults(state.controller.settings().as_ref()) {
        Ok(prefs) => Json(prefs).into_response(),
        Err(e) => {
            tracing::error!("Error resetting preferences: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn get_consent(State(state): State<Arc<AppState>>) -> Json<ConsentBody> {
    Json(ConsentBody {
        data_collection_consent: data_collection_consent(state.controller.settings().as_ref()),
    })
}

pub async fn put_consent(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ConsentBody>,
) -> Response {
    let settings = state.controller.settings();
    match set_data_collection_consent(settings.as_ref(), body.data_collection_consent) {
        Ok(()) => Json(body).into_response(),
        Err(e) => {
            tracing::error!("Error saving consent: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Remove delivered notifications and the badge
pub async fn clear_notifications(State(state): State<Arc<AppState>>) -> StatusCode {
    state.controller.alerts().clear_all().await;
    StatusCode::NO_CONTENT
}
