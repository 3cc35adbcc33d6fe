// Presentation layer - Local HTTP view of the polling state
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    clear_notifications, get_consent, get_forecast, get_history, get_preferences, health_check,
    put_consent, put_preferences, refresh, reset_preferences, stream_events,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/forecast", get(get_forecast))
        .route("/history", get(get_history))
        .route("/stream", get(stream_events))
        .route("/refresh", post(refresh))
        .route("/preferences", get(get_preferences).put(put_preferences))
        .route("/preferences/reset", post(reset_preferences))
        .route("/preferences/consent", get(get_consent).put(put_consent))
        .route("/notifications/clear", post(clear_notifications))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
