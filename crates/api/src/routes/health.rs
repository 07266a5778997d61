//! Liveness probe, with the active message layout.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "ballpark-api",
        "version": env!("CARGO_PKG_VERSION"),
        "message_format": state.config.message_format,
    }))
}
