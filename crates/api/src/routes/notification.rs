//! Scheduler-triggered notification run.
//!
//! Per-user failures never fail the request; only run-aborting errors and
//! the dispatch deadline produce a 500.

use std::time::Duration;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{Value, json};

use ballpark_common::error::AppError;
use ballpark_engine::DispatchOutcome;

use crate::middleware::auth::CronAuth;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/cron/notification", post(run_notification))
}

async fn run_notification(
    _auth: CronAuth,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let deadline = Duration::from_secs(state.config.dispatch_timeout_secs);

    let outcome = tokio::time::timeout(deadline, state.dispatcher.run(Utc::now()))
        .await
        .map_err(|_| {
            AppError::Internal(format!(
                "Dispatch did not finish within {}s",
                deadline.as_secs()
            ))
        })??;

    let message = match outcome {
        DispatchOutcome::NoGames { .. } => "No games found",
        DispatchOutcome::Completed(_) => "OK",
    };

    Ok(Json(json!({ "message": message })))
}
