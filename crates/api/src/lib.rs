//! HTTP surface of the notification dispatcher.
//!
//! - `POST /api/cron/notification`: one dispatch run, guarded by `x-api-key`
//! - `GET /health`: liveness

pub mod middleware;
pub mod routes;
pub mod state;
