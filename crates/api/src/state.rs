//! Shared application state for the Axum API server.

use std::sync::Arc;

use ballpark_common::config::AppConfig;
use ballpark_engine::Dispatcher;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, config: AppConfig) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            config,
        }
    }
}
