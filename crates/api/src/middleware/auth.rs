//! Shared-secret authentication for scheduler-triggered endpoints.
//!
//! The scheduler sends the configured `CRON_API_KEY` in the `x-api-key`
//! header. `CronAuth` is the Axum extractor that enforces it.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use ballpark_common::error::AppError;

use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Marker extracted from requests carrying the cron API key.
///
/// ```ignore
/// async fn handler(_auth: CronAuth) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CronAuth;

/// Check `x-api-key` against the expected key. An empty expected key never matches.
pub fn verify_api_key(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if !expected.is_empty() && key == expected => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

impl FromRequestParts<AppState> for CronAuth {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = verify_api_key(&parts.headers, &state.config.cron_api_key);
        let path = parts.uri.path().to_string();

        async move {
            if result.is_err() {
                tracing::warn!(%path, "Rejected request without a valid API key");
            }
            result.map(|()| CronAuth)
        }
    }
}
