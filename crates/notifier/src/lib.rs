//! Push delivery through the LINE Messaging API.
//!
//! - `line`: HTTP client issuing stateless channel access tokens and sending push messages
//! - `token`: channel access token lifecycle (issue once, re-issue on a fixed interval)
//! - `retry`: exponential backoff with jitter around a single logical send

pub mod error;
pub mod line;
pub mod retry;
pub mod token;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use ballpark_common::types::PushMessage;

pub use error::{ProviderErrorCode, PushError};
pub use line::LineClient;
pub use retry::{RetryPolicy, send_with_retry};
pub use token::{ChannelTokenState, TokenManager};

/// A freshly issued channel access token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    /// Lifetime in seconds as reported by the provider
    pub expires_in: u64,
}

/// Push-message provider.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Issue a new short-lived channel access token.
    async fn issue_channel_token(&self) -> Result<IssuedToken, PushError>;

    /// Send `messages` to `to`. `retry_key` identifies the logical send so the
    /// provider can drop duplicate deliveries of a retried request.
    async fn push(
        &self,
        token: &str,
        retry_key: Uuid,
        to: &str,
        messages: &[PushMessage],
    ) -> Result<(), PushError>;
}
