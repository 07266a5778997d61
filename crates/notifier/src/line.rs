//! LINE Messaging API client.
//!
//! Uses stateless channel access tokens (`/oauth2/v3/token`, 15 minute
//! lifetime) so no token revocation bookkeeping is needed, and sends push
//! messages with an `X-Line-Retry-Key` header for idempotent retries.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use ballpark_common::types::PushMessage;

use crate::{IssuedToken, PushError, PushProvider};

/// LINE accepts at most five message objects per push request.
pub const MAX_MESSAGES_PER_PUSH: usize = 5;

/// Error body returned by the Messaging API.
#[derive(Debug, Deserialize)]
struct LineErrorBody {
    message: Option<String>,
    error_description: Option<String>,
}

/// LINE Messaging API client bound to one channel.
#[derive(Debug, Clone)]
pub struct LineClient {
    client: reqwest::Client,
    base_url: String,
    channel_id: String,
    channel_secret: String,
}

impl LineClient {
    pub fn new(
        base_url: impl Into<String>,
        channel_id: impl Into<String>,
        channel_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            channel_id: channel_id.into(),
            channel_secret: channel_secret.into(),
        })
    }

    /// Turn a non-success response into a classified `PushError`.
    async fn error_from_response(response: reqwest::Response) -> PushError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<LineErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error_description))
            .unwrap_or(body);
        PushError::provider(status, message)
    }
}

#[async_trait]
impl PushProvider for LineClient {
    async fn issue_channel_token(&self) -> Result<IssuedToken, PushError> {
        let response = self
            .client
            .post(format!("{}/oauth2/v3/token", self.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.channel_id.as_str()),
                ("client_secret", self.channel_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let token: IssuedToken = response
            .json()
            .await
            .map_err(|e| PushError::Decode(e.to_string()))?;

        tracing::info!(expires_in = token.expires_in, "Issued LINE channel access token");
        Ok(token)
    }

    async fn push(
        &self,
        token: &str,
        retry_key: Uuid,
        to: &str,
        messages: &[PushMessage],
    ) -> Result<(), PushError> {
        let body = json!({
            "to": to,
            "messages": messages,
        });

        let response = self
            .client
            .post(format!("{}/v2/bot/message/push", self.base_url))
            .bearer_auth(token)
            .header("X-Line-Retry-Key", retry_key.to_string())
            .json(&body)
            .send()
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_parsing() {
        let body: LineErrorBody =
            serde_json::from_str(r#"{"message":"The request body has 1 error(s)"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("The request body has 1 error(s)"));

        let body: LineErrorBody = serde_json::from_str(
            r#"{"error":"invalid_client","error_description":"invalid client_secret"}"#,
        )
        .unwrap();
        assert_eq!(body.error_description.as_deref(), Some("invalid client_secret"));
    }

    #[test]
    fn test_issued_token_deserializes() {
        let token: IssuedToken = serde_json::from_str(
            r#"{"token_type":"Bearer","access_token":"abc","expires_in":900}"#,
        )
        .unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.expires_in, 900);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client =
            LineClient::new("http://127.0.0.1:9", "id", "secret", Duration::from_millis(500))
                .unwrap();
        let err = client.issue_channel_token().await.unwrap_err();
        assert!(matches!(err, PushError::Transport(_)));
        assert!(!err.is_retryable());
    }
}
