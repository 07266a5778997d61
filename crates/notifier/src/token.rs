//! Channel access token lifecycle.
//!
//! The token is issued lazily and then reused until the refresh interval has
//! elapsed. The interval is shorter than the provider's real lifetime so a
//! token handed to a batch of concurrent sends never expires mid-batch.
//! Callers refresh between batches only; workers read a stable snapshot.

use std::time::Duration;

use tokio::time::Instant;

use crate::{PushError, PushProvider};

/// Default re-issue interval: 10 minutes against a 15 minute token lifetime.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Current channel access token and when it was issued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelTokenState {
    pub token: String,
    pub issued_at: Option<Instant>,
}

impl ChannelTokenState {
    pub fn is_unset(&self) -> bool {
        self.token.is_empty() || self.issued_at.is_none()
    }
}

/// Issues and refreshes channel access tokens.
#[derive(Debug, Clone)]
pub struct TokenManager {
    refresh_interval: Duration,
}

impl TokenManager {
    pub fn new(refresh_interval: Duration) -> Self {
        Self { refresh_interval }
    }

    /// Whether `state` must be replaced by a newly issued token at `now`.
    pub fn needs_refresh(&self, state: &ChannelTokenState, now: Instant) -> bool {
        if state.token.is_empty() {
            return true;
        }
        match state.issued_at {
            None => true,
            Some(issued_at) => now.saturating_duration_since(issued_at) > self.refresh_interval,
        }
    }

    /// Return a usable token state, issuing a new token when the current one is
    /// unset or older than the refresh interval.
    pub async fn ensure_token(
        &self,
        provider: &dyn PushProvider,
        state: &ChannelTokenState,
    ) -> Result<ChannelTokenState, PushError> {
        let now = Instant::now();

        if !self.needs_refresh(state, now) {
            tracing::debug!("Reusing channel access token");
            return Ok(state.clone());
        }

        let issued = provider.issue_channel_token().await?;

        if Duration::from_secs(issued.expires_in) <= self.refresh_interval {
            tracing::warn!(
                expires_in = issued.expires_in,
                refresh_interval_secs = self.refresh_interval.as_secs(),
                "Token lifetime is not longer than the refresh interval"
            );
        }

        tracing::info!(
            initial = state.is_unset(),
            "Channel access token issued"
        );

        Ok(ChannelTokenState {
            token: issued.access_token,
            issued_at: Some(now),
        })
    }
}

impl Default for TokenManager {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use uuid::Uuid;

    use ballpark_common::types::PushMessage;

    use crate::IssuedToken;

    /// Issues "token-1", "token-2", ... and counts issuance calls.
    #[derive(Default)]
    struct CountingProvider {
        issued: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl PushProvider for CountingProvider {
        async fn issue_channel_token(&self) -> Result<IssuedToken, PushError> {
            if self.fail {
                return Err(PushError::provider(401, "invalid client"));
            }
            let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(IssuedToken {
                access_token: format!("token-{}", n),
                expires_in: 900,
            })
        }

        async fn push(
            &self,
            _token: &str,
            _retry_key: Uuid,
            _to: &str,
            _messages: &[PushMessage],
        ) -> Result<(), PushError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_issue() {
        let provider = CountingProvider::default();
        let manager = TokenManager::default();

        let state = manager
            .ensure_token(&provider, &ChannelTokenState::default())
            .await
            .unwrap();

        assert_eq!(state.token, "token-1");
        assert!(state.issued_at.is_some());
        assert_eq!(provider.issued.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reuse_before_interval_and_reissue_after() {
        let provider = CountingProvider::default();
        let manager = TokenManager::default();

        // t = 0
        let state = manager
            .ensure_token(&provider, &ChannelTokenState::default())
            .await
            .unwrap();

        // t = 9 min: cached token reused
        tokio::time::advance(Duration::from_secs(9 * 60)).await;
        let state = manager.ensure_token(&provider, &state).await.unwrap();
        assert_eq!(state.token, "token-1");
        assert_eq!(provider.issued.load(Ordering::SeqCst), 1);

        // t = 11 min: exactly one re-issue
        tokio::time::advance(Duration::from_secs(2 * 60)).await;
        let state = manager.ensure_token(&provider, &state).await.unwrap();
        assert_eq!(state.token, "token-2");
        assert_eq!(provider.issued.load(Ordering::SeqCst), 2);

        // Fresh token is reused again right away
        let state = manager.ensure_token(&provider, &state).await.unwrap();
        assert_eq!(state.token, "token-2");
        assert_eq!(provider.issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_token_is_reissued() {
        let manager = TokenManager::default();
        let state = ChannelTokenState {
            token: String::new(),
            issued_at: Some(Instant::now()),
        };
        assert!(manager.needs_refresh(&state, Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_issue_failure_propagates() {
        let provider = CountingProvider {
            fail: true,
            ..Default::default()
        };
        let manager = TokenManager::default();

        let err = manager
            .ensure_token(&provider, &ChannelTokenState::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.provider_code(),
            Some(crate::ProviderErrorCode::Unauthorized)
        );
    }
}
