use std::str::FromStr;

use serde::Deserialize;

use crate::types::MessageFormat;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Maximum number of PostgreSQL connections in the pool (default: 10)
    pub db_max_connections: u32,

    /// HTTP listen port (default: 3000)
    pub port: u16,

    /// Shared secret expected in the `x-api-key` header of cron requests
    pub cron_api_key: String,

    /// MLB Stats API base URL
    pub mlb_api_base_url: String,

    /// LINE API base URL (both OAuth and Messaging API live under it)
    pub line_api_base_url: String,

    /// LINE Messaging API channel ID
    pub line_channel_id: String,

    /// LINE Messaging API channel secret
    pub line_channel_secret: String,

    /// Per-request timeout for outbound HTTP calls, in seconds
    pub http_timeout_secs: u64,

    /// Number of users loaded per page (default: 200)
    pub user_chunk_size: usize,

    /// Number of concurrent push sends within a chunk (default: 10)
    pub send_concurrency: usize,

    /// Maximum number of games rendered into a single message (default: 10)
    pub max_games_per_message: usize,

    /// Message layout used for push messages (default: flex)
    pub message_format: MessageFormat,

    /// Channel access token re-issue interval in seconds (default: 600).
    /// Stateless LINE tokens live for 15 minutes.
    pub token_refresh_interval_secs: u64,

    /// Retries after the first push attempt (default: 3)
    pub max_retry_count: u32,

    /// Backoff base interval in milliseconds (default: 1000)
    pub retry_base_interval_ms: u64,

    /// Upper bound (exclusive) of the random jitter added to each backoff, in milliseconds
    pub retry_base_jitter_ms: u64,

    /// UTC offset used to render kickoff times (default: 9, JST)
    pub display_utc_offset_hours: i32,

    /// Upper bound for one dispatch run in seconds
    pub dispatch_timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let message_format = std::env::var("MESSAGE_FORMAT")
            .unwrap_or_else(|_| "flex".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("MESSAGE_FORMAT is invalid: {}", e))?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,
            port: parse_or("PORT", 3000)?,
            cron_api_key: required("CRON_API_KEY")?,
            mlb_api_base_url: std::env::var("MLB_API_BASE_URL")
                .unwrap_or_else(|_| "https://statsapi.mlb.com/api/v1".to_string()),
            line_api_base_url: std::env::var("LINE_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.line.me".to_string()),
            line_channel_id: required("LINE_CHANNEL_ID")?,
            line_channel_secret: required("LINE_CHANNEL_SECRET")?,
            http_timeout_secs: parse_or("HTTP_TIMEOUT_SECS", 10)?,
            user_chunk_size: parse_or("USER_CHUNK_SIZE", 200)?,
            send_concurrency: parse_or("SEND_CONCURRENCY", 10)?,
            max_games_per_message: parse_or("MAX_GAMES_PER_MESSAGE", 10)?,
            message_format,
            token_refresh_interval_secs: parse_or("TOKEN_REFRESH_INTERVAL_SECS", 600)?,
            max_retry_count: parse_or("MAX_RETRY_COUNT", 3)?,
            retry_base_interval_ms: parse_or("RETRY_BASE_INTERVAL_MS", 1000)?,
            retry_base_jitter_ms: parse_or("RETRY_BASE_JITTER_MS", 250)?,
            display_utc_offset_hours: parse_or("DISPLAY_UTC_OFFSET_HOURS", 9)?,
            dispatch_timeout_secs: parse_or("DISPATCH_TIMEOUT_SECS", 840)?,
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    std::env::var(key).map_err(|_| anyhow::anyhow!("{} environment variable is required", key))
}

fn parse_or<T: FromStr>(key: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            anyhow::anyhow!(
                "{} must be a valid {}",
                key,
                std::any::type_name::<T>()
            )
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_uses_default_when_unset() {
        let value: u64 = parse_or("BALLPARK_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_required_reports_missing_key() {
        let err = required("BALLPARK_TEST_MISSING_REQUIRED").unwrap_err();
        assert!(err.to_string().contains("BALLPARK_TEST_MISSING_REQUIRED"));
    }
}
