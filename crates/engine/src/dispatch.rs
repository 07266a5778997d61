//! Dispatch orchestrator.
//!
//! One run:
//! 1. Fetch teams, standings and the day's schedule concurrently
//! 2. Sort games by first pitch and resolve them into `GameContentData`
//! 3. With no games, touch the user store and return early
//! 4. Walk users chunk by chunk; refresh the channel token before each chunk
//! 5. Notify the chunk's users through the bounded concurrency runner
//!
//! Only snapshot, credential and user-page failures abort a run. Everything
//! that goes wrong for a single user is counted in `RunResult` and logged.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use ballpark_common::config::AppConfig;
use ballpark_common::error::AppError;
use ballpark_common::types::{GameContentData, PushMessage, User};
use ballpark_notifier::line::MAX_MESSAGES_PER_PUSH;
use ballpark_notifier::{
    ChannelTokenState, PushError, PushProvider, RetryPolicy, TokenManager, send_with_retry,
};
use ballpark_stats::{StatsError, StatsSource};

use crate::concurrency::run_with_concurrency;
use crate::content::{banner_date, build_game_contents, sort_games_by_start_time};
use crate::message::MessageBuilder;
use crate::relevance::should_notify;
use crate::users::{UserChunks, UserRelations, UserSource};

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Failed to fetch game snapshot: {0}")]
    Snapshot(#[from] StatsError),

    #[error("Failed to issue channel access token: {0}")]
    Credential(#[from] PushError),

    #[error("Failed to read users: {0}")]
    Users(#[from] AppError),
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Users(inner) => inner,
            other => AppError::Upstream(other.to_string()),
        }
    }
}

/// Run counters, shared by the concurrent user tasks of a chunk.
#[derive(Debug, Default)]
pub struct RunResult {
    total: AtomicU64,
    success: AtomicU64,
    error: AtomicU64,
    skip: AtomicU64,
}

impl RunResult {
    pub fn record_success(&self) {
        self.record(&self.success);
    }

    pub fn record_error(&self) {
        self.record(&self.error);
    }

    pub fn record_skip(&self) {
        self.record(&self.skip);
    }

    fn record(&self, outcome: &AtomicU64) {
        outcome.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total: self.total.load(Ordering::Relaxed),
            success: self.success.load(Ordering::Relaxed),
            error: self.error.load(Ordering::Relaxed),
            skip: self.skip.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of `RunResult` at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: u64,
    pub success: u64,
    pub error: u64,
    pub skip: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No game could be resolved; nothing was sent.
    NoGames { user_count: i64 },
    Completed(RunSummary),
}

/// UTC+9, used for kickoff times unless configured otherwise.
const JST: FixedOffset = match FixedOffset::east_opt(9 * 3600) {
    Some(offset) => offset,
    None => panic!("UTC+9 is a valid offset"),
};

/// Run-shape parameters.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Users per page
    pub chunk_size: usize,
    /// Concurrent user tasks within a chunk
    pub concurrency: usize,
    /// Offset used for kickoff times
    pub display_offset: FixedOffset,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            chunk_size: 200,
            concurrency: 10,
            display_offset: JST,
        }
    }
}

pub struct Dispatcher {
    stats: Arc<dyn StatsSource>,
    users: Arc<dyn UserSource>,
    push: Arc<dyn PushProvider>,
    settings: DispatchSettings,
    builder: MessageBuilder,
    token_manager: TokenManager,
    retry: RetryPolicy,
}

impl Dispatcher {
    pub fn new(
        stats: Arc<dyn StatsSource>,
        users: Arc<dyn UserSource>,
        push: Arc<dyn PushProvider>,
    ) -> Self {
        Self {
            stats,
            users,
            push,
            settings: DispatchSettings::default(),
            builder: MessageBuilder::default(),
            token_manager: TokenManager::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_config(
        config: &AppConfig,
        stats: Arc<dyn StatsSource>,
        users: Arc<dyn UserSource>,
        push: Arc<dyn PushProvider>,
    ) -> Result<Self, AppError> {
        let display_offset = config
            .display_utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "DISPLAY_UTC_OFFSET_HOURS out of range: {}",
                    config.display_utc_offset_hours
                ))
            })?;

        Ok(Self::new(stats, users, push)
            .with_settings(DispatchSettings {
                chunk_size: config.user_chunk_size,
                concurrency: config.send_concurrency,
                display_offset,
            })
            .with_message_builder(MessageBuilder::new(
                config.message_format,
                config.max_games_per_message,
            ))
            .with_token_manager(TokenManager::new(Duration::from_secs(
                config.token_refresh_interval_secs,
            )))
            .with_retry_policy(RetryPolicy::new(
                config.max_retry_count,
                Duration::from_millis(config.retry_base_interval_ms),
                Duration::from_millis(config.retry_base_jitter_ms),
            )))
    }

    pub fn with_settings(mut self, settings: DispatchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_message_builder(mut self, builder: MessageBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_token_manager(mut self, token_manager: TokenManager) -> Self {
        self.token_manager = token_manager;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Execute one dispatch run for the games scheduled on `now`'s UTC date.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<DispatchOutcome, DispatchError> {
        let game_date = now.date_naive();
        let offset = self.settings.display_offset;

        let (teams, standings, mut games) = tokio::try_join!(
            self.stats.fetch_teams(),
            self.stats.fetch_standings(game_date.year()),
            self.stats.fetch_games_by_date(game_date),
        )?;

        tracing::info!(
            %game_date,
            games = games.len(),
            teams = teams.len(),
            standings = standings.len(),
            "Dispatch started"
        );

        sort_games_by_start_time(&mut games);
        let contents = build_game_contents(&teams, &standings, &games, offset);

        if contents.is_empty() {
            // Keeps the database from idling into suspension
            let user_count = self.users.count_users().await?;
            tracing::info!(user_count, "No games found");
            return Ok(DispatchOutcome::NoGames { user_count });
        }

        let banner = banner_date(game_date);
        let result = RunResult::default();
        let mut token = ChannelTokenState::default();
        let mut chunks = UserChunks::new(
            self.users.as_ref(),
            self.settings.chunk_size,
            UserRelations::ALL,
        );
        let mut chunk_index = 0usize;

        while let Some(chunk) = chunks.next().await? {
            token = self
                .token_manager
                .ensure_token(self.push.as_ref(), &token)
                .await?;

            tracing::info!(chunk = chunk_index, users = chunk.len(), "Processing user chunk");

            let tasks: Vec<_> = chunk
                .iter()
                .map(|user| self.notify_user(user, &contents, &banner, &token.token, &result))
                .collect();
            run_with_concurrency(tasks, self.settings.concurrency).await;

            chunk_index += 1;
        }

        let summary = result.summary();
        tracing::info!(
            total = summary.total,
            success = summary.success,
            error = summary.error,
            skip = summary.skip,
            chunks = chunk_index,
            "Dispatch finished"
        );

        Ok(DispatchOutcome::Completed(summary))
    }

    /// One user's task. Records exactly one outcome.
    async fn notify_user(
        &self,
        user: &User,
        games: &[GameContentData],
        banner: &str,
        token: &str,
        result: &RunResult,
    ) {
        let relevant = games
            .iter()
            .filter(|game| should_notify(game, &user.team_ids, &user.player_ids));
        let messages = self.builder.build(banner, relevant);

        if messages.is_empty() {
            result.record_skip();
            return;
        }

        match self.send(user, token, &messages).await {
            Ok(()) => result.record_success(),
            Err(e) => {
                tracing::warn!(
                    user_id = user.id,
                    error_kind = ?e.kind(),
                    error = %e,
                    "Failed to notify user"
                );
                result.record_error();
            }
        }
    }

    /// Send in push-sized groups, each with its own retry key.
    async fn send(
        &self,
        user: &User,
        token: &str,
        messages: &[PushMessage],
    ) -> Result<(), PushError> {
        for group in messages.chunks(MAX_MESSAGES_PER_PUSH) {
            send_with_retry(
                self.push.as_ref(),
                &self.retry,
                token,
                Uuid::new_v4(),
                &user.line_id,
                group,
            )
            .await?;
        }
        Ok(())
    }
}
