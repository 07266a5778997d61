//! MLB Stats API access.
//!
//! The dispatch run needs three snapshots per invocation: the club list,
//! current standings and the day's schedule with probable pitchers.
//! `StatsSource` is the seam the engine depends on; `MlbStatsClient` is the
//! HTTP implementation.

pub mod client;
pub mod payload;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use ballpark_common::types::{Game, Standing, Team};

pub use client::MlbStatsClient;

/// Errors returned by a stats source.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("HTTP error while fetching {endpoint}: {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned status {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("Malformed {endpoint} payload: {message}")]
    Payload {
        endpoint: &'static str,
        message: String,
    },
}

/// Read-only snapshot source for league data.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// All major-league clubs.
    async fn fetch_teams(&self) -> Result<Vec<Team>, StatsError>;

    /// Current standings for both leagues of the given season.
    async fn fetch_standings(&self, season: i32) -> Result<Vec<Standing>, StatsError>;

    /// Games scheduled on the given calendar date.
    async fn fetch_games_by_date(&self, date: NaiveDate) -> Result<Vec<Game>, StatsError>;
}
