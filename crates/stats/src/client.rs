use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use ballpark_common::types::{Game, Standing, Team};

use crate::payload::{ScheduleResponse, StandingsResponse, TeamsResponse};
use crate::{StatsError, StatsSource};

/// MLB sport id in the stats API.
const SPORT_ID_MLB: &str = "1";

/// American League and National League.
const MLB_LEAGUE_IDS: &str = "103,104";

/// HTTP client for `statsapi.mlb.com`.
#[derive(Debug, Clone)]
pub struct MlbStatsClient {
    client: reqwest::Client,
    base_url: String,
}

impl MlbStatsClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &[(&str, String)],
    ) -> Result<T, StatsError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| StatsError::Http { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| StatsError::Http { endpoint, source })?;

        serde_json::from_slice(&body).map_err(|e| StatsError::Payload {
            endpoint,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl StatsSource for MlbStatsClient {
    async fn fetch_teams(&self) -> Result<Vec<Team>, StatsError> {
        let response: TeamsResponse = self
            .get_json("teams", &[("sportId", SPORT_ID_MLB.to_string())])
            .await?;

        let teams = response.into_teams();
        tracing::debug!(count = teams.len(), "Fetched teams");
        Ok(teams)
    }

    async fn fetch_standings(&self, season: i32) -> Result<Vec<Standing>, StatsError> {
        let response: StandingsResponse = self
            .get_json(
                "standings",
                &[
                    ("sportId", SPORT_ID_MLB.to_string()),
                    ("leagueId", MLB_LEAGUE_IDS.to_string()),
                    ("season", season.to_string()),
                    (
                        "fields",
                        "records,league,id,division,id,teamRecords,team,id,divisionRank,wildCardLeader"
                            .to_string(),
                    ),
                ],
            )
            .await?;

        let standings = response.into_standings();
        tracing::debug!(season, count = standings.len(), "Fetched standings");
        Ok(standings)
    }

    async fn fetch_games_by_date(&self, date: NaiveDate) -> Result<Vec<Game>, StatsError> {
        let response: ScheduleResponse = self
            .get_json(
                "schedule",
                &[
                    ("sportId", SPORT_ID_MLB.to_string()),
                    ("date", date.format("%Y-%m-%d").to_string()),
                    ("hydrate", "probablePitcher".to_string()),
                    (
                        "fields",
                        "dates,games,gamePk,gameDate,teams,away,home,team,id,name,probablePitcher,id,fullName"
                            .to_string(),
                    ),
                ],
            )
            .await?;

        let games = response.into_games();
        tracing::debug!(%date, count = games.len(), "Fetched schedule");
        Ok(games)
    }
}
