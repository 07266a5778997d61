//! Wire shapes of the MLB Stats API responses and their mapping onto the
//! shared domain types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use ballpark_common::types::{Game, GameSide, ProbablePitcher, Standing, Team};

#[derive(Debug, Deserialize)]
pub struct IdRef {
    pub id: i64,
}

// ---------- /teams ----------

#[derive(Debug, Deserialize)]
pub struct TeamsResponse {
    #[serde(default)]
    pub teams: Vec<RawTeam>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTeam {
    pub id: i64,
    pub name: String,
    pub team_name: String,
    #[serde(default)]
    pub abbreviation: String,
    pub league: IdRef,
    pub division: IdRef,
}

impl TeamsResponse {
    pub fn into_teams(self) -> Vec<Team> {
        self.teams
            .into_iter()
            .map(|team| Team {
                id: team.id,
                name: team.name,
                team_name: team.team_name,
                abbreviation: team.abbreviation,
                league_id: team.league.id,
                division_id: team.division.id,
            })
            .collect()
    }
}

// ---------- /standings ----------

#[derive(Debug, Deserialize)]
pub struct StandingsResponse {
    #[serde(default)]
    pub records: Vec<RawDivisionRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDivisionRecord {
    pub league: IdRef,
    pub division: IdRef,
    #[serde(default)]
    pub team_records: Vec<RawTeamRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTeamRecord {
    pub team: IdRef,
    #[serde(default)]
    pub division_rank: String,
    pub wild_card_leader: Option<bool>,
}

impl StandingsResponse {
    pub fn into_standings(self) -> Vec<Standing> {
        self.records
            .into_iter()
            .flat_map(|record| {
                let league_id = record.league.id;
                let division_id = record.division.id;
                record
                    .team_records
                    .into_iter()
                    .map(move |team_record| Standing {
                        team_id: team_record.team.id,
                        league_id,
                        division_id,
                        division_rank: team_record.division_rank,
                        is_wild_card_leader: team_record.wild_card_leader.unwrap_or(false),
                    })
            })
            .collect()
    }
}

// ---------- /schedule ----------

#[derive(Debug, Deserialize)]
pub struct ScheduleResponse {
    #[serde(default)]
    pub dates: Vec<RawScheduleDate>,
}

#[derive(Debug, Deserialize)]
pub struct RawScheduleDate {
    #[serde(default)]
    pub games: Vec<RawGame>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGame {
    pub game_pk: i64,
    /// e.g. "2025-08-16T18:20:00Z"
    pub game_date: DateTime<Utc>,
    pub teams: RawGameTeams,
}

#[derive(Debug, Deserialize)]
pub struct RawGameTeams {
    pub home: RawGameSide,
    pub away: RawGameSide,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGameSide {
    pub team: IdRef,
    pub probable_pitcher: Option<RawPerson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPerson {
    pub id: i64,
    pub full_name: String,
}

impl From<RawGameSide> for GameSide {
    fn from(side: RawGameSide) -> Self {
        GameSide {
            team_id: side.team.id,
            probable_pitcher: side.probable_pitcher.map(|p| ProbablePitcher {
                id: p.id,
                full_name: p.full_name,
            }),
        }
    }
}

impl ScheduleResponse {
    pub fn into_games(self) -> Vec<Game> {
        self.dates
            .into_iter()
            .flat_map(|date| date.games)
            .map(|game| Game {
                game_pk: game.game_pk,
                game_date: game.game_date,
                home: game.teams.home.into(),
                away: game.teams.away.into(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_teams_mapping() {
        let response: TeamsResponse = serde_json::from_value(json!({
            "teams": [{
                "id": 147,
                "name": "New York Yankees",
                "teamName": "Yankees",
                "abbreviation": "NYY",
                "league": {"id": 103},
                "division": {"id": 201}
            }]
        }))
        .unwrap();

        let teams = response.into_teams();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].id, 147);
        assert_eq!(teams[0].team_name, "Yankees");
        assert_eq!(teams[0].league_id, 103);
        assert_eq!(teams[0].division_id, 201);
    }

    #[test]
    fn test_standings_flattened_per_division() {
        let response: StandingsResponse = serde_json::from_value(json!({
            "records": [
                {
                    "league": {"id": 103},
                    "division": {"id": 201},
                    "teamRecords": [
                        {"team": {"id": 147}, "divisionRank": "1"},
                        {"team": {"id": 111}, "divisionRank": "2", "wildCardLeader": true}
                    ]
                },
                {
                    "league": {"id": 104},
                    "division": {"id": 204},
                    "teamRecords": [
                        {"team": {"id": 121}, "divisionRank": "3", "wildCardLeader": false}
                    ]
                }
            ]
        }))
        .unwrap();

        let standings = response.into_standings();
        assert_eq!(standings.len(), 3);

        assert_eq!(standings[0].team_id, 147);
        assert!(!standings[0].is_wild_card_leader);
        assert!(standings[0].in_playoff_spot());

        assert_eq!(standings[1].team_id, 111);
        assert!(standings[1].is_wild_card_leader);
        assert!(standings[1].in_playoff_spot());

        assert_eq!(standings[2].division_id, 204);
        assert!(!standings[2].in_playoff_spot());
    }

    #[test]
    fn test_schedule_with_and_without_probable_pitchers() {
        let response: ScheduleResponse = serde_json::from_value(json!({
            "dates": [{
                "games": [{
                    "gamePk": 776543,
                    "gameDate": "2025-08-16T18:20:00Z",
                    "teams": {
                        "home": {
                            "team": {"id": 147, "name": "New York Yankees"},
                            "probablePitcher": {"id": 608331, "fullName": "Max Fried"}
                        },
                        "away": {
                            "team": {"id": 111, "name": "Boston Red Sox"}
                        }
                    }
                }]
            }]
        }))
        .unwrap();

        let games = response.into_games();
        assert_eq!(games.len(), 1);
        let game = &games[0];
        assert_eq!(game.game_pk, 776543);
        assert_eq!(game.game_date.to_rfc3339(), "2025-08-16T18:20:00+00:00");
        assert_eq!(game.home.team_id, 147);
        assert_eq!(
            game.home.probable_pitcher.as_ref().map(|p| p.id),
            Some(608331)
        );
        assert!(game.away.probable_pitcher.is_none());
    }

    #[test]
    fn test_schedule_without_dates_yields_no_games() {
        let response: ScheduleResponse =
            serde_json::from_value(json!({"dates": []})).unwrap();
        assert!(response.into_games().is_empty());

        let response: ScheduleResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.into_games().is_empty());
    }
}
