use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An MLB club as returned by the stats source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    /// Full club name (e.g., "New York Yankees")
    pub name: String,
    /// Short club name used in messages (e.g., "Yankees")
    pub team_name: String,
    pub abbreviation: String,
    pub league_id: i64,
    pub division_id: i64,
}

/// A club's current position in its division.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub team_id: i64,
    pub league_id: i64,
    pub division_id: i64,
    /// Division rank as reported by the stats source ("1", "2", ...)
    pub division_rank: String,
    pub is_wild_card_leader: bool,
}

impl Standing {
    /// Division leader or designated wild-card leader.
    pub fn in_playoff_spot(&self) -> bool {
        self.division_rank == "1" || self.is_wild_card_leader
    }
}

/// The starting pitcher officially projected for a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbablePitcher {
    pub id: i64,
    pub full_name: String,
}

/// One side (home or away) of a scheduled game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSide {
    pub team_id: i64,
    pub probable_pitcher: Option<ProbablePitcher>,
}

/// A scheduled game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub game_pk: i64,
    /// Scheduled first pitch (UTC)
    pub game_date: DateTime<Utc>,
    pub home: GameSide,
    pub away: GameSide,
}

/// A registered LINE user with the clubs and pitchers they follow.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub line_id: String,
    pub team_ids: Vec<i64>,
    pub player_ids: Vec<i64>,
}

/// Per-side content of a game, resolved against the team and standing snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamContent {
    pub team_id: i64,
    pub team_name: String,
    /// e.g. "ア東1位" or "ア東2位 WC"; `None` when the standing is unknown
    pub standing_text: Option<String>,
    pub pitcher_last_name: Option<String>,
    pub probable_pitcher_id: Option<i64>,
    pub in_playoff_spot: bool,
}

/// Everything needed to decide on and render one game, built once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameContentData {
    /// Kickoff time already formatted in the display timezone ("HH:MM")
    pub start_time: String,
    pub home: TeamContent,
    pub away: TeamContent,
}

/// Push message layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageFormat {
    /// Card-like flex bubble (system of record)
    Flex,
    /// Plain joined text (legacy)
    Text,
}

impl std::fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageFormat::Flex => write!(f, "flex"),
            MessageFormat::Text => write!(f, "text"),
        }
    }
}

impl std::str::FromStr for MessageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flex" => Ok(MessageFormat::Flex),
            "text" => Ok(MessageFormat::Text),
            other => Err(format!("unknown message format '{}'", other)),
        }
    }
}

/// A LINE message object as sent in a push request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PushMessage {
    Text {
        text: String,
    },
    Flex {
        #[serde(rename = "altText")]
        alt_text: String,
        contents: serde_json::Value,
    },
}
