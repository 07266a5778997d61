//! Game content: resolves the raw schedule against the team and standing
//! snapshot once per run.
//!
//! Games whose home or away club is missing from the team snapshot are dropped
//! entirely. A missing standing only degrades the text (and counts as "not in a
//! playoff spot").

use std::collections::HashMap;

use chrono::{Days, FixedOffset, NaiveDate};

use ballpark_common::types::{Game, GameContentData, GameSide, Standing, Team, TeamContent};

/// Japanese short names of the six MLB divisions, keyed by division id.
const DIVISION_ABBREVIATIONS: &[(i64, &str)] = &[
    (200, "ア西"),
    (201, "ア東"),
    (202, "ア中"),
    (203, "ナ西"),
    (204, "ナ東"),
    (205, "ナ中"),
];

pub fn division_abbreviation(division_id: i64) -> Option<&'static str> {
    DIVISION_ABBREVIATIONS
        .iter()
        .find(|(id, _)| *id == division_id)
        .map(|(_, abbr)| *abbr)
}

/// e.g. "ア東1位", or "ア東2位 WC" for the wild-card leader.
pub fn standing_text(standing: &Standing) -> Option<String> {
    let abbr = division_abbreviation(standing.division_id)?;
    let text = format!("{}{}位", abbr, standing.division_rank);
    if standing.is_wild_card_leader {
        Some(format!("{} WC", text))
    } else {
        Some(text)
    }
}

/// Last whitespace-separated token of a full name ("Max Fried" → "Fried").
pub fn last_name(full_name: &str) -> &str {
    full_name.split_whitespace().last().unwrap_or(full_name)
}

/// Order games by first pitch, keeping the schedule order for ties.
pub fn sort_games_by_start_time(games: &mut [Game]) {
    games.sort_by_key(|game| game.game_date);
}

/// "MM/DD" of the day after the schedule date the games were fetched for.
pub fn banner_date(game_date: NaiveDate) -> String {
    game_date
        .checked_add_days(Days::new(1))
        .unwrap_or(game_date)
        .format("%m/%d")
        .to_string()
}

/// Build one `GameContentData` per resolvable game, preserving input order.
pub fn build_game_contents(
    teams: &[Team],
    standings: &[Standing],
    games: &[Game],
    offset: FixedOffset,
) -> Vec<GameContentData> {
    let teams_by_id: HashMap<i64, &Team> = teams.iter().map(|t| (t.id, t)).collect();
    let standings_by_team: HashMap<i64, &Standing> =
        standings.iter().map(|s| (s.team_id, s)).collect();

    let side_content = |side: &GameSide| -> Option<TeamContent> {
        let team = teams_by_id.get(&side.team_id)?;
        let standing = standings_by_team.get(&side.team_id);
        Some(TeamContent {
            team_id: team.id,
            team_name: team.team_name.clone(),
            standing_text: standing.and_then(|s| standing_text(s)),
            pitcher_last_name: side
                .probable_pitcher
                .as_ref()
                .map(|p| last_name(&p.full_name).to_string()),
            probable_pitcher_id: side.probable_pitcher.as_ref().map(|p| p.id),
            in_playoff_spot: standing.is_some_and(|s| s.in_playoff_spot()),
        })
    };

    games
        .iter()
        .filter_map(|game| {
            let home = side_content(&game.home);
            let away = side_content(&game.away);
            let (Some(home), Some(away)) = (home, away) else {
                tracing::debug!(game_pk = game.game_pk, "Skipping game with unknown team");
                return None;
            };

            Some(GameContentData {
                start_time: game.game_date.with_timezone(&offset).format("%H:%M").to_string(),
                home,
                away,
            })
        })
        .collect()
}
