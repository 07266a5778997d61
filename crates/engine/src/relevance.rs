//! Relevance evaluator: decides whether a game is worth notifying a user about.
//!
//! A game is notable for a user when something they follow meets an opponent
//! that currently holds a playoff spot:
//! 1. registered home club vs. away club in a playoff spot
//! 2. registered away club vs. home club in a playoff spot
//! 3. registered home probable pitcher vs. away club in a playoff spot
//! 4. registered away probable pitcher vs. home club in a playoff spot

use ballpark_common::types::{GameContentData, TeamContent};

/// Pure and deterministic; any one of the four conditions is enough.
pub fn should_notify(
    game: &GameContentData,
    registered_team_ids: &[i64],
    registered_player_ids: &[i64],
) -> bool {
    let follows = |side: &TeamContent| {
        registered_team_ids.contains(&side.team_id)
            || side
                .probable_pitcher_id
                .is_some_and(|id| registered_player_ids.contains(&id))
    };

    (follows(&game.home) && game.away.in_playoff_spot)
        || (follows(&game.away) && game.home.in_playoff_spot)
}
