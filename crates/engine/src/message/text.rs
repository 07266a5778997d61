//! Plain text layout (legacy).
//!
//! ```text
//! 【🕐08:05】
//! Yankees（ア東1位）
//! 先発：Fried
//!     [vs]
//! Red Sox（ア東2位 WC）
//! 先発：Crochet
//! ```
//!
//! Games are separated by a blank line; the first message starts with the
//! date banner.

use ballpark_common::types::{GameContentData, PushMessage, TeamContent};

/// Characters of game blocks allowed in one message (LINE limit: 5000).
pub const CONTENT_SIZE_BUDGET: usize = 4_500;

const SEPARATOR: &str = "\n\n";
const PLACEHOLDER: &str = " - ";

fn team_line(side: &TeamContent) -> String {
    format!(
        "{}（{}）",
        side.team_name,
        side.standing_text.as_deref().unwrap_or(PLACEHOLDER)
    )
}

fn pitcher_line(side: &TeamContent) -> String {
    format!("先発：{}", side.pitcher_last_name.as_deref().unwrap_or(PLACEHOLDER))
}

/// Text block for one game.
pub fn item(game: &GameContentData) -> String {
    [
        format!("【🕐{}】", game.start_time),
        team_line(&game.home),
        pitcher_line(&game.home),
        "    [vs]".to_string(),
        team_line(&game.away),
        pitcher_line(&game.away),
    ]
    .join("\n")
}

/// Character count of a block plus its separator.
pub fn item_size(game: &GameContentData) -> usize {
    item(game).chars().count() + SEPARATOR.chars().count()
}

pub fn render(games: &[&GameContentData], banner: Option<&str>) -> PushMessage {
    let body = games
        .iter()
        .map(|game| item(game))
        .collect::<Vec<_>>()
        .join(SEPARATOR);

    let text = match banner {
        Some(date) => format!("明日の注目試合 ({}){}{}", date, SEPARATOR, body),
        None => body,
    };

    PushMessage::Text { text }
}
