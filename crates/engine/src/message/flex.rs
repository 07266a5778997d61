//! Flex bubble layout (system of record).
//!
//! One bubble per message: an optional header banner, then one dark card per
//! game separated by separator components.

use serde_json::{Value, json};

use ballpark_common::types::{GameContentData, PushMessage};

/// Serialized bytes of game cards allowed in one bubble. LINE caps a flex
/// message at 30 KB; the rest is left for the layout around the cards.
pub const CONTENT_SIZE_BUDGET: usize = 25_000;

const PLACEHOLDER: &str = " - ";

fn separator() -> Value {
    json!({
        "type": "separator",
        "margin": "8px",
        "color": "#1E293B",
    })
}

fn standing(text: Option<&str>) -> String {
    text.map(|t| format!("({})", t))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn pitcher(last_name: Option<&str>) -> String {
    format!("P: {}", last_name.unwrap_or(PLACEHOLDER))
}

/// Two-column row with the away value left and the home value right-aligned.
fn row(margin: &str, away: Value, home: Value) -> Value {
    json!({
        "type": "box",
        "layout": "horizontal",
        "margin": margin,
        "contents": [away, home],
    })
}

/// Card for one game.
pub fn item(game: &GameContentData) -> Value {
    let (home, away) = (&game.home, &game.away);

    json!({
        "type": "box",
        "layout": "vertical",
        "paddingAll": "10px",
        "backgroundColor": "#1E293B",
        "cornerRadius": "10px",
        "contents": [
            {
                "type": "box",
                "layout": "baseline",
                "contents": [
                    { "type": "text", "text": "⚾️", "size": "sm", "flex": 0 },
                    {
                        "type": "text",
                        "text": game.start_time,
                        "weight": "bold",
                        "size": "sm",
                        "color": "#E2E8F0",
                        "flex": 0,
                        "margin": "4px",
                    },
                    {
                        "type": "text",
                        "text": format!("{} @ {}", away.team_name, home.team_name),
                        "weight": "bold",
                        "size": "sm",
                        "color": "#E2E8F0",
                        "wrap": true,
                        "margin": "8px",
                    },
                ],
            },
            row(
                "6px",
                json!({ "type": "text", "text": away.team_name, "weight": "bold", "size": "md", "color": "#CBD5E1" }),
                json!({ "type": "text", "text": home.team_name, "weight": "bold", "size": "md", "color": "#CBD5E1", "align": "end" }),
            ),
            row(
                "6px",
                json!({ "type": "text", "text": standing(away.standing_text.as_deref()), "size": "xs", "color": "#CBD5E1" }),
                json!({ "type": "text", "text": standing(home.standing_text.as_deref()), "size": "xs", "color": "#CBD5E1", "align": "end" }),
            ),
            row(
                "4px",
                json!({ "type": "text", "text": pitcher(away.pitcher_last_name.as_deref()), "size": "xs", "color": "#94A3B8", "wrap": true }),
                json!({ "type": "text", "text": pitcher(home.pitcher_last_name.as_deref()), "size": "xs", "color": "#94A3B8", "align": "end", "wrap": true }),
            ),
        ],
    })
}

/// Serialized size of a card plus its separator.
pub fn item_size(game: &GameContentData) -> usize {
    item(game).to_string().len() + separator().to_string().len()
}

/// Render one batch into a flex message. `banner` is set for the first message only.
pub fn render(games: &[&GameContentData], date: &str, banner: Option<&str>) -> PushMessage {
    let mut contents = Vec::with_capacity(games.len() * 2);
    for (i, game) in games.iter().enumerate() {
        if i > 0 {
            contents.push(separator());
        }
        contents.push(item(game));
    }

    let mut bubble = json!({
        "type": "bubble",
        "size": "mega",
        "body": {
            "type": "box",
            "layout": "vertical",
            "paddingAll": "12px",
            "backgroundColor": "#0A0A0A",
            "spacing": "10px",
            "contents": contents,
        },
    });

    if let Some(date) = banner {
        bubble["header"] = json!({
            "type": "box",
            "layout": "horizontal",
            "paddingAll": "14px",
            "backgroundColor": "#111827",
            "contents": [{
                "type": "text",
                "text": format!("明日の注目試合 ({})", date),
                "weight": "bold",
                "size": "md",
                "color": "#F8FAFC",
            }],
        });
    }

    PushMessage::Flex {
        alt_text: format!("明日のMLB試合情報（{}）", date),
        contents: bubble,
    }
}
