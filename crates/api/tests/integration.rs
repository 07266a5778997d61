//! Integration tests for API routes.
//!
//! Uses `tower::ServiceExt` to drive the Axum router without a real HTTP
//! server; the dispatcher runs against in-memory sources.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{NaiveDate, Utc};
use tower::ServiceExt;
use uuid::Uuid;

use ballpark_api::routes::create_router;
use ballpark_api::state::AppState;
use ballpark_common::config::AppConfig;
use ballpark_common::error::AppError;
use ballpark_common::types::{
    Game, GameSide, MessageFormat, PushMessage, Standing, Team, User,
};
use ballpark_engine::Dispatcher;
use ballpark_engine::users::{UserPage, UserRelations, UserSource};
use ballpark_notifier::{IssuedToken, PushError, PushProvider};
use ballpark_stats::{StatsError, StatsSource};

// ============================================================
// Helpers
// ============================================================

const API_KEY: &str = "test-cron-key";

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "unused".to_string(),
        db_max_connections: 1,
        port: 0,
        cron_api_key: API_KEY.to_string(),
        mlb_api_base_url: "http://unused".to_string(),
        line_api_base_url: "http://unused".to_string(),
        line_channel_id: "channel".to_string(),
        line_channel_secret: "secret".to_string(),
        http_timeout_secs: 1,
        user_chunk_size: 200,
        send_concurrency: 10,
        max_games_per_message: 10,
        message_format: MessageFormat::Flex,
        token_refresh_interval_secs: 600,
        max_retry_count: 3,
        retry_base_interval_ms: 1000,
        retry_base_jitter_ms: 250,
        display_utc_offset_hours: 9,
        dispatch_timeout_secs: 30,
    }
}

struct Stats {
    games: Vec<Game>,
    fail: bool,
}

#[async_trait]
impl StatsSource for Stats {
    async fn fetch_teams(&self) -> Result<Vec<Team>, StatsError> {
        Ok([(147, "Yankees"), (111, "Red Sox")]
            .into_iter()
            .map(|(id, name)| Team {
                id,
                name: name.to_string(),
                team_name: name.to_string(),
                abbreviation: name[..3].to_uppercase(),
                league_id: 103,
                division_id: 201,
            })
            .collect())
    }

    async fn fetch_standings(&self, _season: i32) -> Result<Vec<Standing>, StatsError> {
        Ok([(147, "2"), (111, "1")]
            .into_iter()
            .map(|(team_id, rank)| Standing {
                team_id,
                league_id: 103,
                division_id: 201,
                division_rank: rank.to_string(),
                is_wild_card_leader: false,
            })
            .collect())
    }

    async fn fetch_games_by_date(&self, _date: NaiveDate) -> Result<Vec<Game>, StatsError> {
        if self.fail {
            return Err(StatsError::Status {
                endpoint: "schedule",
                status: 500,
            });
        }
        Ok(self.games.clone())
    }
}

struct Users(Vec<User>);

#[async_trait]
impl UserSource for Users {
    async fn next_page(
        &self,
        cursor: Option<i64>,
        size: usize,
        _relations: UserRelations,
    ) -> Result<UserPage, AppError> {
        Ok(UserPage::from_users(
            self.0
                .iter()
                .filter(|u| cursor.is_none_or(|c| u.id > c))
                .take(size)
                .cloned()
                .collect(),
        ))
    }

    async fn count_users(&self) -> Result<i64, AppError> {
        Ok(self.0.len() as i64)
    }
}

#[derive(Default)]
struct Push {
    recipients: Mutex<Vec<String>>,
}

#[async_trait]
impl PushProvider for Push {
    async fn issue_channel_token(&self) -> Result<IssuedToken, PushError> {
        Ok(IssuedToken {
            access_token: "token".to_string(),
            expires_in: 900,
        })
    }

    async fn push(
        &self,
        _token: &str,
        _retry_key: Uuid,
        to: &str,
        _messages: &[PushMessage],
    ) -> Result<(), PushError> {
        self.recipients.lock().unwrap().push(to.to_string());
        Ok(())
    }
}

fn yankees_vs_red_sox() -> Game {
    Game {
        game_pk: 1,
        game_date: Utc::now(),
        home: GameSide {
            team_id: 147,
            probable_pitcher: None,
        },
        away: GameSide {
            team_id: 111,
            probable_pitcher: None,
        },
    }
}

fn build_test_state(stats: Stats, push: Arc<Push>) -> AppState {
    let config = test_config();
    let users = Users(vec![User {
        id: 1,
        line_id: "U1".to_string(),
        team_ids: vec![147],
        player_ids: vec![],
    }]);
    let dispatcher = Dispatcher::from_config(&config, Arc::new(stats), Arc::new(users), push)
        .unwrap();
    AppState::new(dispatcher, config)
}

fn cron_request(api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/cron/notification");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

// ============================================================
// Health
// ============================================================

#[tokio::test]
async fn test_health_endpoint() {
    let state = build_test_state(
        Stats {
            games: vec![],
            fail: false,
        },
        Arc::new(Push::default()),
    );
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "ballpark-api");
    assert_eq!(json["message_format"], "flex");
}

// ============================================================
// Cron notification
// ============================================================

#[tokio::test]
async fn test_missing_api_key_is_unauthorized() {
    let push = Arc::new(Push::default());
    let state = build_test_state(
        Stats {
            games: vec![yankees_vs_red_sox()],
            fail: false,
        },
        push.clone(),
    );

    let response = create_router(state.clone())
        .oneshot(cron_request(None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "Unauthorized");

    let response = create_router(state)
        .oneshot(cron_request(Some("wrong")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert!(push.recipients.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_no_games_found() {
    let push = Arc::new(Push::default());
    let state = build_test_state(
        Stats {
            games: vec![],
            fail: false,
        },
        push.clone(),
    );

    let response = create_router(state)
        .oneshot(cron_request(Some(API_KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["message"], "No games found");
    assert!(push.recipients.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_completed_run_returns_ok() {
    let push = Arc::new(Push::default());
    let state = build_test_state(
        Stats {
            games: vec![yankees_vs_red_sox()],
            fail: false,
        },
        push.clone(),
    );

    let response = create_router(state)
        .oneshot(cron_request(Some(API_KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["message"], "OK");
    assert_eq!(*push.recipients.lock().unwrap(), vec!["U1".to_string()]);
}

#[tokio::test]
async fn test_snapshot_failure_returns_500() {
    let state = build_test_state(
        Stats {
            games: vec![],
            fail: true,
        },
        Arc::new(Push::default()),
    );

    let response = create_router(state)
        .oneshot(cron_request(Some(API_KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "Internal Server Error");
}

#[tokio::test]
async fn test_get_is_not_allowed() {
    let state = build_test_state(
        Stats {
            games: vec![],
            fail: false,
        },
        Arc::new(Push::default()),
    );

    let response = create_router(state)
        .oneshot(
            Request::builder()
                .uri("/api/cron/notification")
                .header("x-api-key", API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
