//! User pagination.
//!
//! Users are read in ascending id order with a keyset cursor (`id > cursor`),
//! so pages stay stable while users register or leave during a run.
//! `UserChunks` is the pull-based iterator the dispatcher walks chunk by chunk.

use async_trait::async_trait;
use sqlx::PgPool;

use ballpark_common::error::AppError;
use ballpark_common::types::User;

/// Which relations to load alongside each user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserRelations {
    pub teams: bool,
    pub players: bool,
}

impl UserRelations {
    pub const ALL: Self = Self {
        teams: true,
        players: true,
    };
    pub const NONE: Self = Self {
        teams: false,
        players: false,
    };
}

/// One page of users and the cursor to continue from.
#[derive(Debug, Clone, Default)]
pub struct UserPage {
    pub users: Vec<User>,
    /// Id of the last user in the page; `None` for an empty page
    pub next_cursor: Option<i64>,
}

impl UserPage {
    pub fn from_users(users: Vec<User>) -> Self {
        let next_cursor = users.last().map(|u| u.id);
        Self { users, next_cursor }
    }
}

/// Cursor-paginated access to registered users.
#[async_trait]
pub trait UserSource: Send + Sync {
    /// Up to `size` users with `id > cursor` (all users when `cursor` is `None`),
    /// ascending by id.
    async fn next_page(
        &self,
        cursor: Option<i64>,
        size: usize,
        relations: UserRelations,
    ) -> Result<UserPage, AppError>;

    async fn count_users(&self) -> Result<i64, AppError>;
}

/// Pull-based iterator over fixed-size user chunks.
pub struct UserChunks<'a> {
    source: &'a dyn UserSource,
    size: usize,
    relations: UserRelations,
    cursor: Option<i64>,
    done: bool,
}

impl<'a> UserChunks<'a> {
    pub fn new(source: &'a dyn UserSource, size: usize, relations: UserRelations) -> Self {
        Self {
            source,
            size: size.max(1),
            relations,
            cursor: None,
            done: false,
        }
    }

    /// Next non-empty chunk, or `None` once every user has been returned.
    pub async fn next(&mut self) -> Result<Option<Vec<User>>, AppError> {
        if self.done {
            return Ok(None);
        }

        let page = self
            .source
            .next_page(self.cursor, self.size, self.relations)
            .await?;

        if page.users.is_empty() {
            self.done = true;
            return Ok(None);
        }

        // A short page is the last one
        if page.users.len() < self.size || page.next_cursor.is_none() {
            self.done = true;
        }
        self.cursor = page.next_cursor;

        Ok(Some(page.users))
    }
}

/// PostgreSQL-backed user source.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserSource for PgUserRepository {
    async fn next_page(
        &self,
        cursor: Option<i64>,
        size: usize,
        relations: UserRelations,
    ) -> Result<UserPage, AppError> {
        let users: Vec<User> = sqlx::query_as(
            r#"
            SELECT
                u.id,
                u.line_id,
                CASE WHEN $3 THEN ARRAY(
                    SELECT ut.team_id FROM user_teams ut
                    WHERE ut.user_id = u.id
                    ORDER BY ut.team_id
                ) ELSE ARRAY[]::BIGINT[] END AS team_ids,
                CASE WHEN $4 THEN ARRAY(
                    SELECT up.player_id FROM user_players up
                    WHERE up.user_id = u.id
                    ORDER BY up.player_id
                ) ELSE ARRAY[]::BIGINT[] END AS player_ids
            FROM users u
            WHERE $1::BIGINT IS NULL OR u.id > $1
            ORDER BY u.id ASC
            LIMIT $2
            "#,
        )
        .bind(cursor)
        .bind(size as i64)
        .bind(relations.teams)
        .bind(relations.players)
        .fetch_all(&self.pool)
        .await?;

        Ok(UserPage::from_users(users))
    }

    async fn count_users(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
