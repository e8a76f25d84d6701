use async_trait::async_trait;
use chrono::Utc;
use deadpool_postgres::Pool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio_postgres::{Row, error::SqlState};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::user::{NewUser, User},
};

/// Message returned when a username is already taken.
pub const USER_EXISTS_MESSAGE: &str = "User already exists";

/// Lookup, insert and update of user records keyed by username.
///
/// `create` must reject a username that already exists even when two signups
/// race past the handler's own existence check.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Persists a new user. Fails with [`AppError::Conflict`] on a duplicate username.
    async fn create(&self, user: NewUser) -> Result<User>;

    /// Writes back the mutable fields of an existing user. `username` is never updated.
    async fn save(&self, user: &User) -> Result<User>;
}

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        fullname: row.try_get("fullname").map_err(|_| AppError::MissingData("fullname".to_string()))?,
        username: row.try_get("username").map_err(|_| AppError::MissingData("username".to_string()))?,
        password: row.try_get("password").map_err(|_| AppError::MissingData("password".to_string()))?,
        last_sign_in: row.try_get("last_sign_in").map_err(|_| AppError::MissingData("last_sign_in".to_string()))?,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
    })
}

/// PostgreSQL-backed store. Uniqueness is enforced by the `users_username_key` constraint.
#[derive(Clone)]
pub struct PgUserStore {
    pool: Pool,
}

impl PgUserStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                SELECT id, fullname, username, password, last_sign_in, created_at
                FROM users
                WHERE username = $1
                "#,
            )
            .await?;
        let row = client.query_opt(&statement, &[&username]).await?;
        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                INSERT INTO users (id, fullname, username, password)
                VALUES ($1, $2, $3, $4)
                RETURNING id, fullname, username, password, last_sign_in, created_at
                "#,
            )
            .await?;

        let id = Uuid::new_v4();
        let row = client
            .query_one(
                &statement,
                &[&id, &user.fullname, &user.username, &user.password],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    AppError::Conflict(USER_EXISTS_MESSAGE.to_string())
                } else {
                    AppError::Database(e)
                }
            })?;
        row_to_user(&row)
    }

    async fn save(&self, user: &User) -> Result<User> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                UPDATE users
                SET fullname = $1, password = $2, last_sign_in = $3
                WHERE id = $4
                RETURNING id, fullname, username, password, last_sign_in, created_at
                "#,
            )
            .await?;
        let row = client
            .query_opt(
                &statement,
                &[&user.fullname, &user.password, &user.last_sign_in, &user.id],
            )
            .await?
            .ok_or_else(|| AppError::Internal(format!("User {} vanished before save", user.id)))?;
        row_to_user(&row)
    }
}

/// In-memory store for tests and local demos.
///
/// The existence check and the insert happen under one write lock, which
/// closes the signup race the same way a unique index does.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(AppError::Conflict(USER_EXISTS_MESSAGE.to_string()));
        }

        let record = User {
            id: Uuid::new_v4(),
            fullname: user.fullname,
            username: user.username,
            password: user.password,
            last_sign_in: None,
            created_at: Utc::now(),
        };
        users.insert(record.username.clone(), record.clone());
        Ok(record)
    }

    async fn save(&self, user: &User) -> Result<User> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(&user.username)
            .filter(|stored| stored.id == user.id)
            .ok_or_else(|| AppError::Internal(format!("User {} vanished before save", user.id)))?;

        stored.fullname = user.fullname.clone();
        stored.password = user.password.clone();
        stored.last_sign_in = user.last_sign_in;
        Ok(stored.clone())
    }
}
