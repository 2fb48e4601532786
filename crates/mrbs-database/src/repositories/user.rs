//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use mrbs_core::error::AppError;
use mrbs_core::result::AppResult;
use mrbs_core::types::UserId;
use mrbs_entity::user::{CreateUser, User};

use crate::error::db_error;
use crate::store::ActivityMarker;

/// Repository for the user records the engine reads and marks.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find user by id", e))
    }

    /// Find a user by login name (case-insensitive).
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find user by name", e))
    }

    /// List every user ordered by login name.
    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list users", e))
    }

    /// Register a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, display_name, level) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(UserId::new())
        .bind(&data.name)
        .bind(&data.display_name)
        .bind(data.privilege.as_level())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("users_name_key") => {
                AppError::validation(format!("User name '{}' already exists", data.name))
            }
            other => db_error("Failed to create user", other),
        })
    }
}

#[async_trait]
impl ActivityMarker for UserRepository {
    async fn touch_last_active(&self, user_id: UserId) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET last_active_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update last activity", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
        Ok(())
    }
}
