//! SQLite storage adapter.
//!
//! Implements all three capability ports over a `sqlx` SQLite pool. The
//! schema lives in the workspace `migrations/` directory.

use super::{AppProvider, StorageError, UserProvider, UserSaver};
use crate::models::{App, User};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Concrete storage backend over a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Opens the database at `url` (e.g. `sqlite://sso.db`).
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| StorageError::Backend(format!("failed to open database: {e}")))?;

        Ok(Self { pool })
    }

    /// Wraps an existing pool (used by tests and the migration step).
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn backend(context: &str, e: sqlx::Error) -> StorageError {
    StorageError::Backend(format!("{context}: {e}"))
}

#[async_trait::async_trait]
impl UserSaver for SqliteStorage {
    async fn save_user(
        &self,
        name: &str,
        phone: &str,
        pass_hash: &str,
    ) -> Result<i64, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, phone, pass_hash)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(name)
        .bind(phone)
        .bind(pass_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // Unique constraint on users.phone
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                StorageError::AlreadyExists
            } else {
                backend("failed to insert user", e)
            }
        })?;

        Ok(result.last_insert_rowid())
    }
}

#[async_trait::async_trait]
impl UserProvider for SqliteStorage {
    async fn user_by_phone(&self, phone: &str) -> Result<User, StorageError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, phone, pass_hash
            FROM users
            WHERE phone = ?1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend("failed to fetch user by phone", e))?
        .ok_or(StorageError::NotFound)
    }

    async fn is_admin(&self, user_id: i64) -> Result<bool, StorageError> {
        let row: Option<(bool,)> = sqlx::query_as(
            r#"
            SELECT is_admin
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend("failed to fetch admin flag", e))?;

        row.map(|(is_admin,)| is_admin).ok_or(StorageError::NotFound)
    }
}

#[async_trait::async_trait]
impl AppProvider for SqliteStorage {
    async fn app(&self, app_id: i32) -> Result<App, StorageError> {
        sqlx::query_as::<_, App>(
            r#"
            SELECT id, name, secret
            FROM apps
            WHERE id = ?1
            "#,
        )
        .bind(app_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend("failed to fetch app", e))?
        .ok_or(StorageError::NotFound)
    }
}
