//! Storage capability ports.
//!
//! The auth service depends on these three narrow contracts, never on a
//! concrete storage technology. Each port is independently substitutable:
//! `sqlite` provides the production adapter, `mock` an in-memory double for
//! tests.

pub mod mock;
pub mod sqlite;

use crate::models::{App, User};
use thiserror::Error;

/// Storage-layer error type.
///
/// Adapters classify every failure into one of these kinds; callers branch
/// on the kind, never on message text.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested record does not exist.
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint was violated (duplicate phone).
    #[error("record already exists")]
    AlreadyExists,

    /// Any other backend failure. Detail stays server-side.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persists new users.
#[async_trait::async_trait]
pub trait UserSaver: Send + Sync {
    /// Saves a new user and returns the storage-assigned id.
    ///
    /// Fails with [`StorageError::AlreadyExists`] when the phone number is
    /// already registered.
    async fn save_user(
        &self,
        name: &str,
        phone: &str,
        pass_hash: &str,
    ) -> Result<i64, StorageError>;
}

/// Looks up users and their admin flag.
#[async_trait::async_trait]
pub trait UserProvider: Send + Sync {
    /// Fails with [`StorageError::NotFound`] when no user has this phone.
    async fn user_by_phone(&self, phone: &str) -> Result<User, StorageError>;

    /// Fails with [`StorageError::NotFound`] when the user does not exist;
    /// a `false` result always means the user exists and is not an admin.
    async fn is_admin(&self, user_id: i64) -> Result<bool, StorageError>;
}

/// Looks up registered client applications.
#[async_trait::async_trait]
pub trait AppProvider: Send + Sync {
    /// Fails with [`StorageError::NotFound`] when the app is not registered.
    async fn app(&self, app_id: i32) -> Result<App, StorageError>;
}
