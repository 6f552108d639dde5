//! Credential verification, registration and admin lookup.
//!
//! `AuthService` orchestrates the storage capability ports and the token
//! issuer. It holds no mutable state; one instance is shared across all
//! requests.

use crate::errors::AuthError;
use crate::services::token_service;
use crate::storage::{AppProvider, StorageError, UserProvider, UserSaver};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tracing::{info, instrument, warn};

/// Bcrypt work factor for newly registered passwords.
const BCRYPT_COST: u32 = 12;

/// Core authentication domain logic.
///
/// The storage ports are injected at construction; no global state is
/// reached from here.
pub struct AuthService {
    user_saver: Arc<dyn UserSaver>,
    user_provider: Arc<dyn UserProvider>,
    app_provider: Arc<dyn AppProvider>,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        user_saver: Arc<dyn UserSaver>,
        user_provider: Arc<dyn UserProvider>,
        app_provider: Arc<dyn AppProvider>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            user_saver,
            user_provider,
            app_provider,
            token_ttl,
        }
    }

    /// Verifies credentials and issues a token scoped to `app_id`.
    ///
    /// An unknown phone and a wrong password produce the same
    /// [`AuthError::InvalidCredentials`], so login failures cannot be used
    /// to tell registered phones from unregistered ones.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        phone: &str,
        password: &str,
        app_id: i32,
    ) -> Result<String, AuthError> {
        info!("attempting to log user in");

        let user = match self.user_provider.user_by_phone(phone).await {
            Ok(user) => user,
            Err(StorageError::NotFound) => {
                warn!("user not found");
                return Err(AuthError::InvalidCredentials);
            }
            Err(source) => {
                return Err(AuthError::Storage {
                    op: "auth.login",
                    source,
                })
            }
        };

        if !verify_password(password.to_owned(), user.pass_hash.clone()).await? {
            warn!("password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let app = match self.app_provider.app(app_id).await {
            Ok(app) => app,
            Err(StorageError::NotFound) => return Err(AuthError::AppNotFound),
            Err(source) => {
                return Err(AuthError::Storage {
                    op: "auth.login",
                    source,
                })
            }
        };

        let token = token_service::issue(&user, &app, self.token_ttl)?;

        info!(user_id = user.id, "user logged in");

        Ok(token)
    }

    /// Registers a new user and returns the storage-assigned id.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        phone: &str,
        password: &str,
    ) -> Result<i64, AuthError> {
        info!("registering user");

        let pass_hash = hash_password(password.to_owned()).await?;

        // Duplicate phones are classified from the persistence result; the
        // hash step above cannot observe them.
        match self.user_saver.save_user(name, phone, &pass_hash).await {
            Ok(user_id) => {
                info!(user_id, "user registered");
                Ok(user_id)
            }
            Err(StorageError::AlreadyExists) => {
                warn!("user already exists");
                Err(AuthError::UserAlreadyExists)
            }
            Err(source) => Err(AuthError::Storage {
                op: "auth.register",
                source,
            }),
        }
    }

    /// Reports whether `user_id` carries the admin flag.
    ///
    /// An unknown user id is [`AuthError::UserNotFound`], never `Ok(false)`.
    #[instrument(skip(self))]
    pub async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError> {
        match self.user_provider.is_admin(user_id).await {
            Ok(is_admin) => {
                info!(is_admin, "checked admin flag");
                Ok(is_admin)
            }
            Err(StorageError::NotFound) => {
                warn!("user not found");
                Err(AuthError::UserNotFound)
            }
            Err(source) => Err(AuthError::Storage {
                op: "auth.is_admin",
                source,
            }),
        }
    }
}

/// Runs bcrypt hashing off the async scheduler; at this work factor it is
/// far too slow to hold a cooperative task.
async fn hash_password(password: String) -> Result<String, AuthError> {
    task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| AuthError::Crypto(format!("hashing task failed: {e}")))?
        .map_err(|e| AuthError::Crypto(format!("failed to hash password: {e}")))
}

async fn verify_password(password: String, pass_hash: String) -> Result<bool, AuthError> {
    task::spawn_blocking(move || bcrypt::verify(password, &pass_hash))
        .await
        .map_err(|e| AuthError::Crypto(format!("verification task failed: {e}")))?
        .map_err(|e| AuthError::Crypto(format!("failed to verify password: {e}")))
}
