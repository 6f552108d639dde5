//! Token issuance.
//!
//! Mints the signed, time-bounded JWT binding a user identity to the
//! requesting app. Tokens are HS256-signed with the app's own secret, so a
//! token minted for one app never verifies under another app's key. The
//! service never parses or stores issued tokens.

use crate::errors::AuthError;
use crate::models::{App, User};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Claims embedded in every issued token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub uid: i64,
    pub name: String,
    pub phone: String,
    pub app_id: i32,
    /// Absolute expiry, unix seconds: issuance instant plus the configured TTL.
    pub exp: i64,
}

/// Signs a token for `user`, scoped to `app`, valid for `ttl`.
pub fn issue(user: &User, app: &App, ttl: Duration) -> Result<String, AuthError> {
    let ttl = chrono::Duration::from_std(ttl)
        .map_err(|e| AuthError::Crypto(format!("token TTL out of range: {e}")))?;

    let claims = Claims {
        uid: user.id,
        name: user.name.clone(),
        phone: user.phone.clone(),
        app_id: app.id,
        exp: (Utc::now() + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(app.secret.as_bytes()),
    )
    .map_err(|e| AuthError::Crypto(format!("failed to sign token: {e}")))
}
