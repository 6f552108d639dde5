//! Domain models.

use sqlx::FromRow;

/// A registered end user (maps to the `users` table).
///
/// Created by registration; never mutated or deleted by this service. The
/// phone number is the login key and is unique across users.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub phone: String,
    /// Bcrypt hash of the password; the raw password is never retained.
    pub pass_hash: String,
}

/// A registered client application (maps to the `apps` table).
///
/// Read-only to this service; the record and its signing secret are owned by
/// an external collaborator. Tokens issued for an app are signed with its
/// secret and verify under no other app's secret.
#[derive(Debug, Clone, FromRow)]
pub struct App {
    pub id: i32,
    pub name: String,
    pub secret: String,
}
