//! Service error types and their wire translation.
//!
//! The taxonomy is translated into gRPC status codes exactly once, in the
//! `From<AuthError> for Status` impl below:
//!
//! - `InvalidCredentials` → `UNAUTHENTICATED`
//! - `UserAlreadyExists` → `ALREADY_EXISTS`
//! - `UserNotFound`, `AppNotFound` → `NOT_FOUND`
//! - `Storage`, `Crypto` → `INTERNAL` (detail logged server-side, never sent)

use crate::storage::StorageError;
use thiserror::Error;
use tonic::Status;
use tracing::error;

/// Domain-layer error type.
///
/// Callers branch on the variant, never on message text.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown phone or wrong password. Deliberately indistinguishable to
    /// the caller so login failures cannot be used to enumerate accounts.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A user with this phone number is already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Admin lookup named a user id that does not exist.
    #[error("user not found")]
    UserNotFound,

    /// Login named an app id that is not registered.
    #[error("app not found")]
    AppNotFound,

    /// Unexpected storage failure, wrapped with the originating operation.
    #[error("{op}: storage failure")]
    Storage {
        op: &'static str,
        #[source]
        source: StorageError,
    },

    /// Password hashing or token signing failure.
    #[error("cryptographic error: {0}")]
    Crypto(String),
}

impl From<AuthError> for Status {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Status::unauthenticated("invalid credentials"),
            AuthError::UserAlreadyExists => Status::already_exists("user already exists"),
            AuthError::UserNotFound => Status::not_found("user not found"),
            AuthError::AppNotFound => Status::not_found("app not found"),
            AuthError::Storage { op, source } => {
                error!(op, error = %source, "storage failure");
                Status::internal("internal error")
            }
            AuthError::Crypto(detail) => {
                error!(error = %detail, "cryptographic failure");
                Status::internal("internal error")
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn test_caller_fault_classes_are_distinguishable() {
        assert_eq!(
            Status::from(AuthError::InvalidCredentials).code(),
            Code::Unauthenticated
        );
        assert_eq!(
            Status::from(AuthError::UserAlreadyExists).code(),
            Code::AlreadyExists
        );
        assert_eq!(Status::from(AuthError::UserNotFound).code(), Code::NotFound);
        assert_eq!(Status::from(AuthError::AppNotFound).code(), Code::NotFound);
    }

    #[test]
    fn test_internal_faults_do_not_leak_detail() {
        let status = Status::from(AuthError::Storage {
            op: "auth.login",
            source: StorageError::Backend("connection refused to 10.0.0.3:5432".to_string()),
        });
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "internal error");

        let status = Status::from(AuthError::Crypto("bad signing key material".to_string()));
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "internal error");
    }

    #[test]
    fn test_storage_wrap_keeps_operation_context() {
        let err = AuthError::Storage {
            op: "auth.register",
            source: StorageError::Backend("disk full".to_string()),
        };
        assert_eq!(err.to_string(), "auth.register: storage failure");
    }
}
