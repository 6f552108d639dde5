//! End-to-end tests for the gRPC auth surface.
//!
//! Each test boots the tonic server on an ephemeral port over in-memory
//! storage and drives it through the generated client, the way external
//! callers do.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use proto_gen::auth::auth_client::AuthClient;
use proto_gen::auth::auth_server::AuthServer;
use proto_gen::auth::{IsAdminRequest, LoginRequest, RegisterRequest};
use sso_service::grpc::AuthApi;
use sso_service::models::App;
use sso_service::services::token_service::Claims;
use sso_service::services::AuthService;
use sso_service::storage::mock::MockStorage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tonic::transport::{Channel, Server};
use tonic::Code;

const APP_ID: i32 = 1;
const APP_SECRET: &str = "test-secret";
const OTHER_APP_ID: i32 = 2;
const OTHER_APP_SECRET: &str = "other-secret";
const TOKEN_TTL: Duration = Duration::from_secs(3600);
const EXP_DELTA_SECONDS: i64 = 1;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_storage() -> Arc<MockStorage> {
    let storage = Arc::new(MockStorage::new());
    storage.add_app(App {
        id: APP_ID,
        name: "test".to_string(),
        secret: APP_SECRET.to_string(),
    });
    storage.add_app(App {
        id: OTHER_APP_ID,
        name: "other".to_string(),
        secret: OTHER_APP_SECRET.to_string(),
    });
    storage
}

async fn start_server(
    storage: Arc<MockStorage>,
) -> (AuthClient<Channel>, oneshot::Sender<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind an ephemeral port");
    let addr = listener.local_addr().expect("Listener should have an address");

    // Convert tokio listener to tonic-compatible incoming stream
    let incoming = tokio_stream::wrappers::TcpListenerStream::new(listener);

    let auth = Arc::new(AuthService::new(
        storage.clone(),
        storage.clone(),
        storage.clone(),
        TOKEN_TTL,
    ));

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = Server::builder()
        .add_service(AuthServer::new(AuthApi::new(auth)))
        .serve_with_incoming_shutdown(incoming, async move {
            let _ = shutdown_rx.await;
        });

    tokio::spawn(async move {
        let _ = server.await;
    });

    // Give server time to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = AuthClient::connect(format!("http://{}", addr))
        .await
        .expect("Client should connect");

    (client, shutdown_tx)
}

fn decode_claims(token: &str, secret: &str) -> jsonwebtoken::errors::Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
}

// ============================================================================
// Happy Path
// ============================================================================

#[tokio::test]
async fn test_register_then_login_happy_path() -> Result<()> {
    let storage = test_storage();
    let (mut client, shutdown) = start_server(storage).await;

    let reg = client
        .register(RegisterRequest {
            name: "Alice".to_string(),
            phone: "+79991234567".to_string(),
            password: "Secret123".to_string(),
        })
        .await?
        .into_inner();
    assert_eq!(reg.user_id, 1);

    let login_time = Utc::now().timestamp();
    let login = client
        .login(LoginRequest {
            phone: "+79991234567".to_string(),
            password: "Secret123".to_string(),
            app_id: APP_ID,
        })
        .await?
        .into_inner();
    assert!(!login.token.is_empty());

    let claims = decode_claims(&login.token, APP_SECRET)?;
    assert_eq!(claims.uid, reg.user_id);
    assert_eq!(claims.name, "Alice");
    assert_eq!(claims.phone, "+79991234567");
    assert_eq!(claims.app_id, APP_ID);

    let expected_exp = login_time + TOKEN_TTL.as_secs() as i64;
    assert!(
        (claims.exp - expected_exp).abs() <= EXP_DELTA_SECONDS,
        "exp {} should be within {}s of login time + TTL {}",
        claims.exp,
        EXP_DELTA_SECONDS,
        expected_exp
    );

    drop(shutdown);
    Ok(())
}

#[tokio::test]
async fn test_token_is_scoped_to_the_requesting_app() -> Result<()> {
    let storage = test_storage();
    let (mut client, shutdown) = start_server(storage).await;

    client
        .register(RegisterRequest {
            name: "Alice".to_string(),
            phone: "+79991234567".to_string(),
            password: "Secret123".to_string(),
        })
        .await?;

    let token = client
        .login(LoginRequest {
            phone: "+79991234567".to_string(),
            password: "Secret123".to_string(),
            app_id: APP_ID,
        })
        .await?
        .into_inner()
        .token;

    // Verifies under the issuing app's secret, fails under the other app's
    assert!(decode_claims(&token, APP_SECRET).is_ok());
    assert!(decode_claims(&token, OTHER_APP_SECRET).is_err());

    drop(shutdown);
    Ok(())
}

// ============================================================================
// Failure Classification
// ============================================================================

#[tokio::test]
async fn test_duplicate_registration_is_already_exists() -> Result<()> {
    let storage = test_storage();
    let (mut client, shutdown) = start_server(storage.clone()).await;

    let request = RegisterRequest {
        name: "Alice".to_string(),
        phone: "+79991234567".to_string(),
        password: "Secret123".to_string(),
    };

    client.register(request.clone()).await?;

    let status = client
        .register(request)
        .await
        .expect_err("Second registration should fail");
    assert_eq!(status.code(), Code::AlreadyExists);
    assert_eq!(status.message(), "user already exists");

    // Exactly one record exists for that phone
    assert_eq!(storage.users_with_phone("+79991234567"), 1);

    drop(shutdown);
    Ok(())
}

#[tokio::test]
async fn test_bad_logins_are_indistinguishable() -> Result<()> {
    let storage = test_storage();
    let (mut client, shutdown) = start_server(storage).await;

    client
        .register(RegisterRequest {
            name: "Bob".to_string(),
            phone: "+79998887777".to_string(),
            password: "Pass1".to_string(),
        })
        .await?;

    // Unregistered phone
    let unknown = client
        .login(LoginRequest {
            phone: "+79990000000".to_string(),
            password: "anything".to_string(),
            app_id: APP_ID,
        })
        .await
        .expect_err("Login should fail");

    // Registered phone, wrong password
    let wrong_password = client
        .login(LoginRequest {
            phone: "+79998887777".to_string(),
            password: "Pass2".to_string(),
            app_id: APP_ID,
        })
        .await
        .expect_err("Login should fail");

    assert_eq!(unknown.code(), Code::Unauthenticated);
    assert_eq!(wrong_password.code(), Code::Unauthenticated);
    assert_eq!(unknown.message(), wrong_password.message());

    drop(shutdown);
    Ok(())
}

#[tokio::test]
async fn test_login_with_unregistered_app_is_not_found() -> Result<()> {
    let storage = test_storage();
    let (mut client, shutdown) = start_server(storage).await;

    client
        .register(RegisterRequest {
            name: "Alice".to_string(),
            phone: "+79991234567".to_string(),
            password: "Secret123".to_string(),
        })
        .await?;

    let status = client
        .login(LoginRequest {
            phone: "+79991234567".to_string(),
            password: "Secret123".to_string(),
            app_id: 42,
        })
        .await
        .expect_err("Login should fail");
    assert_eq!(status.code(), Code::NotFound);

    drop(shutdown);
    Ok(())
}

#[tokio::test]
async fn test_is_admin_classification() -> Result<()> {
    let storage = test_storage();
    let (mut client, shutdown) = start_server(storage.clone()).await;

    let user_id = client
        .register(RegisterRequest {
            name: "Alice".to_string(),
            phone: "+79991234567".to_string(),
            password: "Secret123".to_string(),
        })
        .await?
        .into_inner()
        .user_id;

    // Existing user, flag unset
    let response = client.is_admin(IsAdminRequest { user_id }).await?.into_inner();
    assert!(!response.is_admin);

    // Existing user, flag set
    storage.set_admin(user_id);
    let response = client.is_admin(IsAdminRequest { user_id }).await?.into_inner();
    assert!(response.is_admin);

    // Unknown user is NOT_FOUND, never a successful `false`
    let status = client
        .is_admin(IsAdminRequest { user_id: 424242 })
        .await
        .expect_err("Unknown user should fail");
    assert_eq!(status.code(), Code::NotFound);
    assert_eq!(status.message(), "user not found");

    drop(shutdown);
    Ok(())
}

#[tokio::test]
async fn test_storage_failure_surfaces_as_opaque_internal() -> Result<()> {
    let storage = Arc::new(MockStorage::failing());
    let (mut client, shutdown) = start_server(storage).await;

    let status = client
        .login(LoginRequest {
            phone: "+79991234567".to_string(),
            password: "Secret123".to_string(),
            app_id: APP_ID,
        })
        .await
        .expect_err("Login should fail");

    assert_eq!(status.code(), Code::Internal);
    assert_eq!(status.message(), "internal error");

    drop(shutdown);
    Ok(())
}

// ============================================================================
// Validation (no storage access for invalid input)
// ============================================================================

#[tokio::test]
async fn test_register_validation_happens_before_storage() -> Result<()> {
    let cases = [
        (
            RegisterRequest {
                name: String::new(),
                phone: "+79991234567".to_string(),
                password: "Secret123".to_string(),
            },
            "name is required",
        ),
        (
            RegisterRequest {
                name: "Carl".to_string(),
                phone: String::new(),
                password: "Pass1".to_string(),
            },
            "phone is required",
        ),
        (
            RegisterRequest {
                name: "Carl".to_string(),
                phone: "12345".to_string(),
                password: "Pass1".to_string(),
            },
            "phone is invalid",
        ),
        (
            RegisterRequest {
                name: "Carl".to_string(),
                phone: "+79991234567".to_string(),
                password: String::new(),
            },
            "password is required",
        ),
    ];

    for (request, expected) in cases {
        let storage = test_storage();
        let (mut client, shutdown) = start_server(storage.clone()).await;

        let status = client
            .register(request)
            .await
            .expect_err("Registration should fail validation");
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), expected);

        // Invalid input never reaches storage
        assert_eq!(storage.call_count(), 0, "case: {expected}");

        drop(shutdown);
    }

    Ok(())
}

#[tokio::test]
async fn test_login_validation_happens_before_storage() -> Result<()> {
    let cases = [
        (
            LoginRequest {
                phone: String::new(),
                password: "Secret123".to_string(),
                app_id: APP_ID,
            },
            "phone is required",
        ),
        (
            LoginRequest {
                phone: "+7999123456".to_string(),
                password: "Secret123".to_string(),
                app_id: APP_ID,
            },
            "phone is invalid",
        ),
        (
            LoginRequest {
                phone: "+79991234567".to_string(),
                password: String::new(),
                app_id: APP_ID,
            },
            "password is required",
        ),
        (
            LoginRequest {
                phone: "+79991234567".to_string(),
                password: "Secret123".to_string(),
                app_id: 0,
            },
            "appId is required",
        ),
    ];

    for (request, expected) in cases {
        let storage = test_storage();
        let (mut client, shutdown) = start_server(storage.clone()).await;

        let status = client
            .login(request)
            .await
            .expect_err("Login should fail validation");
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), expected);

        assert_eq!(storage.call_count(), 0, "case: {expected}");

        drop(shutdown);
    }

    Ok(())
}

#[tokio::test]
async fn test_is_admin_validation_happens_before_storage() -> Result<()> {
    let storage = test_storage();
    let (mut client, shutdown) = start_server(storage.clone()).await;

    let status = client
        .is_admin(IsAdminRequest { user_id: 0 })
        .await
        .expect_err("Zero user_id should fail validation");
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "user_id is required");
    assert_eq!(storage.call_count(), 0);

    drop(shutdown);
    Ok(())
}
