//! SSO server binary.
//!
//! # Startup Flow
//!
//! 1. Initialize tracing
//! 2. Load configuration from environment
//! 3. Open the SQLite pool and apply migrations
//! 4. Build the auth service over the storage ports
//! 5. Serve the gRPC API until ctrl-c

use proto_gen::auth::auth_server::AuthServer;
use sso_service::config::Config;
use sso_service::grpc::AuthApi;
use sso_service::services::AuthService;
use sso_service::storage::sqlite::SqliteStorage;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sso_service=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SSO service");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        grpc_bind_address = %config.grpc_bind_address,
        token_ttl_seconds = config.token_ttl.as_secs(),
        "Configuration loaded successfully"
    );

    // Open storage and apply migrations
    info!("Connecting to database...");
    let storage = SqliteStorage::connect(&config.database_url)
        .await
        .map_err(|e| {
            error!("Failed to open storage: {}", e);
            e
        })?;

    sqlx::migrate!("../../migrations")
        .run(storage.pool())
        .await
        .map_err(|e| {
            error!("Failed to run migrations: {}", e);
            e
        })?;

    info!("Database ready");

    // Wire the auth service through the storage ports
    let storage = Arc::new(storage);
    let auth = Arc::new(AuthService::new(
        storage.clone(),
        storage.clone(),
        storage.clone(),
        config.token_ttl,
    ));

    let addr: SocketAddr = config.grpc_bind_address.parse().map_err(|e| {
        error!(addr = %config.grpc_bind_address, "Invalid gRPC bind address: {}", e);
        e
    })?;

    info!(addr = %addr, "gRPC server starting");

    tonic::transport::Server::builder()
        .add_service(AuthServer::new(AuthApi::new(auth)))
        .serve_with_shutdown(addr, async {
            let _ = signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("SSO service stopped");

    Ok(())
}
