use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_GRPC_BIND_ADDRESS: &str = "0.0.0.0:44044";
const DEFAULT_TOKEN_TTL_SECONDS: u64 = 3600;

/// Service configuration, supplied through the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database URL, e.g. `sqlite://sso.db`.
    pub database_url: String,
    pub grpc_bind_address: String,
    /// Lifetime of issued tokens; expiry is issuance instant plus this.
    pub token_ttl: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid token TTL: {0}")]
    InvalidTokenTtl(String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let grpc_bind_address = vars
            .get("GRPC_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_GRPC_BIND_ADDRESS.to_string());

        let token_ttl = match vars.get("TOKEN_TTL_SECONDS") {
            Some(raw) => {
                let seconds: u64 = raw
                    .parse()
                    .map_err(|_| ConfigError::InvalidTokenTtl(raw.clone()))?;
                if seconds == 0 {
                    return Err(ConfigError::InvalidTokenTtl(raw.clone()));
                }
                Duration::from_secs(seconds)
            }
            None => Duration::from_secs(DEFAULT_TOKEN_TTL_SECONDS),
        };

        Ok(Config {
            database_url,
            grpc_bind_address,
            token_ttl,
        })
    }
}
