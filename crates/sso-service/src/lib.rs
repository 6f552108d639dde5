//! SSO Service Library
//!
//! Authenticates end users on behalf of registered client applications,
//! issuing app-scoped signed tokens after verifying credentials, and answers
//! admin privilege queries.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `errors` - Error taxonomy and wire translation
//! - `grpc` - Transport adapter (tonic)
//! - `models` - Domain models
//! - `services` - Business logic layer (auth, token issuance)
//! - `storage` - Storage capability ports and the SQLite adapter

pub mod config;
pub mod errors;
pub mod grpc;
pub mod models;
pub mod services;
pub mod storage;
