//! gRPC surface of the SSO service.
//!
//! `auth_api` adapts the transport to the domain layer: it validates request
//! shape before any domain (and therefore storage) call is made, and
//! translates domain outcomes into gRPC status codes.

pub mod auth_api;

pub use auth_api::AuthApi;
