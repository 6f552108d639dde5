//! Generated Protocol Buffer code for the SSO service.
//!
//! This crate contains the compiled Protocol Buffer definitions for the
//! `sso.auth` package (see `proto/sso.proto` at the workspace root).
//!
//! The generated code is checked in under `src/generated/` so the workspace
//! builds without a `protoc` toolchain. To regenerate after editing the
//! proto file, run `tonic-build` against `proto/sso.proto` with
//! `out_dir("src/generated")`.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)] // Generated code has various doc formatting

// Re-export prost traits for convenience
pub use prost::Message;

// Generated protobuf modules
pub mod auth {
    //! Authentication RPC messages and service
    include!("generated/sso.auth.rs");
}
