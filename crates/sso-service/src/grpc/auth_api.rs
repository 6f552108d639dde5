//! Auth gRPC service implementation.
//!
//! Validation runs before any call into [`AuthService`]; a request that
//! fails validation never touches storage. Domain errors convert to
//! `tonic::Status` through the single mapping in `errors.rs`.

use crate::services::AuthService;
use proto_gen::auth::auth_server::Auth;
use proto_gen::auth::{
    IsAdminRequest, IsAdminResponse, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse,
};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tonic::{Request, Response, Status};
use tracing::instrument;

/// Mobile numbers must be E.164 for the +7 country code: `+7` then exactly
/// ten digits.
const PHONE_PATTERN: &str = r"^\+7\d{10}$";

#[expect(clippy::expect_used)] // the pattern is a known-good constant
fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PHONE_PATTERN).expect("phone pattern should compile"))
}

/// gRPC adapter over [`AuthService`].
pub struct AuthApi {
    auth: Arc<AuthService>,
}

impl AuthApi {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }
}

#[tonic::async_trait]
impl Auth for AuthApi {
    #[instrument(skip_all)]
    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        let req = request.into_inner();
        validate_login(&req)?;

        let token = self
            .auth
            .login(&req.phone, &req.password, req.app_id)
            .await?;

        Ok(Response::new(LoginResponse { token }))
    }

    #[instrument(skip_all)]
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let req = request.into_inner();
        validate_register(&req)?;

        let user_id = self
            .auth
            .register(&req.name, &req.phone, &req.password)
            .await?;

        Ok(Response::new(RegisterResponse { user_id }))
    }

    #[instrument(skip_all)]
    async fn is_admin(
        &self,
        request: Request<IsAdminRequest>,
    ) -> Result<Response<IsAdminResponse>, Status> {
        let req = request.into_inner();
        validate_is_admin(&req)?;

        let is_admin = self.auth.is_admin(req.user_id).await?;

        Ok(Response::new(IsAdminResponse { is_admin }))
    }
}

fn validate_login(req: &LoginRequest) -> Result<(), Status> {
    validate_phone(&req.phone)?;

    if req.password.is_empty() {
        return Err(Status::invalid_argument("password is required"));
    }

    if req.app_id == 0 {
        return Err(Status::invalid_argument("appId is required"));
    }

    Ok(())
}

fn validate_register(req: &RegisterRequest) -> Result<(), Status> {
    if req.name.is_empty() {
        return Err(Status::invalid_argument("name is required"));
    }

    validate_phone(&req.phone)?;

    if req.password.is_empty() {
        return Err(Status::invalid_argument("password is required"));
    }

    Ok(())
}

fn validate_is_admin(req: &IsAdminRequest) -> Result<(), Status> {
    if req.user_id == 0 {
        return Err(Status::invalid_argument("user_id is required"));
    }

    Ok(())
}

/// Accepts conforming numbers, rejects everything else.
fn validate_phone(phone: &str) -> Result<(), Status> {
    if phone.is_empty() {
        return Err(Status::invalid_argument("phone is required"));
    }

    if !phone_regex().is_match(phone) {
        return Err(Status::invalid_argument("phone is invalid"));
    }

    Ok(())
}
