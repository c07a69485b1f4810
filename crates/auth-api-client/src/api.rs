//! The auth backend seam.

use crate::{ApiResult, AppPasswordStatus, AuthResponse, Credentials, MessageResponse};
use async_trait::async_trait;

/// Calls the session core makes against the auth backend.
///
/// Implementations attach the persisted bearer token to the authenticated
/// calls (everything except `login` and `register`).
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthResponse>;

    /// `POST /auth/register`
    async fn register(&self, credentials: &Credentials) -> ApiResult<AuthResponse>;

    /// `POST /auth/logout`
    async fn logout(&self) -> ApiResult<MessageResponse>;

    /// `POST /auth/set-app-password`
    async fn set_app_password(&self, app_password: &str) -> ApiResult<MessageResponse>;

    /// `POST /auth/verify-app-password`
    ///
    /// A rejected password is `Ok(false)`; only transport and server failures
    /// are errors.
    async fn verify_app_password(&self, app_password: &str) -> ApiResult<bool>;

    /// `GET /auth/check-app-password`
    async fn check_app_password_status(&self) -> ApiResult<AppPasswordStatus>;
}
