//! reqwest implementation of [`AuthApi`].

use crate::types::AppPasswordRequest;
use crate::{
    ApiError, ApiResult, AppPasswordStatus, AuthApi, AuthResponse, Credentials, MessageResponse,
    APP_PASSWORD_VERIFIED_MESSAGE,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use secure_token_store::TokenStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// HTTP client for the Moodlog auth backend.
///
/// The bearer token is read from the [`TokenStore`] on every authenticated
/// request, so a token persisted by one call is picked up by the next.
#[derive(Clone)]
pub struct HttpAuthClient {
    http_client: reqwest::Client,
    base_url: Url,
    tokens: TokenStore,
}

impl HttpAuthClient {
    /// Create a client with the default request timeout.
    pub fn new(base_url: Url, tokens: TokenStore) -> ApiResult<Self> {
        Self::with_timeout(base_url, tokens, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-request timeout.
    pub fn with_timeout(mut base_url: Url, tokens: TokenStore, timeout: Duration) -> ApiResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!(
                "API URL cannot be used as a base: {}",
                base_url
            )));
        }
        // `Url::join` replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url,
            tokens,
        })
    }

    /// The normalized base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn bearer_token(&self) -> ApiResult<String> {
        self.tokens.token()?.ok_or(ApiError::MissingToken)
    }

    async fn post_public<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        tracing::debug!(url = %url, "POST");
        let response = self.http_client.post(url).json(body).send().await?;
        Self::decode(path, response).await
    }

    async fn send_authenticated(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&AppPasswordRequest<'_>>,
    ) -> ApiResult<reqwest::Response> {
        let token = self.bearer_token()?;
        let url = self.endpoint(path)?;
        tracing::debug!(method = %method, url = %url, "Authenticated request");

        let mut request = self.http_client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(path, status, response).await);
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn status_error(path: &str, status: StatusCode, response: reqwest::Response) -> ApiError {
        let body = response.text().await.unwrap_or_default();
        let body_summary = summarize_response_body(&body);
        tracing::error!(
            path = %path,
            status = %status,
            body_summary = %body_summary,
            "Auth request failed"
        );
        ApiError::Status {
            status,
            body_summary,
        }
    }
}

#[async_trait]
impl AuthApi for HttpAuthClient {
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthResponse> {
        self.post_public("auth/login", credentials).await
    }

    async fn register(&self, credentials: &Credentials) -> ApiResult<AuthResponse> {
        self.post_public("auth/register", credentials).await
    }

    async fn logout(&self) -> ApiResult<MessageResponse> {
        let path = "auth/logout";
        let response = self
            .send_authenticated(reqwest::Method::POST, path, None)
            .await?;
        Self::decode(path, response).await
    }

    async fn set_app_password(&self, app_password: &str) -> ApiResult<MessageResponse> {
        let path = "auth/set-app-password";
        let body = AppPasswordRequest { app_password };
        let response = self
            .send_authenticated(reqwest::Method::POST, path, Some(&body))
            .await?;
        Self::decode(path, response).await
    }

    async fn verify_app_password(&self, app_password: &str) -> ApiResult<bool> {
        let path = "auth/verify-app-password";
        let body = AppPasswordRequest { app_password };
        let response = self
            .send_authenticated(reqwest::Method::POST, path, Some(&body))
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!("App password rejected");
            return Ok(false);
        }

        let message: MessageResponse = Self::decode(path, response).await?;
        Ok(message.message == APP_PASSWORD_VERIFIED_MESSAGE)
    }

    async fn check_app_password_status(&self) -> ApiResult<AppPasswordStatus> {
        let path = "auth/check-app-password";
        let response = self
            .send_authenticated(reqwest::Method::GET, path, None)
            .await?;
        Self::decode(path, response).await
    }
}
