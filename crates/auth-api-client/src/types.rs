//! Wire types for the `/auth/*` endpoints.

use serde::{Deserialize, Serialize};

/// Message the backend returns when the app password was stored.
pub const APP_PASSWORD_UPDATED_MESSAGE: &str = "Uygulama şifresi başarıyla güncellendi";

/// Message the backend returns when the app password matched.
pub const APP_PASSWORD_VERIFIED_MESSAGE: &str = "Uygulama şifresi doğrulandı";

/// Login/register request body.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Login/register response. Every field is optional on the wire; a missing
/// token is a failed login even on HTTP 200.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    /// The backend uses `message` on register and `mesaj` on login.
    #[serde(default, alias = "mesaj")]
    pub message: Option<String>,
}

/// User summary embedded in auth responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(raw.map(|id| match id {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    }))
}

/// Generic `{message}` response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Body for the set/verify app password calls.
#[derive(Serialize)]
pub(crate) struct AppPasswordRequest<'a> {
    #[serde(rename = "appPassword")]
    pub app_password: &'a str,
}

/// `GET /auth/check-app-password` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AppPasswordStatus {
    #[serde(rename = "isSet")]
    pub is_set: bool,
}
