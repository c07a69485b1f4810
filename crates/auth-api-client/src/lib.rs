//! REST client for the Moodlog auth endpoints.
//!
//! This crate provides:
//! - The [`AuthApi`] seam the session core talks to
//! - [`HttpAuthClient`], a reqwest implementation that injects the stored
//!   bearer token into every authenticated request
//! - Wire types for the `/auth/*` endpoints

mod api;
mod client;
mod error;
mod types;

pub use api::AuthApi;
pub use client::HttpAuthClient;
pub use error::{ApiError, ApiResult};
pub use types::{
    AppPasswordStatus, AuthResponse, Credentials, MessageResponse, UserProfile,
    APP_PASSWORD_UPDATED_MESSAGE, APP_PASSWORD_VERIFIED_MESSAGE,
};
