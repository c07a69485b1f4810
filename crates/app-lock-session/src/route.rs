//! Screen stack selection from the session flags.

use serde::{Deserialize, Serialize};

/// Which screen stack the UI should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Login / register.
    Auth,
    /// Signed in, no app password yet.
    CreateAppPassword,
    /// Signed in, app password not entered.
    VerifyAppPassword,
    /// The main app.
    Main,
}

impl Route {
    pub fn select(
        is_authenticated: bool,
        app_password_set: bool,
        app_password_verified: bool,
    ) -> Self {
        match (is_authenticated, app_password_set, app_password_verified) {
            (false, _, _) => Route::Auth,
            (true, false, _) => Route::CreateAppPassword,
            (true, true, false) => Route::VerifyAppPassword,
            (true, true, true) => Route::Main,
        }
    }
}
