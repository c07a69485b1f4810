//! Session manager for account auth and the app password gate.
//!
//! `SessionManager` is the single owner of session mutation. UI collaborators
//! hold it behind an `Arc`, call its actions, and re-render from the
//! [`SessionSnapshot`] published on a `watch` channel.
//!
//! Network-backed actions are queued: only one runs at a time, later calls
//! wait their turn. `lock_app`, `set_last_active_timestamp`,
//! `check_inactivity` and `snapshot` never wait on the queue.

use crate::lock_fsm::{LockMachine, LockMachineInput, LockState};
use crate::{messages, validation, AuthError, AuthResult, Route};
use auth_api_client::{AuthApi, AuthResponse, APP_PASSWORD_UPDATED_MESSAGE};
use secure_token_store::TokenStore;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Idle time after which the app password gate re-locks.
pub const INACTIVITY_THRESHOLD: Duration = Duration::from_secs(2 * 60);

/// Point-in-time view of the session for UI consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub state: LockState,
    pub is_authenticated: bool,
    pub app_password_set: bool,
    pub app_password_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl SessionSnapshot {
    fn new(state: LockState, error: Option<String>, user_id: Option<String>) -> Self {
        Self {
            state,
            is_authenticated: state.is_authenticated(),
            app_password_set: state.app_password_set(),
            app_password_verified: state.app_password_verified(),
            error,
            user_id,
        }
    }

    /// Screen stack for this snapshot.
    pub fn route(&self) -> Route {
        Route::select(
            self.is_authenticated,
            self.app_password_set,
            self.app_password_verified,
        )
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::new(LockState::SignedOut, None, None)
    }
}

#[derive(Debug, Clone, Copy)]
enum SignInFlow {
    Login,
    Register,
}

impl SignInFlow {
    fn failure_message(self) -> &'static str {
        match self {
            SignInFlow::Login => messages::LOGIN_FAILED,
            SignInFlow::Register => messages::REGISTER_FAILED,
        }
    }
}

/// Owner of the session state.
pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    tokens: TokenStore,
    /// Lock FSM; the three session flags are derived from its state.
    fsm: Mutex<LockMachine>,
    error: Mutex<Option<String>>,
    user_id: Mutex<Option<String>>,
    last_active: Mutex<Instant>,
    /// Held for the whole of every network-backed action.
    operations: tokio::sync::Mutex<()>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl SessionManager {
    /// Create a signed-out session. Call [`initialize_auth`](Self::initialize_auth)
    /// to restore a persisted session.
    pub fn new(api: Arc<dyn AuthApi>, tokens: TokenStore) -> Self {
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());
        Self {
            api,
            tokens,
            fsm: Mutex::new(LockMachine::new()),
            error: Mutex::new(None),
            user_id: Mutex::new(None),
            last_active: Mutex::new(Instant::now()),
            operations: tokio::sync::Mutex::new(()),
            snapshot_tx,
        }
    }

    // ==========================================
    // Read State
    // ==========================================

    /// Current lock state.
    pub fn lock_state(&self) -> LockState {
        let fsm = self.fsm.lock().unwrap();
        LockState::from(fsm.state())
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock_state().is_authenticated()
    }

    pub fn app_password_set(&self) -> bool {
        self.lock_state().app_password_set()
    }

    pub fn app_password_verified(&self) -> bool {
        self.lock_state().app_password_verified()
    }

    /// Last user-facing failure message.
    pub fn error(&self) -> Option<String> {
        self.error.lock().unwrap().clone()
    }

    pub fn last_active_timestamp(&self) -> Instant {
        *self.last_active.lock().unwrap()
    }

    /// Build a snapshot of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(
            self.lock_state(),
            self.error(),
            self.user_id.lock().unwrap().clone(),
        )
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    // ==========================================
    // Account Actions
    // ==========================================

    /// Log in and check the app password status.
    ///
    /// A failed status check does not fail the login; it is reported through
    /// `error` and leaves the session on the create-app-password route.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<()> {
        let _queue = self.operations.lock().await;
        self.sign_in(SignInFlow::Login, username, password).await
    }

    /// Register a new account. Same contract as [`login`](Self::login).
    pub async fn register(&self, username: &str, password: &str) -> AuthResult<()> {
        let _queue = self.operations.lock().await;
        self.sign_in(SignInFlow::Register, username, password).await
    }

    /// Log out remotely and clear the session.
    ///
    /// The local session is always cleared. If the remote call or the token
    /// store fails, `error` is set and the failure is returned.
    pub async fn logout(&self) -> AuthResult<()> {
        let _queue = self.operations.lock().await;

        let remote = if self.is_authenticated() {
            self.api.logout().await.map(|_| ()).map_err(AuthError::from)
        } else {
            debug!("Logout without a session, skipping remote call");
            Ok(())
        };
        let local = self.tokens.clear().map_err(AuthError::from);

        self.set_user_id(None);
        self.transition(&LockMachineInput::LoggedOut)?;
        self.touch();

        match remote.and(local) {
            Ok(()) => {
                self.set_error(None);
                info!("Logged out");
                Ok(())
            }
            Err(err) => Err(self.fail(err, messages::LOGOUT_FAILED)),
        }
    }

    /// Restore the session from the token store at startup.
    ///
    /// With a token present the session becomes authenticated and the app
    /// password status is fetched; without one it stays signed out.
    pub async fn initialize_auth(&self) -> AuthResult<()> {
        let _queue = self.operations.lock().await;

        let token = match self.tokens.token() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(err) => {
                self.set_user_id(None);
                self.transition(&LockMachineInput::NoSession)?;
                return Err(self.fail(err.into(), messages::INITIALIZE_FAILED));
            }
        };

        self.set_error(None);
        self.touch();

        if token.is_none() {
            self.set_user_id(None);
            self.transition(&LockMachineInput::NoSession)?;
            info!("No stored session");
            return Ok(());
        }

        let user_id = match self.tokens.user_id() {
            Ok(user_id) => user_id,
            Err(err) => {
                warn!(error = %err, "Failed to read stored user id");
                None
            }
        };
        self.set_user_id(user_id);
        self.transition(&LockMachineInput::SessionRestored)?;
        info!("Restored stored session");

        if let Err(err) = self.refresh_app_password_status().await {
            debug!(error = %err, "App password status unavailable after restore");
        }
        Ok(())
    }

    // ==========================================
    // App Password Actions
    // ==========================================

    /// Ask the backend whether an app password exists.
    ///
    /// Does nothing while signed out. Always clears verification.
    pub async fn check_app_password_status(&self) -> AuthResult<()> {
        let _queue = self.operations.lock().await;
        self.refresh_app_password_status().await
    }

    /// Store a new app password and unlock.
    pub async fn set_app_password(&self, password: &str) -> AuthResult<()> {
        let _queue = self.operations.lock().await;
        self.store_app_password(password)
            .await
            .map_err(|err| self.fail(err, messages::SET_APP_PASSWORD_FAILED))
    }

    /// Check the app password. A wrong password is `Ok(false)` and locks the
    /// gate; transport failures are errors.
    pub async fn verify_app_password(&self, password: &str) -> AuthResult<bool> {
        let _queue = self.operations.lock().await;

        if let Err(err) = self.require_session() {
            return Err(self.fail(err, messages::VERIFY_APP_PASSWORD_FAILED));
        }

        match self.api.verify_app_password(password).await {
            Ok(valid) => {
                let input = if valid {
                    LockMachineInput::PasswordVerified
                } else {
                    LockMachineInput::PasswordRejected
                };
                self.transition(&input)?;
                self.set_error(None);
                self.touch();
                info!(valid, "App password checked");
                Ok(valid)
            }
            Err(err) => Err(self.fail(err.into(), messages::VERIFY_APP_PASSWORD_FAILED)),
        }
    }

    /// Replace the app password.
    ///
    /// When one is already set, `current` is verified first; a mismatch fails
    /// with [`AuthError::InvalidAppPassword`] without changing the lock state.
    pub async fn change_app_password(
        &self,
        current: &str,
        new_password: &str,
        confirmation: &str,
    ) -> AuthResult<()> {
        let _queue = self.operations.lock().await;
        self.replace_app_password(current, new_password, confirmation)
            .await
            .map_err(|err| self.fail(err, messages::SET_APP_PASSWORD_FAILED))
    }

    // ==========================================
    // Lock & Inactivity
    // ==========================================

    /// Clear app password verification. Other flags are untouched.
    pub fn lock_app(&self) {
        match self.transition(&LockMachineInput::Lock) {
            Ok(state) => debug!(state = ?state, "App locked"),
            Err(err) => warn!(error = %err, "Failed to lock app"),
        }
    }

    /// Record user activity at `at`.
    pub fn set_last_active_timestamp(&self, at: Instant) {
        *self.last_active.lock().unwrap() = at;
    }

    /// True once more than [`INACTIVITY_THRESHOLD`] has passed since the last
    /// recorded activity.
    pub fn check_inactivity(&self) -> bool {
        self.last_active_timestamp().elapsed() > INACTIVITY_THRESHOLD
    }

    // ==========================================
    // Internals (callers hold the operation queue)
    // ==========================================

    async fn sign_in(&self, flow: SignInFlow, username: &str, password: &str) -> AuthResult<()> {
        if let Err(err) = self.establish_session(flow, username, password).await {
            return Err(self.fail(err, flow.failure_message()));
        }

        if let Err(err) = self.refresh_app_password_status().await {
            debug!(error = %err, "App password status unavailable after sign in");
        }
        Ok(())
    }

    async fn establish_session(
        &self,
        flow: SignInFlow,
        username: &str,
        password: &str,
    ) -> AuthResult<()> {
        let credentials = validation::credentials(username, password)?;

        let response: AuthResponse = match flow {
            SignInFlow::Login => self.api.login(&credentials).await?,
            SignInFlow::Register => self.api.register(&credentials).await?,
        };

        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        // The token goes in last: a stored token is what restores a session.
        let user_id = response.user.and_then(|user| user.id);
        match &user_id {
            Some(id) => self.tokens.set_user_id(id)?,
            None => {
                self.tokens.remove_user_id()?;
            }
        }
        self.tokens.set_token(&token)?;
        self.set_user_id(user_id);

        self.transition(&LockMachineInput::LoginSucceeded)?;
        self.set_error(None);
        self.touch();

        info!(username = %credentials.username, flow = ?flow, "Signed in");
        Ok(())
    }

    async fn refresh_app_password_status(&self) -> AuthResult<()> {
        if !self.is_authenticated() {
            debug!("Skipping app password status check while signed out");
            return Ok(());
        }

        match self.api.check_app_password_status().await {
            Ok(status) => {
                let input = if status.is_set {
                    LockMachineInput::PasswordStatusSet
                } else {
                    LockMachineInput::PasswordStatusUnset
                };
                self.transition(&input)?;
                debug!(is_set = status.is_set, "App password status refreshed");
                Ok(())
            }
            Err(err) => {
                self.transition(&LockMachineInput::StatusCheckFailed)?;
                Err(self.fail(err.into(), messages::STATUS_CHECK_FAILED))
            }
        }
    }

    async fn store_app_password(&self, password: &str) -> AuthResult<()> {
        self.require_session()?;
        validation::app_password(password)?;

        let response = self.api.set_app_password(password).await?;
        if response.message != APP_PASSWORD_UPDATED_MESSAGE {
            return Err(AuthError::UnexpectedResponse(response.message));
        }

        self.transition(&LockMachineInput::AppPasswordCreated)?;
        self.set_error(None);
        self.touch();
        info!("App password stored");
        Ok(())
    }

    async fn replace_app_password(
        &self,
        current: &str,
        new_password: &str,
        confirmation: &str,
    ) -> AuthResult<()> {
        self.require_session()?;
        validation::app_password_change(new_password, confirmation)?;

        if self.app_password_set() && !self.api.verify_app_password(current).await? {
            return Err(AuthError::InvalidAppPassword);
        }

        self.store_app_password(new_password).await
    }

    fn require_session(&self) -> AuthResult<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(AuthError::NotSignedIn)
        }
    }

    /// Transition the FSM and publish if the state changed.
    fn transition(&self, input: &LockMachineInput) -> AuthResult<LockState> {
        let mut fsm = self.fsm.lock().unwrap();
        let old_state = LockState::from(fsm.state());

        fsm.consume(input).map_err(|_| {
            AuthError::InvalidStateTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input,
                fsm.state()
            ))
        })?;

        let new_state = LockState::from(fsm.state());
        drop(fsm);

        if old_state != new_state {
            debug!(
                old_state = ?old_state,
                new_state = ?new_state,
                "Lock state transition"
            );
            self.publish();
        }

        Ok(new_state)
    }

    fn set_error(&self, message: Option<String>) {
        let changed = {
            let mut error = self.error.lock().unwrap();
            let changed = *error != message;
            *error = message;
            changed
        };
        if changed {
            self.publish();
        }
    }

    fn set_user_id(&self, user_id: Option<String>) {
        let changed = {
            let mut current = self.user_id.lock().unwrap();
            let changed = *current != user_id;
            *current = user_id;
            changed
        };
        if changed {
            self.publish();
        }
    }

    /// Record `err` in `error` and hand it back to the caller.
    fn fail(&self, err: AuthError, action_message: &str) -> AuthError {
        let message = if err.has_own_message() {
            err.user_message()
        } else {
            action_message.to_string()
        };
        warn!(error = %err, "Session action failed");
        self.set_error(Some(message));
        err
    }

    fn touch(&self) {
        self.set_last_active_timestamp(Instant::now());
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}
