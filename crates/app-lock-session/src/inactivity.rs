//! Background watcher that re-locks the app password gate after inactivity.

use crate::SessionManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Polls [`SessionManager::check_inactivity`] and calls
/// [`SessionManager::lock_app`] once the unlocked session has been idle too
/// long. The task stops on [`shutdown`](Self::shutdown) or when the monitor
/// is dropped.
pub struct InactivityMonitor {
    session: Arc<SessionManager>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl InactivityMonitor {
    /// Start polling every `poll_interval`. Must be called inside a tokio
    /// runtime.
    pub fn spawn(session: Arc<SessionManager>, poll_interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_monitor(session.clone(), poll_interval, shutdown_rx));

        info!(
            poll_interval_ms = poll_interval.as_millis() as u64,
            "Started inactivity monitor"
        );

        Self {
            session,
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }

    /// Record user interaction now.
    pub fn touch(&self) {
        self.session.set_last_active_timestamp(Instant::now());
    }

    /// Stop the watcher and wait for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        let _ = (&mut self.task).await;
    }
}

impl Drop for InactivityMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_monitor(
    session: Arc<SessionManager>,
    poll_interval: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                debug!("Stopping inactivity monitor");
                break;
            }
            _ = ticker.tick() => {
                if session.app_password_verified() && session.check_inactivity() {
                    info!("Locking app after inactivity");
                    session.lock_app();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LockState, INACTIVITY_THRESHOLD};
    use async_trait::async_trait;
    use auth_api_client::{
        ApiResult, AppPasswordStatus, AuthApi, AuthResponse, Credentials, MessageResponse,
        APP_PASSWORD_UPDATED_MESSAGE,
    };
    use secure_token_store::{MemoryStorage, TokenStore};

    /// Backend that accepts everything.
    struct AcceptingApi;

    #[async_trait]
    impl AuthApi for AcceptingApi {
        async fn login(&self, _credentials: &Credentials) -> ApiResult<AuthResponse> {
            Ok(AuthResponse {
                token: Some("jwt".to_string()),
                ..AuthResponse::default()
            })
        }

        async fn register(&self, credentials: &Credentials) -> ApiResult<AuthResponse> {
            self.login(credentials).await
        }

        async fn logout(&self) -> ApiResult<MessageResponse> {
            Ok(MessageResponse::default())
        }

        async fn set_app_password(&self, _app_password: &str) -> ApiResult<MessageResponse> {
            Ok(MessageResponse {
                message: APP_PASSWORD_UPDATED_MESSAGE.to_string(),
            })
        }

        async fn verify_app_password(&self, _app_password: &str) -> ApiResult<bool> {
            Ok(true)
        }

        async fn check_app_password_status(&self) -> ApiResult<AppPasswordStatus> {
            Ok(AppPasswordStatus { is_set: false })
        }
    }

    async fn unlocked_session() -> Arc<SessionManager> {
        let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
        let session = Arc::new(SessionManager::new(Arc::new(AcceptingApi), tokens));
        session.login("ayse", "pw").await.unwrap();
        session.set_app_password("1234").await.unwrap();
        assert_eq!(session.lock_state(), LockState::Unlocked);
        session
    }

    #[tokio::test(start_paused = true)]
    async fn test_locks_after_threshold() {
        let session = unlocked_session().await;
        let monitor = InactivityMonitor::spawn(session.clone(), Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(session.lock_state(), LockState::Unlocked);

        tokio::time::sleep(INACTIVITY_THRESHOLD).await;
        assert_eq!(session.lock_state(), LockState::Locked);

        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_keeps_session_unlocked() {
        let session = unlocked_session().await;
        let monitor = InactivityMonitor::spawn(session.clone(), Duration::from_secs(5));

        for _ in 0..6 {
            tokio::time::sleep(Duration::from_secs(30)).await;
            monitor.touch();
        }

        assert_eq!(session.lock_state(), LockState::Unlocked);
        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_watching() {
        let session = unlocked_session().await;
        let monitor = InactivityMonitor::spawn(session.clone(), Duration::from_secs(5));

        monitor.shutdown().await;
        tokio::time::sleep(INACTIVITY_THRESHOLD * 2).await;

        assert_eq!(session.lock_state(), LockState::Unlocked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_watching() {
        let session = unlocked_session().await;
        drop(InactivityMonitor::spawn(session.clone(), Duration::from_secs(5)));

        tokio::time::sleep(INACTIVITY_THRESHOLD * 2).await;

        assert_eq!(session.lock_state(), LockState::Unlocked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_does_not_touch_signed_out_session() {
        let tokens = TokenStore::new(Arc::new(MemoryStorage::new()));
        let session = Arc::new(SessionManager::new(Arc::new(AcceptingApi), tokens));
        let monitor = InactivityMonitor::spawn(session.clone(), Duration::from_secs(5));

        tokio::time::sleep(INACTIVITY_THRESHOLD * 2).await;

        assert_eq!(session.lock_state(), LockState::SignedOut);
        monitor.shutdown().await;
    }
}
