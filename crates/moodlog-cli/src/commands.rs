//! Subcommand handlers.

use crate::Commands;
use anyhow::Context;
use app_lock_session::{messages, AuthError, InactivityMonitor, SessionManager, SessionSnapshot};
use auth_api_client::HttpAuthClient;
use client_config_and_utils::Config;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(command: Commands, config: &Config) -> anyhow::Result<()> {
    let tokens =
        secure_token_store::create_token_store().context("Secure storage is unavailable")?;
    let client =
        HttpAuthClient::with_timeout(config.api_url()?, tokens.clone(), config.request_timeout())?;
    let session = Arc::new(SessionManager::new(Arc::new(client), tokens));

    match command {
        Commands::Login { username, password } => {
            let password = password_or_stdin(password)?;
            session
                .login(&username, &password)
                .await
                .map_err(|err| report(&session, err))?;
            print_snapshot(&session.snapshot())?;
        }
        Commands::Register { username, password } => {
            let password = password_or_stdin(password)?;
            session
                .register(&username, &password)
                .await
                .map_err(|err| report(&session, err))?;
            print_snapshot(&session.snapshot())?;
        }
        Commands::Logout => {
            // A failed restore still leaves a local session to clear.
            let _ = session.initialize_auth().await;
            logout(&session, &mut std::io::stdout()).await?;
        }
        Commands::Status => {
            restore(&session).await?;
            print_snapshot(&session.snapshot())?;
        }
        Commands::SetAppPassword { password } => {
            restore(&session).await?;
            session
                .set_app_password(&password)
                .await
                .map_err(|err| report(&session, err))?;
            print_snapshot(&session.snapshot())?;
        }
        Commands::VerifyAppPassword { password } => {
            restore(&session).await?;
            let valid = session
                .verify_app_password(&password)
                .await
                .map_err(|err| report(&session, err))?;
            if !valid {
                anyhow::bail!(messages::CURRENT_APP_PASSWORD_WRONG);
            }
            print_snapshot(&session.snapshot())?;
        }
        Commands::ChangeAppPassword {
            current,
            new,
            confirm,
        } => {
            restore(&session).await?;
            session
                .change_app_password(&current, &new, &confirm)
                .await
                .map_err(|err| report(&session, err))?;
            print_snapshot(&session.snapshot())?;
        }
        Commands::Watch => watch(session, config).await?,
    }

    Ok(())
}

/// The local session is cleared even when the remote call fails, so that is
/// reported before the remote error.
async fn logout(session: &SessionManager, out: &mut impl Write) -> anyhow::Result<()> {
    match session.logout().await {
        Ok(()) => writeln!(out, "Logged out")?,
        Err(err) => {
            writeln!(out, "Local session cleared")?;
            return Err(report(session, err));
        }
    }
    Ok(())
}

async fn restore(session: &SessionManager) -> anyhow::Result<()> {
    session
        .initialize_auth()
        .await
        .map_err(|err| report(session, err))
}

async fn watch(session: Arc<SessionManager>, config: &Config) -> anyhow::Result<()> {
    restore(&session).await?;

    let monitor = InactivityMonitor::spawn(session.clone(), config.inactivity_poll_interval());
    let mut updates = session.subscribe();
    let initial = updates.borrow_and_update().clone();
    print_snapshot(&initial)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                print_snapshot(&snapshot)?;
            }
            _ = &mut ctrl_c => {
                info!("Received shutdown signal, exiting...");
                break;
            }
        }
    }

    monitor.shutdown().await;
    Ok(())
}

/// Wrap a session error with the message the session recorded for the user.
fn report(session: &SessionManager, err: AuthError) -> anyhow::Error {
    let mut message = session.error().unwrap_or_else(|| err.user_message());
    if let Some(hint) = hint(&err) {
        message = format!("{message} ({hint})");
    }
    anyhow::Error::new(err).context(message)
}

fn hint(err: &AuthError) -> Option<&'static str> {
    match err {
        AuthError::Api(api) if api.is_unauthorized() => {
            Some("session rejected, run `moodlog login`")
        }
        _ if err.is_transient() => Some("temporary failure, try again"),
        _ => None,
    }
}

fn print_snapshot(snapshot: &SessionSnapshot) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "route": snapshot.route(),
        "session": snapshot,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn password_or_stdin(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(|c| c == '\r' || c == '\n').to_string())
}
