//! Moodlog command-line client.
//!
//! Drives the session core against a real backend, with the session token
//! kept in the platform keystore.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use client_config_and_utils::{init_logging, Config, Paths};

/// Moodlog command-line interface.
#[derive(Parser, Debug)]
#[command(name = "moodlog")]
#[command(about = "Sign in to Moodlog and manage the app password lock")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error). Defaults to the configured level
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for client files. Defaults to ~/.moodlog
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// Backend URL, overriding config and MOODLOG_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in with username and password
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long, env = "MOODLOG_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account and log in
    Register {
        username: String,
        /// Read from stdin when omitted
        #[arg(long, env = "MOODLOG_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Log out and forget the stored session
    Logout,
    /// Show the restored session state and route
    Status,
    /// Set the app password for the signed-in account
    SetAppPassword { password: String },
    /// Check the app password
    VerifyAppPassword { password: String },
    /// Replace the app password
    ChangeAppPassword {
        /// Current app password (ignored when none is set)
        #[arg(long, default_value = "")]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Print session changes until interrupted, re-locking after inactivity
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = match cli.base_dir.clone() {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    let mut config = Config::load(&paths)?;
    if let Some(api_url) = cli.api_url.clone() {
        config.api_url = api_url;
        config.validate()?;
    }

    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    init_logging(&log_level);

    commands::run(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "moodlog",
            "status",
            "--api-url",
            "http://127.0.0.1:9000",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Status));
        assert_eq!(cli.api_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_change_app_password_current_defaults_to_empty() {
        let cli = Cli::try_parse_from([
            "moodlog",
            "change-app-password",
            "--new",
            "5678",
            "--confirm",
            "5678",
        ])
        .unwrap();

        match cli.command {
            Commands::ChangeAppPassword {
                current,
                new,
                confirm,
            } => {
                assert_eq!(current, "");
                assert_eq!(new, "5678");
                assert_eq!(confirm, "5678");
            }
            other => panic!("Unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_login_requires_username() {
        assert!(Cli::try_parse_from(["moodlog", "login"]).is_err());
    }
}
