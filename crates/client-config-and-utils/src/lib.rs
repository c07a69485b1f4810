//! Configuration, paths, and logging shared by the Moodlog client crates.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_API_URL, DEFAULT_INACTIVITY_POLL_INTERVAL_SECS, DEFAULT_LOG_LEVEL,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
