//! File system paths for the client.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Directory name under the user's home directory.
const BASE_DIR_NAME: &str = ".moodlog";

/// Manages file system paths for the client.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for client files (~/.moodlog)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.moodlog`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(BASE_DIR_NAME),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.moodlog).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.moodlog/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths_with_base_dir() {
        let base = PathBuf::from("/tmp/test-moodlog");
        let paths = Paths::with_base_dir(base.clone());

        assert_eq!(paths.base_dir(), &base);
        assert_eq!(paths.config_file(), base.join("config.json"));
    }

    #[test]
    fn test_paths_default_lives_under_home() {
        if let Ok(paths) = Paths::new() {
            assert!(paths.base_dir().ends_with(BASE_DIR_NAME));
        }
    }

    #[test]
    fn test_ensure_dirs_idempotent() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().join("nested").join("moodlog"));

        paths.ensure_dirs().unwrap();
        paths.ensure_dirs().unwrap();
        assert!(paths.base_dir().is_dir());
    }
}
