//! Unified path management for pulse state files.
//!
//! Snapshots and the runtime configuration live under a single
//! per-platform config directory:
//!
//! ```text
//! ~/.config/pulse/                 # Linux (XDG); platform dirs elsewhere
//! ├── config.toml                  # Runtime configuration (optional)
//! ├── auth-storage.json            # Persisted auth session snapshot
//! └── dashboard-preferences.json   # Persisted preference snapshot
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for pulse.
pub struct PulsePaths {
    /// Overrides the platform config directory when set. Tests point
    /// this at a temporary directory.
    root: Option<PathBuf>,
}

impl PulsePaths {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Returns the pulse configuration directory.
    ///
    /// The directory is not created here; writers create it on demand.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join("pulse"))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path of the runtime configuration file.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }
}
