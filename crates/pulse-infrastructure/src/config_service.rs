//! Runtime configuration loader.
//!
//! Reads `config.toml` from the pulse config directory. Purely a disk
//! concern: a missing file, an empty file, or a parse failure all fall
//! back to the in-code defaults, so the engine never refuses to start
//! over configuration.

use std::path::Path;

use pulse_core::config::EngineConfig;

use crate::paths::PulsePaths;

/// Loads the engine configuration from the default config file path.
pub fn load_config() -> EngineConfig {
    match PulsePaths::new(None).config_file() {
        Ok(path) => load_config_from(&path),
        Err(err) => {
            tracing::warn!(%err, "cannot resolve config path, using defaults");
            EngineConfig::default()
        }
    }
}

/// Loads the engine configuration from an explicit path.
pub fn load_config_from(path: &Path) -> EngineConfig {
    if !path.exists() {
        return EngineConfig::default();
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::warn!(?path, %err, "failed to read config file, using defaults");
            return EngineConfig::default();
        }
    };

    if contents.trim().is_empty() {
        return EngineConfig::default();
    }

    match toml::from_str(&contents) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(?path, %err, "failed to parse config file, using defaults");
            EngineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_defaults() {
        let config = load_config_from(Path::new("/nonexistent/pulse/config.toml"));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_valid_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "live_tick_secs = 1\nfetch_failure_rate = 0.0").unwrap();

        let config = load_config_from(file.path());
        assert_eq!(config.live_tick_secs, 1);
        assert_eq!(config.fetch_failure_rate, 0.0);
        // Unspecified fields keep their defaults.
        assert_eq!(config.fetch_latency_ms, 800);
    }

    #[test]
    fn test_unparsable_file_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "live_tick_secs = \"not a number").unwrap();

        let config = load_config_from(file.path());
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_empty_file_defaults() {
        let file = NamedTempFile::new().unwrap();
        let config = load_config_from(file.path());
        assert_eq!(config, EngineConfig::default());
    }
}
