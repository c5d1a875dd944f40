//! Configuration file support
//!
//! Loads settings from ~/.damedit.toml (or %USERPROFILE%\.damedit.toml on Windows)
//!
//! Example:
//! ```text
//! # damedit configuration
//! configs_dir = "configs"
//! debounce_ms = 200
//! theme = "themes/dracula.json"
//! highlighting = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::Result;

const DEBOUNCE_MIN_MS: u64 = 10;
const DEBOUNCE_MAX_MS: u64 = 5000;

/// Configuration settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory scanned for language profiles
    pub configs_dir: PathBuf,
    /// Quiescence window before a highlight pass, in milliseconds
    pub debounce_ms: u64,
    /// Theme file merged over the default theme at startup
    pub theme: Option<PathBuf>,
    /// Whether syntax highlighting starts enabled
    pub highlighting: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            configs_dir: PathBuf::from("configs"),
            debounce_ms: 200,
            theme: None,
            highlighting: true,
        }
    }
}

impl Settings {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".damedit.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".damedit.toml"))
        }
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from `path`; a missing or invalid file gives defaults
    pub fn load_from(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no settings file");
                return Self::default();
            }
        };
        match Self::parse(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid settings file, using defaults");
                Self::default()
            }
        }
    }

    /// Parse settings from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        let mut settings: Settings = toml::from_str(contents)?;
        settings.debounce_ms = settings.debounce_ms.clamp(DEBOUNCE_MIN_MS, DEBOUNCE_MAX_MS);
        Ok(settings)
    }

    /// Debounce window for the highlight scheduler
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_settings() {
        let contents = r#"
# Comment
configs_dir = "langs"
debounce_ms = 120
theme = "dark.json"
highlighting = false
        "#;

        let settings = Settings::parse(contents).unwrap();
        assert_eq!(settings.configs_dir, PathBuf::from("langs"));
        assert_eq!(settings.debounce(), Duration::from_millis(120));
        assert_eq!(settings.theme, Some(PathBuf::from("dark.json")));
        assert!(!settings.highlighting);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let settings = Settings::parse("debounce_ms = 300").unwrap();
        assert_eq!(settings.configs_dir, PathBuf::from("configs"));
        assert_eq!(settings.debounce_ms, 300);
        assert!(settings.highlighting);
        assert_eq!(Settings::parse("").unwrap(), Settings::default());
    }

    #[test]
    fn test_debounce_is_clamped() {
        assert_eq!(Settings::parse("debounce_ms = 0").unwrap().debounce_ms, 10);
        assert_eq!(Settings::parse("debounce_ms = 99999").unwrap().debounce_ms, 5000);
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".damedit.toml");
        fs::write(&path, "debounce_ms = \"fast\"").unwrap();
        assert!(Settings::parse("debounce_ms = \"fast\"").unwrap_err().is_config());
        assert_eq!(Settings::load_from(&path), Settings::default());
        assert_eq!(Settings::load_from(&dir.path().join("absent.toml")), Settings::default());
    }
}
