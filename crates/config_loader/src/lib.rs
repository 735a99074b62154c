//! # Config Loader
//!
//! Settings loading for the reconciliation job.
//!
//! Responsibilities:
//! - Parse TOML/JSON settings files
//! - Fall back to defaults for missing or invalid tunables
//! - Generate `SyncSettings`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let settings = ConfigLoader::load_from_path(Path::new("settings.toml")).unwrap();
//! println!("Staleness window: {} min", settings.syncevents.minutes_old);
//! ```

mod parser;
mod validator;

pub use contracts::SyncSettings;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// A tunable that was ignored in favour of its default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Dotted field path (`section.key`)
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Settings loader
///
/// Provides static methods to load settings from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from file path
    ///
    /// Format is detected from the file extension (.toml / .json). A missing
    /// file yields the defaults.
    ///
    /// # Errors
    /// - Unsupported format
    /// - File read failure
    /// - Syntax error
    pub fn load_from_path(path: &Path) -> Result<SyncSettings, ContractError> {
        if !path.exists() {
            warn!(path = %path.display(), "Settings file not found, using defaults");
            return Ok(SyncSettings::default());
        }
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        debug!(path = %path.display(), ?format, "Loading settings");
        Self::load_from_str(&content, format)
    }

    /// Load settings from string, logging every fallback
    ///
    /// # Errors
    /// - Syntax error
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<SyncSettings, ContractError> {
        let (settings, warnings) = Self::load_with_warnings(content, format)?;
        for warning in &warnings {
            warn!(field = %warning.field, "{}", warning.message);
        }
        Ok(settings)
    }

    /// Load settings from string and return the fallbacks that were applied
    pub fn load_with_warnings(
        content: &str,
        format: ConfigFormat,
    ) -> Result<(SyncSettings, Vec<ConfigWarning>), ContractError> {
        let tree = parser::parse(content, format)?;
        let mut warnings = Vec::new();
        let mut settings = parser::resolve(&tree, &mut warnings);
        validator::sanitize(&mut settings, &mut warnings);
        Ok((settings, warnings))
    }
}

impl ConfigLoader {
    /// Infer settings format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read settings file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::DeliveryPolicy;
    use std::io::Write;

    const SETTINGS_TOML: &str = r#"
[database]
path = "/srv/vigilo.sqlite"

[connector-syncevents]
minutes_old = 20
max_events = 50
on_delivery_error = "abort"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let settings = ConfigLoader::load_from_str(SETTINGS_TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(settings.syncevents.minutes_old, 20);
        assert_eq!(settings.syncevents.hls_minutes_old, 35);
        assert_eq!(settings.syncevents.max_events(), Some(50));
        assert_eq!(settings.syncevents.on_delivery_error, DeliveryPolicy::Abort);
    }

    #[test]
    fn test_round_trip_json() {
        let settings = ConfigLoader::load_from_str(SETTINGS_TOML, ConfigFormat::Toml).unwrap();
        let json = serde_json::to_string(&settings).unwrap();
        let (reloaded, warnings) =
            ConfigLoader::load_with_warnings(&json, ConfigFormat::Json).unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(reloaded.database.path, settings.database.path);
        assert_eq!(reloaded.syncevents.max_events, 50);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let (settings, warnings) = ConfigLoader::load_with_warnings(
            "[bus]\naddr = \"\"\nconnect_timeout_secs = 0\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(settings.bus.addr, "127.0.0.1:5680");
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ConfigLoader::load_from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.syncevents.minutes_old, 35);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(SETTINGS_TOML.as_bytes()).unwrap();
        let settings = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(settings.syncevents.minutes_old, 20);
    }

    #[test]
    fn test_unreadable_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::create_dir(&path).unwrap();
        let result = ConfigLoader::load_from_path(&path);
        assert!(matches!(result, Err(ContractError::Io(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let result = ConfigLoader::load_from_path(file.path());
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }
}
