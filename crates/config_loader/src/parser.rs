//! Settings parsing
//!
//! TOML (preferred) and JSON documents are parsed into a generic tree first,
//! then each tunable is read individually. A tunable that is missing or has
//! the wrong shape keeps its default and yields a [`ConfigWarning`].

use std::path::PathBuf;

use contracts::{ContractError, DeliveryPolicy, SyncSettings};
use serde_json::{Map, Value};

use crate::ConfigWarning;

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a TOML document into a tree
pub fn parse_toml(content: &str) -> Result<Value, ContractError> {
    let table: toml::Table = toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })?;
    serde_json::to_value(table).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML conversion error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a JSON document into a tree
pub fn parse_json(content: &str) -> Result<Value, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse according to format
pub fn parse(content: &str, format: ConfigFormat) -> Result<Value, ContractError> {
    let tree = match format {
        ConfigFormat::Toml => parse_toml(content)?,
        ConfigFormat::Json => parse_json(content)?,
    };
    if !tree.is_object() {
        return Err(ContractError::config_parse(
            "configuration root must be a table",
        ));
    }
    Ok(tree)
}

/// Read every known tunable from the tree, falling back to defaults
pub fn resolve(tree: &Value, warnings: &mut Vec<ConfigWarning>) -> SyncSettings {
    let mut settings = SyncSettings::default();
    let mut reader = Reader { warnings };

    if let Some(db) = reader.section(tree, "database") {
        reader.path(db, "database.path", "path", &mut settings.database.path);
        reader.unsigned(
            db,
            "database.busy_timeout_ms",
            "busy_timeout_ms",
            &mut settings.database.busy_timeout_ms,
        );
    }

    if let Some(bus) = reader.section(tree, "bus") {
        reader.string(bus, "bus.addr", "addr", &mut settings.bus.addr);
        reader.unsigned(
            bus,
            "bus.connect_timeout_secs",
            "connect_timeout_secs",
            &mut settings.bus.connect_timeout_secs,
        );
    }

    if let Some(sync) = reader.section(tree, "connector-syncevents") {
        let cfg = &mut settings.syncevents;
        reader.signed(sync, "connector-syncevents.minutes_old", "minutes_old", &mut cfg.minutes_old);
        reader.signed(
            sync,
            "connector-syncevents.hls_minutes_old",
            "hls_minutes_old",
            &mut cfg.hls_minutes_old,
        );
        reader.unsigned(sync, "connector-syncevents.max_events", "max_events", &mut cfg.max_events);
        reader.path(sync, "connector-syncevents.lockfile", "lockfile", &mut cfg.lockfile);
        reader.policy(
            sync,
            "connector-syncevents.on_delivery_error",
            "on_delivery_error",
            &mut cfg.on_delivery_error,
        );
    }

    settings
}

struct Reader<'w> {
    warnings: &'w mut Vec<ConfigWarning>,
}

impl Reader<'_> {
    fn warn(&mut self, field: &str, message: String) {
        self.warnings.push(ConfigWarning {
            field: field.to_string(),
            message,
        });
    }

    fn section<'t>(&mut self, tree: &'t Value, name: &str) -> Option<&'t Map<String, Value>> {
        match tree.get(name)? {
            Value::Object(map) => Some(map),
            other => {
                self.warn(name, format!("expected a table, got {other}"));
                None
            }
        }
    }

    fn signed(&mut self, section: &Map<String, Value>, field: &str, key: &str, slot: &mut i64) {
        let Some(raw) = section.get(key) else { return };
        let parsed = match raw {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        match parsed {
            Some(v) => *slot = v,
            None => self.warn(field, format!("expected an integer, got {raw}")),
        }
    }

    fn unsigned(&mut self, section: &Map<String, Value>, field: &str, key: &str, slot: &mut u64) {
        let Some(raw) = section.get(key) else { return };
        let parsed = match raw {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        match parsed {
            Some(v) => *slot = v,
            None => self.warn(field, format!("expected a non-negative integer, got {raw}")),
        }
    }

    fn string(&mut self, section: &Map<String, Value>, field: &str, key: &str, slot: &mut String) {
        match section.get(key) {
            None => {}
            Some(Value::String(s)) => *slot = s.clone(),
            Some(raw) => self.warn(field, format!("expected a string, got {raw}")),
        }
    }

    fn path(&mut self, section: &Map<String, Value>, field: &str, key: &str, slot: &mut PathBuf) {
        match section.get(key) {
            None => {}
            Some(Value::String(s)) => *slot = PathBuf::from(s),
            Some(raw) => self.warn(field, format!("expected a path, got {raw}")),
        }
    }

    fn policy(
        &mut self,
        section: &Map<String, Value>,
        field: &str,
        key: &str,
        slot: &mut DeliveryPolicy,
    ) {
        let Some(raw) = section.get(key) else { return };
        match serde_json::from_value::<DeliveryPolicy>(raw.clone()) {
            Ok(policy) => *slot = policy,
            Err(_) => self.warn(
                field,
                format!("expected \"continue\" or \"abort\", got {raw}"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_full() {
        let content = r#"
[database]
path = "/tmp/vigilo.sqlite"

[bus]
addr = "bus.example:5680"

[connector-syncevents]
minutes_old = 20
hls_minutes_old = -1
max_events = 100
lockfile = "/tmp/syncevents.lock"
on_delivery_error = "abort"
"#;
        let tree = parse_toml(content).unwrap();
        let mut warnings = Vec::new();
        let settings = resolve(&tree, &mut warnings);

        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(settings.database.path, PathBuf::from("/tmp/vigilo.sqlite"));
        assert_eq!(settings.bus.addr, "bus.example:5680");
        assert_eq!(settings.syncevents.minutes_old, 20);
        assert_eq!(settings.syncevents.hls_minutes_old, -1);
        assert_eq!(settings.syncevents.max_events, 100);
        assert_eq!(settings.syncevents.on_delivery_error, DeliveryPolicy::Abort);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let tree = parse_toml("[connector-syncevents]\nminutes_old = \"42\"\n").unwrap();
        let mut warnings = Vec::new();
        let settings = resolve(&tree, &mut warnings);
        assert!(warnings.is_empty());
        assert_eq!(settings.syncevents.minutes_old, 42);
    }

    #[test]
    fn test_bad_tunable_falls_back() {
        let tree = parse_json(
            r#"{"connector-syncevents": {"minutes_old": "soon", "max_events": -3}}"#,
        )
        .unwrap();
        let mut warnings = Vec::new();
        let settings = resolve(&tree, &mut warnings);

        assert_eq!(settings.syncevents.minutes_old, 35);
        assert_eq!(settings.syncevents.max_events, 0);
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].field, "connector-syncevents.minutes_old");
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let result = parse_toml("invalid toml [[[");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_json_root_must_be_object() {
        assert!(parse("[1, 2]", ConfigFormat::Json).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("ini"), None);
    }
}
