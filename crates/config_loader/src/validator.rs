//! Settings validation
//!
//! Rules (declared on the contract types):
//! - database.path and lockfile are non-empty
//! - database.busy_timeout_ms <= 10 minutes
//! - bus.addr is non-empty
//! - 1 <= bus.connect_timeout_secs <= 3600
//!
//! A field that breaks a rule is reset to its default; validation never fails
//! the load.

use contracts::{BusConfig, DatabaseConfig, SyncEventsConfig, SyncSettings};
use ::validator::{Validate, ValidationErrors};

use crate::ConfigWarning;

/// Reset every invalid field of `settings` to its default
pub fn sanitize(settings: &mut SyncSettings, warnings: &mut Vec<ConfigWarning>) {
    sanitize_database(&mut settings.database, warnings);
    sanitize_bus(&mut settings.bus, warnings);
    sanitize_syncevents(&mut settings.syncevents, warnings);
}

fn sanitize_database(db: &mut DatabaseConfig, warnings: &mut Vec<ConfigWarning>) {
    let Err(errors) = db.validate() else { return };
    let defaults = DatabaseConfig::default();
    if reset_if_invalid(&errors, "database", "path", warnings) {
        db.path = defaults.path;
    }
    if reset_if_invalid(&errors, "database", "busy_timeout_ms", warnings) {
        db.busy_timeout_ms = defaults.busy_timeout_ms;
    }
}

fn sanitize_bus(bus: &mut BusConfig, warnings: &mut Vec<ConfigWarning>) {
    let Err(errors) = bus.validate() else { return };
    let defaults = BusConfig::default();
    if reset_if_invalid(&errors, "bus", "addr", warnings) {
        bus.addr = defaults.addr;
    }
    if reset_if_invalid(&errors, "bus", "connect_timeout_secs", warnings) {
        bus.connect_timeout_secs = defaults.connect_timeout_secs;
    }
}

fn sanitize_syncevents(cfg: &mut SyncEventsConfig, warnings: &mut Vec<ConfigWarning>) {
    let Err(errors) = cfg.validate() else { return };
    if reset_if_invalid(&errors, "connector-syncevents", "lockfile", warnings) {
        cfg.lockfile = SyncEventsConfig::default().lockfile;
    }
}

fn reset_if_invalid(
    errors: &ValidationErrors,
    section: &str,
    field: &str,
    warnings: &mut Vec<ConfigWarning>,
) -> bool {
    let field_errors = errors.field_errors();
    let Some(failures) = field_errors.get(field) else {
        return false;
    };
    let codes: Vec<_> = failures.iter().map(|e| e.code.to_string()).collect();
    warnings.push(ConfigWarning {
        field: format!("{section}.{field}"),
        message: format!("invalid value ({}), using default", codes.join(", ")),
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_settings_untouched() {
        let mut settings = SyncSettings::default();
        settings.bus.addr = "bus:1234".to_string();
        let mut warnings = Vec::new();
        sanitize(&mut settings, &mut warnings);
        assert!(warnings.is_empty());
        assert_eq!(settings.bus.addr, "bus:1234");
    }

    #[test]
    fn test_invalid_fields_reset() {
        let mut settings = SyncSettings::default();
        settings.bus.addr = String::new();
        settings.bus.connect_timeout_secs = 0;
        settings.syncevents.lockfile = PathBuf::new();
        let mut warnings = Vec::new();
        sanitize(&mut settings, &mut warnings);

        assert_eq!(settings.bus.addr, BusConfig::default().addr);
        assert_eq!(settings.bus.connect_timeout_secs, 10);
        assert_eq!(settings.syncevents.lockfile, SyncEventsConfig::default().lockfile);
        assert_eq!(warnings.len(), 3);
    }
}
