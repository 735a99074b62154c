//! Monitoring vocabulary shared with the database

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level of a host or service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StateName {
    Ok,
    Unknown,
    Warning,
    Critical,
    Up,
    Unreachable,
    Down,
}

impl StateName {
    /// Every state name, in the order they are seeded into the database
    pub const ALL: [StateName; 7] = [
        Self::Ok,
        Self::Unknown,
        Self::Warning,
        Self::Critical,
        Self::Up,
        Self::Unreachable,
        Self::Down,
    ];

    /// Name as stored in the `statename` table
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Unknown => "UNKNOWN",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
            Self::Up => "UP",
            Self::Unreachable => "UNREACHABLE",
            Self::Down => "DOWN",
        }
    }

    /// Severity rank (1 = nominal, 4 = worst)
    pub fn order(&self) -> u8 {
        match self {
            Self::Ok | Self::Up => 1,
            Self::Unknown | Self::Unreachable => 2,
            Self::Warning => 3,
            Self::Critical | Self::Down => 4,
        }
    }
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acknowledgement status of a correlated event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[default]
    None,
    Acknowledged,
    /// Closed incidents no longer trigger resynchronization
    AAClosed,
}

impl AckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Acknowledged => "Acknowledged",
            Self::AAClosed => "AAClosed",
        }
    }
}
