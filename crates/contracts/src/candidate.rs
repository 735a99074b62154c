//! DesyncCandidate - Selector output
//!
//! A monitored item whose recorded state must be re-published by the
//! monitoring daemon.

use serde::Serialize;
use std::fmt;

/// Kind of item a candidate designates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    /// A host (no service name)
    Host,
    /// An actively checked service attached to a host
    LowLevelService,
    /// An aggregate service with no host
    HighLevelService,
}

impl CandidateKind {
    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::LowLevelService => "lls",
            Self::HighLevelService => "hls",
        }
    }
}

/// One row of the desynchronization query
///
/// At least one of `hostname` / `servicename` is always set:
/// - no hostname: high-level service
/// - no servicename: host
/// - both: low-level service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DesyncCandidate {
    hostname: Option<String>,
    servicename: Option<String>,
    routing_key: Option<String>,
}

impl DesyncCandidate {
    /// Build a candidate from a raw result row
    ///
    /// Returns `None` when both names are missing.
    pub fn from_row(
        hostname: Option<String>,
        servicename: Option<String>,
        routing_key: Option<String>,
    ) -> Option<Self> {
        if hostname.is_none() && servicename.is_none() {
            return None;
        }
        Some(Self {
            hostname,
            servicename,
            routing_key,
        })
    }

    /// Host candidate
    pub fn host(hostname: impl Into<String>, routing_key: Option<String>) -> Self {
        Self {
            hostname: Some(hostname.into()),
            servicename: None,
            routing_key,
        }
    }

    /// Low-level service candidate
    pub fn low_level_service(
        hostname: impl Into<String>,
        servicename: impl Into<String>,
        routing_key: Option<String>,
    ) -> Self {
        Self {
            hostname: Some(hostname.into()),
            servicename: Some(servicename.into()),
            routing_key,
        }
    }

    /// High-level service candidate (never routed)
    pub fn high_level_service(servicename: impl Into<String>) -> Self {
        Self {
            hostname: None,
            servicename: Some(servicename.into()),
            routing_key: None,
        }
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn servicename(&self) -> Option<&str> {
        self.servicename.as_deref()
    }

    /// Name of the monitoring server responsible for the item, if any
    pub fn routing_key(&self) -> Option<&str> {
        self.routing_key.as_deref()
    }

    pub fn kind(&self) -> CandidateKind {
        match (&self.hostname, &self.servicename) {
            (None, _) => CandidateKind::HighLevelService,
            (Some(_), Some(_)) => CandidateKind::LowLevelService,
            (Some(_), None) => CandidateKind::Host,
        }
    }
}

impl fmt::Display for DesyncCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.hostname(), self.servicename()) {
            (Some(host), Some(service)) => write!(f, "service '{service}' on host '{host}'")?,
            (Some(host), None) => write!(f, "host '{host}'")?,
            (None, service) => write!(f, "high-level service '{}'", service.unwrap_or_default())?,
        }
        if let Some(key) = self.routing_key() {
            write!(f, " via '{key}'")?;
        }
        Ok(())
    }
}
