//! NagiosCommand - Dispatcher output
//!
//! External command asking the monitoring daemon to re-send the state of an
//! item. The `value` string is written verbatim to the daemon's command pipe.

use serde::{Deserialize, Serialize};

use crate::{CandidateKind, DesyncCandidate};

/// Message type expected by the daemon-side connector
pub const COMMAND_TYPE: &str = "nagios";

/// Pseudo host under which high-level services are declared
pub const HLS_HOSTNAME: &str = "High-Level-Services";

/// Author and comment fields appended to every notification request
pub const NOTIFICATION_TAG: &str = "vigilo;syncevents";

/// Command name for service notifications
pub const SVC_NOTIFICATION: &str = "SEND_CUSTOM_SVC_NOTIFICATION";

/// Command name for host notifications
pub const HOST_NOTIFICATION: &str = "SEND_CUSTOM_HOST_NOTIFICATION";

/// Notification command handed to a publisher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NagiosCommand {
    /// Always [`COMMAND_TYPE`]
    #[serde(rename = "type")]
    pub kind: String,

    /// Seconds since the Unix epoch at construction time
    pub timestamp: u64,

    /// External command name
    pub cmdname: String,

    /// Semicolon-separated command arguments
    pub value: String,

    /// Monitoring server that must execute the command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_key: Option<String>,
}

impl NagiosCommand {
    /// Build the notification request for a candidate
    pub fn for_candidate(candidate: &DesyncCandidate, timestamp: u64) -> Self {
        let (cmdname, value) = match candidate.kind() {
            CandidateKind::HighLevelService => (
                SVC_NOTIFICATION,
                format!(
                    "{HLS_HOSTNAME};{};0;{NOTIFICATION_TAG}",
                    candidate.servicename().unwrap_or_default()
                ),
            ),
            CandidateKind::LowLevelService => (
                SVC_NOTIFICATION,
                format!(
                    "{};{};0;{NOTIFICATION_TAG}",
                    candidate.hostname().unwrap_or_default(),
                    candidate.servicename().unwrap_or_default()
                ),
            ),
            CandidateKind::Host => (
                HOST_NOTIFICATION,
                format!(
                    "{};0;{NOTIFICATION_TAG}",
                    candidate.hostname().unwrap_or_default()
                ),
            ),
        };

        Self {
            kind: COMMAND_TYPE.to_string(),
            timestamp,
            cmdname: cmdname.to_string(),
            value,
            routing_key: candidate.routing_key().map(str::to_string),
        }
    }
}
