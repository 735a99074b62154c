//! Desynchronization rules
//!
//! Each rule is one statically composed `SELECT` producing
//! `(hostname, servicename, vigiloserver)` rows. Rules are combined with
//! [`crate::union`].
//!
//! | rule                       | items                | trigger                              |
//! |----------------------------|----------------------|--------------------------------------|
//! | `OldLowLevelServices` (A)  | low-level services   | not OK, stale, host not down         |
//! | `OldHosts` (B)             | hosts                | not UP, stale                        |
//! | `OldHighLevelServices` (C) | high-level services  | OK or UNKNOWN, stale                 |
//! | `DesyncEventServices` (D)  | low-level services   | state != last event, open incident, host not up |
//! | `DesyncEventHosts` (E)     | hosts                | state != last event, open incident   |

use chrono::NaiveDateTime;
use contracts::DesyncCandidate;
use rusqlite::Connection;

use crate::{union, SelectorError};

/// Routing key: the enabled server ventilated for nagios checks of `host`.
macro_rules! ventilation_join {
    () => {
        " JOIN vigilo_ventilation AS vent ON vent.idhost = host.idhost \
          JOIN vigilo_application AS app ON app.idapp = vent.idapp AND app.name = 'nagios' \
          JOIN vigilo_vigiloserver AS vs \
            ON vs.idvigiloserver = vent.idvigiloserver AND vs.disabled = 0 "
    };
}

/// `host` has a current state and it is not nominal.
macro_rules! host_is_down {
    () => {
        " EXISTS (SELECT 1 FROM vigilo_state AS hst \
            JOIN vigilo_statename AS hsn ON hsn.idstatename = hst.state \
            WHERE hst.idsupitem = host.idhost AND hsn.statename NOT IN ('OK', 'UP')) "
    };
}

/// `host` has no nominal state, including when it has no state at all.
macro_rules! host_not_up {
    () => {
        " NOT EXISTS (SELECT 1 FROM vigilo_state AS hst \
            JOIN vigilo_statename AS hsn ON hsn.idstatename = hst.state \
            WHERE hst.idsupitem = host.idhost AND hsn.statename IN ('OK', 'UP')) "
    };
}

/// Disagreement is id inequality: every state name has its own row.
macro_rules! state_disagrees {
    () => {
        "WHERE ev.current_state != st.state AND"
    };
}

/// `ev` is the latest event of its item and still part of an open incident.
macro_rules! latest_event_on_open_correvent {
    () => {
        " NOT EXISTS (SELECT 1 FROM vigilo_event AS newer \
            WHERE newer.idsupitem = ev.idsupitem AND newer.idevent > ev.idevent) \
          AND EXISTS (SELECT 1 FROM vigilo_correvent AS ce \
            WHERE ce.status != 'AAClosed' \
              AND (ce.idcause = ev.idevent \
                   OR ce.idcorrevent IN (SELECT agg.idcorrevent FROM vigilo_eventsaggregate AS agg \
                                         WHERE agg.idevent = ev.idevent))) "
    };
}

const OLD_LLS: &str = concat!(
    "SELECT host.name AS hostname, svc.servicename AS servicename, vs.name AS vigiloserver \
     FROM vigilo_lowlevelservice AS lls \
     JOIN vigilo_service AS svc ON svc.idservice = lls.idservice \
     JOIN vigilo_host AS host ON host.idhost = lls.idhost \
     JOIN vigilo_state AS st ON st.idsupitem = lls.idservice \
     JOIN vigilo_statename AS sn ON sn.idstatename = st.state",
    ventilation_join!(),
    "WHERE sn.statename NOT IN ('OK', 'UP') \
       AND st.timestamp <= :time_limit \
       AND NOT",
    host_is_down!(),
);

const OLD_HOSTS: &str = concat!(
    "SELECT host.name AS hostname, NULL AS servicename, vs.name AS vigiloserver \
     FROM vigilo_host AS host \
     JOIN vigilo_state AS st ON st.idsupitem = host.idhost \
     JOIN vigilo_statename AS sn ON sn.idstatename = st.state",
    ventilation_join!(),
    "WHERE sn.statename NOT IN ('OK', 'UP') \
       AND st.timestamp <= :time_limit ",
);

const OLD_HLS: &str = "SELECT NULL AS hostname, svc.servicename AS servicename, NULL AS vigiloserver \
     FROM vigilo_highlevelservice AS hls \
     JOIN vigilo_service AS svc ON svc.idservice = hls.idservice \
     JOIN vigilo_state AS st ON st.idsupitem = hls.idservice \
     JOIN vigilo_statename AS sn ON sn.idstatename = st.state \
     WHERE sn.statename IN ('OK', 'UNKNOWN') \
       AND st.timestamp <= :hls_time_limit ";

const DESYNC_EVENT_SERVICES: &str = concat!(
    "SELECT host.name AS hostname, svc.servicename AS servicename, vs.name AS vigiloserver \
     FROM vigilo_lowlevelservice AS lls \
     JOIN vigilo_service AS svc ON svc.idservice = lls.idservice \
     JOIN vigilo_host AS host ON host.idhost = lls.idhost \
     JOIN vigilo_state AS st ON st.idsupitem = lls.idservice \
     JOIN vigilo_event AS ev ON ev.idsupitem = lls.idservice",
    ventilation_join!(),
    state_disagrees!(),
    latest_event_on_open_correvent!(),
    "AND",
    host_not_up!(),
);

const DESYNC_EVENT_HOSTS: &str = concat!(
    "SELECT host.name AS hostname, NULL AS servicename, vs.name AS vigiloserver \
     FROM vigilo_host AS host \
     JOIN vigilo_state AS st ON st.idsupitem = host.idhost \
     JOIN vigilo_event AS ev ON ev.idsupitem = host.idhost",
    ventilation_join!(),
    state_disagrees!(),
    latest_event_on_open_correvent!(),
);

/// One selection rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Stale, non-OK low-level services whose host is not down
    OldLowLevelServices,
    /// Stale, non-UP hosts
    OldHosts,
    /// Stale OK/UNKNOWN high-level services
    OldHighLevelServices,
    /// Services whose state disagrees with their last open event (host not up)
    DesyncEventServices,
    /// Hosts whose state disagrees with their last open event
    DesyncEventHosts,
}

/// Named parameter a rule binds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleParam {
    None,
    TimeLimit,
    HlsTimeLimit,
}

impl Rule {
    pub const ALL: [Rule; 5] = [
        Self::OldLowLevelServices,
        Self::OldHosts,
        Self::OldHighLevelServices,
        Self::DesyncEventServices,
        Self::DesyncEventHosts,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::OldLowLevelServices => "old_lls",
            Self::OldHosts => "old_hosts",
            Self::OldHighLevelServices => "old_hls",
            Self::DesyncEventServices => "desync_event_services",
            Self::DesyncEventHosts => "desync_event_hosts",
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Self::OldLowLevelServices => OLD_LLS,
            Self::OldHosts => OLD_HOSTS,
            Self::OldHighLevelServices => OLD_HLS,
            Self::DesyncEventServices => DESYNC_EVENT_SERVICES,
            Self::DesyncEventHosts => DESYNC_EVENT_HOSTS,
        }
    }

    pub fn param(&self) -> RuleParam {
        match self {
            Self::OldLowLevelServices | Self::OldHosts => RuleParam::TimeLimit,
            Self::OldHighLevelServices => RuleParam::HlsTimeLimit,
            Self::DesyncEventServices | Self::DesyncEventHosts => RuleParam::None,
        }
    }
}

/// Rule A
pub fn old_lls(
    db: &Connection,
    time_limit: NaiveDateTime,
) -> Result<Vec<DesyncCandidate>, SelectorError> {
    union::run(db, &[Rule::OldLowLevelServices], &union::Bindings::stale(time_limit))
}

/// Rule B
pub fn old_hosts(
    db: &Connection,
    time_limit: NaiveDateTime,
) -> Result<Vec<DesyncCandidate>, SelectorError> {
    union::run(db, &[Rule::OldHosts], &union::Bindings::stale(time_limit))
}

/// Rule C
pub fn old_hls(
    db: &Connection,
    hls_time_limit: NaiveDateTime,
) -> Result<Vec<DesyncCandidate>, SelectorError> {
    let bindings = union::Bindings {
        hls_time_limit: Some(hls_time_limit),
        ..Default::default()
    };
    union::run(db, &[Rule::OldHighLevelServices], &bindings)
}

/// Rule D
pub fn desync_event_services(db: &Connection) -> Result<Vec<DesyncCandidate>, SelectorError> {
    union::run(db, &[Rule::DesyncEventServices], &union::Bindings::default())
}

/// Rule E
pub fn desync_event_hosts(db: &Connection) -> Result<Vec<DesyncCandidate>, SelectorError> {
    union::run(db, &[Rule::DesyncEventHosts], &union::Bindings::default())
}
