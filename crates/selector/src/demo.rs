//! Fixture builders for the monitoring schema
//!
//! Used by tests and by local demos to populate a database the way the
//! monitoring models would.

use chrono::{NaiveDateTime, Utc};
use contracts::{AckStatus, StateName};
use rusqlite::{params, Connection, OptionalExtension};

/// Register an application, returning its id (existing id if already present)
pub fn add_application(db: &Connection, name: &str) -> rusqlite::Result<i64> {
    db.execute(
        "INSERT OR IGNORE INTO vigilo_application (name) VALUES (?1)",
        params![name],
    )?;
    db.query_row(
        "SELECT idapp FROM vigilo_application WHERE name = ?1",
        params![name],
        |r| r.get(0),
    )
}

/// Register an enabled monitoring server
pub fn add_vigiloserver(db: &Connection, name: &str) -> rusqlite::Result<i64> {
    db.execute(
        "INSERT OR IGNORE INTO vigilo_vigiloserver (name, disabled) VALUES (?1, 0)",
        params![name],
    )?;
    db.query_row(
        "SELECT idvigiloserver FROM vigilo_vigiloserver WHERE name = ?1",
        params![name],
        |r| r.get(0),
    )
}

pub fn set_vigiloserver_disabled(db: &Connection, name: &str, disabled: bool) -> rusqlite::Result<()> {
    db.execute(
        "UPDATE vigilo_vigiloserver SET disabled = ?2 WHERE name = ?1",
        params![name, disabled],
    )?;
    Ok(())
}

fn add_supitem(db: &Connection, itemtype: &str) -> rusqlite::Result<i64> {
    db.execute(
        "INSERT INTO vigilo_supitem (itemtype) VALUES (?1)",
        params![itemtype],
    )?;
    Ok(db.last_insert_rowid())
}

pub fn add_host(db: &Connection, name: &str) -> rusqlite::Result<i64> {
    let id = add_supitem(db, "host")?;
    db.execute(
        "INSERT INTO vigilo_host (idhost, name) VALUES (?1, ?2)",
        params![id, name],
    )?;
    Ok(id)
}

pub fn add_lowlevelservice(db: &Connection, idhost: i64, servicename: &str) -> rusqlite::Result<i64> {
    let id = add_supitem(db, "lowlevelservice")?;
    db.execute(
        "INSERT INTO vigilo_service (idservice, servicename) VALUES (?1, ?2)",
        params![id, servicename],
    )?;
    db.execute(
        "INSERT INTO vigilo_lowlevelservice (idservice, idhost) VALUES (?1, ?2)",
        params![id, idhost],
    )?;
    Ok(id)
}

pub fn add_highlevelservice(db: &Connection, servicename: &str) -> rusqlite::Result<i64> {
    let id = add_supitem(db, "highlevelservice")?;
    db.execute(
        "INSERT INTO vigilo_service (idservice, servicename) VALUES (?1, ?2)",
        params![id, servicename],
    )?;
    db.execute(
        "INSERT INTO vigilo_highlevelservice (idservice) VALUES (?1)",
        params![id],
    )?;
    Ok(id)
}

fn state_id(db: &Connection, state: StateName) -> rusqlite::Result<i64> {
    db.query_row(
        "SELECT idstatename FROM vigilo_statename WHERE statename = ?1",
        params![state.as_str()],
        |r| r.get(0),
    )
}

fn upsert_state(
    db: &Connection,
    idsupitem: i64,
    state: StateName,
    timestamp: NaiveDateTime,
) -> rusqlite::Result<()> {
    let idstate = state_id(db, state)?;
    db.execute(
        "INSERT INTO vigilo_state (idsupitem, state, timestamp) VALUES (?1, ?2, ?3) \
         ON CONFLICT (idsupitem) DO UPDATE SET state = excluded.state, timestamp = excluded.timestamp",
        params![idsupitem, idstate, timestamp],
    )?;
    Ok(())
}

/// Set (or replace) the current state of a host
pub fn add_host_state(
    db: &Connection,
    idhost: i64,
    state: StateName,
    timestamp: NaiveDateTime,
) -> rusqlite::Result<()> {
    upsert_state(db, idhost, state, timestamp)
}

/// Set (or replace) the current state of a low- or high-level service
pub fn add_svc_state(
    db: &Connection,
    idservice: i64,
    state: StateName,
    timestamp: NaiveDateTime,
) -> rusqlite::Result<()> {
    upsert_state(db, idservice, state, timestamp)
}

/// Record a raw event whose current, peak and initial states are `state`
pub fn add_event(
    db: &Connection,
    idsupitem: i64,
    state: StateName,
    message: &str,
) -> rusqlite::Result<i64> {
    let idstate = state_id(db, state)?;
    db.execute(
        "INSERT INTO vigilo_event \
           (idsupitem, current_state, peak_state, initial_state, message, timestamp) \
         VALUES (?1, ?2, ?2, ?2, ?3, ?4)",
        params![idsupitem, idstate, message, Utc::now().naive_utc()],
    )?;
    Ok(db.last_insert_rowid())
}

/// Correlate `events` into one incident; the first event is the cause
pub fn add_correvent(db: &Connection, events: &[i64], status: AckStatus) -> rusqlite::Result<i64> {
    let Some(&cause) = events.first() else {
        return Err(rusqlite::Error::InvalidParameterCount(0, 1));
    };
    db.execute(
        "INSERT INTO vigilo_correvent (idcause, status, timestamp_active) VALUES (?1, ?2, ?3)",
        params![cause, status.as_str(), Utc::now().naive_utc()],
    )?;
    let idcorrevent = db.last_insert_rowid();
    let mut stmt = db.prepare(
        "INSERT OR IGNORE INTO vigilo_eventsaggregate (idevent, idcorrevent) VALUES (?1, ?2)",
    )?;
    for idevent in events {
        stmt.execute(params![idevent, idcorrevent])?;
    }
    Ok(idcorrevent)
}

/// Assign `host` to `server` for `application`
///
/// Server and application are created if they do not exist yet.
pub fn add_ventilation(
    db: &Connection,
    idhost: i64,
    server: &str,
    application: &str,
) -> rusqlite::Result<()> {
    let idvigiloserver = match db
        .query_row(
            "SELECT idvigiloserver FROM vigilo_vigiloserver WHERE name = ?1",
            params![server],
            |r| r.get::<_, i64>(0),
        )
        .optional()?
    {
        Some(id) => id,
        None => add_vigiloserver(db, server)?,
    };
    let idapp = add_application(db, application)?;
    db.execute(
        "INSERT OR IGNORE INTO vigilo_ventilation (idhost, idvigiloserver, idapp) VALUES (?1, ?2, ?3)",
        params![idhost, idvigiloserver, idapp],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    #[test]
    fn test_state_upsert_replaces() -> rusqlite::Result<()> {
        let db = Connection::open_in_memory()?;
        schema::init(&db)?;
        let host = add_host(&db, "h")?;
        let now = Utc::now().naive_utc();
        add_host_state(&db, host, StateName::Up, now)?;
        add_host_state(&db, host, StateName::Down, now)?;

        let name: String = db.query_row(
            "SELECT sn.statename FROM vigilo_state st \
             JOIN vigilo_statename sn ON sn.idstatename = st.state WHERE st.idsupitem = ?1",
            params![host],
            |r| r.get(0),
        )?;
        assert_eq!(name, "DOWN");
        Ok(())
    }

    #[test]
    fn test_correvent_needs_events() -> rusqlite::Result<()> {
        let db = Connection::open_in_memory()?;
        schema::init(&db)?;
        assert!(add_correvent(&db, &[], AckStatus::None).is_err());
        Ok(())
    }
}
