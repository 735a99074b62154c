//! Monitoring database schema

use contracts::StateName;
use rusqlite::{params, Connection};

/// Application whose ventilation decides the routing key
pub const NAGIOS_APP: &str = "nagios";

/// Create the schema in the connected database and seed state names.
pub fn init(db: &Connection) -> rusqlite::Result<()> {
    db.execute_batch(include_str!("schema.sql"))?;
    seed_state_names(db)
}

fn seed_state_names(db: &Connection) -> rusqlite::Result<()> {
    let mut stmt =
        db.prepare(r#"INSERT OR IGNORE INTO vigilo_statename (statename, "order") VALUES (?1, ?2)"#)?;
    for state in StateName::ALL {
        stmt.execute(params![state.as_str(), state.order()])?;
    }
    Ok(())
}
