//! Set-union combinator over rules
//!
//! Rules are joined with SQL `UNION` (not `UNION ALL`), so identical rows
//! from different rules collapse. The optional cap is applied by the store
//! to the combined result, without any ordering.

use chrono::NaiveDateTime;
use contracts::DesyncCandidate;
use rusqlite::{Connection, ToSql};
use tracing::{error, trace, warn};

use crate::rules::{Rule, RuleParam};
use crate::SelectorError;

/// Values bound to the rules' named parameters
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    pub time_limit: Option<NaiveDateTime>,
    pub hls_time_limit: Option<NaiveDateTime>,
    pub max_events: Option<usize>,
}

impl Bindings {
    /// Bindings for the host / low-level service staleness rules
    pub fn stale(time_limit: NaiveDateTime) -> Self {
        Self {
            time_limit: Some(time_limit),
            ..Default::default()
        }
    }

    fn row_cap(&self) -> Option<i64> {
        self.max_events
            .map(|n| i64::try_from(n).unwrap_or(i64::MAX))
    }
}

/// Rules whose parameter is bound, in evaluation order
pub fn enabled_rules(bindings: &Bindings) -> Vec<Rule> {
    Rule::ALL
        .into_iter()
        .filter(|rule| match rule.param() {
            RuleParam::None => true,
            RuleParam::TimeLimit => bindings.time_limit.is_some(),
            RuleParam::HlsTimeLimit => bindings.hls_time_limit.is_some(),
        })
        .collect()
}

/// Compose the SQL text for a set of rules
pub fn compose(rules: &[Rule], capped: bool) -> String {
    let mut sql = rules
        .iter()
        .map(Rule::sql)
        .collect::<Vec<_>>()
        .join("\nUNION\n");
    if capped {
        sql.push_str("\nLIMIT :max_events");
    }
    sql
}

/// Run the union of `rules`
///
/// Store failures are logged with full detail and returned as
/// [`SelectorError::DataStore`].
pub fn run(
    db: &Connection,
    rules: &[Rule],
    bindings: &Bindings,
) -> Result<Vec<DesyncCandidate>, SelectorError> {
    if rules.is_empty() {
        return Ok(Vec::new());
    }

    let cap = bindings.row_cap();
    let sql = compose(rules, cap.is_some());
    trace!(%sql, "Composed desync query");

    execute(db, &sql, rules, bindings, cap).map_err(|e| {
        let names: Vec<_> = rules.iter().map(Rule::name).collect();
        error!(error = %e, rules = ?names, "Database exception raised");
        SelectorError::DataStore(e)
    })
}

fn execute(
    db: &Connection,
    sql: &str,
    rules: &[Rule],
    bindings: &Bindings,
    cap: Option<i64>,
) -> rusqlite::Result<Vec<DesyncCandidate>> {
    let mut named: Vec<(&str, &dyn ToSql)> = Vec::with_capacity(3);
    let params: Vec<_> = rules.iter().map(Rule::param).collect();
    if params.contains(&RuleParam::TimeLimit) {
        if let Some(ref limit) = bindings.time_limit {
            named.push((":time_limit", limit));
        }
    }
    if params.contains(&RuleParam::HlsTimeLimit) {
        if let Some(ref limit) = bindings.hls_time_limit {
            named.push((":hls_time_limit", limit));
        }
    }
    if let Some(ref cap) = cap {
        named.push((":max_events", cap));
    }

    let mut stmt = db.prepare(sql)?;
    let rows = stmt.query_map(named.as_slice(), |row| {
        Ok((
            row.get::<_, Option<String>>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    })?;

    let mut candidates = Vec::new();
    for row in rows {
        let (hostname, servicename, routing_key) = row?;
        match DesyncCandidate::from_row(hostname, servicename, routing_key) {
            Some(candidate) => candidates.push(candidate),
            None => warn!("Skipping desync row without host or service name"),
        }
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_rules_follow_bindings() {
        assert_eq!(
            enabled_rules(&Bindings::default()),
            vec![Rule::DesyncEventServices, Rule::DesyncEventHosts]
        );
        assert_eq!(enabled_rules(&Bindings::stale(chrono::Utc::now().naive_utc())).len(), 4);
    }

    #[test]
    fn test_compose_uses_set_union() {
        let sql = compose(&[Rule::OldHosts, Rule::DesyncEventHosts], true);
        assert_eq!(sql.matches("\nUNION\n").count(), 1);
        assert!(!sql.contains("UNION ALL"));
        assert!(sql.ends_with("LIMIT :max_events"));
    }

    #[test]
    fn test_run_without_rules() {
        let db = Connection::open_in_memory().unwrap();
        assert!(run(&db, &[], &Bindings::default()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_schema_is_data_store_error() {
        let db = Connection::open_in_memory().unwrap();
        let result = run(&db, &[Rule::DesyncEventHosts], &Bindings::default());
        assert!(matches!(result, Err(SelectorError::DataStore(_))));
    }
}
