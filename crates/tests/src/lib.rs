//! # Integration Tests
//!
//! Cross-crate tests.
//!
//! Covers:
//! - Settings file to desync query
//! - Selector to dispatcher with a recording publisher
//! - Bus publisher against a local TCP listener

#[cfg(test)]
mod contract_tests {
    use contracts::{DesyncCandidate, NagiosCommand};

    #[test]
    fn test_wire_shapes() {
        let host = NagiosCommand::for_candidate(&DesyncCandidate::host("h", Some("rk".into())), 7);
        let json = serde_json::to_value(&host).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "nagios",
                "timestamp": 7,
                "cmdname": "SEND_CUSTOM_HOST_NOTIFICATION",
                "value": "h;0;vigilo;syncevents",
                "routing_key": "rk",
            })
        );

        let svc = NagiosCommand::for_candidate(
            &DesyncCandidate::low_level_service("h", "s", Some("rk".into())),
            7,
        );
        assert_eq!(svc.cmdname, "SEND_CUSTOM_SVC_NOTIFICATION");
        assert_eq!(svc.value, "h;s;0;vigilo;syncevents");

        let hls = NagiosCommand::for_candidate(&DesyncCandidate::high_level_service("s"), 7);
        let json = serde_json::to_value(&hls).unwrap();
        assert_eq!(json["value"], "High-Level-Services;s;0;vigilo;syncevents");
        assert!(json.get("routing_key").is_none());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::{Arc, Mutex};

    use chrono::{NaiveDateTime, TimeDelta, Utc};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        AckStatus, ContractError, DeliveryPolicy, NagiosCommand, Publisher, StateName,
    };
    use dispatcher::{
        BusPublisher, BusPublisherConfig, DispatchReport, SenderState, SyncSender,
    };
    use rusqlite::Connection;
    use selector::{demo, schema, DesyncQuery, DesyncSelector};
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpListener;

    /// Publisher recording every command it receives
    #[derive(Clone, Default)]
    struct RecordingPublisher {
        commands: Arc<Mutex<Vec<NagiosCommand>>>,
        closed: Arc<Mutex<bool>>,
    }

    impl Publisher for RecordingPublisher {
        fn name(&self) -> &str {
            "recording"
        }

        async fn write(&mut self, command: &NagiosCommand) -> Result<(), ContractError> {
            self.commands.lock().unwrap().push(command.clone());
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            *self.closed.lock().unwrap() = true;
            Ok(())
        }
    }

    /// A small monitored estate with one item per selection rule
    fn estate(now: NaiveDateTime) -> DesyncSelector {
        let db = Connection::open_in_memory().unwrap();
        schema::init(&db).unwrap();
        let old = now - TimeDelta::hours(1);

        // Rule A: stale CRITICAL service on an UP host
        let web = demo::add_host(&db, "web").unwrap();
        demo::add_ventilation(&db, web, "collector1", schema::NAGIOS_APP).unwrap();
        demo::add_host_state(&db, web, StateName::Up, now).unwrap();
        let http = demo::add_lowlevelservice(&db, web, "HTTP").unwrap();
        demo::add_svc_state(&db, http, StateName::Critical, old).unwrap();

        // Rule B: stale DOWN host
        let db_host = demo::add_host(&db, "db").unwrap();
        demo::add_ventilation(&db, db_host, "collector2", schema::NAGIOS_APP).unwrap();
        demo::add_host_state(&db, db_host, StateName::Down, old).unwrap();

        // Rule C: stale UNKNOWN high-level service
        let portal = demo::add_highlevelservice(&db, "portal").unwrap();
        demo::add_svc_state(&db, portal, StateName::Unknown, old).unwrap();

        // Rule D: service on a DOWN host disagreeing with its open event
        let mail = demo::add_host(&db, "mail").unwrap();
        demo::add_ventilation(&db, mail, "collector1", schema::NAGIOS_APP).unwrap();
        demo::add_host_state(&db, mail, StateName::Down, now).unwrap();
        let smtp = demo::add_lowlevelservice(&db, mail, "SMTP").unwrap();
        demo::add_svc_state(&db, smtp, StateName::Ok, now).unwrap();
        let ev = demo::add_event(&db, smtp, StateName::Critical, "connection refused").unwrap();
        demo::add_correvent(&db, &[ev], AckStatus::Acknowledged).unwrap();

        // Rule E: UP host whose open event still says DOWN
        let dns = demo::add_host(&db, "dns").unwrap();
        demo::add_ventilation(&db, dns, "collector2", schema::NAGIOS_APP).unwrap();
        demo::add_host_state(&db, dns, StateName::Up, now).unwrap();
        let ev = demo::add_event(&db, dns, StateName::Down, "no route").unwrap();
        demo::add_correvent(&db, &[ev], AckStatus::None).unwrap();

        // Synchronized items that must never show up
        let ok_host = demo::add_host(&db, "quiet").unwrap();
        demo::add_ventilation(&db, ok_host, "collector1", schema::NAGIOS_APP).unwrap();
        demo::add_host_state(&db, ok_host, StateName::Up, old).unwrap();
        let closed = demo::add_event(&db, ok_host, StateName::Down, "closed").unwrap();
        demo::add_correvent(&db, &[closed], AckStatus::AAClosed).unwrap();
        let critical_hls = demo::add_highlevelservice(&db, "billing").unwrap();
        demo::add_svc_state(&db, critical_hls, StateName::Critical, old).unwrap();

        DesyncSelector::new(db)
    }

    fn sorted_values(commands: &[NagiosCommand]) -> Vec<String> {
        let mut values: Vec<_> = commands.iter().map(|c| c.value.clone()).collect();
        values.sort();
        values
    }

    #[tokio::test]
    async fn test_selector_to_dispatcher() {
        let now = Utc::now().naive_utc();
        let selector = estate(now);
        let query = DesyncQuery {
            time_limit: Some(now - TimeDelta::minutes(35)),
            hls_time_limit: Some(now - TimeDelta::minutes(35)),
            max_events: None,
        };
        let candidates = selector.get_desync(&query).unwrap();
        assert_eq!(candidates.len(), 5);

        let publisher = RecordingPublisher::default();
        let recorded = Arc::clone(&publisher.commands);
        let closed = Arc::clone(&publisher.closed);
        let mut sender = SyncSender::new(publisher, DeliveryPolicy::Continue);
        let report = sender.ask_nagios(&candidates).await.unwrap();
        sender.close().await.unwrap();

        assert_eq!(sender.state(), SenderState::Done);
        assert!(*closed.lock().unwrap());
        assert_eq!(report, DispatchReport { sent: 5, failed: 0, skipped: 0 });

        let commands = recorded.lock().unwrap().clone();
        // One command per candidate, in candidate order
        let expected: Vec<_> = candidates
            .iter()
            .map(|c| NagiosCommand::for_candidate(c, 0).value)
            .collect();
        let sent: Vec<_> = commands.iter().map(|c| c.value.clone()).collect();
        assert_eq!(sent, expected);

        assert_eq!(
            sorted_values(&commands),
            vec![
                "High-Level-Services;portal;0;vigilo;syncevents",
                "db;0;vigilo;syncevents",
                "dns;0;vigilo;syncevents",
                "mail;SMTP;0;vigilo;syncevents",
                "web;HTTP;0;vigilo;syncevents",
            ]
        );

        let dns = commands
            .iter()
            .find(|c| c.value.starts_with("dns;"))
            .unwrap();
        assert_eq!(dns.routing_key.as_deref(), Some("collector2"));
        let portal = commands
            .iter()
            .find(|c| c.value.contains("portal"))
            .unwrap();
        assert_eq!(portal.routing_key, None);
    }

    #[tokio::test]
    async fn test_settings_drive_the_query() {
        let now = Utc::now().naive_utc();
        let selector = estate(now);
        let settings = ConfigLoader::load_from_str(
            r#"
            [connector-syncevents]
            minutes_old = -1
            hls_minutes_old = "-1"
            max_events = 1
            "#,
            ConfigFormat::Toml,
        )
        .unwrap();

        // Only the event rules remain, and the cap keeps one of their two rows
        let query = DesyncQuery::from_settings(&settings.syncevents, now);
        let candidates = selector.get_desync(&query).unwrap();
        assert_eq!(candidates.len(), 1);

        let uncapped = DesyncQuery {
            max_events: None,
            ..query
        };
        let mut names: Vec<_> = selector
            .get_desync(&uncapped)
            .unwrap()
            .iter()
            .map(|c| c.hostname().unwrap_or_default().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["dns", "mail"]);
    }

    #[tokio::test]
    async fn test_bus_end_to_end() {
        let now = Utc::now().naive_utc();
        let selector = estate(now);
        let candidates = selector
            .get_desync(&DesyncQuery {
                time_limit: Some(now - TimeDelta::minutes(35)),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(candidates.len(), 4);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut lines = BufReader::new(socket).lines();
            let mut received = Vec::new();
            while let Some(line) = lines.next_line().await.unwrap() {
                received.push(serde_json::from_str::<serde_json::Value>(&line).unwrap());
            }
            received
        });

        let config = BusPublisherConfig {
            addr,
            connect_timeout: std::time::Duration::from_secs(2),
            trace_wire: true,
        };
        let publisher = BusPublisher::connect("bus", config).await.unwrap();
        let mut sender = SyncSender::new(publisher, DeliveryPolicy::Abort);
        let report = sender.ask_nagios(&candidates).await.unwrap();
        sender.close().await.unwrap();
        assert_eq!(report.sent, 4);

        let received = server.await.unwrap();
        assert_eq!(received.len(), 4);
        assert!(received.iter().all(|m| m["type"] == "nagios"));
        assert!(received.iter().all(|m| m.get("routing_key").is_some()));
    }
}
