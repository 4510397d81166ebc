#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::error::ValidationError;

fn doc(yaml: &str) -> ClusterDocument {
    decode_document(yaml).unwrap()
}

const MINIMAL: &str = r#"
primary:
  host: 10.0.0.1
  replication_user: r
  replication_password: p
replicas:
  - host: 10.0.0.2
    replication_slot: slot1
"#;

const FULL: &str = r#"
primary:
  host: 192.168.1.100
  port: 5433
  data_directory: /opt/postgresql/data
  db_name: app
  db_user: app_user
  db_password: app_secret
  replication_user: repl_user
  replication_password: secret123
replicas:
  - host: 192.168.1.101
    port: 5433
    replication_slot: replica_1
    sync_mode: sync
  - host: 192.168.1.102
    port: 5433
    replication_slot: replica_2
    sync_mode: async
options:
  promote_on_failure: true
  wal_level: logical
  max_wal_senders: 5
  wal_keep_size: 2GB
  hot_standby: true
  synchronous_commit: remote_apply
monitoring:
  datadog:
    enabled: true
    api_key: abc123
    site: datadoghq.eu
    password: dd_pass
"#;

#[test]
fn test_minimal_document_gets_defaults() {
    let (t, errors) = validate(&doc(MINIMAL));
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(t.primary.port, 5432);
    assert_eq!(t.primary.data_directory, "/var/lib/postgresql/data");
    assert_eq!(t.replicas.len(), 1);
    assert_eq!(t.replicas[0].port, 5432);
    assert_eq!(t.replicas[0].sync_mode, SyncMode::Async);
    assert_eq!(t.options.wal_level, WalLevel::Replica);
    assert_eq!(t.options.max_wal_senders, 3);
    assert_eq!(t.options.wal_keep_size.as_str(), "1GB");
    assert_eq!(t.options.synchronous_commit, SynchronousCommit::On);
    assert!(!t.options.hot_standby);
    assert!(!t.options.promote_on_failure);
    assert!(t.monitoring.is_none());
}

#[test]
fn test_full_document_keeps_explicit_values() {
    let t = validate_strict(&doc(FULL)).unwrap();
    assert_eq!(t.primary.port, 5433);
    assert_eq!(t.primary.data_directory, "/opt/postgresql/data");
    assert_eq!(t.replicas[0].sync_mode, SyncMode::Sync);
    assert_eq!(t.replicas[1].replication_slot, "replica_2");
    assert_eq!(t.options.wal_level, WalLevel::Logical);
    assert_eq!(t.options.max_wal_senders, 5);
    assert_eq!(t.options.synchronous_commit, SynchronousCommit::RemoteApply);
    assert!(t.options.promote_on_failure);
    let dd = t.datadog().unwrap();
    assert_eq!(dd.site, "datadoghq.eu");
    assert_eq!(dd.password, "dd_pass");
    assert_eq!(t.sync_replicas().count(), 1);
}

#[test]
fn test_duplicate_slot_names_index_of_second_entry() {
    let (_, errors) = validate(&doc(
        r#"
primary: {host: h, replication_user: r, replication_password: p}
replicas:
  - {host: a, replication_slot: dup}
  - {host: b, replication_slot: dup}
"#,
    ));
    assert_eq!(
        errors,
        vec![ValidationError::DuplicateSlot {
            field: "replicas[1].replication_slot".into(),
            slot: "dup".into(),
        }]
    );
    assert_eq!(
        errors[0].to_string(),
        "replicas[1].replication_slot 'dup' is already used"
    );
}

#[test]
fn test_duplicate_slot_detected_anywhere_in_list() {
    let (_, errors) = validate(&doc(
        r#"
primary: {host: h, replication_user: r, replication_password: p}
replicas:
  - {host: a, replication_slot: s0}
  - {host: b, replication_slot: s1}
  - {host: c, replication_slot: s2}
  - {host: d, replication_slot: s0}
"#,
    ));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field(), "replicas[3].replication_slot");
}

#[test]
fn test_wal_keep_size_rejected_but_other_defaults_applied() {
    let (t, errors) = validate(&doc(
        r#"
primary: {host: h, replication_user: r, replication_password: p}
replicas:
  - {host: a, replication_slot: s}
options:
  wal_keep_size: banana
"#,
    ));
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("invalid wal_keep_size 'banana'"));
    assert_eq!(errors[0].field(), "options.wal_keep_size");
    assert_eq!(t.primary.port, 5432);
    assert_eq!(t.options.wal_level, WalLevel::Replica);
    assert_eq!(t.options.max_wal_senders, 3);
    assert_eq!(t.options.synchronous_commit, SynchronousCommit::On);
    assert_eq!(t.replicas[0].sync_mode, SyncMode::Async);
}

#[test]
fn test_zero_replicas_always_rejected() {
    let (_, errors) = validate(&doc(
        "primary: {host: h, replication_user: r, replication_password: p}\n",
    ));
    assert_eq!(errors, vec![ValidationError::NoReplicas]);
    assert_eq!(errors[0].to_string(), "at least one replica is required");

    // Broken primary too: the replica error is still reported.
    let (_, errors) = validate(&doc("primary: {}\n"));
    assert!(errors.contains(&ValidationError::NoReplicas));
    assert!(errors.len() > 1);
}

#[test]
fn test_all_errors_reported_at_once() {
    let (t, errors) = validate(&doc(
        r#"
primary:
  port: -1
replicas:
  - port: 6000
    sync_mode: sometimes
options:
  wal_level: verbose
  synchronous_commit: maybe
"#,
    ));
    let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
    assert_eq!(
        fields,
        vec![
            "primary.host",
            "primary.replication_user",
            "primary.replication_password",
            "replicas[0].host",
            "replicas[0].replication_slot",
            "replicas[0].sync_mode",
            "options.wal_level",
            "options.synchronous_commit",
        ]
    );
    // Defaulting is not blocked by sibling failures.
    assert_eq!(t.primary.port, 5432);
    assert_eq!(t.replicas[0].port, 6000);
    assert_eq!(t.replicas[0].sync_mode, SyncMode::Async);
    assert_eq!(
        errors[5].to_string(),
        "replicas[0].sync_mode: invalid sync_mode 'sometimes': must be one of [sync, async]"
    );
}

#[test]
fn test_slot_name_rules() {
    let longest = "s".repeat(63);
    let accepted: [&str; 6] = ["a", "_", "slot_1", "Replica_Slot", "_x9", longest.as_str()];
    for slot in accepted {
        assert!(check_slot_name("f", slot).is_ok(), "{slot} should be accepted");
    }
    let rejected = ["1slot", "slot-1", "slot 1", "slöt", "", "slot.1", "$slot"];
    for slot in rejected {
        assert!(
            matches!(
                check_slot_name("f", slot),
                Err(ValidationError::InvalidSlotName { .. })
            ),
            "{slot:?} should be rejected"
        );
    }
    assert!(matches!(
        check_slot_name("f", &"s".repeat(64)),
        Err(ValidationError::SlotNameTooLong { .. })
    ));
}

#[test]
fn test_wal_keep_size_formats() {
    for ok in ["0", "2048", "1GB", "512MB", "64kB", "1TB", "0MB"] {
        assert!(WalKeepSize::parse(ok).is_ok(), "{ok} should be accepted");
    }
    assert_eq!(
        WalKeepSize::parse("1.5GB"),
        Err(WalKeepSizeError::NonIntegerAmount)
    );
    assert_eq!(WalKeepSize::parse("GB"), Err(WalKeepSizeError::NonIntegerAmount));
    for bad in ["banana", "1gb", "1 GB", "1KB", "", "1PB", "-5"] {
        assert!(WalKeepSize::parse(bad).is_err(), "{bad:?} should be rejected");
    }
}

#[test]
fn test_wal_keep_size_accepts_yaml_integer() {
    let (t, errors) = validate(&doc(&format!("{MINIMAL}options:\n  wal_keep_size: 2048\n")));
    assert!(errors.is_empty());
    assert_eq!(t.options.wal_keep_size.as_str(), "2048");
}

#[test]
fn test_duplicate_replica_host_rejected() {
    let (_, errors) = validate(&doc(
        r#"
primary: {host: h, replication_user: r, replication_password: p}
replicas:
  - {host: 10.0.0.2, port: 5432, replication_slot: a}
  - {host: 10.0.0.2, port: 5433, replication_slot: b}
"#,
    ));
    assert_eq!(
        errors[0].to_string(),
        "replicas[1].host '10.0.0.2' is already used by replicas[0]"
    );
}

#[test]
fn test_host_with_path_separator_rejected() {
    let (_, errors) = validate(&doc(
        r#"
primary: {host: h, replication_user: r, replication_password: p}
replicas:
  - {host: "../etc", replication_slot: a}
"#,
    ));
    assert!(matches!(errors[0], ValidationError::InvalidHost { .. }));
}

#[test]
fn test_port_out_of_range() {
    let (t, errors) = validate(&doc(
        r#"
primary: {host: h, port: 70000, replication_user: r, replication_password: p}
replicas:
  - {host: a, replication_slot: s}
"#,
    ));
    assert_eq!(
        errors,
        vec![ValidationError::PortOutOfRange {
            field: "primary.port".into(),
            value: 70000,
        }]
    );
    assert_eq!(t.primary.port, 5432);
}

#[test]
fn test_max_wal_senders_beyond_u32_rejected() {
    let (t, errors) = validate(&doc(&format!(
        "{MINIMAL}options:\n  max_wal_senders: 4294967296\n"
    )));
    assert_eq!(
        errors,
        vec![ValidationError::OutOfRange {
            field: "options.max_wal_senders".into(),
            name: "max_wal_senders",
            value: 4_294_967_296,
            max: 4_294_967_295,
        }]
    );
    assert_eq!(
        errors[0].to_string(),
        "options.max_wal_senders: max_wal_senders 4294967296 is out of range (1-4294967295)"
    );
    assert_eq!(t.options.max_wal_senders, DEFAULT_MAX_WAL_SENDERS);

    let (t, errors) = validate(&doc(&format!(
        "{MINIMAL}options:\n  max_wal_senders: 4294967295\n"
    )));
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(t.options.max_wal_senders, u32::MAX);
}

#[test]
fn test_monitoring_requires_api_key_and_site() {
    let (_, errors) = validate(&doc(&format!(
        "{MINIMAL}monitoring:\n  datadog:\n    enabled: false\n"
    )));
    let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
    assert_eq!(
        fields,
        vec!["monitoring.datadog.api_key", "monitoring.datadog.site"]
    );
}

#[test]
fn test_monitoring_password_falls_back_to_db_password() {
    let t = validate_strict(&doc(
        r#"
primary: {host: h, db_password: dbpw, replication_user: r, replication_password: p}
replicas:
  - {host: a, replication_slot: s}
monitoring:
  datadog: {enabled: true, api_key: k, site: datadoghq.com}
"#,
    ))
    .unwrap();
    assert_eq!(t.datadog().unwrap().password, "dbpw");
}

#[test]
fn test_disabled_monitoring_is_not_rendered() {
    let t = validate_strict(&doc(&format!(
        "{MINIMAL}monitoring:\n  datadog: {{enabled: false, api_key: k, site: s}}\n"
    )))
    .unwrap();
    assert!(t.monitoring.is_some());
    assert!(t.datadog().is_none());
}

#[test]
fn test_validation_is_idempotent() {
    for source in [MINIMAL, FULL] {
        let first = validate_strict(&doc(source)).unwrap();
        let (second, errors) = validate(&ClusterDocument::from(&first));
        assert!(errors.is_empty());
        assert_eq!(first, second);
    }
}

#[test]
fn test_reencoded_topology_round_trips() {
    for source in [MINIMAL, FULL] {
        let original = validate_strict(&doc(source)).unwrap();
        let yaml = serde_yaml::to_string(&original).unwrap();
        let reloaded = validate_strict(&doc(&yaml)).unwrap();
        assert_eq!(original, reloaded);
    }
}

#[test]
fn test_decode_error_on_type_mismatch() {
    assert!(decode_document("primary:\n  port: not-a-number\n").is_err());
    assert!(decode_document("replicas: {host: a}\n").is_err());
    assert!(decode_document("primary: [\n").is_err());
}

#[test]
fn test_null_sections_decode_to_default() {
    let d = doc("primary: ~\nreplicas: ~\noptions: ~\nmonitoring:\n  datadog: ~\n");
    assert_eq!(d.primary, PrimaryDocument::default());
    assert!(d.replicas.is_empty());
    assert_eq!(d.options, OptionsDocument::default());
    assert_eq!(d.monitoring, Some(MonitoringDocument::default()));

    assert_eq!(doc("primary: ~\nreplicas: ~\noptions: ~\n"), ClusterDocument::default());

    let (_, errors) = validate(&doc("primary: ~\nreplicas: ~\n"));
    assert!(errors.contains(&ValidationError::NoReplicas));
    assert!(errors.iter().any(|e| e.field() == "primary.host"));
}

#[test]
fn test_empty_document_decodes_to_default() {
    assert_eq!(decode_document("").unwrap(), ClusterDocument::default());
    assert_eq!(decode_document("  \n").unwrap(), ClusterDocument::default());
}

#[test]
fn test_load_topology_reports_read_and_validation_errors() {
    use crate::error::ConfigError;

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.yaml");
    assert!(matches!(
        load_topology(&missing),
        Err(ConfigError::Read { .. })
    ));

    let bad = dir.path().join("bad.yaml");
    std::fs::write(&bad, "primary: {host: h}\nreplicas: []\n").unwrap();
    match load_topology(&bad) {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors.len(), 3);
            let rendered = errors.to_string();
            assert!(rendered.contains("primary.replication_user is required"));
            assert!(rendered.contains("at least one replica is required"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let good = dir.path().join("good.yaml");
    std::fs::write(&good, MINIMAL).unwrap();
    assert_eq!(load_topology(&good).unwrap().replicas[0].host, "10.0.0.2");
}

#[test]
fn test_mask_password() {
    assert_eq!(mask_password(""), "****");
    assert_eq!(mask_password("abcd"), "****");
    assert_eq!(mask_password("secret123"), "se****23");
}

#[test]
fn test_summary_masks_password_and_lists_replicas() {
    let t = validate_strict(&doc(FULL)).unwrap();
    let summary = render_summary(&t);
    assert!(summary.contains("Host: 192.168.1.100:5433"));
    assert!(summary.contains("Password: se****23"));
    assert!(!summary.contains("secret123"));
    assert!(summary.contains("Replicas (2 configured):"));
    assert!(summary.contains("  2. 192.168.1.102:5433"));
    assert!(summary.contains("Synchronous Commit: remote_apply"));
    assert!(summary.contains("Monitoring: Datadog enabled (site datadoghq.eu)"));
    assert!(summary.contains("Total nodes: 3 (1 primary + 2 replicas)"));
    assert!(summary.contains("Failover: Automatic promotion enabled"));
}

#[test]
fn test_summary_display_matches_render() {
    let t = validate_strict(&doc(MINIMAL)).unwrap();
    let shown = format!("{}", Summary(&t));
    assert_eq!(shown, render_summary(&t));
    assert!(shown.starts_with("=== PostgreSQL HA Streaming Replication Configuration ===\n"));
    assert!(shown.ends_with("Failover: Manual promotion only\n"));
}
