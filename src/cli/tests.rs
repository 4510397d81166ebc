//! Unit tests for CLI commands
#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::cli::{run, Cli, Commands};
use clap::Parser;
use std::fs;

const VALID: &str = r#"
primary:
  host: 10.0.0.1
  replication_user: r
  replication_password: p
replicas:
  - host: 10.0.0.2
    replication_slot: slot1
"#;

#[test]
fn test_validate_command_parses() {
    let cli = Cli::try_parse_from(["syncgen", "validate", "cluster.yaml"]).unwrap();

    match cli.command {
        Commands::Validate { config, json } => {
            assert_eq!(config.to_string_lossy(), "cluster.yaml");
            assert!(!json);
        }
        _ => panic!("Expected Validate command"),
    }
    assert!(cli.log_level.is_none());
}

#[test]
fn test_build_command_with_flags() {
    let cli = Cli::try_parse_from([
        "syncgen",
        "build",
        "cluster.yaml",
        "--output",
        "out",
        "--template-dir",
        "tpl",
        "--dry-run",
        "--keep-going",
        "--log-level",
        "debug",
    ])
    .unwrap();

    match cli.command {
        Commands::Build {
            config,
            output,
            template_dir,
            dry_run,
            keep_going,
        } => {
            assert_eq!(config.to_string_lossy(), "cluster.yaml");
            assert_eq!(output.unwrap().to_string_lossy(), "out");
            assert_eq!(template_dir.unwrap().to_string_lossy(), "tpl");
            assert!(dry_run);
            assert!(keep_going);
        }
        _ => panic!("Expected Build command"),
    }
    assert_eq!(cli.log_level.as_deref(), Some("debug"));
}

#[test]
fn test_build_defaults() {
    let cli = Cli::try_parse_from(["syncgen", "build", "cluster.yaml"]).unwrap();
    match cli.command {
        Commands::Build {
            output,
            template_dir,
            dry_run,
            keep_going,
            ..
        } => {
            assert!(output.is_none());
            assert!(template_dir.is_none());
            assert!(!dry_run);
            assert!(!keep_going);
        }
        _ => panic!("Expected Build command"),
    }
}

#[test]
fn test_config_file_is_required() {
    assert!(Cli::try_parse_from(["syncgen", "validate"]).is_err());
    assert!(Cli::try_parse_from(["syncgen", "build"]).is_err());
    assert!(Cli::try_parse_from(["syncgen", "status"]).is_err());
}

#[test]
fn test_run_validate_reports_every_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "primary:\n  port: 5432\n").unwrap();

    let cli = Cli::try_parse_from(["syncgen", "validate", path.to_str().unwrap()]).unwrap();
    let msg = format!("{:#}", run(cli).unwrap_err());
    assert!(msg.contains("primary.host is required"), "{msg}");
    assert!(msg.contains("at least one replica is required"), "{msg}");
}

#[test]
fn test_run_build_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cluster.yaml");
    fs::write(&path, VALID).unwrap();
    let out = dir.path().join("out");

    let cli = Cli::try_parse_from([
        "syncgen",
        "build",
        path.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
        "--dry-run",
    ])
    .unwrap();
    run(cli).unwrap();
    assert!(!out.exists());
}

#[test]
fn test_run_build_writes_into_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cluster.yaml");
    fs::write(&path, VALID).unwrap();
    let out = dir.path().join("out");

    let cli = Cli::try_parse_from([
        "syncgen",
        "build",
        path.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
    ])
    .unwrap();
    run(cli).unwrap();
    assert!(out.join("primary/postgresql.conf.custom").is_file());
    assert!(out.join("replica-10.0.0.2/ha-postgres-health.timer").is_file());
}
