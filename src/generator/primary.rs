use serde::Serialize;
use std::path::{Path, PathBuf};

use super::templates::{ensure_dir, ArtifactWriter, ParsedTemplate};
use crate::config::Topology;
use crate::error::RenderError;

/// Directory under the output root holding the primary's artifacts.
pub const PRIMARY_DIR: &str = "primary";

/// Slots kept free on top of one per replica, for re-seeding and tooling.
pub const SPARE_REPLICATION_SLOTS: usize = 2;

/// Context for `postgresql.conf.custom`.
#[derive(Debug, Clone, Serialize)]
pub struct PostgresqlConfContext {
    pub port: u16,
    pub wal_level: String,
    pub max_wal_senders: u32,
    pub max_replication_slots: usize,
    pub wal_keep_size: String,
    pub hot_standby: bool,
    pub synchronous_commit: String,
    /// `application_name`s (slot names) of replicas in `sync` mode, in document order.
    pub synchronous_standby_names: Vec<String>,
    pub has_monitoring: bool,
}

/// One `host replication` rule in `pg_hba.conf.custom`.
#[derive(Debug, Clone, Serialize)]
pub struct HbaReplica {
    pub host: String,
}

/// Context for `pg_hba.conf.custom`.
///
/// Only hosts and the shared replication role: per-replica credentials are
/// not needed to write access rules.
#[derive(Debug, Clone, Serialize)]
pub struct PgHbaContext {
    pub replication_user: String,
    pub replicas: Vec<HbaReplica>,
}

/// Context for `setup_primary.sh`.
#[derive(Debug, Clone, Serialize)]
pub struct SetupPrimaryContext {
    pub primary_host: String,
    pub primary_port: u16,
    pub data_directory: String,
    pub db_name: String,
    pub db_user: String,
    pub replication_user: String,
    pub replication_password: String,
    pub replication_slots: Vec<String>,
}

impl PostgresqlConfContext {
    pub fn new(topology: &Topology) -> Self {
        let o = &topology.options;
        PostgresqlConfContext {
            port: topology.primary.port,
            wal_level: o.wal_level.to_string(),
            max_wal_senders: o.max_wal_senders,
            max_replication_slots: topology.replicas.len() + SPARE_REPLICATION_SLOTS,
            wal_keep_size: o.wal_keep_size.to_string(),
            hot_standby: o.hot_standby,
            synchronous_commit: o.synchronous_commit.to_string(),
            synchronous_standby_names: topology
                .sync_replicas()
                .map(|r| r.replication_slot.clone())
                .collect(),
            has_monitoring: topology.datadog().is_some(),
        }
    }
}

impl PgHbaContext {
    pub fn new(topology: &Topology) -> Self {
        PgHbaContext {
            replication_user: topology.primary.replication_user.clone(),
            replicas: topology
                .replicas
                .iter()
                .map(|r| HbaReplica {
                    host: r.host.clone(),
                })
                .collect(),
        }
    }
}

impl SetupPrimaryContext {
    pub fn new(topology: &Topology) -> Self {
        let p = &topology.primary;
        SetupPrimaryContext {
            primary_host: p.host.clone(),
            primary_port: p.port,
            data_directory: p.data_directory.clone(),
            db_name: p.db_name.clone(),
            db_user: p.db_user.clone(),
            replication_user: p.replication_user.clone(),
            replication_password: p.replication_password.clone(),
            replication_slots: topology
                .replicas
                .iter()
                .map(|r| r.replication_slot.clone())
                .collect(),
        }
    }
}

/// Parsed templates used for the primary.
#[derive(Debug)]
pub struct PrimaryTemplates {
    pub postgresql_conf: ParsedTemplate,
    pub pg_hba: ParsedTemplate,
    pub setup_primary: ParsedTemplate,
}

/// Paths of the primary's artifacts, in write order.
pub fn primary_artifacts(output_dir: &Path) -> [PathBuf; 3] {
    let dir = output_dir.join(PRIMARY_DIR);
    [
        dir.join("postgresql.conf.custom"),
        dir.join("pg_hba.conf.custom"),
        dir.join("setup_primary.sh"),
    ]
}

/// Write `primary/{postgresql.conf.custom, pg_hba.conf.custom, setup_primary.sh}`.
///
/// # Errors
///
/// A failure to create the directory, or the first failed artifact when
/// `out` fails fast. Files already written stay on disk.
pub fn render_primary(
    topology: &Topology,
    templates: &PrimaryTemplates,
    output_dir: &Path,
    out: &mut ArtifactWriter,
) -> Result<(), RenderError> {
    ensure_dir(&output_dir.join(PRIMARY_DIR))?;
    let [conf, hba, setup] = primary_artifacts(output_dir);

    out.write(
        conf,
        &templates.postgresql_conf,
        &PostgresqlConfContext::new(topology),
    )?;
    out.write(hba, &templates.pg_hba, &PgHbaContext::new(topology))?;
    out.write(
        setup,
        &templates.setup_primary,
        &SetupPrimaryContext::new(topology),
    )?;

    Ok(())
}
