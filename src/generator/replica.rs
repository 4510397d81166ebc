use serde::Serialize;
use std::path::{Path, PathBuf};

use super::templates::{ensure_dir, ArtifactWriter, ParsedTemplate};
use crate::config::{PrimaryNode, ReplicaNode, Topology};
use crate::error::RenderError;

/// Where a replica's generated directory is installed on the target host.
/// Referenced by the systemd service.
pub const REMOTE_INSTALL_ROOT: &str = "/opt/ha-syncgen";

/// `replica-<host>`
pub fn replica_dir_name(host: &str) -> String {
    format!("replica-{host}")
}

/// Context for `setup_replication.sh`.
#[derive(Debug, Clone, Serialize)]
pub struct SetupReplicationContext {
    pub replica_host: String,
    pub replica_port: u16,
    pub replication_slot: String,
    pub sync_mode: String,
    pub primary_host: String,
    pub primary_port: u16,
    pub replication_user: String,
    pub replication_password: String,
    pub data_directory: String,
    pub hot_standby: bool,
}

/// Context for `health_check.sh`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckContext {
    pub replica_host: String,
    pub replica_port: u16,
    pub replication_slot: String,
    pub primary_host: String,
    pub primary_port: u16,
    pub replication_user: String,
    pub data_directory: String,
    pub promote_on_failure: bool,
}

/// Context for `ha-postgres-health.service`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthServiceContext {
    pub replica_host: String,
    pub primary_host: String,
    pub install_dir: String,
    pub pg_user: String,
    pub data_directory: String,
}

/// Context for `ha-postgres-health.timer`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthTimerContext {
    pub replica_host: String,
}

impl SetupReplicationContext {
    pub fn new(replica: &ReplicaNode, primary: &PrimaryNode, hot_standby: bool) -> Self {
        SetupReplicationContext {
            replica_host: replica.host.clone(),
            replica_port: replica.port,
            replication_slot: replica.replication_slot.clone(),
            sync_mode: replica.sync_mode.to_string(),
            primary_host: primary.host.clone(),
            primary_port: primary.port,
            replication_user: primary.replication_user.clone(),
            replication_password: primary.replication_password.clone(),
            data_directory: primary.data_directory.clone(),
            hot_standby,
        }
    }
}

impl HealthCheckContext {
    pub fn new(replica: &ReplicaNode, primary: &PrimaryNode, promote_on_failure: bool) -> Self {
        HealthCheckContext {
            replica_host: replica.host.clone(),
            replica_port: replica.port,
            replication_slot: replica.replication_slot.clone(),
            primary_host: primary.host.clone(),
            primary_port: primary.port,
            replication_user: primary.replication_user.clone(),
            data_directory: primary.data_directory.clone(),
            promote_on_failure,
        }
    }
}

impl HealthServiceContext {
    pub fn new(replica: &ReplicaNode, primary: &PrimaryNode) -> Self {
        HealthServiceContext {
            replica_host: replica.host.clone(),
            primary_host: primary.host.clone(),
            install_dir: format!("{REMOTE_INSTALL_ROOT}/{}", replica_dir_name(&replica.host)),
            pg_user: primary.replication_user.clone(),
            data_directory: primary.data_directory.clone(),
        }
    }
}

/// Parsed templates shared by every replica.
#[derive(Debug)]
pub struct ReplicaTemplates {
    pub setup_replication: ParsedTemplate,
    pub health_check: ParsedTemplate,
    pub health_service: ParsedTemplate,
    pub health_timer: ParsedTemplate,
}

/// Paths of one replica's artifacts, in write order.
pub fn replica_artifacts(output_dir: &Path, replica: &ReplicaNode) -> [PathBuf; 4] {
    let dir = output_dir.join(replica_dir_name(&replica.host));
    [
        dir.join("setup_replication.sh"),
        dir.join("health_check.sh"),
        dir.join("ha-postgres-health.service"),
        dir.join("ha-postgres-health.timer"),
    ]
}

/// Write the four artifacts of one replica under `replica-<host>/`.
///
/// # Errors
///
/// A failure to create the directory, or the first failed artifact when
/// `out` fails fast. Files already written stay on disk.
pub fn render_replica(
    topology: &Topology,
    replica: &ReplicaNode,
    templates: &ReplicaTemplates,
    output_dir: &Path,
    out: &mut ArtifactWriter,
) -> Result<(), RenderError> {
    let primary = &topology.primary;
    let options = &topology.options;
    ensure_dir(&output_dir.join(replica_dir_name(&replica.host)))?;
    let [setup, health, service, timer] = replica_artifacts(output_dir, replica);

    out.write(
        setup,
        &templates.setup_replication,
        &SetupReplicationContext::new(replica, primary, options.hot_standby),
    )?;
    out.write(
        health,
        &templates.health_check,
        &HealthCheckContext::new(replica, primary, options.promote_on_failure),
    )?;
    out.write(
        service,
        &templates.health_service,
        &HealthServiceContext::new(replica, primary),
    )?;
    out.write(
        timer,
        &templates.health_timer,
        &HealthTimerContext {
            replica_host: replica.host.clone(),
        },
    )?;

    Ok(())
}
