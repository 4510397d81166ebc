//! The cluster document exactly as decoded from YAML.
//!
//! Every scalar here is loosely typed on purpose: an empty string or a zero
//! means "not set" and a bad enum spelling is still a string. That way the
//! decoder only rejects documents that are structurally broken, and every
//! semantic problem is reported by the validator with a field path.

use serde::{Deserialize, Deserializer, Serialize};

use super::types::{Datadog, Monitoring, Options, PrimaryNode, ReplicaNode, Topology};

/// Root of a cluster document (`primary`, `replicas`, `options`, `monitoring`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterDocument {
    #[serde(deserialize_with = "null_as_default")]
    pub primary: PrimaryDocument,
    #[serde(deserialize_with = "null_as_default")]
    pub replicas: Vec<ReplicaDocument>,
    #[serde(deserialize_with = "null_as_default")]
    pub options: OptionsDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<MonitoringDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryDocument {
    pub host: String,
    pub port: i64,
    pub data_directory: String,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    pub replication_user: String,
    pub replication_password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicaDocument {
    pub host: String,
    pub port: i64,
    pub replication_slot: String,
    pub sync_mode: String,
    pub db_user: String,
    pub db_password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsDocument {
    pub wal_level: String,
    pub max_wal_senders: i64,
    /// `1GB` and `2048` are both common spellings, so numbers are accepted too.
    #[serde(deserialize_with = "string_or_integer")]
    pub wal_keep_size: String,
    pub hot_standby: bool,
    pub synchronous_commit: String,
    pub promote_on_failure: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringDocument {
    #[serde(deserialize_with = "null_as_default")]
    pub datadog: DatadogDocument,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatadogDocument {
    pub enabled: bool,
    pub api_key: String,
    pub site: String,
    pub password: String,
}

/// `primary: ~` reads the same as a missing `primary` key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn string_or_integer<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
    }

    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Text(s)) => s,
        Some(Scalar::Int(n)) => n.to_string(),
        None => String::new(),
    })
}

impl From<&Topology> for ClusterDocument {
    fn from(topology: &Topology) -> Self {
        ClusterDocument {
            primary: PrimaryDocument::from(&topology.primary),
            replicas: topology.replicas.iter().map(ReplicaDocument::from).collect(),
            options: OptionsDocument::from(&topology.options),
            monitoring: topology.monitoring.as_ref().map(MonitoringDocument::from),
        }
    }
}

impl From<&PrimaryNode> for PrimaryDocument {
    fn from(p: &PrimaryNode) -> Self {
        PrimaryDocument {
            host: p.host.clone(),
            port: i64::from(p.port),
            data_directory: p.data_directory.clone(),
            db_name: p.db_name.clone(),
            db_user: p.db_user.clone(),
            db_password: p.db_password.clone(),
            replication_user: p.replication_user.clone(),
            replication_password: p.replication_password.clone(),
        }
    }
}

impl From<&ReplicaNode> for ReplicaDocument {
    fn from(r: &ReplicaNode) -> Self {
        ReplicaDocument {
            host: r.host.clone(),
            port: i64::from(r.port),
            replication_slot: r.replication_slot.clone(),
            sync_mode: r.sync_mode.to_string(),
            db_user: r.db_user.clone(),
            db_password: r.db_password.clone(),
        }
    }
}

impl From<&Options> for OptionsDocument {
    fn from(o: &Options) -> Self {
        OptionsDocument {
            wal_level: o.wal_level.to_string(),
            max_wal_senders: i64::from(o.max_wal_senders),
            wal_keep_size: o.wal_keep_size.to_string(),
            hot_standby: o.hot_standby,
            synchronous_commit: o.synchronous_commit.to_string(),
            promote_on_failure: o.promote_on_failure,
        }
    }
}

impl From<&Monitoring> for MonitoringDocument {
    fn from(m: &Monitoring) -> Self {
        MonitoringDocument {
            datadog: DatadogDocument::from(&m.datadog),
        }
    }
}

impl From<&Datadog> for DatadogDocument {
    fn from(d: &Datadog) -> Self {
        DatadogDocument {
            enabled: d.enabled,
            api_key: d.api_key.clone(),
            site: d.site.clone(),
            password: d.password.clone(),
        }
    }
}
