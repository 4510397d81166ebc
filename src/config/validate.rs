//! Validation and defaulting of a decoded cluster document.
//!
//! Validation never stops at the first problem. The three passes (primary,
//! replicas, options) plus the monitoring check each append to one error
//! list, and defaults are applied to every field regardless of what is wrong
//! with its siblings. The result is a fully defaulted [`Topology`] together
//! with everything that was wrong with the input.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use super::document::{
    ClusterDocument, MonitoringDocument, OptionsDocument, PrimaryDocument, ReplicaDocument,
};
use super::types::{
    Datadog, Monitoring, Options, PrimaryNode, ReplicaNode, SyncMode, SynchronousCommit,
    Topology, WalKeepSize, WalLevel, DEFAULT_DATA_DIRECTORY, DEFAULT_MAX_WAL_SENDERS,
    DEFAULT_PORT, MAX_SLOT_NAME_LEN,
};
use crate::error::{ValidationError, ValidationErrors};

/// Replication slot names are plain SQL identifiers.
#[allow(clippy::expect_used)]
static SLOT_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("slot name regex should be valid")
});

/// Validate a decoded document and fill in every default.
///
/// Pure: the document is not modified. The returned topology is always fully
/// defaulted, even when errors were found, so callers can inspect what the
/// defaults would have been. Treat a non-empty error list as fatal.
pub fn validate(document: &ClusterDocument) -> (Topology, Vec<ValidationError>) {
    let mut errors = Vec::new();

    let primary = validate_primary(&document.primary, &mut errors);

    if document.replicas.is_empty() {
        errors.push(ValidationError::NoReplicas);
    }
    let pass = document
        .replicas
        .iter()
        .enumerate()
        .fold(ReplicaPass::default(), ReplicaPass::visit);
    errors.extend(pass.errors);

    let options = validate_options(&document.options, &mut errors);
    let monitoring = document
        .monitoring
        .as_ref()
        .map(|m| validate_monitoring(m, &primary, &mut errors));

    let topology = Topology {
        primary,
        replicas: pass.replicas,
        options,
        monitoring,
    };
    (topology, errors)
}

/// Like [`validate`], but only hands out the topology when it is clean.
///
/// # Errors
///
/// All collected violations, as one [`ValidationErrors`] value.
pub fn validate_strict(document: &ClusterDocument) -> Result<Topology, ValidationErrors> {
    match validate(document) {
        (topology, errors) if errors.is_empty() => Ok(topology),
        (_, errors) => Err(ValidationErrors(errors)),
    }
}

/// Check a replication slot name against PostgreSQL's identifier rules.
pub fn check_slot_name(field: &str, slot: &str) -> Result<(), ValidationError> {
    if !SLOT_NAME_REGEX.is_match(slot) {
        return Err(ValidationError::InvalidSlotName {
            field: field.to_string(),
            slot: slot.to_string(),
        });
    }
    if slot.len() > MAX_SLOT_NAME_LEN {
        return Err(ValidationError::SlotNameTooLong {
            field: field.to_string(),
            slot: slot.to_string(),
        });
    }
    Ok(())
}

fn validate_primary(doc: &PrimaryDocument, errors: &mut Vec<ValidationError>) -> PrimaryNode {
    require(&doc.host, "primary.host", errors);
    check_host(&doc.host, "primary.host", errors);
    let port = port_or_default(doc.port, "primary.port", errors);
    require(&doc.replication_user, "primary.replication_user", errors);
    require(
        &doc.replication_password,
        "primary.replication_password",
        errors,
    );

    let data_directory = if doc.data_directory.is_empty() {
        DEFAULT_DATA_DIRECTORY.to_string()
    } else {
        doc.data_directory.clone()
    };

    PrimaryNode {
        host: doc.host.clone(),
        port,
        data_directory,
        db_name: doc.db_name.clone(),
        db_user: doc.db_user.clone(),
        db_password: doc.db_password.clone(),
        replication_user: doc.replication_user.clone(),
        replication_password: doc.replication_password.clone(),
    }
}

/// Accumulator threaded through the replica fold.
#[derive(Default)]
struct ReplicaPass {
    replicas: Vec<ReplicaNode>,
    seen_slots: HashSet<String>,
    seen_hosts: HashMap<String, usize>,
    errors: Vec<ValidationError>,
}

impl ReplicaPass {
    fn visit(mut self, (index, doc): (usize, &ReplicaDocument)) -> Self {
        let field = |name: &str| format!("replicas[{index}].{name}");

        let host_field = field("host");
        if doc.host.is_empty() {
            self.errors.push(ValidationError::Missing { field: host_field });
        } else {
            check_host(&doc.host, &host_field, &mut self.errors);
            if let Some(&first) = self.seen_hosts.get(&doc.host) {
                self.errors.push(ValidationError::DuplicateHost {
                    field: host_field,
                    host: doc.host.clone(),
                    first,
                });
            } else {
                self.seen_hosts.insert(doc.host.clone(), index);
            }
        }

        let port = port_or_default(doc.port, &field("port"), &mut self.errors);

        let slot_field = field("replication_slot");
        if doc.replication_slot.is_empty() {
            self.errors.push(ValidationError::Missing { field: slot_field });
        } else {
            if !self.seen_slots.insert(doc.replication_slot.clone()) {
                self.errors.push(ValidationError::DuplicateSlot {
                    field: slot_field.clone(),
                    slot: doc.replication_slot.clone(),
                });
            }
            if let Err(e) = check_slot_name(&slot_field, &doc.replication_slot) {
                self.errors.push(e);
            }
        }

        let sync_mode = choice::<SyncMode>(
            &doc.sync_mode,
            &field("sync_mode"),
            "sync_mode",
            SyncMode::ALLOWED,
            &mut self.errors,
        );

        self.replicas.push(ReplicaNode {
            host: doc.host.clone(),
            port,
            replication_slot: doc.replication_slot.clone(),
            sync_mode,
            db_user: doc.db_user.clone(),
            db_password: doc.db_password.clone(),
        });
        self
    }
}

fn validate_options(doc: &OptionsDocument, errors: &mut Vec<ValidationError>) -> Options {
    let wal_level = choice::<WalLevel>(
        &doc.wal_level,
        "options.wal_level",
        "wal_level",
        WalLevel::ALLOWED,
        errors,
    );

    let max_wal_senders = if doc.max_wal_senders <= 0 {
        DEFAULT_MAX_WAL_SENDERS
    } else {
        u32::try_from(doc.max_wal_senders).unwrap_or_else(|_| {
            errors.push(ValidationError::OutOfRange {
                field: "options.max_wal_senders".to_string(),
                name: "max_wal_senders",
                value: doc.max_wal_senders,
                max: u64::from(u32::MAX),
            });
            DEFAULT_MAX_WAL_SENDERS
        })
    };

    let wal_keep_size = if doc.wal_keep_size.is_empty() {
        WalKeepSize::default()
    } else {
        WalKeepSize::parse(&doc.wal_keep_size).unwrap_or_else(|e| {
            errors.push(ValidationError::InvalidWalKeepSize {
                field: "options.wal_keep_size".to_string(),
                value: doc.wal_keep_size.clone(),
                reason: e.reason(),
            });
            WalKeepSize::default()
        })
    };

    let synchronous_commit = choice::<SynchronousCommit>(
        &doc.synchronous_commit,
        "options.synchronous_commit",
        "synchronous_commit",
        SynchronousCommit::ALLOWED,
        errors,
    );

    Options {
        wal_level,
        max_wal_senders,
        wal_keep_size,
        hot_standby: doc.hot_standby,
        synchronous_commit,
        promote_on_failure: doc.promote_on_failure,
    }
}

fn validate_monitoring(
    doc: &MonitoringDocument,
    primary: &PrimaryNode,
    errors: &mut Vec<ValidationError>,
) -> Monitoring {
    let dd = &doc.datadog;
    require(&dd.api_key, "monitoring.datadog.api_key", errors);
    require(&dd.site, "monitoring.datadog.site", errors);

    let password = if dd.password.is_empty() {
        primary.db_password.clone()
    } else {
        dd.password.clone()
    };

    Monitoring {
        datadog: Datadog {
            enabled: dd.enabled,
            api_key: dd.api_key.clone(),
            site: dd.site.clone(),
            password,
        },
    }
}

fn require(value: &str, field: &str, errors: &mut Vec<ValidationError>) {
    if value.is_empty() {
        errors.push(ValidationError::Missing {
            field: field.to_string(),
        });
    }
}

// Hosts name output directories (`replica-<host>`).
fn check_host(host: &str, field: &str, errors: &mut Vec<ValidationError>) {
    if host
        .chars()
        .any(|c| c.is_whitespace() || c == '/' || c == '\\')
    {
        errors.push(ValidationError::InvalidHost {
            field: field.to_string(),
            host: host.to_string(),
        });
    }
}

fn port_or_default(raw: i64, field: &str, errors: &mut Vec<ValidationError>) -> u16 {
    if raw <= 0 {
        return DEFAULT_PORT;
    }
    u16::try_from(raw).unwrap_or_else(|_| {
        errors.push(ValidationError::PortOutOfRange {
            field: field.to_string(),
            value: raw,
        });
        DEFAULT_PORT
    })
}

fn choice<T>(
    raw: &str,
    field: &str,
    name: &'static str,
    allowed: &'static str,
    errors: &mut Vec<ValidationError>,
) -> T
where
    T: FromStr + Default,
{
    if raw.is_empty() {
        return T::default();
    }
    raw.parse().unwrap_or_else(|_| {
        errors.push(ValidationError::InvalidChoice {
            field: field.to_string(),
            name,
            value: raw.to_string(),
            allowed,
        });
        T::default()
    })
}
