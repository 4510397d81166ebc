//! # Config Module
//!
//! Loading, validation and defaulting of cluster documents.
//!
//! ## Overview
//!
//! A cluster document is a YAML file describing one PostgreSQL primary, an
//! ordered list of streaming replicas, WAL/replication options and an
//! optional Datadog integration:
//!
//! ```yaml
//! primary:
//!   host: 10.0.0.1
//!   replication_user: replicator
//!   replication_password: s3cret
//! replicas:
//!   - host: 10.0.0.2
//!     replication_slot: replica_1
//!     sync_mode: sync
//! options:
//!   wal_keep_size: 2GB
//!   hot_standby: true
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! YAML → load_document → ClusterDocument → validate → (Topology, errors)
//! ```
//!
//! - [`load_document`] only rejects structurally broken documents
//!   ([`ConfigError::Decode`](crate::error::ConfigError::Decode)).
//! - [`validate`] is pure. It reports every violation at once and always
//!   returns a fully defaulted [`Topology`].
//! - [`load_topology`] chains both and refuses to hand out a topology that
//!   has violations.
//!
//! ## Defaults
//!
//! | Field | Default |
//! |---|---|
//! | `primary.port`, `replicas[].port` | `5432` |
//! | `primary.data_directory` | `/var/lib/postgresql/data` |
//! | `replicas[].sync_mode` | `async` |
//! | `options.wal_level` | `replica` |
//! | `options.max_wal_senders` | `3` |
//! | `options.wal_keep_size` | `1GB` |
//! | `options.synchronous_commit` | `on` |
//! | `monitoring.datadog.password` | `primary.db_password` |

mod document;
mod load;
mod print;
mod types;
mod validate;
#[cfg(test)]
mod tests;

pub use document::{
    ClusterDocument, DatadogDocument, MonitoringDocument, OptionsDocument, PrimaryDocument,
    ReplicaDocument,
};
pub use load::{decode_document, load_document, load_topology};
pub use print::{mask_password, render_summary, Summary};
pub use types::*;
pub use validate::{check_slot_name, validate, validate_strict};
