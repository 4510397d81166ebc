//! # syncgen
//!
//! **syncgen** generates the configuration files, setup scripts and systemd
//! units needed to run a PostgreSQL primary with one or more streaming
//! replicas, driven entirely by a single YAML topology document.
//!
//! ## Overview
//!
//! A run reads the document, validates it into a typed [`config::Topology`]
//! (filling in defaults and collecting every problem at once), then renders a
//! fixed set of templates per entity into an output directory. Nothing is
//! executed against a database; the output is meant to be copied to the hosts
//! and run there.
//!
//! ## Architecture
//!
//! - **[`config`]** - Document decoding, validation/defaulting and the typed model
//! - **[`generator`]** - Template resolution, entity renderers and the orchestrator
//! - **[`error`]** - Error types for every stage
//! - **[`runtime_config`]** - Template and output directories
//! - **[`otel`]** - Logging setup
//! - **[`cli`]** - The `syncgen` command line
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(syncgen build)
//!     participant Load as config::load_document
//!     participant Validate as config::validate
//!     participant Gen as generator::generate_all
//!     participant FS as File System
//!
//!     User->>CLI: syncgen build cluster.yaml
//!     CLI->>Load: load_document("cluster.yaml")
//!     Load-->>CLI: ClusterDocument
//!     CLI->>Validate: validate_strict(&document)
//!     Validate-->>CLI: Topology (or every ValidationError)
//!     CLI->>Gen: generate_all(&topology, out, options)
//!     Gen->>FS: primary/*
//!     Gen->>FS: replica-<host>/* (each replica)
//!     Gen->>FS: datadog/* (when enabled)
//!     Gen-->>CLI: GenerationReport
//!     CLI-->>User: ✅ Wrote N files
//! ```
//!
//! ## Quick Start
//!
//! ```yaml
//! primary:
//!   host: 10.0.0.1
//!   replication_user: replicator
//!   replication_password: secret
//! replicas:
//!   - host: 10.0.0.2
//!     replication_slot: replica_1
//!     sync_mode: sync
//! ```
//!
//! ```bash
//! syncgen validate cluster.yaml
//! syncgen build cluster.yaml --output generated
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod otel;
pub mod runtime_config;

pub use config::{load_topology, validate, validate_strict, Topology};
pub use error::{ConfigError, GenerateError, ValidationError, ValidationErrors};
pub use generator::{generate_all, plan_artifacts, ErrorPolicy, GenerateOptions};
