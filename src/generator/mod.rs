//! # Generator Module
//!
//! Turns a validated [`Topology`](crate::config::Topology) into a directory
//! of deployable PostgreSQL replication artifacts.
//!
//! ## Architecture
//!
//! ```text
//! Topology → TemplateSet::resolve → render_primary → render_replica (each) → render_datadog → files
//! ```
//!
//! 1. **Template Resolution** - every template the run needs is read and
//!    parsed once ([`templates`])
//! 2. **Entity Renderers** - one per entity kind; each builds a flat,
//!    serialisable context and writes its artifacts ([`primary`],
//!    [`replica`], [`datadog`])
//! 3. **Orchestrator** - owns the output directory, fixes the order and
//!    applies the [`ErrorPolicy`] per artifact ([`generate_all`])
//!
//! ## Generated Structure
//!
//! ```text
//! generated/
//! ├── primary/
//! │   ├── postgresql.conf.custom
//! │   ├── pg_hba.conf.custom
//! │   └── setup_primary.sh            # 0755
//! ├── replica-<host>/                 # one per replica
//! │   ├── setup_replication.sh        # 0755
//! │   ├── health_check.sh             # 0755
//! │   ├── ha-postgres-health.service
//! │   └── ha-postgres-health.timer
//! └── datadog/                        # only when monitoring is enabled
//!     ├── datadog-install.sh          # 0755
//!     ├── datadog.sql
//!     └── datadog-conf.yaml
//! ```
//!
//! ## Template Customization
//!
//! Templates are minijinja sources in the `templates/` directory, one
//! `<artifact>.txt` per output file, and are compiled into the binary
//! ([`BUNDLED_TEMPLATES`]). Point `--template-dir` (or
//! `SYNCGEN_TEMPLATE_DIR`) at a copy to customise them. A template that
//! references a key its context does not provide fails to render.
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use std::path::Path;
//! use syncgen::config::load_topology;
//! use syncgen::generator::{generate_all, GenerateOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let topology = load_topology(Path::new("cluster.yaml"))?;
//! let report = generate_all(
//!     &topology,
//!     "generated".as_ref(),
//!     &GenerateOptions::default(),
//! )?;
//! println!("{} files", report.written.len());
//! # Ok(())
//! # }
//! ```

pub mod datadog;
pub mod primary;
mod project;
pub mod replica;
pub mod templates;

pub use project::*;
pub use templates::{
    resolve, resolve_bundled, write_artifact, ArtifactWriter, ErrorPolicy, ParsedTemplate,
    BUNDLED_TEMPLATES,
};
