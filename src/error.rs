//! Error types for loading, validating and rendering a cluster topology.
//!
//! Every failure the pipeline can produce belongs to one of four families:
//!
//! - [`ConfigError`] - the document could not be read or decoded, or it
//!   decoded but failed validation
//! - [`ValidationError`] - one semantic rule violation (aggregated into
//!   [`ValidationErrors`])
//! - [`TemplateError`] - a template source is missing or does not parse
//! - [`RenderError`] - a template could not be executed against its context
//!   or the result could not be written
//!
//! [`GenerateError`] is what the orchestrator returns: a renderer failure
//! tagged with the entity that was being rendered.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a document on disk into a [`Topology`](crate::config::Topology).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is malformed or a field has the wrong type.
    #[error("failed to decode config file {}: {source}", path.display())]
    Decode {
        /// Path that was decoded.
        path: PathBuf,
        /// Decoder error, surfaced verbatim.
        #[source]
        source: serde_yaml::Error,
    },

    /// The document decoded but violates one or more rules.
    #[error("validation error:\n{0}")]
    Validation(#[from] ValidationErrors),
}

/// A single semantic rule violation.
///
/// `field` always carries the dotted path of the offending value
/// (`primary.host`, `replicas[2].replication_slot`, ...).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A mandatory field is absent or empty.
    #[error("{field} is required")]
    Missing {
        /// Field path.
        field: String,
    },

    /// The topology has no replicas.
    #[error("at least one replica is required")]
    NoReplicas,

    /// A replication slot name appears more than once.
    #[error("{field} '{slot}' is already used")]
    DuplicateSlot {
        /// Field path of the second occurrence.
        field: String,
        /// The repeated slot name.
        slot: String,
    },

    /// Two replicas resolve to the same output directory.
    #[error("{field} '{host}' is already used by replicas[{first}]")]
    DuplicateHost {
        /// Field path of the second occurrence.
        field: String,
        /// The repeated host.
        host: String,
        /// Index of the first replica using the host.
        first: usize,
    },

    /// A host cannot be used to name an output directory.
    #[error("{field} '{host}' must not contain whitespace or path separators")]
    InvalidHost {
        /// Field path.
        field: String,
        /// Offending host.
        host: String,
    },

    /// A replication slot name is not a valid SQL identifier.
    #[error("{field}: invalid replication slot name '{slot}': must be a valid SQL identifier")]
    InvalidSlotName {
        /// Field path.
        field: String,
        /// Offending slot name.
        slot: String,
    },

    /// A replication slot name exceeds the PostgreSQL identifier limit.
    #[error("{field}: replication slot name '{slot}' too long: maximum 63 characters")]
    SlotNameTooLong {
        /// Field path.
        field: String,
        /// Offending slot name.
        slot: String,
    },

    /// A value is outside a fixed set of choices.
    #[error("{field}: invalid {name} '{value}': must be one of [{allowed}]")]
    InvalidChoice {
        /// Field path.
        field: String,
        /// Short option name used in the message (`sync_mode`, `wal_level`, ...).
        name: &'static str,
        /// Offending value.
        value: String,
        /// Comma-separated accepted values.
        allowed: &'static str,
    },

    /// `wal_keep_size` is neither a bare integer nor an integer with a unit.
    #[error("{field}: invalid wal_keep_size '{value}': {reason}")]
    InvalidWalKeepSize {
        /// Field path.
        field: String,
        /// Offending value.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A port does not fit a TCP port number.
    #[error("{field}: port {value} is out of range (1-65535)")]
    PortOutOfRange {
        /// Field path.
        field: String,
        /// Offending value.
        value: i64,
    },

    /// A count does not fit the integer type PostgreSQL uses for it.
    #[error("{field}: {name} {value} is out of range (1-{max})")]
    OutOfRange {
        /// Field path.
        field: String,
        /// Short option name used in the message.
        name: &'static str,
        /// Offending value.
        value: i64,
        /// Largest accepted value.
        max: u64,
    },
}

impl ValidationError {
    /// Dotted path of the field the violation is about.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::NoReplicas => "replicas",
            ValidationError::Missing { field }
            | ValidationError::DuplicateSlot { field, .. }
            | ValidationError::DuplicateHost { field, .. }
            | ValidationError::InvalidHost { field, .. }
            | ValidationError::InvalidSlotName { field, .. }
            | ValidationError::SlotNameTooLong { field, .. }
            | ValidationError::InvalidChoice { field, .. }
            | ValidationError::InvalidWalKeepSize { field, .. }
            | ValidationError::PortOutOfRange { field, .. }
            | ValidationError::OutOfRange { field, .. } => field,
        }
    }
}

/// Every violation found by one validation run, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    /// Iterate over the individual violations.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Number of violations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when no rule was violated.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        ValidationErrors(errors)
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A template source could not be loaded.
///
/// This points at a packaging problem (wrong template directory, broken
/// template), not at the user's document.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// The template file could not be read.
    #[error("failed to read {name} template from {}: {source}", path.display())]
    Read {
        /// Template name.
        name: String,
        /// Full path that was tried.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The template source has a syntax error or an unknown directive.
    #[error("failed to parse {name} template: {source}")]
    Parse {
        /// Template name.
        name: String,
        /// Parser error.
        #[source]
        source: minijinja::Error,
    },

    /// No template directory was given and `name` is not one of the
    /// templates compiled into the binary.
    #[error("no bundled template named {name}")]
    NotBundled {
        /// Template name.
        name: String,
    },
}

/// One artifact could not be produced.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The template referenced something the context does not provide.
    #[error("failed to execute {template} template: {source}")]
    Execute {
        /// Template name.
        template: String,
        /// Engine error.
        #[source]
        source: minijinja::Error,
    },

    /// An entity directory could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The rendered artifact could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A script could not be marked executable.
    #[error("failed to make script {} executable: {source}", path.display())]
    Permissions {
        /// Script path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors returned by [`generate_all`](crate::generator::generate_all).
#[derive(Error, Debug)]
pub enum GenerateError {
    /// The output directory could not be created.
    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        /// Output directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A template needed for this run could not be resolved.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The primary server artifacts failed.
    #[error("failed to generate primary files: {0}")]
    Primary(#[source] RenderError),

    /// One replica's artifacts failed.
    #[error("failed to generate files for replica {host}: {source}")]
    Replica {
        /// Host of the failing replica.
        host: String,
        /// Renderer error.
        #[source]
        source: RenderError,
    },

    /// The monitoring artifacts failed.
    #[error("failed to generate datadog files: {0}")]
    Monitoring(#[source] RenderError),

    /// Several renderers failed under the keep-going policy.
    #[error("{} renderers failed:\n{}", .0.len(), join_lines(.0))]
    Multiple(Vec<GenerateError>),
}

fn join_lines(errors: &[GenerateError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
