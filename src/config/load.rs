use std::path::Path;

use tracing::debug;

use super::document::ClusterDocument;
use super::types::Topology;
use super::validate::validate_strict;
use crate::error::ConfigError;

/// Read and decode a cluster document without validating it.
///
/// # Errors
///
/// [`ConfigError::Read`] when the file cannot be read and
/// [`ConfigError::Decode`] when it is not a well-formed cluster document.
/// No partial document is ever returned.
pub fn load_document(path: &Path) -> Result<ClusterDocument, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document = decode_document(&content).map_err(|source| ConfigError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        replicas = document.replicas.len(),
        "decoded cluster document"
    );
    Ok(document)
}

/// Decode a cluster document from YAML text.
pub fn decode_document(content: &str) -> Result<ClusterDocument, serde_yaml::Error> {
    // An empty file is an empty mapping, not a decode failure.
    if content.trim().is_empty() {
        return Ok(ClusterDocument::default());
    }
    serde_yaml::from_str(content)
}

/// Load, decode and validate a cluster document.
///
/// # Errors
///
/// Any [`ConfigError`]; validation failures carry every violation at once.
pub fn load_topology(path: &Path) -> Result<Topology, ConfigError> {
    let document = load_document(path)?;
    Ok(validate_strict(&document)?)
}
