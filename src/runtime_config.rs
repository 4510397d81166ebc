//! # Runtime Configuration Module
//!
//! Base directories used by a generation run, resolved once at process start
//! and passed down explicitly.
//!
//! ## Environment Variables
//!
//! ### `SYNCGEN_TEMPLATE_DIR`
//!
//! Directory holding the artifact templates (`postgresql.conf.txt`,
//! `setup_primary.sh.txt`, ...).
//!
//! Default: unset, which uses the templates compiled into the binary.
//!
//! ### `SYNCGEN_OUTPUT_DIR`
//!
//! Root of the generated tree.
//!
//! Default: `generated` (relative to the working directory)
//!
//! ## Usage
//!
//! ```rust
//! use syncgen::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env().with_output_dir("out");
//! assert!(config.output_dir.ends_with("out"));
//! ```
//!
//! Command-line flags take precedence over both variables.

use std::env;
use std::path::PathBuf;

/// Output directory used when nothing else is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

/// Directories a generation run reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Where template sources are resolved from. `None` means bundled.
    pub template_dir: Option<PathBuf>,
    /// Root of the generated tree.
    pub output_dir: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            template_dir: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = RuntimeConfig::default();
        RuntimeConfig {
            template_dir: non_empty_var("SYNCGEN_TEMPLATE_DIR")
                .map(PathBuf::from)
                .or(defaults.template_dir),
            output_dir: non_empty_var("SYNCGEN_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        }
    }

    /// Override the template directory.
    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    /// Override the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
