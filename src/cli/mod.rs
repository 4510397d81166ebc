//! # CLI Module
//!
//! Command-line surface of the `syncgen` binary.
//!
//! ## Commands
//!
//! ### `validate`
//!
//! Load and validate a cluster document, then print a summary (or JSON):
//!
//! ```bash
//! syncgen validate cluster.yaml
//! syncgen validate cluster.yaml --json
//! ```
//!
//! Every validation problem is reported at once, one per line. Exit code is
//! non-zero on any read, decode or validation failure.
//!
//! ### `build`
//!
//! Validate, then generate every artifact:
//!
//! ```bash
//! syncgen build cluster.yaml
//! syncgen build cluster.yaml --output /tmp/out --keep-going
//! syncgen build cluster.yaml --dry-run
//! ```
//!
//! Options:
//! - `--output <DIR>` - Output root (default: `SYNCGEN_OUTPUT_DIR`, then `./generated`)
//! - `--template-dir <DIR>` - Template sources (default: `SYNCGEN_TEMPLATE_DIR`, then bundled)
//! - `--dry-run` - Print the planned file list only
//! - `--keep-going` - Render everything possible and report all failures
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use syncgen::cli::{run, Cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! run(cli)?;
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run, run_cli, Cli, Commands};
