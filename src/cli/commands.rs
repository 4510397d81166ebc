use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{load_topology, Summary};
use crate::generator::{generate_all, plan_artifacts, ErrorPolicy, GenerateOptions};
use crate::otel::{init_logging, LogConfig};
use crate::runtime_config::RuntimeConfig;

/// Command-line interface for syncgen
///
/// Validates PostgreSQL replication topologies and generates the files needed
/// to deploy them.
#[derive(Parser, Debug)]
#[command(name = "syncgen", version)]
#[command(about = "PostgreSQL streaming replication config generator", long_about = None)]
pub struct Cli {
    /// Log level (trace/debug/info/warn/error); overrides SYNCGEN_LOG_LEVEL
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a cluster document and print a summary of the result
    Validate {
        /// Path to the cluster YAML document
        config: PathBuf,

        /// Print the validated topology as JSON instead of a summary
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Validate a cluster document and generate all artifacts
    Build {
        /// Path to the cluster YAML document
        config: PathBuf,

        /// Output directory (default: SYNCGEN_OUTPUT_DIR, then ./generated)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Template directory (default: SYNCGEN_TEMPLATE_DIR, then bundled templates)
        #[arg(long)]
        template_dir: Option<PathBuf>,

        /// List the files that would be written without writing them
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Keep rendering after a failure and report every error at the end
        #[arg(long, default_value_t = false)]
        keep_going: bool,
    },
}

/// Parse arguments, set up logging and run the selected command.
///
/// # Errors
///
/// Returns an error if:
/// - Logging cannot be initialised
/// - The document cannot be read, decoded or validated
/// - Generation fails
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut log_config = LogConfig::from_env();
    if let Some(level) = &cli.log_level {
        log_config.log_level = level.clone();
    }
    init_logging(&log_config)?;
    run(cli)
}

/// Run an already-parsed command.
///
/// # Errors
///
/// See [`run_cli`].
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Validate { config, json } => {
            let topology = load_topology(&config)?;
            if json {
                let out = serde_json::to_string_pretty(&topology)
                    .context("Failed to encode topology as JSON")?;
                println!("{out}");
            } else {
                println!("✅ Validation successful: {}", config.display());
                println!();
                print!("{}", Summary(&topology));
            }
            Ok(())
        }
        Commands::Build {
            config,
            output,
            template_dir,
            dry_run,
            keep_going,
        } => {
            let mut runtime = RuntimeConfig::from_env();
            if let Some(dir) = output {
                runtime = runtime.with_output_dir(dir);
            }
            if let Some(dir) = template_dir {
                runtime = runtime.with_template_dir(dir);
            }

            println!("📄 Loading {}", config.display());
            let topology = load_topology(&config)?;
            println!(
                "✅ Configuration valid: 1 primary, {} replica(s)",
                topology.replicas.len()
            );

            if dry_run {
                let plan = plan_artifacts(&topology, &runtime.output_dir);
                for path in &plan {
                    println!("   {}", path.display());
                }
                println!(
                    "ℹ️  Dry run: {} files would be written to {}",
                    plan.len(),
                    runtime.output_dir.display()
                );
                return Ok(());
            }

            let policy = if keep_going {
                ErrorPolicy::KeepGoing
            } else {
                ErrorPolicy::FailFast
            };
            let options = GenerateOptions {
                template_dir: runtime.template_dir.clone(),
                error_policy: policy,
            };
            let report = generate_all(&topology, &runtime.output_dir, &options)
                .with_context(|| {
                    format!("Failed to generate files in {}", runtime.output_dir.display())
                })?;

            for path in &report.written {
                println!("✅ Wrote {}", path.display());
            }
            println!(
                "🎉 Generated {} files in {}",
                report.written.len(),
                runtime.output_dir.display()
            );
            Ok(())
        }
    }
}
