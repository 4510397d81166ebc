use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::Topology;
use crate::error::{GenerateError, RenderError, TemplateError};
use crate::generator::datadog::{datadog_artifacts, render_datadog, DatadogTemplates};
use crate::generator::primary::{primary_artifacts, render_primary, PrimaryTemplates};
use crate::generator::replica::{render_replica, replica_artifacts, ReplicaTemplates};
use crate::generator::templates::{
    self, resolve, resolve_bundled, ArtifactWriter, ErrorPolicy, ParsedTemplate,
};

/// Options for [`generate_all`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Template directory. `None` uses the templates compiled into the binary.
    pub template_dir: Option<PathBuf>,
    pub error_policy: ErrorPolicy,
}

impl GenerateOptions {
    /// Resolve templates from `template_dir` instead of the bundled set.
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        GenerateOptions {
            template_dir: Some(template_dir.into()),
            error_policy: ErrorPolicy::default(),
        }
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }
}

/// Paths written by a successful run, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub written: Vec<PathBuf>,
}

/// Every template a run needs, parsed once.
#[derive(Debug)]
pub struct TemplateSet {
    pub primary: PrimaryTemplates,
    pub replica: ReplicaTemplates,
    pub datadog: Option<DatadogTemplates>,
}

impl TemplateSet {
    /// Resolve the primary and replica templates, plus the monitoring ones
    /// when `with_datadog` is set. Without a `dir` the bundled sources are
    /// used.
    ///
    /// # Errors
    ///
    /// The first template that is missing or fails to parse.
    pub fn resolve(dir: Option<&Path>, with_datadog: bool) -> Result<Self, TemplateError> {
        let load = |name: &str| -> Result<ParsedTemplate, TemplateError> {
            match dir {
                Some(dir) => resolve(dir, name),
                None => resolve_bundled(name),
            }
        };
        let primary = PrimaryTemplates {
            postgresql_conf: load(templates::POSTGRESQL_CONF)?,
            pg_hba: load(templates::PG_HBA_CONF)?,
            setup_primary: load(templates::SETUP_PRIMARY)?,
        };
        let replica = ReplicaTemplates {
            setup_replication: load(templates::SETUP_REPLICATION)?,
            health_check: load(templates::HEALTH_CHECK)?,
            health_service: load(templates::HEALTH_SERVICE)?,
            health_timer: load(templates::HEALTH_TIMER)?,
        };
        let datadog = if with_datadog {
            Some(DatadogTemplates {
                install: load(templates::DATADOG_INSTALL)?,
                sql: load(templates::DATADOG_SQL)?,
                conf: load(templates::DATADOG_CONF)?,
            })
        } else {
            None
        };
        Ok(TemplateSet {
            primary,
            replica,
            datadog,
        })
    }
}

/// Every artifact path `generate_all` would write for `topology`, in order.
///
/// Touches nothing on disk.
pub fn plan_artifacts(topology: &Topology, output_dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = primary_artifacts(output_dir).into();
    for replica in &topology.replicas {
        paths.extend(replica_artifacts(output_dir, replica));
    }
    if topology.datadog().is_some() {
        paths.extend(datadog_artifacts(output_dir));
    }
    paths
}

/// Render the full artifact tree for a validated topology.
///
/// Order: primary, each replica in document order, then Datadog when
/// monitoring is enabled. Files that were already written are
/// left on disk when a later one fails.
///
/// # Errors
///
/// * [`GenerateError::OutputDir`] if `output_dir` cannot be created.
/// * [`GenerateError::Template`] if a needed template is missing or invalid.
/// * The first artifact failure under [`ErrorPolicy::FailFast`], or
///   [`GenerateError::Multiple`] under [`ErrorPolicy::KeepGoing`].
pub fn generate_all(
    topology: &Topology,
    output_dir: &Path,
    options: &GenerateOptions,
) -> Result<GenerationReport, GenerateError> {
    fs::create_dir_all(output_dir).map_err(|source| GenerateError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let datadog = topology.datadog();
    let set = TemplateSet::resolve(options.template_dir.as_deref(), datadog.is_some())?;

    let mut run = Run::new(options.error_policy);

    let mut out = run.writer();
    let result = render_primary(topology, &set.primary, output_dir, &mut out);
    run.record(out, result, GenerateError::Primary)?;
    for replica in &topology.replicas {
        let mut out = run.writer();
        let result = render_replica(topology, replica, &set.replica, output_dir, &mut out);
        run.record(out, result, |source| GenerateError::Replica {
            host: replica.host.clone(),
            source,
        })?;
    }
    if let (Some(datadog), Some(dd_templates)) = (datadog, &set.datadog) {
        let mut out = run.writer();
        let result = render_datadog(
            datadog,
            &topology.primary,
            dd_templates,
            output_dir,
            &mut out,
        );
        run.record(out, result, GenerateError::Monitoring)?;
    }

    let report = run.finish()?;
    info!(
        output_dir = %output_dir.display(),
        files = report.written.len(),
        "generation complete"
    );
    Ok(report)
}

/// Accumulates written paths and, under keep-going, entity failures.
struct Run {
    policy: ErrorPolicy,
    written: Vec<PathBuf>,
    failures: Vec<GenerateError>,
}

impl Run {
    fn new(policy: ErrorPolicy) -> Self {
        Run {
            policy,
            written: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn writer(&self) -> ArtifactWriter {
        ArtifactWriter::new(self.policy)
    }

    /// Fold one entity's writer and result into the run.
    ///
    /// Every failed file of the entity becomes its own error, wrapped with
    /// the entity it belongs to.
    fn record(
        &mut self,
        out: ArtifactWriter,
        result: Result<(), RenderError>,
        wrap: impl Fn(RenderError) -> GenerateError,
    ) -> Result<(), GenerateError> {
        let (written, failures) = out.into_parts();
        self.written.extend(written);
        let mut failed = failures.into_iter().chain(result.err()).map(&wrap);
        match self.policy {
            ErrorPolicy::FailFast => match failed.next() {
                Some(err) => Err(err),
                None => Ok(()),
            },
            ErrorPolicy::KeepGoing => {
                for err in failed {
                    warn!(error = %err, "artifact failed, continuing");
                    self.failures.push(err);
                }
                Ok(())
            }
        }
    }

    fn finish(self) -> Result<GenerationReport, GenerateError> {
        if self.failures.is_empty() {
            Ok(GenerationReport {
                written: self.written,
            })
        } else {
            Err(GenerateError::Multiple(self.failures))
        }
    }
}
