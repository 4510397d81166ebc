use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{RenderError, TemplateError};

/// `postgresql.conf` overrides for the primary.
pub const POSTGRESQL_CONF: &str = "postgresql.conf.txt";
/// `pg_hba.conf` replication rules for the primary.
pub const PG_HBA_CONF: &str = "pg_hba.conf.txt";
/// Role and slot bootstrap script for the primary.
pub const SETUP_PRIMARY: &str = "setup_primary.sh.txt";
/// Base-backup and standby setup script for a replica.
pub const SETUP_REPLICATION: &str = "setup_replication.sh.txt";
/// Replica-side health check and optional promotion.
pub const HEALTH_CHECK: &str = "health_check.sh.txt";
/// systemd service running the health check.
pub const HEALTH_SERVICE: &str = "ha-postgres-health.service.txt";
/// systemd timer driving the health check service.
pub const HEALTH_TIMER: &str = "ha-postgres-health.timer.txt";
/// Datadog agent install script.
pub const DATADOG_INSTALL: &str = "datadog-install.sh.txt";
/// SQL creating the Datadog monitoring role.
pub const DATADOG_SQL: &str = "datadog.sql.txt";
/// Datadog postgres integration config.
pub const DATADOG_CONF: &str = "datadog-conf.yaml.txt";

/// Template sources compiled into the binary, keyed by template name.
///
/// Used whenever no template directory is configured.
pub const BUNDLED_TEMPLATES: &[(&str, &str)] = &[
    (POSTGRESQL_CONF, include_str!("../../templates/postgresql.conf.txt")),
    (PG_HBA_CONF, include_str!("../../templates/pg_hba.conf.txt")),
    (SETUP_PRIMARY, include_str!("../../templates/setup_primary.sh.txt")),
    (SETUP_REPLICATION, include_str!("../../templates/setup_replication.sh.txt")),
    (HEALTH_CHECK, include_str!("../../templates/health_check.sh.txt")),
    (HEALTH_SERVICE, include_str!("../../templates/ha-postgres-health.service.txt")),
    (HEALTH_TIMER, include_str!("../../templates/ha-postgres-health.timer.txt")),
    (DATADOG_INSTALL, include_str!("../../templates/datadog-install.sh.txt")),
    (DATADOG_SQL, include_str!("../../templates/datadog.sql.txt")),
    (DATADOG_CONF, include_str!("../../templates/datadog-conf.yaml.txt")),
];

/// A template source that has been read and parsed.
///
/// Each parsed template owns its own engine environment, so it is
/// independent of the directory it came from and of every other template.
/// Undefined context keys are errors rather than empty strings.
pub struct ParsedTemplate {
    name: String,
    env: Environment<'static>,
}

impl std::fmt::Debug for ParsedTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedTemplate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ParsedTemplate {
    /// Parse a template from source text.
    ///
    /// # Errors
    ///
    /// [`TemplateError::Parse`] on a syntax error or unknown directive.
    pub fn from_source(name: &str, source: String) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_template_owned(name.to_string(), source)
            .map_err(|source| TemplateError::Parse {
                name: name.to_string(),
                source,
            })?;
        Ok(ParsedTemplate {
            name: name.to_string(),
            env,
        })
    }

    /// Template name (its file name in the template directory).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute the template against a context.
    ///
    /// # Errors
    ///
    /// [`RenderError::Execute`] when the template needs something the
    /// context does not provide.
    pub fn render<C: Serialize>(&self, context: &C) -> Result<String, RenderError> {
        let execute_err = |source| RenderError::Execute {
            template: self.name.clone(),
            source,
        };
        self.env
            .get_template(&self.name)
            .and_then(|t| t.render(context))
            .map_err(execute_err)
    }
}

/// Load and parse `name` from `dir`.
///
/// # Errors
///
/// [`TemplateError::Read`] if the file is missing or unreadable,
/// [`TemplateError::Parse`] if it does not parse.
pub fn resolve(dir: &Path, name: &str) -> Result<ParsedTemplate, TemplateError> {
    let path = dir.join(name);
    let source = fs::read_to_string(&path).map_err(|source| TemplateError::Read {
        name: name.to_string(),
        path: path.clone(),
        source,
    })?;
    let template = ParsedTemplate::from_source(name, source)?;
    debug!(template = name, path = %path.display(), "resolved template");
    Ok(template)
}

/// Parse the compiled-in copy of `name`.
///
/// # Errors
///
/// [`TemplateError::NotBundled`] for an unknown name,
/// [`TemplateError::Parse`] if the source does not parse.
pub fn resolve_bundled(name: &str) -> Result<ParsedTemplate, TemplateError> {
    let (_, source) = BUNDLED_TEMPLATES
        .iter()
        .find(|(n, _)| *n == name)
        .ok_or_else(|| TemplateError::NotBundled {
            name: name.to_string(),
        })?;
    let template = ParsedTemplate::from_source(name, (*source).to_string())?;
    debug!(template = name, "resolved bundled template");
    Ok(template)
}

/// Render `template` with `context` and write the result to `path`.
///
/// The whole artifact is rendered before the file is opened, so a failing
/// template never leaves a truncated file behind. Files with an `.sh`
/// extension are made executable (0755).
///
/// # Errors
///
/// Any [`RenderError`].
pub fn write_artifact<C: Serialize>(
    path: &Path,
    template: &ParsedTemplate,
    context: &C,
) -> Result<(), RenderError> {
    let rendered = template.render(context)?;
    fs::write(path, rendered).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    if is_script(path) {
        make_executable(path)?;
    }
    info!(path = %path.display(), template = template.name(), "wrote artifact");
    Ok(())
}

/// What a run does when an artifact fails to render or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first failing artifact.
    #[default]
    FailFast,
    /// Write every remaining artifact and report all failures together.
    KeepGoing,
}

/// Writes the artifacts of one entity and applies the [`ErrorPolicy`]
/// per file.
///
/// Under [`ErrorPolicy::KeepGoing`] a failed file is recorded and the
/// remaining files of the same entity are still written.
#[derive(Debug)]
pub struct ArtifactWriter {
    policy: ErrorPolicy,
    written: Vec<PathBuf>,
    failures: Vec<RenderError>,
}

impl ArtifactWriter {
    pub fn new(policy: ErrorPolicy) -> Self {
        ArtifactWriter {
            policy,
            written: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Write one artifact through [`write_artifact`].
    ///
    /// # Errors
    ///
    /// The write failure under [`ErrorPolicy::FailFast`]. Under
    /// [`ErrorPolicy::KeepGoing`] this never fails.
    pub fn write<C: Serialize>(
        &mut self,
        path: PathBuf,
        template: &ParsedTemplate,
        context: &C,
    ) -> Result<(), RenderError> {
        match write_artifact(&path, template, context) {
            Ok(()) => {
                self.written.push(path);
                Ok(())
            }
            Err(err) => match self.policy {
                ErrorPolicy::FailFast => Err(err),
                ErrorPolicy::KeepGoing => {
                    self.failures.push(err);
                    Ok(())
                }
            },
        }
    }

    /// Paths written so far, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Written paths and recorded failures.
    pub fn into_parts(self) -> (Vec<PathBuf>, Vec<RenderError>) {
        (self.written, self.failures)
    }
}

/// Create an entity directory (and parents).
pub(crate) fn ensure_dir(dir: &Path) -> Result<(), RenderError> {
    fs::create_dir_all(dir).map_err(|source| RenderError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

pub(crate) fn is_script(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "sh")
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), RenderError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|source| {
        RenderError::Permissions {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), RenderError> {
    Ok(())
}
