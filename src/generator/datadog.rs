use serde::Serialize;
use std::path::{Path, PathBuf};

use super::templates::{ensure_dir, ArtifactWriter, ParsedTemplate};
use crate::config::{Datadog, PrimaryNode};
use crate::error::RenderError;

pub const DATADOG_DIR: &str = "datadog";

/// Database role the agent connects as; created by `datadog.sql`.
pub const DATADOG_DB_USER: &str = "datadog";

#[derive(Debug, Clone, Serialize)]
pub struct DatadogInstallContext {
    pub api_key: String,
    pub site: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatadogSqlContext {
    pub db_user: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatadogConfContext {
    pub host: String,
    pub port: u16,
    pub db_name: String,
    pub db_user: String,
    pub password: String,
    pub data_directory: String,
}

impl DatadogConfContext {
    pub fn new(datadog: &Datadog, primary: &PrimaryNode) -> Self {
        DatadogConfContext {
            host: primary.host.clone(),
            port: primary.port,
            db_name: primary.db_name.clone(),
            db_user: DATADOG_DB_USER.to_string(),
            password: datadog.password.clone(),
            data_directory: primary.data_directory.clone(),
        }
    }
}

#[derive(Debug)]
pub struct DatadogTemplates {
    pub install: ParsedTemplate,
    pub sql: ParsedTemplate,
    pub conf: ParsedTemplate,
}

pub fn datadog_artifacts(output_dir: &Path) -> [PathBuf; 3] {
    let dir = output_dir.join(DATADOG_DIR);
    [
        dir.join("datadog-install.sh"),
        dir.join("datadog.sql"),
        dir.join("datadog-conf.yaml"),
    ]
}

/// Write `datadog/{datadog-install.sh, datadog.sql, datadog-conf.yaml}`.
///
/// Callers decide whether monitoring is enabled; this always renders.
pub fn render_datadog(
    datadog: &Datadog,
    primary: &PrimaryNode,
    templates: &DatadogTemplates,
    output_dir: &Path,
    out: &mut ArtifactWriter,
) -> Result<(), RenderError> {
    ensure_dir(&output_dir.join(DATADOG_DIR))?;
    let [install, sql, conf] = datadog_artifacts(output_dir);

    out.write(
        install,
        &templates.install,
        &DatadogInstallContext {
            api_key: datadog.api_key.clone(),
            site: datadog.site.clone(),
        },
    )?;
    out.write(
        sql,
        &templates.sql,
        &DatadogSqlContext {
            db_user: DATADOG_DB_USER.to_string(),
            password: datadog.password.clone(),
        },
    )?;
    out.write(
        conf,
        &templates.conf,
        &DatadogConfContext::new(datadog, primary),
    )?;

    Ok(())
}
