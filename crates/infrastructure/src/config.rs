use std::path::Path;

use anyhow::Context;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use domain::{PageEnvironment, TaggingValues, Viewport};

/// Time source used for load timing
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClockKind {
    #[default]
    Monotonic,
    Wall,
}

/// Where the visitor came from, as seen by the page
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct EntrySettings {
    #[serde(default)]
    pub referrer: String,
    /// Query string including the leading `?`
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Run mode, mapped to an environment label when tagging
    pub environment: String,
    pub origin: String,
    pub viewport: Viewport,
    #[serde(default = "default_backup_depth")]
    pub backup_depth: usize,
    #[serde(default)]
    pub clock: ClockKind,
    /// JSON file holding the tagging value tables
    pub values_file: String,
    #[serde(default = "default_console_agent")]
    pub console_agent: bool,
    #[serde(default)]
    pub entry: EntrySettings,
}

fn default_backup_depth() -> usize {
    1
}

fn default_console_agent() -> bool {
    true
}

impl Settings {
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("environment", run_mode.as_str())?
            .set_default("origin", "http://localhost")?
            .set_default("viewport.width", 1920)?
            .set_default("viewport.height", 1080)?
            .set_default("values_file", format!("{}/values.json", config_dir))?
            // Required so a missing config directory fails loudly
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(true))
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // e.g. DDL__ORIGIN=https://example.com, DDL__VIEWPORT__WIDTH=375
            .add_source(Environment::with_prefix("DDL").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn page_environment(&self) -> PageEnvironment {
        PageEnvironment {
            viewport: self.viewport,
            origin: self.origin.clone(),
            run_mode: self.environment.clone(),
        }
    }
}

/// Read and validate the tagging value tables.
///
/// The file is plain JSON: data layer property names are case sensitive and
/// must reach the classifier unchanged.
pub fn load_values(path: impl AsRef<Path>) -> anyhow::Result<TaggingValues> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read values file {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Values file {} is not valid JSON", path.display()))?;

    let values = TaggingValues::from_json(json)
        .with_context(|| format!("Values file {} is invalid", path.display()))?;

    tracing::info!(
        path = %path.display(),
        context = values.regions.context.len(),
        view = values.regions.view.len(),
        action = values.regions.action.len(),
        "📋 Tagging values loaded"
    );
    Ok(values)
}
