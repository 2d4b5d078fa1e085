use crate::error::RxError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the rule catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    /// One of the embedded catalogs in [`crate::catalog::builtin::PRESETS`].
    Preset(String),
    /// A JSON catalog on disk.
    File(PathBuf),
}

impl Default for CatalogSource {
    fn default() -> Self {
        CatalogSource::Preset("demo".to_string())
    }
}

/// Which secondary analysis, if any, is merged into every check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecondaryMode {
    #[default]
    Off,
    Mock,
}

impl SecondaryMode {
    pub fn from_str_loose(s: &str) -> Option<SecondaryMode> {
        match s.trim().to_lowercase().as_str() {
            "off" | "none" => Some(SecondaryMode::Off),
            "mock" => Some(SecondaryMode::Mock),
            _ => None,
        }
    }
}

/// Runtime settings for a [`crate::Triage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub catalog: CatalogSource,
    pub secondary: SecondaryMode,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogSource::default(),
            secondary: SecondaryMode::default(),
            log_filter: default_log_filter(),
        }
    }
}

pub fn default_log_filter() -> String {
    "rxcheck=info,rxcheck_core=info".to_string()
}

/// Load a config file. A relative catalog path is resolved against the
/// directory holding the config.
pub fn load_config(path: &Path) -> Result<TriageConfig, RxError> {
    let content = std::fs::read_to_string(path).map_err(|e| RxError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut config = parse_config_str(&content).map_err(|e| RxError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if let CatalogSource::File(file) = &config.catalog {
        if file.is_relative() {
            if let Some(dir) = path.parent() {
                config.catalog = CatalogSource::File(dir.join(file));
            }
        }
    }
    Ok(config)
}

pub fn parse_config_str(json: &str) -> Result<TriageConfig, RxError> {
    let config: TriageConfig = serde_json::from_str(json)?;
    if let CatalogSource::Preset(name) = &config.catalog {
        if name.trim().is_empty() {
            return Err(RxError::ParseError("catalog preset name is empty".into()));
        }
    }
    if config.log_filter.trim().is_empty() {
        return Err(RxError::ParseError("log_filter must not be empty".into()));
    }
    Ok(config)
}
