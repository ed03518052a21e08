//! Engine configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `hazard.ron` file (if exists)
//! 3. Environment variables prefixed with `HAZARD_`
//!
//! Example environment variable: `HAZARD_REMEDIATION_DOSE=35.0`

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use hazard_rules::{RuleBundle, RuleId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Dose removed by one remediation when the caller gives no amount
pub const DEFAULT_REMEDIATION_DOSE: f64 = 20.0;

fn default_remediation_dose() -> f64 {
    DEFAULT_REMEDIATION_DOSE
}

/// Per-world engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hazard types to evaluate, all when absent
    #[serde(default)]
    pub enabled_hazard_types: Option<Vec<String>>,
    /// Hazard sources to evaluate, all when absent
    #[serde(default)]
    pub enabled_hazard_sources: Option<Vec<String>>,
    #[serde(default = "default_remediation_dose")]
    pub remediation_dose: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled_hazard_types: None,
            enabled_hazard_sources: None,
            remediation_dose: DEFAULT_REMEDIATION_DOSE,
        }
    }
}

impl EngineConfig {
    /// Load from `hazard.ron` in the working directory and the environment
    pub fn load() -> Result<Self> {
        Self::load_from("hazard")
    }

    /// Load with `path` (extension optional) as the file layer
    pub fn load_from(path: &str) -> Result<Self> {
        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("remediation_dose", DEFAULT_REMEDIATION_DOSE)?
            // Layer 2: Config file (optional, won't error if missing)
            .add_source(File::with_name(path).format(FileFormat::Ron).required(false))
            // Layer 3: Environment variables (HAZARD_REMEDIATION_DOSE, etc.)
            .add_source(
                Environment::with_prefix("HAZARD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("enabled_hazard_types")
                    .with_list_parse_key("enabled_hazard_sources"),
            );

        let config = builder.build().context("Failed to build hazard configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize hazard configuration")?;
        log::debug!("Loaded hazard configuration: {config:?}");
        Ok(config)
    }

    pub fn is_type_enabled(&self, hazard: &RuleId) -> bool {
        enabled(&self.enabled_hazard_types, hazard)
    }

    pub fn is_source_enabled(&self, source: &RuleId) -> bool {
        enabled(&self.enabled_hazard_sources, source)
    }

    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize hazard configuration")
    }
}

fn enabled(list: &Option<Vec<String>>, id: &RuleId) -> bool {
    list.as_ref()
        .is_none_or(|ids| ids.iter().any(|entry| entry == id.as_str()))
}

/// Read a RON rule bundle from disk; validation happens when it is activated
pub fn load_rule_bundle(path: impl AsRef<Path>) -> Result<RuleBundle> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rule file {}", path.display()))?;
    let bundle = ron::from_str(&text)
        .with_context(|| format!("Failed to parse rule file {}", path.display()))?;
    log::info!("Read rule bundle from {}", path.display());
    Ok(bundle)
}
