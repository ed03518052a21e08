//! Validated rule tables

use crate::defaults;
use crate::effect::EffectRule;
use crate::error::RuleError;
use crate::hazard_type::HazardType;
use crate::id::RuleId;
use crate::source::HazardSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unvalidated rule tables as loaded from configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleBundle {
    #[serde(default)]
    pub hazard_types: BTreeMap<RuleId, HazardType>,
    #[serde(default)]
    pub sources: BTreeMap<RuleId, HazardSource>,
    #[serde(default)]
    pub effects: BTreeMap<RuleId, EffectRule>,
}

/// Immutable, validated rule tables
///
/// Only obtainable through [`RuleSet::from_bundle`], so every source is known
/// to reference an existing hazard type through a compatible
/// transmission/association pair.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleSet {
    bundle: RuleBundle,
}

impl RuleSet {
    pub fn from_bundle(bundle: RuleBundle) -> Result<Self, RuleError> {
        if let Err(err) = validate(&bundle) {
            log::error!("Rejected rule set: {err}");
            return Err(err);
        }

        log::info!(
            "Loaded rule set: {} hazard types, {} sources, {} effects",
            bundle.hazard_types.len(),
            bundle.sources.len(),
            bundle.effects.len()
        );
        Ok(Self { bundle })
    }

    /// Parse a RON rule bundle and validate it
    pub fn from_ron_str(text: &str) -> Result<Self, RuleError> {
        let bundle: RuleBundle = ron::from_str(text)?;
        Self::from_bundle(bundle)
    }

    /// Built-in rules: sun exposure, radioactive sources and contact burns
    pub fn defaults() -> Self {
        Self {
            bundle: defaults::bundle(),
        }
    }

    pub fn empty() -> Self {
        Self {
            bundle: RuleBundle::default(),
        }
    }

    pub fn hazard_type(&self, id: &RuleId) -> Option<&HazardType> {
        self.bundle.hazard_types.get(id)
    }

    /// Hazard types in id order
    pub fn hazard_types(&self) -> impl Iterator<Item = (&RuleId, &HazardType)> {
        self.bundle.hazard_types.iter()
    }

    /// Sources of one hazard type in id order
    pub fn sources_of<'a>(
        &'a self,
        hazard_type: &'a RuleId,
    ) -> impl Iterator<Item = (&'a RuleId, &'a HazardSource)> + 'a {
        self.bundle
            .sources
            .iter()
            .filter(move |(_, source)| &source.hazard_type == hazard_type)
    }

    pub fn source(&self, id: &RuleId) -> Option<&HazardSource> {
        self.bundle.sources.get(id)
    }

    pub fn effect(&self, id: &RuleId) -> Option<&EffectRule> {
        self.bundle.effects.get(id)
    }

    pub fn bundle(&self) -> &RuleBundle {
        &self.bundle
    }

    pub fn to_ron_string(&self) -> Result<String, RuleError> {
        ron::ser::to_string_pretty(&self.bundle, ron::ser::PrettyConfig::default())
            .map_err(|e| RuleError::Parse(e.to_string()))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::defaults()
    }
}

fn validate(bundle: &RuleBundle) -> Result<(), RuleError> {
    for (id, hazard) in &bundle.hazard_types {
        let exposure = &hazard.exposure;
        if exposure.apply_interval_ticks < 1 {
            return Err(invalid_exposure(id, "apply_interval_ticks must be at least 1"));
        }
        if !exposure.maximum.is_finite() || exposure.maximum < 0.0 {
            return Err(invalid_exposure(id, "maximum must be finite and non-negative"));
        }
        if exposure.decay_per_tick.is_nan() || exposure.decay_per_tick < 0.0 {
            return Err(invalid_exposure(id, "decay_per_tick must be non-negative"));
        }

        if let Some(effect) = hazard
            .effects
            .iter()
            .find(|effect| !bundle.effects.contains_key(*effect))
        {
            return Err(RuleError::UnknownEffect {
                hazard_type: id.clone(),
                effect: effect.clone(),
            });
        }
    }

    for (id, source) in &bundle.sources {
        if !bundle.hazard_types.contains_key(&source.hazard_type) {
            return Err(RuleError::UnknownHazardType {
                source_id: id.clone(),
                hazard_type: source.hazard_type.clone(),
            });
        }

        let association = source.association.kind();
        if !source.transmission.supports(association) {
            return Err(RuleError::IncompatibleAssociation {
                source_id: id.clone(),
                hazard_type: source.hazard_type.clone(),
                transmission: source.transmission.kind(),
                association,
            });
        }
    }

    Ok(())
}

fn invalid_exposure(id: &RuleId, reason: &str) -> RuleError {
    RuleError::InvalidExposure {
        hazard_type: id.clone(),
        reason: reason.to_string(),
    }
}
