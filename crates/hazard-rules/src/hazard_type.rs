//! Hazard type definitions: falloff, blocking and exposure policy

use crate::id::RuleId;
use serde::{Deserialize, Serialize};

/// Distance decay applied to a point source's base intensity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Falloff {
    #[default]
    None,
    InverseSquare { min_distance: f64 },
    Linear,
    Exponential { k: f64 },
}

impl Falloff {
    /// Decayed intensity at `distance`. The max-distance cut-off is not applied here.
    pub fn apply(&self, base: f64, distance: f64, max_distance: f64) -> f64 {
        match self {
            Falloff::None => base,
            Falloff::InverseSquare { min_distance } => {
                let d = min_distance.max(distance.max(1e-4));
                base / (d * d)
            }
            Falloff::Linear => {
                if max_distance <= 0.0 {
                    return base;
                }
                base * (1.0 - distance / max_distance).max(0.0)
            }
            Falloff::Exponential { k } => base * (-k * distance).exp(),
        }
    }
}

/// Absorption override for one voxel kind
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KindAbsorption {
    pub voxel: RuleId,
    pub absorption: f64,
}

/// Absorption override for every voxel carrying a tag
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagAbsorption {
    pub tag: RuleId,
    pub absorption: f64,
}

/// How intervening voxels reduce a hazard's intensity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Blocking {
    #[default]
    None,
    SimpleOcclusion {
        solid_multiplier: f64,
        fluid_multiplier: f64,
        treat_leaves_as_solid: bool,
    },
    Absorption {
        default_absorption: f64,
        #[serde(default)]
        voxels: Vec<KindAbsorption>,
        #[serde(default)]
        tags: Vec<TagAbsorption>,
    },
}

impl Blocking {
    pub fn is_none(&self) -> bool {
        matches!(self, Blocking::None)
    }
}

/// Dose accumulation policy of a hazard type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exposure {
    /// Evaluate only on ticks divisible by this interval
    pub apply_interval_ticks: u32,
    pub accumulate: bool,
    /// Scale increments by the remaining headroom below the cap
    pub exponential_near_cap: bool,
    /// Cap for the stored dose, 0 means uncapped
    pub maximum: f64,
    pub decay_per_tick: f64,
}

impl Default for Exposure {
    fn default() -> Self {
        Self {
            apply_interval_ticks: 20,
            accumulate: true,
            exponential_near_cap: false,
            maximum: 0.0,
            decay_per_tick: 0.0,
        }
    }
}

impl Exposure {
    pub fn is_capped(&self) -> bool {
        self.maximum > 0.0
    }

    /// Next dose from this tick's input intensity and the stored dose
    pub fn calculate(&self, input: f64, current: f64) -> f64 {
        if !self.accumulate {
            return self.clamp(input);
        }

        let mut cur = current;
        if self.decay_per_tick > 0.0 {
            cur = (cur - self.decay_per_tick).max(0.0);
        }

        let next = if self.is_capped() && self.exponential_near_cap && input >= 0.0 {
            let headroom = (1.0 - cur / self.maximum).clamp(0.0, 1.0);
            cur + input * headroom
        } else {
            cur + input
        };

        self.clamp(next)
    }

    fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        if self.is_capped() {
            value.clamp(0.0, self.maximum)
        } else {
            value.max(0.0)
        }
    }
}

/// A named kind of environmental danger
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct HazardType {
    #[serde(default)]
    pub falloff: Falloff,
    #[serde(default)]
    pub blocking: Blocking,
    #[serde(default)]
    pub exposure: Exposure,
    /// Effect rule ids, evaluated in order
    #[serde(default)]
    pub effects: Vec<RuleId>,
}
