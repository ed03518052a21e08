//! Hazard rule data for the hazard engine
//!
//! This crate provides the declarative rule model shared by every world:
//! - Hazard types (HazardType, Falloff, Blocking, Exposure)
//! - Hazard sources (HazardSource, Transmission, Association)
//! - Effect rules (EffectRule, Trigger, Action, ScalingCurve)
//! - Validated rule sets (RuleBundle, RuleSet) and the built-in defaults

pub mod defaults;
mod effect;
mod error;
mod hazard_type;
mod id;
mod rule_set;
mod scaling;
mod source;

pub use effect::{Action, DamageKind, EffectRule, Trigger};
pub use error::RuleError;
pub use hazard_type::{Blocking, Exposure, Falloff, HazardType, KindAbsorption, TagAbsorption};
pub use id::RuleId;
pub use rule_set::{RuleBundle, RuleSet};
pub use scaling::ScalingCurve;
pub use source::{
    Association, AssociationKind, HazardSource, Transmission, TransmissionKind, VoxelMatch,
};

/// Intensities at or below this value are treated as exactly zero.
pub const MIN_EFFECTIVE_INTENSITY: f64 = 1e-6;
