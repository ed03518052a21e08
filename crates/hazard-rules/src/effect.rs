//! Effect rules: trigger conditions paired with actions

use crate::id::RuleId;
use crate::scaling::ScalingCurve;
use serde::{Deserialize, Serialize};

/// Condition deciding whether an effect fires for a value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Trigger {
    /// Fires at or above `min`. `hysteresis` is carried but has no effect.
    Threshold { min: f64, hysteresis: f64 },
    Range { min: f64, max: f64 },
    /// Fires with probability `clamp(curve(value), 0, 1)`
    Probability { curve: ScalingCurve },
}

impl Trigger {
    /// Whether the trigger fires. `sample` is drawn only by probability triggers
    /// and must return a uniform value in `[0, 1)`.
    pub fn fires(&self, value: f64, sample: impl FnOnce() -> f64) -> bool {
        match self {
            Trigger::Threshold { min, .. } | Trigger::Range { min, .. } => value >= *min,
            Trigger::Probability { curve } => sample() < probability(curve, value),
        }
    }

    /// Magnitude factor in `[0, 1]` handed to the action
    pub fn factor(&self, value: f64) -> f64 {
        let factor = match self {
            Trigger::Threshold { min, .. } => {
                if value >= *min {
                    1.0
                } else {
                    0.0
                }
            }
            Trigger::Range { min, max } => {
                let denom = max - min;
                if denom <= 0.0 {
                    if value >= *min { 1.0 } else { 0.0 }
                } else {
                    ((value.min(*max) - min) / denom).clamp(0.0, 1.0)
                }
            }
            Trigger::Probability { curve } => probability(curve, value),
        };
        if factor.is_nan() { 0.0 } else { factor }
    }
}

fn probability(curve: &ScalingCurve, value: f64) -> f64 {
    let chance = curve.eval(value);
    if chance.is_nan() {
        0.0
    } else {
        chance.clamp(0.0, 1.0)
    }
}

/// Damage category passed through to the host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DamageKind {
    #[default]
    Magic,
    OnFire,
    InFire,
    Wither,
    Generic,
}

/// Consequence applied to an actor when a trigger fires
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Potion {
        effect: RuleId,
        duration_ticks: u32,
        amplifier: u32,
        #[serde(default)]
        ambient: bool,
        #[serde(default)]
        show_particles: bool,
        #[serde(default)]
        show_icon: bool,
        #[serde(default)]
        scaling: ScalingCurve,
    },
    Damage {
        #[serde(default)]
        damage_type: DamageKind,
        amount: f64,
        #[serde(default)]
        scaling: ScalingCurve,
    },
    Ignite {
        seconds: u32,
        #[serde(default)]
        scaling: ScalingCurve,
    },
    /// Placeholder, never applied
    AttributeModifier {
        attribute: RuleId,
        amount: f64,
        operation: String,
        duration_ticks: u32,
        #[serde(default)]
        scaling: ScalingCurve,
    },
    ClientFx {
        fx_id: RuleId,
        #[serde(default)]
        scaling: ScalingCurve,
        duration_ticks: u32,
    },
    /// Placeholder, never applied
    Command { command: String },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Potion { .. } => "potion",
            Action::Damage { .. } => "damage",
            Action::Ignite { .. } => "ignite",
            Action::AttributeModifier { .. } => "attribute_modifier",
            Action::ClientFx { .. } => "client_fx",
            Action::Command { .. } => "command",
        }
    }
}

/// Trigger plus the action it fires
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectRule {
    pub trigger: Trigger,
    pub action: Action,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_sample() -> f64 {
        panic!("deterministic triggers must not draw a sample")
    }

    #[test]
    fn test_threshold_fires_at_min() {
        let trigger = Trigger::Threshold {
            min: 0.2,
            hysteresis: 0.02,
        };
        assert!(trigger.fires(0.2, no_sample));
        assert!(trigger.fires(3.0, no_sample));
        assert!(!trigger.fires(0.19999, no_sample));
        assert_eq!(trigger.factor(0.2), 1.0);
        assert_eq!(trigger.factor(0.1), 0.0);
    }

    #[test]
    fn test_range_factor() {
        let trigger = Trigger::Range { min: 0.1, max: 1.0 };
        assert_eq!(trigger.factor(0.1), 0.0);
        assert_eq!(trigger.factor(1.0), 1.0);
        assert!((trigger.factor(0.55) - 0.5).abs() < 1e-12);
        assert_eq!(trigger.factor(7.0), 1.0);
        assert!(!trigger.fires(0.05, no_sample));
    }

    #[test]
    fn test_range_degenerate_is_step() {
        let trigger = Trigger::Range { min: 0.5, max: 0.5 };
        assert_eq!(trigger.factor(0.49), 0.0);
        assert_eq!(trigger.factor(0.5), 1.0);
    }

    #[test]
    fn test_probability_uses_sample() {
        let trigger = Trigger::Probability {
            curve: ScalingCurve::Linear01 { min: 0.0, max: 1.0 },
        };
        assert!(trigger.fires(0.5, || 0.49));
        assert!(!trigger.fires(0.5, || 0.5));
        assert_eq!(trigger.factor(0.5), 0.5);
        assert_eq!(trigger.factor(4.0), 1.0);
    }

    #[test]
    fn test_probability_nan_never_fires() {
        let trigger = Trigger::Probability {
            curve: ScalingCurve::Constant { value: f64::NAN },
        };
        assert!(!trigger.fires(1.0, || 0.0));
        assert_eq!(trigger.factor(1.0), 0.0);
    }
}
