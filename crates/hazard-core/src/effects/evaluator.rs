//! Effect rule evaluation: triggers, magnitudes and dispatch

use super::rng::TriggerRng;
use super::sink::{ActionOutcome, ActionSink};
use hazard_rules::{Action, HazardType, RuleSet};

/// Longest burn an ignite action may request, in seconds
pub const MAX_IGNITE_SECONDS: i64 = 600;

/// Final magnitude of an action, `None` when it would do nothing
pub fn resolve_action(action: &Action, value: f64, factor: f64) -> Option<ActionOutcome> {
    if factor.is_nan() || factor <= 0.0 {
        return None;
    }

    match action {
        Action::Potion {
            effect,
            duration_ticks,
            amplifier,
            ambient,
            show_particles,
            show_icon,
            scaling,
        } => {
            let scale = scaling.eval(value) * factor;
            if scale.is_nan() || scale <= 0.0 {
                return None;
            }
            let amplifier = (*amplifier as f64 * scale).round().max(0.0);
            Some(ActionOutcome::Potion {
                effect: effect.clone(),
                duration_ticks: (*duration_ticks).max(1),
                amplifier: amplifier.min(u32::MAX as f64) as u32,
                ambient: *ambient,
                show_particles: *show_particles,
                show_icon: *show_icon,
            })
        }
        Action::Damage {
            damage_type,
            amount,
            scaling,
        } => {
            let amount = amount * scaling.eval(value) * factor;
            if amount.is_nan() || amount <= 0.0 {
                return None;
            }
            Some(ActionOutcome::Damage {
                kind: *damage_type,
                amount,
            })
        }
        Action::Ignite { seconds, scaling } => {
            let scaled = (scaling.eval(value) * factor * *seconds as f64).round();
            if scaled.is_nan() || scaled <= 0.0 {
                return None;
            }
            let seconds = (scaled as i64).clamp(0, MAX_IGNITE_SECONDS) as u32;
            Some(ActionOutcome::Ignite { seconds })
        }
        Action::ClientFx {
            fx_id,
            scaling,
            duration_ticks,
        } => {
            let intensity = scaling.eval(value) * factor;
            if intensity.is_nan() || intensity <= 0.0 {
                return None;
            }
            Some(ActionOutcome::ClientFx {
                fx_id: fx_id.clone(),
                intensity,
                duration_ticks: *duration_ticks,
            })
        }
        Action::AttributeModifier { attribute, .. } => {
            log::debug!("Attribute modifier on '{attribute}' is not applied");
            None
        }
        Action::Command { command } => {
            log::debug!("Command action '{command}' is not applied");
            None
        }
    }
}

/// Evaluate every effect of a hazard type and hand fired actions to the sink
///
/// Returns the number of effects whose trigger fired.
pub fn apply_effects(
    rules: &RuleSet,
    hazard: &HazardType,
    actor: u64,
    value: f64,
    rng: &mut dyn TriggerRng,
    sink: &mut dyn ActionSink,
) -> usize {
    let mut fired = 0;
    for effect_id in &hazard.effects {
        let Some(effect) = rules.effect(effect_id) else {
            continue;
        };
        if !effect.trigger.fires(value, || rng.gen_unit()) {
            continue;
        }
        fired += 1;

        let factor = effect.trigger.factor(value);
        if let Some(outcome) = resolve_action(&effect.action, value, factor) {
            log::trace!("{effect_id} fired for actor {actor}: {outcome:?}");
            sink.apply(actor, &outcome);
        }
    }
    fired
}
