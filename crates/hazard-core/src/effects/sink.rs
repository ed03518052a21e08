//! Resolved actions and the host-side sink that applies them

use hazard_rules::{DamageKind, RuleId};

/// An action with its final magnitude, ready for the host to apply
#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    Potion {
        effect: RuleId,
        duration_ticks: u32,
        amplifier: u32,
        ambient: bool,
        show_particles: bool,
        show_icon: bool,
    },
    Damage {
        kind: DamageKind,
        amount: f64,
    },
    Ignite {
        seconds: u32,
    },
    ClientFx {
        fx_id: RuleId,
        intensity: f64,
        duration_ticks: u32,
    },
}

/// Host hook receiving fired actions
pub trait ActionSink {
    fn apply(&mut self, actor: u64, outcome: &ActionOutcome);
}

/// Discards every action
pub struct NoopSink;

impl ActionSink for NoopSink {
    fn apply(&mut self, _actor: u64, _outcome: &ActionOutcome) {}
}

/// Keeps every applied action, for headless hosts and tests
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub applied: Vec<(u64, ActionOutcome)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<(u64, ActionOutcome)> {
        std::mem::take(&mut self.applied)
    }
}

impl ActionSink for RecordingSink {
    fn apply(&mut self, actor: u64, outcome: &ActionOutcome) {
        self.applied.push((actor, outcome.clone()));
    }
}
