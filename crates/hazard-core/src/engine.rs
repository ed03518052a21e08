//! Per-world hazard engine: evaluation, dose bookkeeping and effects per tick

use crate::config::EngineConfig;
use crate::dose::DoseStore;
use crate::effects::{ActionSink, TriggerRng, apply_effects};
use crate::exposure::ExposureEvaluator;
use crate::index::SectionIndex;
use crate::world::{ActorView, WorldContext};
use glam::IVec3;
use hazard_rules::{RuleBundle, RuleError, RuleId, RuleSet};

/// Result of evaluating one hazard type for one actor
#[derive(Clone, Debug, PartialEq)]
pub struct HazardReading {
    pub hazard: RuleId,
    /// Intensity measured this tick
    pub input: f64,
    /// Stored value after the dose transition
    pub value: f64,
    /// Effects whose trigger fired
    pub fired: usize,
}

/// Everything a tick evaluated, in hazard id order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub readings: Vec<HazardReading>,
}

impl TickReport {
    pub fn reading(&self, hazard: &RuleId) -> Option<&HazardReading> {
        self.readings.iter().find(|reading| &reading.hazard == hazard)
    }
}

/// Hazard state of one world
///
/// Constructed at world load and dropped at unload. All caches (absorption
/// models, last values, doses, the source index) live here.
#[derive(Debug)]
pub struct HazardEngine {
    world_id: RuleId,
    rules: RuleSet,
    config: EngineConfig,
    evaluator: ExposureEvaluator,
    doses: DoseStore,
    index: SectionIndex,
}

impl HazardEngine {
    pub fn new(world_id: impl Into<RuleId>, rules: RuleSet, config: EngineConfig) -> Self {
        let world_id = world_id.into();
        log::info!(
            "Hazard engine for '{}' created with {} hazard types",
            world_id,
            rules.hazard_types().count()
        );
        Self {
            world_id,
            rules,
            config,
            evaluator: ExposureEvaluator::new(),
            doses: DoseStore::new(),
            index: SectionIndex::new(),
        }
    }

    pub fn world_id(&self) -> &RuleId {
        &self.world_id
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    /// Validate and activate a new rule bundle
    ///
    /// On error the previous rules stay active.
    pub fn reload_rules(&mut self, bundle: RuleBundle) -> Result<(), RuleError> {
        match RuleSet::from_bundle(bundle) {
            Ok(rules) => {
                self.rules = rules;
                self.evaluator.clear();
                log::info!("Hazard rules reloaded for '{}'", self.world_id);
                Ok(())
            }
            Err(err) => {
                log::warn!("Keeping previous hazard rules for '{}': {err}", self.world_id);
                Err(err)
            }
        }
    }

    /// Run one simulation tick for an actor
    ///
    /// Each enabled hazard type whose interval divides `game_time` is
    /// evaluated, folded into the actor's dose and checked against its
    /// effects.
    pub fn tick(
        &mut self,
        game_time: u64,
        actor: &ActorView,
        ctx: &WorldContext<'_>,
        rng: &mut dyn TriggerRng,
        sink: &mut dyn ActionSink,
    ) -> TickReport {
        let mut report = TickReport::default();

        for (hazard_id, hazard) in self.rules.hazard_types() {
            if !self.config.is_type_enabled(hazard_id) {
                continue;
            }
            let interval = u64::from(hazard.exposure.apply_interval_ticks.max(1));
            if game_time % interval != 0 {
                continue;
            }

            let input = self.evaluator.compute(&self.rules, hazard_id, actor, ctx, |source| {
                self.config.is_source_enabled(source)
            });
            let record = self.doses.record_mut(actor.id);
            let value = hazard.exposure.calculate(input, record.get(hazard_id));
            record.set(hazard_id, value);

            let fired = apply_effects(&self.rules, hazard, actor.id, value, rng, sink);
            log::trace!("{hazard_id} for actor {}: input {input}, value {value}", actor.id);

            report.readings.push(HazardReading {
                hazard: hazard_id.clone(),
                input,
                value,
                fired,
            });
        }

        report
    }

    /// Intensity of a hazard type at the actor, without touching doses
    pub fn hazard_value(
        &mut self,
        hazard: &RuleId,
        actor: &ActorView,
        ctx: &WorldContext<'_>,
    ) -> f64 {
        if !self.config.is_type_enabled(hazard) {
            return 0.0;
        }
        let config = &self.config;
        self.evaluator.compute(&self.rules, hazard, actor, ctx, |source| {
            config.is_source_enabled(source)
        })
    }

    pub fn last_cached_value(&self, hazard: &RuleId) -> f64 {
        self.evaluator.last_value(hazard)
    }

    pub fn dose(&self, actor: u64, hazard: &RuleId) -> f64 {
        self.doses.dose(actor, hazard)
    }

    pub fn doses(&self) -> &DoseStore {
        &self.doses
    }

    pub fn doses_mut(&mut self) -> &mut DoseStore {
        &mut self.doses
    }

    pub fn reset_doses(&mut self, actor: u64) {
        self.doses.reset(actor);
    }

    /// Carry doses over when an actor is re-instantiated (e.g. respawn)
    pub fn transfer_doses(&mut self, from: u64, to: u64) {
        self.doses.transfer(from, to);
    }

    /// Remove dose from every hazard type of an actor
    ///
    /// `None` uses the configured remediation amount. Returns the total removed.
    pub fn remediate(&mut self, actor: u64, amount: Option<f64>) -> f64 {
        let amount = amount.unwrap_or(self.config.remediation_dose);
        let removed = self.doses.record_mut(actor).remove_from_all(amount);
        log::debug!("Remediated {removed} dose from actor {actor}");
        removed
    }

    pub fn index(&self) -> &SectionIndex {
        &self.index
    }

    /// Source and blocker maintenance, driven by the host's voxel changes
    pub fn index_mut(&mut self) -> &mut SectionIndex {
        &mut self.index
    }

    pub fn nearest_source_distance(&mut self, pos: IVec3) -> f64 {
        self.index.nearest_source_distance(pos)
    }
}
