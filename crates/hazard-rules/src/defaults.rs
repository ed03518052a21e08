//! Built-in rule presets

use crate::effect::{Action, DamageKind, EffectRule, Trigger};
use crate::hazard_type::{Blocking, Exposure, Falloff, HazardType};
use crate::id::RuleId;
use crate::rule_set::RuleBundle;
use crate::scaling::ScalingCurve;
use crate::source::{Association, HazardSource, Transmission, VoxelMatch};

pub const SOLAR_BURN: &str = "hazardous:solar_burn";
pub const RADIOACTIVE_SOURCE: &str = "hazardous:radioactive_source";
pub const CONTACT_BURN: &str = "hazardous:contact_burn";

pub(crate) fn bundle() -> RuleBundle {
    let mut bundle = RuleBundle::default();
    register_hazard_types(&mut bundle);
    register_sources(&mut bundle);
    register_effects(&mut bundle);
    bundle
}

fn register_hazard_types(bundle: &mut RuleBundle) {
    bundle.hazard_types.insert(
        RuleId::from(SOLAR_BURN),
        HazardType {
            falloff: Falloff::None,
            blocking: Blocking::SimpleOcclusion {
                solid_multiplier: 0.6,
                fluid_multiplier: 0.75,
                treat_leaves_as_solid: true,
            },
            exposure: Exposure {
                apply_interval_ticks: 20,
                accumulate: true,
                exponential_near_cap: true,
                maximum: 120.0,
                decay_per_tick: 0.001,
            },
            effects: vec![
                RuleId::from("hazardous:solar_weakness"),
                RuleId::from("hazardous:solar_ignite"),
            ],
        },
    );

    bundle.hazard_types.insert(
        RuleId::from(RADIOACTIVE_SOURCE),
        HazardType {
            falloff: Falloff::Exponential { k: 0.18 },
            blocking: Blocking::Absorption {
                default_absorption: 0.2,
                voxels: Vec::new(),
                tags: Vec::new(),
            },
            exposure: Exposure {
                apply_interval_ticks: 10,
                accumulate: true,
                exponential_near_cap: false,
                maximum: 200.0,
                decay_per_tick: 0.002,
            },
            effects: vec![
                RuleId::from("hazardous:radiation_damage"),
                RuleId::from("hazardous:radiation_geiger"),
            ],
        },
    );

    bundle.hazard_types.insert(
        RuleId::from(CONTACT_BURN),
        HazardType {
            falloff: Falloff::None,
            blocking: Blocking::None,
            exposure: Exposure {
                apply_interval_ticks: 1,
                accumulate: false,
                exponential_near_cap: false,
                maximum: 10.0,
                decay_per_tick: 0.0,
            },
            effects: Vec::new(),
        },
    );
}

fn register_sources(bundle: &mut RuleBundle) {
    bundle.sources.insert(
        RuleId::from("hazardous:overworld_solar"),
        HazardSource {
            hazard_type: RuleId::from(SOLAR_BURN),
            transmission: Transmission::Sky {
                base_intensity: 0.12,
                requires_direct_sky: true,
                rain_multiplier: 0.25,
                thunder_multiplier: 0.1,
                night_multiplier: 0.0,
                indoor_leak: 0.05,
            },
            association: Association::Level {
                level: RuleId::from("overworld"),
            },
        },
    );

    bundle.sources.insert(
        RuleId::from("hazardous:radioactive_zombie"),
        HazardSource {
            hazard_type: RuleId::from(RADIOACTIVE_SOURCE),
            transmission: Transmission::Point {
                base_intensity: 1.0,
                max_distance: 12.0,
                requires_line_of_sight: true,
                air_attenuation_per_unit: 0.05,
            },
            association: Association::EntityType {
                entity_type: RuleId::from("zombie"),
                max_distance: 3.0,
            },
        },
    );

    bundle.sources.insert(
        RuleId::from("hazardous:near_lava"),
        HazardSource {
            hazard_type: RuleId::from(CONTACT_BURN),
            transmission: Transmission::Contact { base_intensity: 2.5 },
            association: Association::VoxelKind {
                target: VoxelMatch::Kind(RuleId::from("lava")),
                max_distance: 4.0,
            },
        },
    );
}

fn register_effects(bundle: &mut RuleBundle) {
    let mut effect = |id: &str, trigger: Trigger, action: Action| {
        bundle
            .effects
            .insert(RuleId::from(id), EffectRule { trigger, action });
    };

    effect(
        "hazardous:solar_weakness",
        Trigger::Threshold {
            min: 0.05,
            hysteresis: 0.01,
        },
        Action::Potion {
            effect: RuleId::from("weakness"),
            duration_ticks: 200,
            amplifier: 0,
            ambient: true,
            show_particles: true,
            show_icon: true,
            scaling: ScalingCurve::default(),
        },
    );

    effect(
        "hazardous:solar_ignite",
        Trigger::Threshold {
            min: 0.2,
            hysteresis: 0.02,
        },
        Action::Ignite {
            seconds: 2,
            scaling: ScalingCurve::Linear01 { min: 0.2, max: 1.0 },
        },
    );

    effect(
        "hazardous:radiation_damage",
        Trigger::Range { min: 0.1, max: 1.0 },
        Action::Damage {
            damage_type: DamageKind::Magic,
            amount: 1.0,
            scaling: ScalingCurve::Linear01 { min: 0.1, max: 1.0 },
        },
    );

    effect(
        "hazardous:radiation_geiger",
        Trigger::Probability {
            curve: ScalingCurve::Linear01 { min: 0.05, max: 1.0 },
        },
        Action::ClientFx {
            fx_id: RuleId::from("geiger"),
            scaling: ScalingCurve::default(),
            duration_ticks: 20,
        },
    );
}
