//! End-to-end tests driving the engine against a sandbox world

use glam::{DVec3, IVec3};
use hazard_core::effects::{ActionOutcome, NoopSink, RecordingSink};
use hazard_core::index::SectionIndex;
use hazard_core::occlusion::{AbsorptionModel, Raycasting};
use hazard_core::rules::{
    Association, Blocking, Exposure, Falloff, HazardSource, HazardType, KindAbsorption, RuleBundle,
    RuleError, RuleId, RuleSet, Transmission, MIN_EFFECTIVE_INTENSITY,
};
use hazard_core::world::{ActorView, SandboxWorld, VoxelCatalog, WorldContext, cell_center};
use hazard_core::{EngineConfig, HazardEngine};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

const SOLAR: &str = "hazardous:solar_burn";
const RADIATION: &str = "hazardous:radioactive_source";
const CONTACT: &str = "hazardous:contact_burn";

fn id(name: &str) -> RuleId {
    RuleId::from(name)
}

fn default_engine() -> HazardEngine {
    HazardEngine::new("overworld", RuleSet::defaults(), EngineConfig::default())
}

fn player() -> ActorView {
    ActorView::humanoid(1, DVec3::new(0.5, 64.0, 0.5))
}

fn random_cell(rng: &mut Xoshiro256StarStar, extent: i32) -> IVec3 {
    IVec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

// ============================================================================
// Tick flow
// ============================================================================

#[test]
fn test_tick_in_sunlight_applies_weakness() {
    let world = SandboxWorld::new("overworld", 128);
    let catalog = VoxelCatalog::with_defaults();
    let ctx = WorldContext::new(&world, &world, &world, &catalog);
    let mut engine = default_engine();
    let mut rng = Xoshiro256StarStar::seed_from_u64(1);
    let mut sink = RecordingSink::new();

    let report = engine.tick(0, &player(), &ctx, &mut rng, &mut sink);
    assert_eq!(report.readings.len(), 3);

    let solar = report.reading(&id(SOLAR)).unwrap();
    assert!((solar.input - 0.12).abs() < 1e-12);
    assert!((solar.value - 0.12).abs() < 1e-12);
    assert_eq!(solar.fired, 1);
    assert!((engine.dose(1, &id(SOLAR)) - 0.12).abs() < 1e-12);
    assert_eq!(engine.last_cached_value(&id(SOLAR)), solar.input);

    let applied = sink.take();
    assert_eq!(applied.len(), 1);
    assert!(matches!(
        &applied[0],
        (1, ActionOutcome::Potion { effect, amplifier: 0, .. }) if effect.as_str() == "weakness"
    ));
}

#[test]
fn test_no_sun_burn_at_night() {
    let mut world = SandboxWorld::new("overworld", 128);
    world.night = true;
    let catalog = VoxelCatalog::with_defaults();
    let ctx = WorldContext::new(&world, &world, &world, &catalog);
    let mut engine = default_engine();
    let mut rng = Xoshiro256StarStar::seed_from_u64(3);
    let mut sink = RecordingSink::new();

    let report = engine.tick(0, &player(), &ctx, &mut rng, &mut sink);
    let solar = report.reading(&id(SOLAR)).unwrap();
    assert_eq!(solar.input, 0.0);
    assert_eq!(solar.value, 0.0);
    assert_eq!(solar.fired, 0);
    assert!(sink.take().is_empty());
}

#[test]
fn test_interval_gating() {
    let world = SandboxWorld::new("overworld", 128);
    let catalog = VoxelCatalog::with_defaults();
    let ctx = WorldContext::new(&world, &world, &world, &catalog);
    let mut engine = default_engine();
    let mut rng = Xoshiro256StarStar::seed_from_u64(1);

    // Contact burn runs every tick, radiation every 10, solar every 20
    let hazards_at = |engine: &mut HazardEngine, rng: &mut Xoshiro256StarStar, time: u64| {
        let report = engine.tick(time, &player(), &ctx, rng, &mut NoopSink);
        report
            .readings
            .iter()
            .map(|reading| reading.hazard.as_str().to_string())
            .collect::<Vec<_>>()
    };

    assert_eq!(hazards_at(&mut engine, &mut rng, 1), vec![CONTACT]);
    assert_eq!(hazards_at(&mut engine, &mut rng, 10), vec![CONTACT, RADIATION]);
    assert_eq!(hazards_at(&mut engine, &mut rng, 40), vec![CONTACT, RADIATION, SOLAR]);
}

#[test]
fn test_solar_dose_approaches_cap() {
    let world = SandboxWorld::new("overworld", 128);
    let catalog = VoxelCatalog::with_defaults();
    let ctx = WorldContext::new(&world, &world, &world, &catalog);
    let mut engine = default_engine();
    let mut rng = Xoshiro256StarStar::seed_from_u64(5);

    let mut last = 0.0;
    for step in 0..500u64 {
        engine.tick(step * 20, &player(), &ctx, &mut rng, &mut NoopSink);
        let dose = engine.dose(1, &id(SOLAR));
        assert!(dose >= last - 0.001);
        assert!(dose <= 120.0);
        last = dose;
    }
    assert!(last > 30.0);
}

#[test]
fn test_contact_burn_from_lava() {
    let mut world = SandboxWorld::new("overworld", 128);
    let catalog = VoxelCatalog::with_defaults();
    world.set_voxel(IVec3::new(0, 64, 0), catalog.lookup("lava").unwrap());
    let ctx = WorldContext::new(&world, &world, &world, &catalog);
    let mut engine = default_engine();
    let mut rng = Xoshiro256StarStar::seed_from_u64(5);

    let report = engine.tick(1, &player(), &ctx, &mut rng, &mut NoopSink);
    let contact = report.reading(&id(CONTACT)).unwrap();
    assert_eq!(contact.input, 2.5);
    assert_eq!(contact.value, 2.5);
}

#[test]
fn test_radioactive_zombie_nearby() {
    let mut world = SandboxWorld::new("overworld", 128);
    world.spawn(50, "zombie", DVec3::new(2.5, 64.0, 0.5), 0.6, 1.95);
    let catalog = VoxelCatalog::with_defaults();
    let ctx = WorldContext::new(&world, &world, &world, &catalog);
    let mut engine = default_engine();

    let value = engine.hazard_value(&id(RADIATION), &player(), &ctx);
    let expected = (-0.18f64 * 2.0).exp() * (-0.05f64 * 2.0).exp();
    assert!((value - expected).abs() < 1e-9);
    // Inspection leaves doses alone
    assert_eq!(engine.dose(1, &id(RADIATION)), 0.0);
}

// ============================================================================
// Configuration and reloads
// ============================================================================

#[test]
fn test_disabled_types_and_sources() {
    let world = SandboxWorld::new("overworld", 128);
    let catalog = VoxelCatalog::with_defaults();
    let ctx = WorldContext::new(&world, &world, &world, &catalog);
    let config = EngineConfig {
        enabled_hazard_types: Some(vec![SOLAR.to_string(), CONTACT.to_string()]),
        enabled_hazard_sources: Some(Vec::new()),
        ..EngineConfig::default()
    };
    let mut engine = HazardEngine::new("overworld", RuleSet::defaults(), config);
    let mut rng = Xoshiro256StarStar::seed_from_u64(9);

    let report = engine.tick(0, &player(), &ctx, &mut rng, &mut NoopSink);
    let hazards: Vec<_> = report.readings.iter().map(|r| r.hazard.as_str()).collect();
    assert_eq!(hazards, vec![CONTACT, SOLAR]);
    assert!(report.readings.iter().all(|r| r.input == 0.0));
}

#[test]
fn test_invalid_reload_keeps_previous_rules() {
    let mut engine = default_engine();
    let mut bundle = engine.rules().bundle().clone();
    bundle.sources.insert(
        id("test:broken"),
        HazardSource {
            hazard_type: id(SOLAR),
            transmission: Transmission::Contact { base_intensity: 1.0 },
            association: Association::Level { level: id("overworld") },
        },
    );

    let err = engine.reload_rules(bundle).unwrap_err();
    match &err {
        RuleError::IncompatibleAssociation { source_id, .. } => {
            assert_eq!(source_id.as_str(), "test:broken")
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(engine.rules().source(&id("test:broken")).is_none());
    assert!(engine.rules().hazard_type(&id(SOLAR)).is_some());
}

#[test]
fn test_reload_replaces_rules_and_clears_cache() {
    let world = SandboxWorld::new("overworld", 128);
    let catalog = VoxelCatalog::with_defaults();
    let ctx = WorldContext::new(&world, &world, &world, &catalog);
    let mut engine = default_engine();
    engine.hazard_value(&id(SOLAR), &player(), &ctx);
    assert!(engine.last_cached_value(&id(SOLAR)) > 0.0);

    let mut bundle = RuleBundle::default();
    bundle.hazard_types.insert(
        id("test:heat"),
        HazardType {
            falloff: Falloff::None,
            blocking: Blocking::None,
            exposure: Exposure::default(),
            effects: Vec::new(),
        },
    );
    engine.reload_rules(bundle).unwrap();
    assert_eq!(engine.last_cached_value(&id(SOLAR)), 0.0);
    assert!(engine.rules().hazard_type(&id(SOLAR)).is_none());
}

// ============================================================================
// Dose lifecycle
// ============================================================================

#[test]
fn test_respawn_transfer_and_remediation() {
    let mut engine = default_engine();
    engine.doses_mut().record_mut(1).set(&id(SOLAR), 5.0);
    engine.doses_mut().record_mut(1).set(&id(RADIATION), 30.0);

    engine.transfer_doses(1, 2);
    assert_eq!(engine.dose(2, &id(RADIATION)), 30.0);
    assert_eq!(engine.dose(1, &id(RADIATION)), 0.0);

    let removed = engine.remediate(2, None);
    assert_eq!(removed, 25.0);
    assert_eq!(engine.dose(2, &id(SOLAR)), 0.0);
    assert_eq!(engine.dose(2, &id(RADIATION)), 10.0);

    engine.reset_doses(2);
    assert_eq!(engine.dose(2, &id(RADIATION)), 0.0);
}

#[test]
fn test_dose_record_persists_across_engines() {
    let world = SandboxWorld::new("overworld", 128);
    let catalog = VoxelCatalog::with_defaults();
    let ctx = WorldContext::new(&world, &world, &world, &catalog);
    let mut engine = default_engine();
    let mut rng = Xoshiro256StarStar::seed_from_u64(2);
    for step in 0..10u64 {
        engine.tick(step * 20, &player(), &ctx, &mut rng, &mut NoopSink);
    }

    let bytes = engine.doses().record(1).unwrap().encode().unwrap();
    let mut restored = default_engine();
    let decoded = hazard_core::DoseRecord::decode(&bytes).unwrap();
    restored.doses_mut().record_mut(1).copy_from(&decoded);
    assert_eq!(
        restored.dose(1, &id(SOLAR)).to_bits(),
        engine.dose(1, &id(SOLAR)).to_bits()
    );
}

// ============================================================================
// Section index against the voxel occlusion model
// ============================================================================

#[test]
fn test_index_agrees_with_voxel_line_scan() {
    let catalog = VoxelCatalog::with_defaults();
    let shields = [("stone", 0.5), ("dirt", 0.2), ("lead_block", 0.7), ("glass", 1.0)];
    let blocking = Blocking::Absorption {
        default_absorption: 0.0,
        voxels: shields
            .iter()
            .map(|(name, absorption)| KindAbsorption {
                voxel: id(name),
                absorption: *absorption,
            })
            .collect(),
        tags: Vec::new(),
    };
    let mut rng = Xoshiro256StarStar::seed_from_u64(77);

    for _ in 0..10 {
        let mut world = SandboxWorld::new("overworld", 64);
        let mut index = SectionIndex::new();
        let mut model = AbsorptionModel::from_blocking(&blocking, &catalog).unwrap();

        for _ in 0..500 {
            let pos = random_cell(&mut rng, 20);
            let (name, absorption) = shields[rng.gen_range(0..shields.len())];
            world.set_voxel(pos, catalog.lookup(name).unwrap());
            index.add_blocker(pos, 1.0 - absorption);
        }

        let mut sources = Vec::new();
        for _ in 0..25 {
            let pos = random_cell(&mut rng, 20);
            if index.add_source(pos) {
                sources.push(pos);
            }
        }

        for _ in 0..25 {
            let query = random_cell(&mut rng, 24);
            let body = cell_center(query);
            let eye = body + DVec3::Y;

            let expected = sources
                .iter()
                .map(|&source| {
                    let from = cell_center(source);
                    let body_factor =
                        Raycasting::line_factor(&mut model, &world, &catalog, from, body, 0.0);
                    let eye_factor =
                        Raycasting::line_factor(&mut model, &world, &catalog, from, eye, 0.0);
                    let factor = body_factor.max(eye_factor);
                    if factor > MIN_EFFECTIVE_INTENSITY {
                        (source - query).as_dvec3().length() / factor
                    } else {
                        f64::INFINITY
                    }
                })
                .fold(f64::INFINITY, f64::min);

            let actual = index.nearest_source_distance(query);
            if expected.is_infinite() {
                assert!(actual.is_infinite(), "expected no reachable source, got {actual}");
            } else {
                assert!(
                    (actual - expected).abs() <= 1e-9 * expected.max(1.0),
                    "query {query}: index {actual}, line scan {expected}"
                );
            }
        }
    }
}
