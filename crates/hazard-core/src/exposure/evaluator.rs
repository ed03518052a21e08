//! Per-tick hazard intensity evaluation

use super::transmission::{PointEmission, SkyEmission, point_blocked, point_raw, sky_intensity};
use crate::occlusion::AbsorptionModel;
use crate::world::{ActorView, WorldContext, cell_center};
use ahash::AHashMap;
use glam::IVec3;
use hazard_rules::{
    Association, HazardSource, HazardType, MIN_EFFECTIVE_INTENSITY, RuleId, RuleSet, Transmission,
    VoxelMatch,
};

/// Sums every enabled source of a hazard type at the actor's position
///
/// Owns the per-world caches: absorption models per hazard type and the last
/// value computed per hazard type.
#[derive(Debug, Default)]
pub struct ExposureEvaluator {
    absorption: AHashMap<RuleId, Option<AbsorptionModel>>,
    last_values: AHashMap<RuleId, f64>,
}

impl ExposureEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop cached models and values, e.g. after a rule reload
    pub fn clear(&mut self) {
        self.absorption.clear();
        self.last_values.clear();
    }

    /// Last value computed for a hazard type, 0 if never evaluated
    pub fn last_value(&self, hazard_id: &RuleId) -> f64 {
        self.last_values.get(hazard_id).copied().unwrap_or(0.0)
    }

    /// Total intensity of `hazard_id` at the actor, always `>= 0`
    ///
    /// Sources rejected by `source_enabled` are skipped. Unknown hazard types
    /// evaluate to 0.
    pub fn compute(
        &mut self,
        rules: &RuleSet,
        hazard_id: &RuleId,
        actor: &ActorView,
        ctx: &WorldContext<'_>,
        source_enabled: impl Fn(&RuleId) -> bool,
    ) -> f64 {
        let Some(hazard) = rules.hazard_type(hazard_id) else {
            return 0.0;
        };

        let model = self
            .absorption
            .entry(hazard_id.clone())
            .or_insert_with(|| AbsorptionModel::from_blocking(&hazard.blocking, ctx.catalog));

        let mut total = 0.0;
        for (source_id, source) in rules.sources_of(hazard_id) {
            if !source_enabled(source_id) {
                continue;
            }
            let contribution = contribute(hazard, source, model.as_mut(), actor, ctx);
            log::trace!("{source_id} contributes {contribution} to {hazard_id}");
            total += contribution;
        }

        let total = if total.is_nan() { 0.0 } else { total.max(0.0) };
        self.last_values.insert(hazard_id.clone(), total);
        total
    }
}

/// Transmission parameters, pulled out of the rule once per source
#[derive(Clone, Copy, Debug)]
enum Emission {
    Sky(SkyEmission),
    Point(PointEmission),
    Contact(f64),
}

impl Emission {
    fn of(transmission: &Transmission) -> Self {
        match *transmission {
            Transmission::Sky {
                base_intensity,
                requires_direct_sky,
                rain_multiplier,
                thunder_multiplier,
                night_multiplier,
                indoor_leak,
            } => Emission::Sky(SkyEmission {
                base_intensity,
                requires_direct_sky,
                rain_multiplier,
                thunder_multiplier,
                night_multiplier,
                indoor_leak,
            }),
            Transmission::Point {
                base_intensity,
                max_distance,
                requires_line_of_sight,
                air_attenuation_per_unit,
            } => Emission::Point(PointEmission {
                base_intensity,
                max_distance,
                requires_line_of_sight,
                air_attenuation_per_unit,
            }),
            Transmission::Contact { base_intensity } => Emission::Contact(base_intensity),
        }
    }
}

fn contribute(
    hazard: &HazardType,
    source: &HazardSource,
    model: Option<&mut AbsorptionModel>,
    actor: &ActorView,
    ctx: &WorldContext<'_>,
) -> f64 {
    match (&source.association, Emission::of(&source.transmission)) {
        (Association::Level { level }, Emission::Sky(sky)) => {
            if ctx.environment.world_id() != level {
                return 0.0;
            }
            sky_intensity(model, ctx, &sky, actor)
        }
        (Association::Biome { biome }, Emission::Sky(sky)) => {
            if !ctx.voxels.biome_matches(actor.cell(), biome) {
                return 0.0;
            }
            sky_intensity(model, ctx, &sky, actor)
        }
        (Association::Region, Emission::Sky(sky)) => {
            let in_region = ctx
                .regions
                .is_some_and(|regions| regions.is_in_region(actor.cell()));
            if !in_region {
                return 0.0;
            }
            sky_intensity(model, ctx, &sky, actor)
        }
        (
            Association::EntityType {
                entity_type,
                max_distance,
            },
            Emission::Point(point),
        ) => entity_point(hazard, &point, entity_type, *max_distance, model, actor, ctx),
        (
            Association::EntityType {
                entity_type,
                max_distance,
            },
            Emission::Contact(base_intensity),
        ) => entity_contact(base_intensity, entity_type, *max_distance, actor, ctx),
        (Association::Locations { level, positions }, Emission::Point(point)) => {
            if ctx.environment.world_id() != level {
                return 0.0;
            }
            let cells = positions.iter().map(|p| IVec3::from_array(*p));
            point_cells(hazard, &point, cells, model, actor, ctx)
        }
        (
            Association::VoxelKind {
                target,
                max_distance,
            },
            Emission::Point(point),
        ) => voxel_point(hazard, &point, target, *max_distance, model, actor, ctx),
        (Association::VoxelKind { target, .. }, Emission::Contact(base_intensity)) => {
            voxel_contact(base_intensity, target, actor, ctx)
        }
        // Rejected at load time
        (
            Association::EntityType { .. }
            | Association::Locations { .. }
            | Association::VoxelKind { .. },
            Emission::Sky(_),
        )
        | (
            Association::Level { .. } | Association::Biome { .. } | Association::Region,
            Emission::Point(_),
        )
        | (
            Association::Level { .. }
            | Association::Biome { .. }
            | Association::Region
            | Association::Locations { .. },
            Emission::Contact(_),
        ) => 0.0,
    }
}

fn entity_contact(
    base_intensity: f64,
    entity_type: &RuleId,
    max_distance: f64,
    actor: &ActorView,
    ctx: &WorldContext<'_>,
) -> f64 {
    if max_distance <= 0.0 {
        return 0.0;
    }
    let area = actor.bounds.inflate(max_distance);
    let touching: f64 = ctx
        .entities
        .entities_in(entity_type, &area, actor.id)
        .iter()
        .filter(|entity| entity.bounds.intersects(&actor.bounds))
        .map(|_| base_intensity)
        .sum();
    touching.max(0.0)
}

fn entity_point(
    hazard: &HazardType,
    emission: &PointEmission,
    entity_type: &RuleId,
    max_distance: f64,
    mut model: Option<&mut AbsorptionModel>,
    actor: &ActorView,
    ctx: &WorldContext<'_>,
) -> f64 {
    if max_distance <= 0.0 {
        return 0.0;
    }
    let area = actor.bounds.inflate(max_distance);
    let mut total = 0.0;
    for entity in &ctx.entities.entities_in(entity_type, &area, actor.id) {
        let distance = actor.position.distance(entity.position);
        if distance > max_distance {
            continue;
        }
        let raw = point_raw(&hazard.falloff, emission, distance);
        let origin = entity.center();
        let value = point_blocked(model.as_deref_mut(), ctx, emission, origin, actor, raw);
        if value > MIN_EFFECTIVE_INTENSITY {
            total += value;
        }
    }
    total
}

/// Whether the voxel at `pos` is a non-air voxel matching `target`
fn voxel_matches(ctx: &WorldContext<'_>, target: &VoxelMatch, pos: IVec3) -> bool {
    let kind = ctx.voxels.voxel_at(pos);
    if kind.is_air() {
        return false;
    }
    match target {
        VoxelMatch::Kind(name) => ctx.catalog.lookup(name.as_str()) == Some(kind),
        VoxelMatch::Tag(tag) => ctx.catalog.has_tag(kind, tag.as_str()),
    }
}

fn unknown_kind(ctx: &WorldContext<'_>, target: &VoxelMatch) -> bool {
    match target {
        VoxelMatch::Kind(name) => ctx.catalog.lookup(name.as_str()).is_none(),
        VoxelMatch::Tag(_) => false,
    }
}

fn voxel_contact(
    base_intensity: f64,
    target: &VoxelMatch,
    actor: &ActorView,
    ctx: &WorldContext<'_>,
) -> f64 {
    if unknown_kind(ctx, target) {
        return 0.0;
    }
    let touching = actor
        .bounds
        .occupied_cells()
        .any(|pos| voxel_matches(ctx, target, pos));
    if touching {
        base_intensity.max(0.0)
    } else {
        0.0
    }
}

fn voxel_point(
    hazard: &HazardType,
    emission: &PointEmission,
    target: &VoxelMatch,
    max_distance: f64,
    model: Option<&mut AbsorptionModel>,
    actor: &ActorView,
    ctx: &WorldContext<'_>,
) -> f64 {
    if max_distance <= 0.0 || unknown_kind(ctx, target) {
        return 0.0;
    }
    let radius = max_distance.ceil() as i32;
    let center = actor.cell();
    let max_sq = max_distance * max_distance;

    let mut cells = Vec::new();
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            for dz in -radius..=radius {
                let offset = IVec3::new(dx, dy, dz);
                if offset.as_dvec3().length_squared() > max_sq {
                    continue;
                }
                let pos = center + offset;
                if voxel_matches(ctx, target, pos) {
                    cells.push(pos);
                }
            }
        }
    }
    point_cells(hazard, emission, cells.into_iter(), model, actor, ctx)
}

/// Sum of point contributions emitted from the centres of `cells`
fn point_cells(
    hazard: &HazardType,
    emission: &PointEmission,
    cells: impl Iterator<Item = IVec3>,
    mut model: Option<&mut AbsorptionModel>,
    actor: &ActorView,
    ctx: &WorldContext<'_>,
) -> f64 {
    let target = actor.body_point();
    let mut total = 0.0;
    for cell in cells {
        let source = cell_center(cell);
        let distance = source.distance(target);
        let raw = point_raw(&hazard.falloff, emission, distance);
        let value = point_blocked(model.as_deref_mut(), ctx, emission, source, actor, raw);
        if value > MIN_EFFECTIVE_INTENSITY {
            total += value;
        }
    }
    total
}
