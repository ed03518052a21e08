//! World access traits for hazard evaluation
//!
//! These traits define the interface between the hazard engine and the host
//! world, so evaluation stays decoupled from how voxels, entities and weather
//! are actually stored. Implementations must be deterministic for a fixed
//! world snapshot.

use super::geometry::{Aabb, EntitySample};
use super::voxel::{VoxelCatalog, VoxelKind};
use glam::IVec3;
use hazard_rules::RuleId;

/// Read-only voxel queries
pub trait VoxelAccess {
    /// Voxel kind at a cell, air when unloaded
    fn voxel_at(&self, pos: IVec3) -> VoxelKind;

    /// Whether nothing but air lies between the cell and the ceiling
    fn can_see_sky(&self, pos: IVec3) -> bool;

    /// Exclusive upper bound of buildable height
    fn ceiling_height(&self) -> i32;

    fn biome_matches(&self, pos: IVec3, biome: &RuleId) -> bool;
}

/// Entity enumeration near the actor
pub trait EntityAccess {
    /// Entities of `kind` whose bounds intersect `area`, excluding `exclude`
    fn entities_in(&self, kind: &RuleId, area: &Aabb, exclude: u64) -> Vec<EntitySample>;
}

/// Weather, time of day and world identity
pub trait Environment {
    fn world_id(&self) -> &RuleId;
    fn is_night(&self) -> bool;
    fn is_raining(&self) -> bool;
    fn is_thundering(&self) -> bool;
}

/// Optional host extension classifying cells into a region (e.g. cities)
pub trait RegionClassifier {
    fn is_in_region(&self, pos: IVec3) -> bool;
}

/// Everything the evaluator may ask of the host world for one pass
#[derive(Clone, Copy)]
pub struct WorldContext<'a> {
    pub voxels: &'a dyn VoxelAccess,
    pub entities: &'a dyn EntityAccess,
    pub environment: &'a dyn Environment,
    pub regions: Option<&'a dyn RegionClassifier>,
    pub catalog: &'a VoxelCatalog,
}

impl<'a> WorldContext<'a> {
    pub fn new(
        voxels: &'a dyn VoxelAccess,
        entities: &'a dyn EntityAccess,
        environment: &'a dyn Environment,
        catalog: &'a VoxelCatalog,
    ) -> Self {
        Self {
            voxels,
            entities,
            environment,
            regions: None,
            catalog,
        }
    }

    pub fn with_regions(mut self, regions: &'a dyn RegionClassifier) -> Self {
        self.regions = Some(regions);
        self
    }
}
