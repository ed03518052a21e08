//! In-memory world for headless hosts and tests

use super::geometry::{Aabb, EntitySample};
use super::traits::{EntityAccess, Environment, RegionClassifier, VoxelAccess};
use super::voxel::VoxelKind;
use ahash::{AHashMap, AHashSet};
use glam::{DVec3, IVec3};
use hazard_rules::RuleId;

#[derive(Clone, Debug)]
struct SandboxEntity {
    id: u64,
    kind: RuleId,
    sample: EntitySample,
}

/// Sparse voxel world implementing every collaborator trait
///
/// Unset cells are air. Biomes and regions are assigned per column.
#[derive(Clone, Debug)]
pub struct SandboxWorld {
    world_id: RuleId,
    ceiling: i32,
    voxels: AHashMap<IVec3, VoxelKind>,
    default_biome: RuleId,
    biomes: AHashMap<(i32, i32), RuleId>,
    regions: AHashSet<(i32, i32)>,
    entities: Vec<SandboxEntity>,
    pub night: bool,
    pub raining: bool,
    pub thundering: bool,
}

impl SandboxWorld {
    pub fn new(world_id: impl Into<RuleId>, ceiling: i32) -> Self {
        Self {
            world_id: world_id.into(),
            ceiling,
            voxels: AHashMap::new(),
            default_biome: RuleId::from("plains"),
            biomes: AHashMap::new(),
            regions: AHashSet::new(),
            entities: Vec::new(),
            night: false,
            raining: false,
            thundering: false,
        }
    }

    pub fn set_voxel(&mut self, pos: IVec3, kind: VoxelKind) {
        if kind.is_air() {
            self.voxels.remove(&pos);
        } else {
            self.voxels.insert(pos, kind);
        }
    }

    /// Fill an inclusive box of cells
    pub fn fill(&mut self, from: IVec3, to: IVec3, kind: VoxelKind) {
        let lo = from.min(to);
        let hi = from.max(to);
        for x in lo.x..=hi.x {
            for y in lo.y..=hi.y {
                for z in lo.z..=hi.z {
                    self.set_voxel(IVec3::new(x, y, z), kind);
                }
            }
        }
    }

    pub fn set_default_biome(&mut self, biome: impl Into<RuleId>) {
        self.default_biome = biome.into();
    }

    pub fn set_biome(&mut self, x: i32, z: i32, biome: impl Into<RuleId>) {
        self.biomes.insert((x, z), biome.into());
    }

    pub fn mark_region(&mut self, x: i32, z: i32) {
        self.regions.insert((x, z));
    }

    /// Add an entity standing at `feet`
    pub fn spawn(
        &mut self,
        id: u64,
        kind: impl Into<RuleId>,
        feet: DVec3,
        width: f64,
        height: f64,
    ) {
        self.entities.push(SandboxEntity {
            id,
            kind: kind.into(),
            sample: EntitySample::new(feet, Aabb::standing(feet, width, height)),
        });
    }

    pub fn despawn(&mut self, id: u64) {
        self.entities.retain(|entity| entity.id != id);
    }
}

impl VoxelAccess for SandboxWorld {
    fn voxel_at(&self, pos: IVec3) -> VoxelKind {
        self.voxels.get(&pos).copied().unwrap_or(VoxelKind::AIR)
    }

    fn can_see_sky(&self, pos: IVec3) -> bool {
        (pos.y + 1..self.ceiling).all(|y| self.voxel_at(IVec3::new(pos.x, y, pos.z)).is_air())
    }

    fn ceiling_height(&self) -> i32 {
        self.ceiling
    }

    fn biome_matches(&self, pos: IVec3, biome: &RuleId) -> bool {
        self.biomes.get(&(pos.x, pos.z)).unwrap_or(&self.default_biome) == biome
    }
}

impl EntityAccess for SandboxWorld {
    fn entities_in(&self, kind: &RuleId, area: &Aabb, exclude: u64) -> Vec<EntitySample> {
        self.entities
            .iter()
            .filter(|entity| entity.id != exclude && &entity.kind == kind)
            .filter(|entity| entity.sample.bounds.intersects(area))
            .map(|entity| entity.sample.clone())
            .collect()
    }
}

impl Environment for SandboxWorld {
    fn world_id(&self) -> &RuleId {
        &self.world_id
    }

    fn is_night(&self) -> bool {
        self.night
    }

    fn is_raining(&self) -> bool {
        self.raining
    }

    fn is_thundering(&self) -> bool {
        self.thundering
    }
}

impl RegionClassifier for SandboxWorld {
    fn is_in_region(&self, pos: IVec3) -> bool {
        self.regions.contains(&(pos.x, pos.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sky_visibility() {
        let mut world = SandboxWorld::new("overworld", 128);
        let pos = IVec3::new(0, 64, 0);
        assert!(world.can_see_sky(pos));

        world.set_voxel(IVec3::new(0, 70, 0), VoxelKind(1));
        assert!(!world.can_see_sky(pos));
        assert!(world.can_see_sky(IVec3::new(0, 70, 0)));

        world.set_voxel(IVec3::new(0, 70, 0), VoxelKind::AIR);
        assert!(world.can_see_sky(pos));
    }

    #[test]
    fn test_entities_filtered_by_kind_and_area() {
        let mut world = SandboxWorld::new("overworld", 128);
        world.spawn(1, "zombie", DVec3::new(2.0, 64.0, 0.0), 0.6, 1.9);
        world.spawn(2, "zombie", DVec3::new(40.0, 64.0, 0.0), 0.6, 1.9);
        world.spawn(3, "cow", DVec3::new(1.0, 64.0, 0.0), 0.9, 1.4);

        let area = Aabb::new(DVec3::new(-5.0, 60.0, -5.0), DVec3::new(5.0, 70.0, 5.0));
        let found = world.entities_in(&RuleId::from("zombie"), &area, 0);
        assert_eq!(found.len(), 1);
        assert!(world.entities_in(&RuleId::from("zombie"), &area, 1).is_empty());
    }

    #[test]
    fn test_biome_and_region_columns() {
        let mut world = SandboxWorld::new("overworld", 128);
        world.set_biome(3, 3, "desert");
        world.mark_region(3, 3);

        assert!(world.biome_matches(IVec3::new(3, 10, 3), &RuleId::from("desert")));
        assert!(world.biome_matches(IVec3::new(0, 10, 0), &RuleId::from("plains")));
        assert!(world.is_in_region(IVec3::new(3, 99, 3)));
        assert!(!world.is_in_region(IVec3::new(4, 99, 3)));
    }
}
