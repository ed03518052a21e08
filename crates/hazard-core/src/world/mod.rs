//! Host world collaborators: voxels, entities, environment and regions

mod geometry;
mod sandbox;
mod traits;
mod voxel;

pub use geometry::{ActorView, Aabb, EntitySample, cell_center, floor_to_cell};
pub use sandbox::SandboxWorld;
pub use traits::{EntityAccess, Environment, RegionClassifier, VoxelAccess, WorldContext};
pub use voxel::{VoxelCatalog, VoxelClass, VoxelDef, VoxelKind};
