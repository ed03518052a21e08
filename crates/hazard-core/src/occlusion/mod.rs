//! Voxel occlusion: absorption lookup and attenuation scans

mod absorption;
mod raycasting;

pub use absorption::AbsorptionModel;
pub use raycasting::{Raycasting, VoxelLine, canonical_order};
