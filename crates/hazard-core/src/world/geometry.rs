//! Bounding boxes, actor samples and coordinate helpers

use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned box in world units
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box of `width` x `height` standing on `feet`
    pub fn standing(feet: DVec3, width: f64, height: f64) -> Self {
        let half = width * 0.5;
        Self::new(
            DVec3::new(feet.x - half, feet.y, feet.z - half),
            DVec3::new(feet.x + half, feet.y + height, feet.z + half),
        )
    }

    pub fn inflate(&self, amount: f64) -> Self {
        Self::new(self.min - DVec3::splat(amount), self.max + DVec3::splat(amount))
    }

    /// Open-interval overlap test, touching faces do not intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    pub fn contains(&self, point: DVec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Every voxel cell the box overlaps, bounds floored inclusively
    pub fn occupied_cells(&self) -> impl Iterator<Item = IVec3> + use<> {
        let lo = floor_to_cell(self.min);
        let hi = floor_to_cell(self.max);
        (lo.x..=hi.x).flat_map(move |x| {
            (lo.y..=hi.y).flat_map(move |y| (lo.z..=hi.z).map(move |z| IVec3::new(x, y, z)))
        })
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// The actor whose exposure is evaluated
#[derive(Clone, Debug, PartialEq)]
pub struct ActorView {
    pub id: u64,
    /// Feet position
    pub position: DVec3,
    pub bounds: Aabb,
    /// Body sample height
    pub body_y: f64,
    /// Eye sample height
    pub eye_y: f64,
}

impl ActorView {
    /// Standard humanoid: 0.6 wide, 1.8 tall, body sample 0.6 above the feet, eyes at 1.62
    pub fn humanoid(id: u64, feet: DVec3) -> Self {
        Self {
            id,
            position: feet,
            bounds: Aabb::standing(feet, 0.6, 1.8),
            body_y: feet.y + 0.6,
            eye_y: feet.y + 1.62,
        }
    }

    /// Cell containing the feet
    pub fn cell(&self) -> IVec3 {
        floor_to_cell(self.position)
    }

    pub fn body_point(&self) -> DVec3 {
        DVec3::new(self.position.x, self.body_y, self.position.z)
    }

    pub fn eye_point(&self) -> DVec3 {
        DVec3::new(self.position.x, self.eye_y, self.position.z)
    }
}

/// An entity found near the actor
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySample {
    /// Feet position
    pub position: DVec3,
    pub bounds: Aabb,
}

impl EntitySample {
    pub fn new(position: DVec3, bounds: Aabb) -> Self {
        Self { position, bounds }
    }

    /// Emission point at mid-height
    pub fn center(&self) -> DVec3 {
        DVec3::new(
            self.position.x,
            self.position.y + self.bounds.height() * 0.5,
            self.position.z,
        )
    }
}

pub fn floor_to_cell(point: DVec3) -> IVec3 {
    IVec3::new(
        point.x.floor() as i32,
        point.y.floor() as i32,
        point.z.floor() as i32,
    )
}

pub fn cell_center(cell: IVec3) -> DVec3 {
    cell.as_dvec3() + DVec3::splat(0.5)
}
