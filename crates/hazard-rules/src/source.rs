//! Hazard sources: where a hazard comes from and how it reaches an actor

use crate::id::RuleId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a source's intensity is generated
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Transmission {
    /// Ambient exposure from above, modulated by weather and time of day
    Sky {
        base_intensity: f64,
        requires_direct_sky: bool,
        rain_multiplier: f64,
        thunder_multiplier: f64,
        night_multiplier: f64,
        indoor_leak: f64,
    },
    /// Distance-decayed emission from discrete points
    Point {
        base_intensity: f64,
        max_distance: f64,
        requires_line_of_sight: bool,
        air_attenuation_per_unit: f64,
    },
    /// Binary exposure while touching the source
    Contact { base_intensity: f64 },
}

/// Fieldless discriminant of [`Transmission`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransmissionKind {
    Sky,
    Point,
    Contact,
}

impl fmt::Display for TransmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransmissionKind::Sky => "sky",
            TransmissionKind::Point => "point",
            TransmissionKind::Contact => "contact",
        };
        f.write_str(name)
    }
}

impl Transmission {
    pub fn kind(&self) -> TransmissionKind {
        match self {
            Transmission::Sky { .. } => TransmissionKind::Sky,
            Transmission::Point { .. } => TransmissionKind::Point,
            Transmission::Contact { .. } => TransmissionKind::Contact,
        }
    }

    /// Association kinds this transmission model can be paired with
    pub fn supported_associations(&self) -> &'static [AssociationKind] {
        match self {
            Transmission::Sky { .. } => &[
                AssociationKind::Level,
                AssociationKind::Biome,
                AssociationKind::Region,
            ],
            Transmission::Point { .. } => &[
                AssociationKind::EntityType,
                AssociationKind::Locations,
                AssociationKind::VoxelKind,
            ],
            Transmission::Contact { .. } => {
                &[AssociationKind::EntityType, AssociationKind::VoxelKind]
            }
        }
    }

    pub fn supports(&self, association: AssociationKind) -> bool {
        self.supported_associations().contains(&association)
    }
}

/// Voxel selector for voxel-kind associations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoxelMatch {
    Kind(RuleId),
    Tag(RuleId),
}

/// Where in the world a source is located
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Association {
    /// Everywhere in one level
    Level { level: RuleId },
    /// Every entity of a kind within range of the actor
    EntityType { entity_type: RuleId, max_distance: f64 },
    /// Fixed voxel positions inside one level
    Locations { level: RuleId, positions: Vec<[i32; 3]> },
    Biome { biome: RuleId },
    /// Wherever the host's region classifier says so
    Region,
    /// Every matching voxel within range of the actor
    VoxelKind { target: VoxelMatch, max_distance: f64 },
}

/// Fieldless discriminant of [`Association`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssociationKind {
    Level,
    EntityType,
    Locations,
    Biome,
    Region,
    VoxelKind,
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssociationKind::Level => "level",
            AssociationKind::EntityType => "entity_type",
            AssociationKind::Locations => "locations",
            AssociationKind::Biome => "biome",
            AssociationKind::Region => "region",
            AssociationKind::VoxelKind => "voxel_kind",
        };
        f.write_str(name)
    }
}

impl Association {
    pub fn kind(&self) -> AssociationKind {
        match self {
            Association::Level { .. } => AssociationKind::Level,
            Association::EntityType { .. } => AssociationKind::EntityType,
            Association::Locations { .. } => AssociationKind::Locations,
            Association::Biome { .. } => AssociationKind::Biome,
            Association::Region => AssociationKind::Region,
            Association::VoxelKind { .. } => AssociationKind::VoxelKind,
        }
    }
}

/// Placement of a hazard type in the world
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HazardSource {
    pub hazard_type: RuleId,
    pub transmission: Transmission,
    pub association: Association,
}
