//! Per-voxel absorption coefficients for one hazard type

use crate::world::{VoxelCatalog, VoxelClass, VoxelKind};
use ahash::AHashMap;
use hazard_rules::Blocking;

#[derive(Clone, Debug)]
enum Resolution {
    Simple {
        solid: f64,
        fluid: f64,
        leaves_solid: bool,
    },
    Table {
        default: f64,
        kinds: AHashMap<VoxelKind, f64>,
        tags: Vec<(String, f64)>,
    },
}

/// Absorption lookup built from a hazard type's blocking rule
///
/// Coefficients are in `[0, 1]`, air is always 0, and each kind is resolved
/// once and memoized.
#[derive(Clone, Debug)]
pub struct AbsorptionModel {
    resolution: Resolution,
    memo: AHashMap<VoxelKind, f64>,
}

impl AbsorptionModel {
    /// Build the model, `None` when the rule does not block at all
    pub fn from_blocking(blocking: &Blocking, catalog: &VoxelCatalog) -> Option<Self> {
        let resolution = match blocking {
            Blocking::None => return None,
            Blocking::SimpleOcclusion {
                solid_multiplier,
                fluid_multiplier,
                treat_leaves_as_solid,
            } => Resolution::Simple {
                solid: sanitize(1.0 - solid_multiplier),
                fluid: sanitize(1.0 - fluid_multiplier),
                leaves_solid: *treat_leaves_as_solid,
            },
            Blocking::Absorption {
                default_absorption,
                voxels,
                tags,
            } => {
                let mut kinds = AHashMap::new();
                for entry in voxels {
                    match catalog.lookup(entry.voxel.as_str()) {
                        Some(kind) => {
                            kinds.insert(kind, sanitize(entry.absorption));
                        }
                        None => log::warn!(
                            "Absorption override for unknown voxel '{}' ignored",
                            entry.voxel
                        ),
                    }
                }
                Resolution::Table {
                    default: sanitize(*default_absorption),
                    kinds,
                    tags: tags
                        .iter()
                        .map(|entry| (entry.tag.as_str().to_string(), sanitize(entry.absorption)))
                        .collect(),
                }
            }
        };

        Some(Self {
            resolution,
            memo: AHashMap::new(),
        })
    }

    /// Absorption coefficient of a voxel kind
    pub fn absorption(&mut self, kind: VoxelKind, catalog: &VoxelCatalog) -> f64 {
        if kind.is_air() {
            return 0.0;
        }
        if let Some(&cached) = self.memo.get(&kind) {
            return cached;
        }
        let value = self.resolve(kind, catalog);
        self.memo.insert(kind, value);
        value
    }

    /// Fraction of intensity that survives one voxel of this kind
    pub fn transmission(&mut self, kind: VoxelKind, catalog: &VoxelCatalog) -> f64 {
        1.0 - self.absorption(kind, catalog)
    }

    fn resolve(&self, kind: VoxelKind, catalog: &VoxelCatalog) -> f64 {
        match &self.resolution {
            Resolution::Simple {
                solid,
                fluid,
                leaves_solid,
            } => match catalog.class_of(kind) {
                VoxelClass::Solid => *solid,
                VoxelClass::Fluid => *fluid,
                VoxelClass::Leaves if *leaves_solid => *solid,
                VoxelClass::Leaves | VoxelClass::Passable | VoxelClass::Air => 0.0,
            },
            Resolution::Table {
                default,
                kinds,
                tags,
            } => {
                if let Some(&exact) = kinds.get(&kind) {
                    return exact;
                }
                tags.iter()
                    .filter(|(tag, _)| catalog.has_tag(kind, tag))
                    .map(|(_, absorption)| *absorption)
                    .reduce(f64::max)
                    .unwrap_or(*default)
            }
        }
    }

    pub fn memoized(&self) -> usize {
        self.memo.len()
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hazard_rules::{KindAbsorption, RuleId, TagAbsorption};

    fn table(default: f64) -> Blocking {
        Blocking::Absorption {
            default_absorption: default,
            voxels: vec![KindAbsorption {
                voxel: RuleId::from("lead_block"),
                absorption: 0.95,
            }],
            tags: vec![
                TagAbsorption {
                    tag: RuleId::from("stone"),
                    absorption: 0.5,
                },
                TagAbsorption {
                    tag: RuleId::from("mineral"),
                    absorption: 0.7,
                },
            ],
        }
    }

    #[test]
    fn test_none_builds_no_model() {
        let catalog = VoxelCatalog::with_defaults();
        assert!(AbsorptionModel::from_blocking(&Blocking::None, &catalog).is_none());
    }

    #[test]
    fn test_exact_then_tags_then_default() {
        let catalog = VoxelCatalog::with_defaults();
        let mut model = AbsorptionModel::from_blocking(&table(0.2), &catalog).unwrap();

        let lead = catalog.lookup("lead_block").unwrap();
        let stone = catalog.lookup("stone").unwrap();
        let dirt = catalog.lookup("dirt").unwrap();

        assert_eq!(model.absorption(lead, &catalog), 0.95);
        assert_eq!(model.absorption(stone, &catalog), 0.7);
        assert_eq!(model.absorption(dirt, &catalog), 0.2);
        assert_eq!(model.absorption(VoxelKind::AIR, &catalog), 0.0);
        assert_eq!(model.memoized(), 3);
    }

    #[test]
    fn test_coefficients_clamped() {
        let catalog = VoxelCatalog::with_defaults();
        let mut model = AbsorptionModel::from_blocking(&table(3.0), &catalog).unwrap();
        let dirt = catalog.lookup("dirt").unwrap();
        assert_eq!(model.absorption(dirt, &catalog), 1.0);
        assert_eq!(model.transmission(dirt, &catalog), 0.0);
    }

    #[test]
    fn test_simple_occlusion_by_class() {
        let catalog = VoxelCatalog::with_defaults();
        let rule = Blocking::SimpleOcclusion {
            solid_multiplier: 0.6,
            fluid_multiplier: 0.75,
            treat_leaves_as_solid: false,
        };
        let mut model = AbsorptionModel::from_blocking(&rule, &catalog).unwrap();

        let stone = catalog.lookup("stone").unwrap();
        let water = catalog.lookup("water").unwrap();
        let leaves = catalog.lookup("oak_leaves").unwrap();

        assert!((model.transmission(stone, &catalog) - 0.6).abs() < 1e-12);
        assert!((model.transmission(water, &catalog) - 0.75).abs() < 1e-12);
        assert_eq!(model.transmission(leaves, &catalog), 1.0);
    }
}
