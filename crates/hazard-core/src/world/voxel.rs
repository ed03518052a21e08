//! Voxel kind definitions and registry

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Numeric voxel kind as stored by the host world
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoxelKind(pub u16);

impl VoxelKind {
    pub const AIR: VoxelKind = VoxelKind(0);

    pub fn is_air(self) -> bool {
        self == Self::AIR
    }
}

/// How a voxel kind interacts with occlusion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoxelClass {
    Air,
    /// Full, opaque block (stone, wood, metal)
    Solid,
    /// Liquid (water, lava)
    Fluid,
    /// Foliage, solid only when a rule says so
    Leaves,
    /// Non-air but non-occluding (flowers, torches)
    Passable,
}

/// Definition of a voxel kind
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoxelDef {
    pub kind: VoxelKind,
    pub name: String,
    pub class: VoxelClass,
    pub tags: Vec<String>,
}

/// Registry of every voxel kind a world can contain
#[derive(Clone, Debug)]
pub struct VoxelCatalog {
    defs: AHashMap<VoxelKind, VoxelDef>,
    by_name: AHashMap<String, VoxelKind>,
}

impl VoxelCatalog {
    /// Catalog containing only air
    pub fn new() -> Self {
        let mut catalog = Self {
            defs: AHashMap::new(),
            by_name: AHashMap::new(),
        };
        catalog.register(VoxelDef {
            kind: VoxelKind::AIR,
            name: "air".to_string(),
            class: VoxelClass::Air,
            tags: Vec::new(),
        });
        catalog
    }

    /// Catalog with a small set of common kinds
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        catalog.register_defaults();
        catalog
    }

    fn register_defaults(&mut self) {
        let defaults: [(u16, &str, VoxelClass, &[&str]); 9] = [
            (1, "stone", VoxelClass::Solid, &["stone", "mineral"]),
            (2, "dirt", VoxelClass::Solid, &["soil"]),
            (3, "water", VoxelClass::Fluid, &["fluid"]),
            (4, "lava", VoxelClass::Fluid, &["fluid", "hot"]),
            (5, "oak_leaves", VoxelClass::Leaves, &["leaves"]),
            (6, "oak_log", VoxelClass::Solid, &["logs"]),
            (7, "lead_block", VoxelClass::Solid, &["metal", "shielding"]),
            (8, "glass", VoxelClass::Solid, &["transparent"]),
            (9, "uranium_ore", VoxelClass::Solid, &["ores", "radioactive"]),
        ];

        for (id, name, class, tags) in defaults {
            self.register(VoxelDef {
                kind: VoxelKind(id),
                name: name.to_string(),
                class,
                tags: tags.iter().map(|t| t.to_string()).collect(),
            });
        }
    }

    /// Register or replace a voxel kind
    pub fn register(&mut self, def: VoxelDef) {
        if let Some(old) = self.defs.get(&def.kind) {
            self.by_name.remove(&old.name);
        }
        self.by_name.insert(def.name.clone(), def.kind);
        self.defs.insert(def.kind, def);
    }

    pub fn get(&self, kind: VoxelKind) -> Option<&VoxelDef> {
        self.defs.get(&kind)
    }

    pub fn lookup(&self, name: &str) -> Option<VoxelKind> {
        self.by_name.get(name).copied()
    }

    /// Class of a kind; unknown kinds are passable
    pub fn class_of(&self, kind: VoxelKind) -> VoxelClass {
        if kind.is_air() {
            return VoxelClass::Air;
        }
        self.defs
            .get(&kind)
            .map(|def| def.class)
            .unwrap_or(VoxelClass::Passable)
    }

    pub fn has_tag(&self, kind: VoxelKind, tag: &str) -> bool {
        self.defs
            .get(&kind)
            .is_some_and(|def| def.tags.iter().any(|t| t == tag))
    }

    pub fn tags_of(&self, kind: VoxelKind) -> &[String] {
        self.defs.get(&kind).map(|def| def.tags.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl Default for VoxelCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}
