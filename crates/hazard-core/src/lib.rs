pub mod config;
pub mod dose;
pub mod effects;
pub mod engine;
pub mod exposure;
pub mod index;
pub mod occlusion;
pub mod world;

pub use config::EngineConfig;
pub use dose::{DoseError, DoseRecord, DoseStore};
pub use engine::{HazardEngine, HazardReading, TickReport};

// Re-export the rule model for hosts that only depend on this crate
pub mod rules {
    pub use hazard_rules::*;
}
