//! Spatial index of hazard sources and blockers

mod blockers;
mod section_index;

pub use section_index::{SECTION_SIZE, SectionBounds, SectionIndex, section_of};
