//! Section-bucketed index of point sources and blockers for one world

use super::blockers::{Segment, SectionBlockers};
use crate::occlusion::{VoxelLine, canonical_order};
use crate::world::{cell_center, floor_to_cell};
use ahash::{AHashMap, AHashSet};
use glam::{DVec3, IVec3};
use hazard_rules::MIN_EFFECTIVE_INTENSITY;
use smallvec::SmallVec;

/// Edge length of a section in voxels
pub const SECTION_SIZE: i32 = 16;

/// Inclusive box of section coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionBounds {
    pub min: IVec3,
    pub max: IVec3,
}

impl SectionBounds {
    fn single(section: IVec3) -> Self {
        Self {
            min: section,
            max: section,
        }
    }

    fn include(&mut self, section: IVec3) {
        self.min = self.min.min(section);
        self.max = self.max.max(section);
    }

    fn on_wall(&self, section: IVec3) -> bool {
        (0..3).any(|axis| section[axis] == self.min[axis] || section[axis] == self.max[axis])
    }

    /// Chebyshev distance from `section` to the nearest section of the box
    fn gap_from(&self, section: IVec3) -> i32 {
        let below = (self.min - section).max(IVec3::ZERO);
        let above = (section - self.max).max(IVec3::ZERO);
        (below + above).max_element()
    }

    /// Chebyshev distance from `section` to the farthest corner of the box
    fn reach_from(&self, section: IVec3) -> i32 {
        let far = (section - self.min).abs().max((self.max - section).abs());
        far.x.max(far.y).max(far.z)
    }
}

/// Section coordinate and local offset of a voxel position
pub fn section_of(pos: IVec3) -> (IVec3, IVec3) {
    let section = IVec3::new(
        pos.x.div_euclid(SECTION_SIZE),
        pos.y.div_euclid(SECTION_SIZE),
        pos.z.div_euclid(SECTION_SIZE),
    );
    let local = IVec3::new(
        pos.x.rem_euclid(SECTION_SIZE),
        pos.y.rem_euclid(SECTION_SIZE),
        pos.z.rem_euclid(SECTION_SIZE),
    );
    (section, local)
}

/// Incremental per-world cache of hazard sources and blockers
///
/// Answers "effective distance to the nearest source", where a source's
/// effective distance is its Euclidean distance divided by the attenuation
/// factor of the blockers between it and the target.
#[derive(Debug, Default)]
pub struct SectionIndex {
    sources: AHashMap<IVec3, AHashSet<IVec3>>,
    blockers: AHashMap<IVec3, SectionBlockers>,
    source_count: usize,
    blocker_count: usize,
    bounds: Option<SectionBounds>,
    bounds_dirty: bool,
}

impl SectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the position was already a source
    pub fn add_source(&mut self, pos: IVec3) -> bool {
        let (section, _) = section_of(pos);
        if !self.sources.entry(section).or_default().insert(pos) {
            return false;
        }
        self.source_count += 1;
        match &mut self.bounds {
            Some(bounds) => bounds.include(section),
            None => self.bounds = Some(SectionBounds::single(section)),
        }
        true
    }

    /// Returns false when the position was not a source
    pub fn remove_source(&mut self, pos: IVec3) -> bool {
        let (section, _) = section_of(pos);
        let Some(set) = self.sources.get_mut(&section) else {
            return false;
        };
        if !set.remove(&pos) {
            return false;
        }
        self.source_count -= 1;

        if set.is_empty() {
            self.sources.remove(&section);
            if self.bounds.is_some_and(|bounds| bounds.on_wall(section)) {
                self.bounds_dirty = true;
            }
        }
        true
    }

    /// Insert or update a blocker with transmission `factor` in `[0, 1]`
    pub fn add_blocker(&mut self, pos: IVec3, factor: f64) {
        let factor = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
        let (section, _) = section_of(pos);
        if self.blockers.entry(section).or_default().insert(pos, factor) {
            self.blocker_count += 1;
        }
    }

    pub fn remove_blocker(&mut self, pos: IVec3) -> Option<f64> {
        let (section, _) = section_of(pos);
        let blockers = self.blockers.get_mut(&section)?;
        let factor = blockers.remove(pos)?;
        self.blocker_count -= 1;
        if blockers.is_empty() {
            self.blockers.remove(&section);
        }
        Some(factor)
    }

    pub fn source_count(&self) -> usize {
        self.source_count
    }

    pub fn blocker_count(&self) -> usize {
        self.blocker_count
    }

    /// Sections currently holding blockers
    pub fn blocker_sections(&self) -> usize {
        self.blockers.len()
    }

    /// Section box of all sources, recomputed first if stale
    pub fn section_bounds(&mut self) -> Option<SectionBounds> {
        self.refresh_bounds();
        self.bounds
    }

    fn refresh_bounds(&mut self) {
        if !self.bounds_dirty {
            return;
        }
        self.bounds_dirty = false;

        let mut sections = self.sources.keys();
        self.bounds = sections.next().map(|&first| {
            let mut bounds = SectionBounds::single(first);
            for &section in sections {
                bounds.include(section);
            }
            bounds
        });
        log::debug!("Recomputed source bounds: {:?}", self.bounds);
    }

    /// Effective distance from `pos` to the closest source, infinite if none
    /// is reachable
    pub fn nearest_source_distance(&mut self, pos: IVec3) -> f64 {
        self.refresh_bounds();
        let Some(bounds) = self.bounds else {
            return f64::INFINITY;
        };

        let (origin, local) = section_of(pos);
        let max_radius = bounds.reach_from(origin);
        let mut best = f64::INFINITY;

        for radius in bounds.gap_from(origin)..=max_radius {
            // Effective distance never undercuts plain distance, so nothing
            // in this or any later shell can beat `best`.
            if best <= shell_clearance(radius, local) {
                break;
            }

            for section in shell(origin, radius, bounds) {
                let Some(sources) = self.sources.get(&section) else {
                    continue;
                };
                for &source in sources {
                    let distance = (source - pos).as_dvec3().length();
                    if distance >= best {
                        continue;
                    }
                    let factor = self.attenuation(source, pos);
                    if factor > MIN_EFFECTIVE_INTENSITY {
                        best = best.min(distance / factor);
                    }
                }
            }
        }

        best
    }

    /// Attenuation between a source cell and a target cell: the better of the
    /// body path (centre to centre) and the eye path (centre to the cell above)
    pub fn attenuation(&self, source: IVec3, target: IVec3) -> f64 {
        let from = cell_center(source);
        let body = cell_center(target);
        let eye = body + DVec3::Y;
        self.path_factor(from, body).max(self.path_factor(from, eye))
    }

    /// Product of blocker factors along a segment, endpoint cells excluded
    pub fn path_factor(&self, a: DVec3, b: DVec3) -> f64 {
        let (from, to) = canonical_order(a, b);
        let segment = Segment {
            from,
            to,
            from_cell: floor_to_cell(from),
            to_cell: floor_to_cell(to),
        };
        if segment.from_cell == segment.to_cell || self.blockers.is_empty() {
            return 1.0;
        }

        let scale = 1.0 / SECTION_SIZE as f64;
        let (first, _) = section_of(segment.from_cell);
        let (last, _) = section_of(segment.to_cell);

        let mut sections: SmallVec<[IVec3; 8]> = SmallVec::new();
        sections.push(first);
        sections.extend(VoxelLine::new(from * scale, to * scale));
        if last != first {
            sections.push(last);
        }

        let mut factor = 1.0;
        for section in sections {
            if let Some(blockers) = self.blockers.get(&section) {
                factor *= blockers.path_factor(&segment);
                if factor <= 0.0 {
                    return 0.0;
                }
            }
        }
        factor
    }
}

/// Lower bound on the distance from a cell at `local` offset inside its
/// section to any cell in a section `radius` shells away
fn shell_clearance(radius: i32, local: IVec3) -> f64 {
    if radius == 0 {
        return 0.0;
    }
    let toward_max = SECTION_SIZE * radius - local;
    let toward_min = SECTION_SIZE * (radius - 1) + local + 1;
    let gap = toward_max.min(toward_min);
    gap.x.min(gap.y).min(gap.z) as f64
}

/// Sections at Chebyshev distance exactly `radius` from `center`, clipped to
/// `bounds` before enumeration
fn shell(center: IVec3, radius: i32, bounds: SectionBounds) -> impl Iterator<Item = IVec3> {
    let r = radius;
    let lo = (bounds.min - center).max(IVec3::splat(-r));
    let hi = (bounds.max - center).min(IVec3::splat(r));
    (lo.x..=hi.x).flat_map(move |dx| {
        (lo.y..=hi.y).flat_map(move |dy| {
            let on_face = dx.abs() == r || dy.abs() == r;
            // Inside the ring's x/y extent only the two z caps qualify
            let (start, step) = if on_face || r == 0 {
                (lo.z, 1)
            } else {
                (-r, (2 * r) as usize)
            };
            (start..=hi.z)
                .step_by(step)
                .filter(move |&dz| dz >= lo.z)
                .map(move |dz| center + IVec3::new(dx, dy, dz))
        })
    })
}
