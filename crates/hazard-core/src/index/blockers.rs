//! Per-section blocker storage with segment queries

use ahash::AHashMap;
use glam::{DVec3, IVec3};
use rstar::{AABB, RTree, SelectionFunction};

/// Wrapper for blocker cells to implement R-tree traits
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct BlockerCell(IVec3);

impl rstar::Point for BlockerCell {
    type Scalar = i32;
    const DIMENSIONS: usize = 3;

    fn generate(mut generator: impl FnMut(usize) -> Self::Scalar) -> Self {
        BlockerCell(IVec3::new(generator(0), generator(1), generator(2)))
    }

    fn nth(&self, index: usize) -> Self::Scalar {
        self.0[index]
    }

    fn nth_mut(&mut self, index: usize) -> &mut Self::Scalar {
        &mut self.0[index]
    }
}

/// A segment between two sample points, with its endpoint cells
#[derive(Clone, Copy, Debug)]
pub(crate) struct Segment {
    pub from: DVec3,
    pub to: DVec3,
    pub from_cell: IVec3,
    pub to_cell: IVec3,
}

impl Segment {
    /// Whether the segment meets the box `[lo, hi]`. `open` requires it to
    /// pass through the interior rather than touch a face, edge or corner.
    pub fn hits_box(&self, lo: DVec3, hi: DVec3, open: bool) -> bool {
        let dir = self.to - self.from;
        let mut enter = f64::NEG_INFINITY;
        let mut exit = f64::INFINITY;

        for axis in 0..3 {
            let origin = self.from[axis];
            if dir[axis] == 0.0 {
                let inside = if open {
                    origin > lo[axis] && origin < hi[axis]
                } else {
                    origin >= lo[axis] && origin <= hi[axis]
                };
                if !inside {
                    return false;
                }
                continue;
            }
            let t0 = (lo[axis] - origin) / dir[axis];
            let t1 = (hi[axis] - origin) / dir[axis];
            enter = enter.max(t0.min(t1));
            exit = exit.min(t0.max(t1));
        }

        if open {
            enter < exit && enter < 1.0 && exit > 0.0
        } else {
            enter <= exit && enter <= 1.0 && exit >= 0.0
        }
    }

    /// Whether the segment passes through the interior of a cell
    pub fn crosses_cell(&self, cell: IVec3) -> bool {
        let lo = cell.as_dvec3();
        self.hits_box(lo, lo + DVec3::ONE, true)
    }
}

struct SelectAlongSegment<'a> {
    segment: &'a Segment,
}

impl SelectionFunction<BlockerCell> for SelectAlongSegment<'_> {
    fn should_unpack_parent(&self, envelope: &AABB<BlockerCell>) -> bool {
        let lo = envelope.lower().0.as_dvec3();
        let hi = envelope.upper().0.as_dvec3() + DVec3::ONE;
        self.segment.hits_box(lo, hi, false)
    }

    fn should_unpack_leaf(&self, leaf: &BlockerCell) -> bool {
        leaf.0 != self.segment.from_cell
            && leaf.0 != self.segment.to_cell
            && self.segment.crosses_cell(leaf.0)
    }
}

/// Blockers inside one section: an R-tree of cells plus their factors
#[derive(Default)]
pub(crate) struct SectionBlockers {
    tree: RTree<BlockerCell>,
    factors: AHashMap<IVec3, f64>,
}

impl std::fmt::Debug for SectionBlockers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionBlockers")
            .field("len", &self.factors.len())
            .finish()
    }
}

impl SectionBlockers {
    /// Insert or update a blocker. Returns true when the cell was new.
    pub fn insert(&mut self, pos: IVec3, factor: f64) -> bool {
        match self.factors.insert(pos, factor) {
            Some(_) => false,
            None => {
                self.tree.insert(BlockerCell(pos));
                true
            }
        }
    }

    pub fn remove(&mut self, pos: IVec3) -> Option<f64> {
        let factor = self.factors.remove(&pos)?;
        self.tree.remove(&BlockerCell(pos));
        Some(factor)
    }

    pub fn get(&self, pos: IVec3) -> Option<f64> {
        self.factors.get(&pos).copied()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Product of the factors of every blocker the segment passes through
    pub fn path_factor(&self, segment: &Segment) -> f64 {
        self.tree
            .locate_with_selection_function(SelectAlongSegment { segment })
            .filter_map(|cell| self.factors.get(&cell.0))
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::cell_center;

    fn segment(a: IVec3, b: IVec3) -> Segment {
        Segment {
            from: cell_center(a),
            to: cell_center(b),
            from_cell: a,
            to_cell: b,
        }
    }

    #[test]
    fn test_insert_update_remove() {
        let mut blockers = SectionBlockers::default();
        assert!(blockers.insert(IVec3::new(1, 2, 3), 0.5));
        assert!(!blockers.insert(IVec3::new(1, 2, 3), 0.25));
        assert_eq!(blockers.len(), 1);
        assert_eq!(blockers.get(IVec3::new(1, 2, 3)), Some(0.25));

        assert_eq!(blockers.remove(IVec3::new(1, 2, 3)), Some(0.25));
        assert_eq!(blockers.remove(IVec3::new(1, 2, 3)), None);
        assert!(blockers.is_empty());
        assert_eq!(blockers.len(), 0);
    }

    #[test]
    fn test_path_factor_multiplies_crossed_cells() {
        let mut blockers = SectionBlockers::default();
        blockers.insert(IVec3::new(3, 0, 0), 0.5);
        blockers.insert(IVec3::new(5, 0, 0), 0.5);
        blockers.insert(IVec3::new(5, 1, 0), 0.1);

        let seg = segment(IVec3::new(0, 0, 0), IVec3::new(8, 0, 0));
        assert!((blockers.path_factor(&seg) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_path_factor_excludes_endpoints() {
        let mut blockers = SectionBlockers::default();
        blockers.insert(IVec3::new(0, 0, 0), 0.5);
        blockers.insert(IVec3::new(4, 0, 0), 0.5);

        let seg = segment(IVec3::new(0, 0, 0), IVec3::new(4, 0, 0));
        assert_eq!(blockers.path_factor(&seg), 1.0);
    }

    #[test]
    fn test_diagonal_does_not_touch_corner_cells() {
        let mut blockers = SectionBlockers::default();
        blockers.insert(IVec3::new(1, 0, 0), 0.5);
        blockers.insert(IVec3::new(0, 1, 0), 0.5);
        blockers.insert(IVec3::new(1, 1, 0), 0.5);

        let seg = segment(IVec3::new(0, 0, 0), IVec3::new(2, 2, 0));
        assert!((blockers.path_factor(&seg) - 0.5).abs() < 1e-12);
    }
}
