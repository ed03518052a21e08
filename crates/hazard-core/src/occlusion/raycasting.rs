//! Voxel traversal and attenuation scans

use super::absorption::AbsorptionModel;
use crate::world::{VoxelAccess, VoxelCatalog, floor_to_cell};
use glam::{DVec3, IVec3};

/// Cells strictly between the endpoint cells of a segment
///
/// 3-D DDA that steps every tied axis at once, so it yields exactly the cells
/// whose interior the segment crosses. Endpoints are put in lexicographic
/// order first, which makes the visit order depend only on the unordered pair.
#[derive(Clone, Debug)]
pub struct VoxelLine {
    origin: DVec3,
    dir: DVec3,
    step: IVec3,
    cell: IVec3,
    end: IVec3,
    remaining: u32,
}

impl VoxelLine {
    pub fn new(a: DVec3, b: DVec3) -> Self {
        let (from, to) = canonical_order(a, b);
        let cell = floor_to_cell(from);
        let end = floor_to_cell(to);
        let dir = to - from;
        let step = IVec3::new(sign(dir.x), sign(dir.y), sign(dir.z));
        let span = (end - cell).abs();

        Self {
            origin: from,
            dir,
            step,
            cell,
            end,
            remaining: (span.x + span.y + span.z) as u32,
        }
    }

    /// Parameter along the segment where the current cell is left on `axis`
    fn exit_t(&self, axis: usize) -> f64 {
        let step = self.step[axis];
        if step == 0 {
            return f64::INFINITY;
        }
        let boundary = if step > 0 {
            self.cell[axis] + 1
        } else {
            self.cell[axis]
        };
        (boundary as f64 - self.origin[axis]) / self.dir[axis]
    }
}

impl Iterator for VoxelLine {
    type Item = IVec3;

    fn next(&mut self) -> Option<IVec3> {
        if self.remaining == 0 || self.cell == self.end {
            return None;
        }

        let t = [self.exit_t(0), self.exit_t(1), self.exit_t(2)];
        let t_min = t[0].min(t[1]).min(t[2]);
        if !t_min.is_finite() || t_min > 1.0 {
            self.remaining = 0;
            return None;
        }

        let mut moved = 0;
        for axis in 0..3 {
            if t[axis] == t_min {
                self.cell[axis] += self.step[axis];
                moved += 1;
            }
        }
        self.remaining = self.remaining.saturating_sub(moved);

        if self.cell == self.end {
            self.remaining = 0;
            return None;
        }
        Some(self.cell)
    }
}

fn sign(v: f64) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Lexicographically smaller endpoint first
pub fn canonical_order(a: DVec3, b: DVec3) -> (DVec3, DVec3) {
    let key = |p: DVec3| [p.x, p.y, p.z];
    if key(b) < key(a) { (b, a) } else { (a, b) }
}

/// Stateless attenuation scans over the host's voxels
pub struct Raycasting;

impl Raycasting {
    /// Surviving fraction along a segment, endpoint cells excluded
    ///
    /// Returns 0 as soon as the fraction drops to `cutoff` or below, and 0
    /// outright when `cutoff >= 1`. Shared start/end cell returns 1.
    pub fn line_factor(
        model: &mut AbsorptionModel,
        voxels: &dyn VoxelAccess,
        catalog: &VoxelCatalog,
        from: DVec3,
        to: DVec3,
        cutoff: f64,
    ) -> f64 {
        if floor_to_cell(from) == floor_to_cell(to) {
            return 1.0;
        }
        if cutoff >= 1.0 {
            return 0.0;
        }

        let mut factor = 1.0;
        for cell in VoxelLine::new(from, to) {
            let absorption = model.absorption(voxels.voxel_at(cell), catalog);
            if absorption <= 0.0 {
                continue;
            }
            factor *= 1.0 - absorption;
            if factor <= cutoff {
                return 0.0;
            }
        }
        factor
    }

    /// Surviving fraction falling straight down a column
    ///
    /// Walks from `top` down to, but excluding, height `bottom_y`.
    pub fn vertical_factor(
        model: &mut AbsorptionModel,
        voxels: &dyn VoxelAccess,
        catalog: &VoxelCatalog,
        top: IVec3,
        bottom_y: i32,
        cutoff: f64,
    ) -> f64 {
        if cutoff >= 1.0 {
            return 0.0;
        }

        let mut factor = 1.0;
        let mut y = top.y;
        while y > bottom_y {
            let kind = voxels.voxel_at(IVec3::new(top.x, y, top.z));
            let absorption = model.absorption(kind, catalog);
            if absorption > 0.0 {
                factor *= 1.0 - absorption;
                if factor <= cutoff {
                    return 0.0;
                }
            }
            y -= 1;
        }
        factor
    }
}
