//! Cell enumeration around a query box, with zone tags.
//!
//! A block's collision shape normally stays inside its own cell. Only blocks
//! flagged as having a large shape may reach one cell further, and only moving
//! placeholders may reach diagonally. [`ShellCursor`] walks the query box padded
//! by one cell and tags each coordinate with a [`Zone`] so the collision sweep
//! can skip cells that cannot matter before it fetches anything.

use crate::aabb::Aabb;
use crate::consts::EPSILON;
use crate::grid::{GridBounds, GridBoundsIter};
use crate::store::BlockState;
use crate::voxel::VoxelCoord;

/// Where a cell sits relative to the query box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    /// Inside the box's own cell range.
    Core,
    /// One cell outside along exactly one axis.
    EdgeShell,
    /// One cell outside along two or three axes.
    CornerShell,
    /// Two or more cells outside on some axis.
    OutOfRange,
}

impl Zone {
    /// Classifies `coord` against the un-padded cell range `core`.
    #[must_use]
    pub fn classify(core: &GridBounds, coord: VoxelCoord) -> Self {
        let overshoot = core.overshoot(coord);
        if overshoot.iter().any(|&d| d >= 2) {
            return Self::OutOfRange;
        }
        match overshoot.iter().filter(|&&d| d == 1).count() {
            0 => Self::Core,
            1 => Self::EdgeShell,
            _ => Self::CornerShell,
        }
    }

    /// Returns `true` if the block state in a cell of this zone must be fetched.
    #[must_use]
    pub const fn needs_fetch(self) -> bool {
        !matches!(self, Self::OutOfRange)
    }

    /// Returns `true` if `block`, found in a cell of this zone, can reach the
    /// query box and must be shape-tested.
    ///
    /// Large shapes are not trusted to reach diagonally, so corner cells only
    /// admit moving placeholders.
    #[must_use]
    pub fn admits<B: BlockState + ?Sized>(self, block: &B) -> bool {
        match self {
            Self::Core => true,
            Self::EdgeShell => block.has_large_collision_shape() || block.is_moving_placeholder(),
            Self::CornerShell => block.is_moving_placeholder(),
            Self::OutOfRange => false,
        }
    }
}

/// Iterator over every cell a query box could be obstructed by.
///
/// Covers `[floor(min - EPSILON) - 1, floor(max + EPSILON) + 1]` on each axis,
/// X fastest, then Y, then Z.
#[derive(Debug, Clone)]
pub struct ShellCursor {
    core: GridBounds,
    bounds: GridBounds,
    cells: GridBoundsIter,
}

impl ShellCursor {
    /// Creates a cursor around `aabb`.
    #[must_use]
    pub fn new(aabb: &Aabb) -> Self {
        let core = GridBounds::covering(aabb, 0.0);
        let bounds = GridBounds::covering(aabb, EPSILON).expand(1);
        Self {
            core,
            bounds,
            cells: bounds.iter(),
        }
    }

    /// The un-padded cell range of the query box.
    #[must_use]
    pub const fn core(&self) -> GridBounds {
        self.core
    }

    /// The full range being walked.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }
}

impl Iterator for ShellCursor {
    type Item = (VoxelCoord, Zone);

    fn next(&mut self) -> Option<Self::Item> {
        let coord = self.cells.next()?;
        Some((coord, Zone::classify(&self.core, coord)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cells.size_hint()
    }
}

impl ExactSizeIterator for ShellCursor {}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::context::BodyId;
    use crate::memory::SimpleBlock;
    use crate::shape::Shape;

    fn zone_at(mut cursor: ShellCursor, coord: VoxelCoord) -> Zone {
        cursor
            .find(|(c, _)| *c == coord)
            .map(|(_, zone)| zone)
            .unwrap()
    }

    #[test]
    fn test_fractional_box_has_no_out_of_range() {
        let cursor = ShellCursor::new(&Aabb::from_bounds(0.2, 0.2, 0.2, 0.8, 0.8, 0.8));
        assert_eq!(cursor.len(), 27);
        let zones: Vec<_> = cursor.map(|(_, z)| z).collect();
        assert_eq!(zones.iter().filter(|z| **z == Zone::Core).count(), 1);
        assert_eq!(zones.iter().filter(|z| **z == Zone::EdgeShell).count(), 6);
        assert_eq!(zones.iter().filter(|z| **z == Zone::CornerShell).count(), 20);
    }

    #[test]
    fn test_integral_box_pads_to_out_of_range() {
        let aabb = Aabb::from_bounds(0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        let cursor = ShellCursor::new(&aabb);
        assert_eq!(cursor.bounds().min, VoxelCoord::new(-2, -2, -2));
        assert_eq!(cursor.bounds().max, VoxelCoord::new(2, 2, 2));
        assert_eq!(cursor.core().max, VoxelCoord::new(1, 1, 1));

        assert_eq!(zone_at(ShellCursor::new(&aabb), VoxelCoord::new(-2, 0, 0)), Zone::OutOfRange);
        assert_eq!(zone_at(ShellCursor::new(&aabb), VoxelCoord::new(-1, 0, 0)), Zone::EdgeShell);
        assert_eq!(zone_at(ShellCursor::new(&aabb), VoxelCoord::new(2, 1, 1)), Zone::EdgeShell);
        assert_eq!(zone_at(ShellCursor::new(&aabb), VoxelCoord::new(-1, 2, 0)), Zone::CornerShell);
        assert_eq!(zone_at(ShellCursor::new(&aabb), VoxelCoord::new(0, 1, 0)), Zone::Core);
    }

    #[test]
    fn test_classify_three_axis_corner() {
        let core = GridBounds::from_point(VoxelCoord::origin());
        assert_eq!(Zone::classify(&core, VoxelCoord::new(1, 1, 1)), Zone::CornerShell);
        assert_eq!(Zone::classify(&core, VoxelCoord::new(1, -1, 0)), Zone::CornerShell);
        assert_eq!(Zone::classify(&core, VoxelCoord::new(0, 0, -3)), Zone::OutOfRange);
    }

    #[test]
    fn test_admits() {
        let plain = SimpleBlock::solid();
        let large = SimpleBlock::solid().with_large_collision_shape(true);
        let moving = SimpleBlock::moving_placeholder(Shape::full_cube(), Some(BodyId(3)));

        assert!(Zone::Core.admits(&plain));
        assert!(!Zone::EdgeShell.admits(&plain));
        assert!(Zone::EdgeShell.admits(&large));
        assert!(Zone::EdgeShell.admits(&moving));
        assert!(!Zone::CornerShell.admits(&large));
        assert!(Zone::CornerShell.admits(&moving));
        assert!(!Zone::OutOfRange.admits(&moving));
        assert!(!Zone::OutOfRange.needs_fetch());
        assert!(Zone::CornerShell.needs_fetch());
    }
}
