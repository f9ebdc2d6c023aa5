//! Integer cell ranges.

use crate::aabb::Aabb;
use crate::voxel::VoxelCoord;

/// An inclusive box of cells.
///
/// The collision sweep uses one of these to describe the cells a query box can
/// touch, padded by one cell of shell on every side.
///
/// # Example
///
/// ```
/// use cf_voxel_query::{GridBounds, VoxelCoord};
///
/// let bounds = GridBounds::new(
///     VoxelCoord::new(0, 0, 0),
///     VoxelCoord::new(10, 10, 10),
/// );
///
/// assert!(bounds.contains(VoxelCoord::new(5, 5, 5)));
/// assert!(!bounds.contains(VoxelCoord::new(15, 5, 5)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridBounds {
    /// Minimum corner (inclusive).
    pub min: VoxelCoord,
    /// Maximum corner (inclusive).
    pub max: VoxelCoord,
}

impl GridBounds {
    /// Creates bounds from two corners, reordering so `min <= max` on each axis.
    #[must_use]
    pub fn new(a: VoxelCoord, b: VoxelCoord) -> Self {
        Self {
            min: VoxelCoord::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: VoxelCoord::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Bounds holding one cell.
    #[must_use]
    pub const fn from_point(coord: VoxelCoord) -> Self {
        Self {
            min: coord,
            max: coord,
        }
    }

    /// The cells a box occupies, with each face pushed outward by `pad`.
    ///
    /// A `pad` of zero gives `[floor(min), floor(max)]`; a positive pad catches
    /// cells whose face the box merely grazes.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxel_query::{Aabb, GridBounds, VoxelCoord};
    ///
    /// let aabb = Aabb::from_bounds(0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
    /// let tight = GridBounds::covering(&aabb, 0.0);
    /// assert_eq!(tight.max, VoxelCoord::new(1, 1, 1));
    ///
    /// let padded = GridBounds::covering(&aabb, 1.0e-7);
    /// assert_eq!(padded.min, VoxelCoord::new(-1, -1, -1));
    /// ```
    #[must_use]
    pub fn covering(aabb: &Aabb, pad: f64) -> Self {
        Self {
            min: VoxelCoord::containing(&aabb.min.map(|v| v - pad)),
            max: VoxelCoord::containing(&aabb.max.map(|v| v + pad)),
        }
    }

    /// Returns these bounds grown by `cells` on every side.
    #[must_use]
    pub const fn expand(&self, cells: i32) -> Self {
        Self {
            min: VoxelCoord::new(
                self.min.x.saturating_sub(cells),
                self.min.y.saturating_sub(cells),
                self.min.z.saturating_sub(cells),
            ),
            max: VoxelCoord::new(
                self.max.x.saturating_add(cells),
                self.max.y.saturating_add(cells),
                self.max.z.saturating_add(cells),
            ),
        }
    }

    /// Cell counts along X, Y and Z.
    #[must_use]
    pub const fn size(&self) -> (u32, u32, u32) {
        (
            self.max.x.abs_diff(self.min.x).saturating_add(1),
            self.max.y.abs_diff(self.min.y).saturating_add(1),
            self.max.z.abs_diff(self.min.z).saturating_add(1),
        )
    }

    /// Total number of cells.
    #[must_use]
    pub fn volume(&self) -> u64 {
        let (w, h, d) = self.size();
        u64::from(w)
            .saturating_mul(u64::from(h))
            .saturating_mul(u64::from(d))
    }

    /// Returns `true` if `coord` lies within the bounds, both ends inclusive.
    #[must_use]
    pub const fn contains(&self, coord: VoxelCoord) -> bool {
        coord.x >= self.min.x
            && coord.x <= self.max.x
            && coord.y >= self.min.y
            && coord.y <= self.max.y
            && coord.z >= self.min.z
            && coord.z <= self.max.z
    }

    /// How far outside the bounds `coord` is along each axis, in cells.
    ///
    /// Zero on an axis means the coordinate is within range on that axis.
    #[must_use]
    pub fn overshoot(&self, coord: VoxelCoord) -> [u32; 3] {
        let axis = |v: i32, lo: i32, hi: i32| {
            if v < lo {
                lo.abs_diff(v)
            } else if v > hi {
                v.abs_diff(hi)
            } else {
                0
            }
        };
        [
            axis(coord.x, self.min.x, self.max.x),
            axis(coord.y, self.min.y, self.max.y),
            axis(coord.z, self.min.z, self.max.z),
        ]
    }

    /// Iterates all cells, X fastest, then Y, then Z.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxel_query::{GridBounds, VoxelCoord};
    ///
    /// let bounds = GridBounds::new(VoxelCoord::new(0, 0, 0), VoxelCoord::new(1, 1, 1));
    /// let coords: Vec<_> = bounds.iter().collect();
    /// assert_eq!(coords.len(), 8);
    /// assert_eq!(coords[1], VoxelCoord::new(1, 0, 0));
    /// ```
    #[must_use]
    pub fn iter(&self) -> GridBoundsIter {
        let (w, h, _) = self.size();
        GridBoundsIter {
            origin: self.min,
            width: u64::from(w),
            layer: u64::from(w).saturating_mul(u64::from(h)),
            next: 0,
            end: self.volume(),
        }
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        Self::from_point(VoxelCoord::origin())
    }
}

impl IntoIterator for GridBounds {
    type Item = VoxelCoord;
    type IntoIter = GridBoundsIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &GridBounds {
    type Item = VoxelCoord;
    type IntoIter = GridBoundsIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the cells of a [`GridBounds`].
///
/// Walks a linear cell index and decodes it per step, so it cannot overflow at
/// the edges of the `i32` range.
#[derive(Debug, Clone)]
pub struct GridBoundsIter {
    origin: VoxelCoord,
    /// Cells per X row.
    width: u64,
    /// Cells per XY layer.
    layer: u64,
    next: u64,
    end: u64,
}

/// `base + by`, where `by` never exceeds the span of one axis.
fn shift(base: i32, by: u64) -> i32 {
    base.wrapping_add_unsigned(u32::try_from(by).unwrap_or(u32::MAX))
}

impl Iterator for GridBoundsIter {
    type Item = VoxelCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let index = self.next;
        self.next += 1;

        let in_layer = index % self.layer;
        Some(VoxelCoord::new(
            shift(self.origin.x, in_layer % self.width),
            shift(self.origin.y, in_layer / self.width),
            shift(self.origin.z, index / self.layer),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.end - self.next).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GridBoundsIter {}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_new_auto_order() {
        let bounds = GridBounds::new(VoxelCoord::new(4, -1, 3), VoxelCoord::new(-2, 5, 3));
        assert_eq!(bounds.min, VoxelCoord::new(-2, -1, 3));
        assert_eq!(bounds.max, VoxelCoord::new(4, 5, 3));
    }

    #[test]
    fn test_bounds_size_and_volume() {
        let bounds = GridBounds::new(VoxelCoord::new(0, 0, 0), VoxelCoord::new(9, 19, 29));
        assert_eq!(bounds.size(), (10, 20, 30));
        assert_eq!(bounds.volume(), 6000);
        assert_eq!(GridBounds::default().volume(), 1);
    }

    #[test]
    fn test_covering_negative_box() {
        let aabb = Aabb::from_bounds(-1.5, -0.25, 2.0, -0.5, 0.75, 2.5);
        let bounds = GridBounds::covering(&aabb, 0.0);
        assert_eq!(bounds.min, VoxelCoord::new(-2, -1, 2));
        assert_eq!(bounds.max, VoxelCoord::new(-1, 0, 2));
    }

    #[test]
    fn test_expand() {
        let bounds = GridBounds::from_point(VoxelCoord::new(3, 3, 3)).expand(1);
        assert_eq!(bounds.size(), (3, 3, 3));
        assert!(bounds.contains(VoxelCoord::new(2, 4, 2)));
    }

    #[test]
    fn test_overshoot() {
        let bounds = GridBounds::new(VoxelCoord::new(0, 0, 0), VoxelCoord::new(2, 2, 2));
        assert_eq!(bounds.overshoot(VoxelCoord::new(1, 1, 1)), [0, 0, 0]);
        assert_eq!(bounds.overshoot(VoxelCoord::new(-1, 1, 3)), [1, 0, 1]);
        assert_eq!(bounds.overshoot(VoxelCoord::new(5, -2, 0)), [3, 2, 0]);
    }

    #[test]
    fn test_iter_order_x_fastest() {
        let bounds = GridBounds::new(VoxelCoord::new(0, 0, 0), VoxelCoord::new(1, 1, 1));
        let coords: Vec<_> = bounds.iter().collect();
        assert_eq!(
            coords,
            vec![
                VoxelCoord::new(0, 0, 0),
                VoxelCoord::new(1, 0, 0),
                VoxelCoord::new(0, 1, 0),
                VoxelCoord::new(1, 1, 0),
                VoxelCoord::new(0, 0, 1),
                VoxelCoord::new(1, 0, 1),
                VoxelCoord::new(0, 1, 1),
                VoxelCoord::new(1, 1, 1),
            ]
        );
    }

    #[test]
    fn test_iter_exact_size() {
        let bounds = GridBounds::new(VoxelCoord::new(-3, 0, 0), VoxelCoord::new(2, 3, 1));
        let mut iter = bounds.iter();
        assert_eq!(iter.len(), 48);
        iter.next();
        assert_eq!(iter.len(), 47);
        assert_eq!(iter.count(), 47);
    }

    #[test]
    fn test_iter_at_i32_max_terminates() {
        let corner = VoxelCoord::new(i32::MAX, i32::MAX, i32::MAX);
        let coords: Vec<_> = GridBounds::from_point(corner).into_iter().collect();
        assert_eq!(coords, vec![corner]);
    }
}
