//! Voxel and section coordinate types.

use nalgebra::{Point3, Vector3};

use crate::consts::SECTION_SHIFT;
use crate::direction::Direction;

/// A discrete 3D coordinate of one world cell.
///
/// Uses `i32` coordinates; the world extends in both directions from the origin.
///
/// # Example
///
/// ```
/// use cf_voxel_query::{SectionPos, VoxelCoord};
///
/// let coord = VoxelCoord::new(-1, 64, 17);
/// assert_eq!(coord.section(), SectionPos::new(-1, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelCoord {
    /// X coordinate (west/east axis).
    pub x: i32,
    /// Y coordinate (vertical axis).
    pub y: i32,
    /// Z coordinate (north/south axis).
    pub z: i32,
}

impl VoxelCoord {
    /// Creates a new voxel coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Creates a coordinate at the origin (0, 0, 0).
    #[must_use]
    pub const fn origin() -> Self {
        Self::new(0, 0, 0)
    }

    /// Returns the cell containing a world-space point.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxel_query::VoxelCoord;
    /// use nalgebra::Point3;
    ///
    /// let coord = VoxelCoord::containing(&Point3::new(0.5, -0.5, 16.0));
    /// assert_eq!(coord, VoxelCoord::new(0, -1, 16));
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn containing(point: &Point3<f64>) -> Self {
        Self::new(
            point.x.floor() as i32,
            point.y.floor() as i32,
            point.z.floor() as i32,
        )
    }

    /// Returns the coordinate as an array.
    #[must_use]
    pub const fn as_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    /// Returns the minimum corner of this cell in world space.
    #[must_use]
    pub fn to_point(self) -> Point3<f64> {
        Point3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }

    /// Returns the minimum corner of this cell as a translation vector.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }

    /// Returns the world-space center of this cell.
    #[must_use]
    pub fn center(self) -> Point3<f64> {
        Point3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y) + 0.5,
            f64::from(self.z) + 0.5,
        )
    }

    /// Returns the chunk section this cell belongs to.
    #[must_use]
    pub const fn section(self) -> SectionPos {
        SectionPos::containing(self.x, self.z)
    }

    /// Returns the neighbouring cell in the given direction.
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        let step = direction.step();
        Self::new(
            self.x.wrapping_add(step.x),
            self.y.wrapping_add(step.y),
            self.z.wrapping_add(step.z),
        )
    }

    /// Squared distance from this cell's center to a world-space point.
    #[must_use]
    pub fn center_distance_squared(self, point: &Point3<f64>) -> f64 {
        (self.center() - point).norm_squared()
    }
}

impl From<(i32, i32, i32)> for VoxelCoord {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<[i32; 3]> for VoxelCoord {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl std::ops::Add for VoxelCoord {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(
            self.x.wrapping_add(other.x),
            self.y.wrapping_add(other.y),
            self.z.wrapping_add(other.z),
        )
    }
}

impl std::ops::Sub for VoxelCoord {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(
            self.x.wrapping_sub(other.x),
            self.y.wrapping_sub(other.y),
            self.z.wrapping_sub(other.z),
        )
    }
}

/// A horizontal chunk-section coordinate: `floor(voxel / 16)` on X and Z.
///
/// Sections are the unit the [`VoxelStore`](crate::VoxelStore) materializes lazily
/// and the key of the single-slot [`ChunkCache`](crate::ChunkCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectionPos {
    /// Section X index.
    pub x: i32,
    /// Section Z index.
    pub z: i32,
}

impl SectionPos {
    /// Creates a section coordinate from section indices.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Returns the section containing the voxel column `(x, z)`.
    ///
    /// Arithmetic shift floors toward negative infinity, so `-1` maps to section `-1`.
    #[must_use]
    pub const fn containing(x: i32, z: i32) -> Self {
        Self::new(x >> SECTION_SHIFT, z >> SECTION_SHIFT)
    }

    /// Returns the minimum voxel X of this section.
    #[must_use]
    pub const fn min_block_x(self) -> i32 {
        self.x << SECTION_SHIFT
    }

    /// Returns the minimum voxel Z of this section.
    #[must_use]
    pub const fn min_block_z(self) -> i32 {
        self.z << SECTION_SHIFT
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let coord = VoxelCoord::new(1, 2, 3);
        assert_eq!(coord.x, 1);
        assert_eq!(coord.y, 2);
        assert_eq!(coord.z, 3);
    }

    #[test]
    fn test_containing_floors_negative() {
        let coord = VoxelCoord::containing(&Point3::new(-0.0001, -1.0, -1.5));
        assert_eq!(coord, VoxelCoord::new(-1, -1, -2));
    }

    #[test]
    fn test_containing_on_grid_plane() {
        let coord = VoxelCoord::containing(&Point3::new(1.0, 2.0, 3.0));
        assert_eq!(coord, VoxelCoord::new(1, 2, 3));
    }

    #[test]
    fn test_to_point_and_center() {
        let coord = VoxelCoord::new(1, -2, 3);
        assert_eq!(coord.to_point(), Point3::new(1.0, -2.0, 3.0));
        assert_eq!(coord.center(), Point3::new(1.5, -1.5, 3.5));
        assert_eq!(coord.to_vector(), Vector3::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn test_section_positive() {
        assert_eq!(VoxelCoord::new(0, 0, 0).section(), SectionPos::new(0, 0));
        assert_eq!(VoxelCoord::new(15, 99, 15).section(), SectionPos::new(0, 0));
        assert_eq!(VoxelCoord::new(16, 0, 31).section(), SectionPos::new(1, 1));
    }

    #[test]
    fn test_section_negative() {
        assert_eq!(VoxelCoord::new(-1, 0, -16).section(), SectionPos::new(-1, -1));
        assert_eq!(VoxelCoord::new(-17, 0, 0).section(), SectionPos::new(-2, 0));
    }

    #[test]
    fn test_section_min_block() {
        let section = SectionPos::new(-2, 3);
        assert_eq!(section.min_block_x(), -32);
        assert_eq!(section.min_block_z(), 48);
        assert_eq!(
            VoxelCoord::new(section.min_block_x(), 0, section.min_block_z()).section(),
            section
        );
    }

    #[test]
    fn test_offset() {
        let coord = VoxelCoord::new(5, 5, 5);
        assert_eq!(coord.offset(Direction::Up), VoxelCoord::new(5, 6, 5));
        assert_eq!(coord.offset(Direction::North), VoxelCoord::new(5, 5, 4));
        assert_eq!(coord.offset(Direction::East), VoxelCoord::new(6, 5, 5));
    }

    #[test]
    fn test_center_distance_squared() {
        let coord = VoxelCoord::new(0, 0, 0);
        let d = coord.center_distance_squared(&Point3::new(0.5, 1.5, 0.5));
        assert_eq!(d, 1.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = VoxelCoord::new(1, 2, 3);
        let b = VoxelCoord::new(4, 5, 6);
        assert_eq!(a + b, VoxelCoord::new(5, 7, 9));
        assert_eq!(b - a, VoxelCoord::new(3, 3, 3));
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        assert!(VoxelCoord::new(0, 5, 5) < VoxelCoord::new(1, 0, 0));
        assert!(VoxelCoord::new(1, 0, 0) < VoxelCoord::new(1, 0, 1));
    }

    #[test]
    fn test_from_conversions() {
        let a: VoxelCoord = (1, 2, 3).into();
        let b: VoxelCoord = [1, 2, 3].into();
        assert_eq!(a, b);
        assert_eq!(a.as_array(), [1, 2, 3]);
    }
}
