//! The world border and the guard that turns it into a collision obstacle.
//!
//! The border is a square column, centered on `(center_x, center_z)`, infinite
//! vertically. Its collision shape is everything outside the playable interior.
//! [`border_obstacle`] decides, once per collision sweep, whether a body should
//! be pushed back by that shape: only while it is inside and within
//! [`EPSILON`] of the wall, never once it is already past it.

use nalgebra::Point3;
use tracing::debug;

use crate::aabb::Aabb;
use crate::consts::{DEFAULT_BORDER_SIZE, EPSILON, MAX_WORLD_EXTENT};
use crate::error::{QueryError, QueryResult};
use crate::shape::Shape;
use crate::voxel::VoxelCoord;

/// A square horizontal world boundary.
///
/// # Example
///
/// ```
/// use cf_voxel_query::WorldBorder;
///
/// let border = WorldBorder::try_new(0.0, 0.0, 20.0)?;
/// assert_eq!(border.min_x(), -10.0);
/// assert_eq!(border.max_z(), 10.0);
/// # Ok::<(), cf_voxel_query::QueryError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldBorder {
    center_x: f64,
    center_z: f64,
    size: f64,
    absolute_max: f64,
}

impl WorldBorder {
    /// Creates a border of diameter `size` centered on `(center_x, center_z)`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidBorderSize`] if `size` is not positive and
    /// finite, and [`QueryError::BorderOutOfRange`] if the center lies outside
    /// [`MAX_WORLD_EXTENT`].
    pub fn try_new(center_x: f64, center_z: f64, size: f64) -> QueryResult<Self> {
        if !size.is_finite() || size <= 0.0 {
            return Err(QueryError::InvalidBorderSize(size));
        }
        let in_range = |v: f64| v.is_finite() && v.abs() <= MAX_WORLD_EXTENT;
        if !in_range(center_x) || !in_range(center_z) {
            return Err(QueryError::BorderOutOfRange {
                x: center_x,
                z: center_z,
                limit: MAX_WORLD_EXTENT,
            });
        }
        Ok(Self {
            center_x,
            center_z,
            size,
            absolute_max: MAX_WORLD_EXTENT,
        })
    }

    /// Center X.
    #[must_use]
    pub const fn center_x(&self) -> f64 {
        self.center_x
    }

    /// Center Z.
    #[must_use]
    pub const fn center_z(&self) -> f64 {
        self.center_z
    }

    /// Diameter.
    #[must_use]
    pub const fn size(&self) -> f64 {
        self.size
    }

    /// Absolute limit the border edges are clamped to.
    #[must_use]
    pub const fn absolute_max(&self) -> f64 {
        self.absolute_max
    }

    /// Western edge.
    #[must_use]
    pub fn min_x(&self) -> f64 {
        (self.center_x - self.size / 2.0).max(-self.absolute_max)
    }

    /// Northern edge.
    #[must_use]
    pub fn min_z(&self) -> f64 {
        (self.center_z - self.size / 2.0).max(-self.absolute_max)
    }

    /// Eastern edge.
    #[must_use]
    pub fn max_x(&self) -> f64 {
        (self.center_x + self.size / 2.0).min(self.absolute_max)
    }

    /// Southern edge.
    #[must_use]
    pub fn max_z(&self) -> f64 {
        (self.center_z + self.size / 2.0).min(self.absolute_max)
    }

    /// The region outside the border, snapped outward to whole cells.
    #[must_use]
    pub fn collision_shape(&self) -> Shape {
        let everything = Aabb::from_bounds(
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::INFINITY,
            f64::INFINITY,
        );
        let interior = Aabb::from_bounds(
            self.min_x().floor(),
            f64::NEG_INFINITY,
            self.min_z().floor(),
            self.max_x().ceil(),
            f64::INFINITY,
            self.max_z().ceil(),
        );
        Shape::from_boxes(everything.subtract(&interior))
    }

    /// Returns `true` if the cell at `coord` starts inside the border.
    #[must_use]
    pub fn is_within_bounds(&self, coord: VoxelCoord) -> bool {
        self.contains_xz(f64::from(coord.x), f64::from(coord.z))
    }

    /// Returns `true` if the horizontal point lies inside the border.
    ///
    /// The western and northern edges are inside, the eastern and southern are not.
    #[must_use]
    pub fn contains_xz(&self, x: f64, z: f64) -> bool {
        x >= self.min_x() && x < self.max_x() && z >= self.min_z() && z < self.max_z()
    }

    /// Returns `true` if `aabb` overlaps the interior at all.
    #[must_use]
    pub fn is_aabb_within_bounds(&self, aabb: &Aabb) -> bool {
        aabb.max.x > self.min_x()
            && aabb.min.x < self.max_x()
            && aabb.max.z > self.min_z()
            && aabb.min.z < self.max_z()
    }

    /// Clamps the horizontal components of `point` into the border.
    #[must_use]
    pub fn clamp_to_bounds(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::new(
            point.x.clamp(self.min_x(), self.max_x()),
            point.y,
            point.z.clamp(self.min_z(), self.max_z()),
        )
    }

    /// Horizontal distance from `point` to the nearest edge.
    ///
    /// Negative when the point is outside.
    #[must_use]
    pub fn distance_to_border(&self, point: &Point3<f64>) -> f64 {
        let west = point.x - self.min_x();
        let east = self.max_x() - point.x;
        let north = point.z - self.min_z();
        let south = self.max_z() - point.z;
        west.min(east).min(north).min(south)
    }

    /// Returns `true` if `aabb` is strictly inside the cell-snapped interior on
    /// all four horizontal sides.
    #[must_use]
    pub fn is_box_fully_within(&self, aabb: &Aabb) -> bool {
        aabb.min.x > self.min_x().floor()
            && aabb.max.x < self.max_x().ceil()
            && aabb.min.z > self.min_z().floor()
            && aabb.max.z < self.max_z().ceil()
    }

    /// Returns `true` if `aabb`, shrunk by [`EPSILON`], already overlaps `shape`.
    #[must_use]
    pub fn is_outside(shape: &Shape, aabb: &Aabb) -> bool {
        shape.intersects_aabb(&aabb.deflate(EPSILON))
    }

    /// Returns `true` if `aabb`, grown by [`EPSILON`], overlaps `shape`.
    #[must_use]
    pub fn is_close_to(shape: &Shape, aabb: &Aabb) -> bool {
        shape.intersects_aabb(&aabb.inflate(EPSILON))
    }
}

impl Default for WorldBorder {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_z: 0.0,
            size: DEFAULT_BORDER_SIZE,
            absolute_max: MAX_WORLD_EXTENT,
        }
    }
}

/// The border shape to report as an obstacle for a body with bounding box
/// `body_box`, if any.
///
/// Bodies comfortably inside get nothing without the border shape ever being
/// built. Bodies already poking through get nothing either.
#[must_use]
pub fn border_obstacle(border: &WorldBorder, body_box: &Aabb) -> Option<Shape> {
    if border.is_box_fully_within(body_box) {
        return None;
    }
    let shape = border.collision_shape();
    if WorldBorder::is_outside(&shape, body_box) {
        debug!(
            min_x = body_box.min.x,
            min_z = body_box.min.z,
            "body already past world border"
        );
        return None;
    }
    if WorldBorder::is_close_to(&shape, body_box) {
        debug!(
            min_x = body_box.min.x,
            min_z = body_box.min.z,
            "world border obstacle emitted"
        );
        return Some(shape);
    }
    None
}
