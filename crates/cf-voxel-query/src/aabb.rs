//! Axis-aligned bounding boxes in world coordinates.
//!
//! [`Aabb`] is the primitive every query is phrased in: swept collision volumes,
//! the boxes a [`Shape`](crate::Shape) is built from, and the per-cell bounds the
//! collision fast path tests against.
//!
//! # Example
//!
//! ```
//! use cf_voxel_query::Aabb;
//! use nalgebra::{Point3, Vector3};
//!
//! let body = Aabb::new(Point3::new(0.2, 1.0, 0.2), Point3::new(0.8, 2.8, 0.8));
//!
//! // The volume a body sweeps while moving down by half a block.
//! let swept = body.expand_towards(&Vector3::new(0.0, -0.5, 0.0));
//! assert!((swept.min.y - 0.5).abs() < 1e-12);
//! ```

use nalgebra::{Point3, Vector3};

use crate::consts::EPSILON;
use crate::direction::{Axis, Direction};
use crate::error::{QueryError, QueryResult};
use crate::voxel::VoxelCoord;

/// An axis-aligned bounding box in world coordinates.
///
/// Zero-volume (degenerate) boxes are valid; they never intersect anything.
///
/// # Example
///
/// ```
/// use cf_voxel_query::Aabb;
/// use nalgebra::Point3;
///
/// let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
/// let b = Aabb::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
///
/// // Touching faces do not intersect.
/// assert!(!a.intersects(&b));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3<f64>,
    /// Maximum corner of the bounding box.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Creates a new AABB from two corners.
    ///
    /// The corners are automatically reordered if necessary.
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates an AABB, rejecting corners that are NaN or infinite.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NonFinite`] if any component is not finite.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxel_query::{Aabb, QueryError};
    /// use nalgebra::Point3;
    ///
    /// let bad = Aabb::try_new(Point3::new(f64::NAN, 0.0, 0.0), Point3::origin());
    /// assert!(matches!(bad, Err(QueryError::NonFinite { .. })));
    /// ```
    pub fn try_new(a: Point3<f64>, b: Point3<f64>) -> QueryResult<Self> {
        for p in [&a, &b] {
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                return Err(QueryError::NonFinite {
                    what: "box corner",
                    x: p.x,
                    y: p.y,
                    z: p.z,
                });
            }
        }
        Ok(Self::new(a, b))
    }

    /// Creates an AABB from six bounds.
    #[must_use]
    pub fn from_bounds(
        min_x: f64,
        min_y: f64,
        min_z: f64,
        max_x: f64,
        max_y: f64,
        max_z: f64,
    ) -> Self {
        Self::new(
            Point3::new(min_x, min_y, min_z),
            Point3::new(max_x, max_y, max_z),
        )
    }

    /// The unit cube at the origin.
    #[must_use]
    pub fn unit() -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::new(1.0, 1.0, 1.0),
        }
    }

    /// The unit cube occupying a world cell.
    #[must_use]
    pub fn cell(coord: VoxelCoord) -> Self {
        let min = coord.to_point();
        Self {
            min,
            max: min + Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Returns the center point of the AABB.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns the full size (dimensions) of the AABB.
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Returns `true` if the box has positive extent on every axis.
    #[must_use]
    pub fn has_volume(&self) -> bool {
        self.max.x > self.min.x && self.max.y > self.min.y && self.max.z > self.min.z
    }

    /// Checks if a point is inside the AABB.
    ///
    /// Points on the boundary are considered inside.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Checks if this AABB overlaps another with positive volume.
    ///
    /// Boxes that only share a face, edge or corner do not intersect, and a
    /// zero-volume box intersects nothing.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.has_volume()
            && other.has_volume()
            && self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Checks if this AABB overlaps the unit cell at `coord`.
    ///
    /// Always `false` for a zero-volume box.
    #[must_use]
    pub fn intersects_cell(&self, coord: VoxelCoord) -> bool {
        let x = f64::from(coord.x);
        let y = f64::from(coord.y);
        let z = f64::from(coord.z);
        self.has_volume()
            && self.min.x < x + 1.0
            && self.max.x > x
            && self.min.y < y + 1.0
            && self.max.y > y
            && self.min.z < z + 1.0
            && self.max.z > z
    }

    /// Returns the positive-volume overlap of two boxes, if any.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let candidate = Self {
            min: Point3::new(
                self.min.x.max(other.min.x),
                self.min.y.max(other.min.y),
                self.min.z.max(other.min.z),
            ),
            max: Point3::new(
                self.max.x.min(other.max.x),
                self.max.y.min(other.max.y),
                self.max.z.min(other.max.z),
            ),
        };
        candidate.has_volume().then_some(candidate)
    }

    /// Returns the smallest AABB containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Returns this box moved by `offset`.
    #[must_use]
    pub fn translate(&self, offset: &Vector3<f64>) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Returns this box grown by `amount` on every side.
    ///
    /// A negative amount shrinks it; the result is not reordered.
    #[must_use]
    pub fn inflate(&self, amount: f64) -> Self {
        let grow = Vector3::new(amount, amount, amount);
        Self {
            min: self.min - grow,
            max: self.max + grow,
        }
    }

    /// Returns this box shrunk by `amount` on every side.
    #[must_use]
    pub fn deflate(&self, amount: f64) -> Self {
        self.inflate(-amount)
    }

    /// Returns the volume this box sweeps while moving by `motion`.
    #[must_use]
    pub fn expand_towards(&self, motion: &Vector3<f64>) -> Self {
        let mut expanded = *self;
        for i in 0..3 {
            if motion[i] < 0.0 {
                expanded.min[i] += motion[i];
            } else if motion[i] > 0.0 {
                expanded.max[i] += motion[i];
            }
        }
        expanded
    }

    /// Returns the point of this box closest to `target`.
    #[must_use]
    pub fn closest_point(&self, target: &Point3<f64>) -> Point3<f64> {
        Point3::new(
            target.x.clamp(self.min.x, self.max.x),
            target.y.clamp(self.min.y, self.max.y),
            target.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Clips the segment `from -> to` against the faces of this box.
    ///
    /// Returns the segment parameter `t` in `(0, 1)` of the nearest face crossing
    /// and the face entered. Face bounds are widened by [`EPSILON`] so a segment
    /// grazing an edge still registers. Faces are tested in X, Y, Z order and an
    /// exact tie keeps the earlier axis.
    #[must_use]
    pub fn clip(&self, from: &Point3<f64>, to: &Point3<f64>) -> Option<(f64, Direction)> {
        self.clip_below(from, to, 1.0)
    }

    /// Like [`Aabb::clip`], but only accepts crossings strictly before `limit`.
    pub(crate) fn clip_below(
        &self,
        from: &Point3<f64>,
        to: &Point3<f64>,
        limit: f64,
    ) -> Option<(f64, Direction)> {
        let delta = to - from;
        let mut scale = limit;
        let mut best = None;

        for axis in Axis::ALL {
            let i = axis.index();
            let (plane, face) = if delta[i] > EPSILON {
                (self.min[i], Direction::from_axis(axis, false))
            } else if delta[i] < -EPSILON {
                (self.max[i], Direction::from_axis(axis, true))
            } else {
                continue;
            };

            let t = (plane - from[i]) / delta[i];
            if t <= 0.0 || t >= scale {
                continue;
            }

            let j = (i + 1) % 3;
            let k = (i + 2) % 3;
            let a = t.mul_add(delta[j], from[j]);
            let b = t.mul_add(delta[k], from[k]);
            if self.min[j] - EPSILON < a
                && a < self.max[j] + EPSILON
                && self.min[k] - EPSILON < b
                && b < self.max[k] + EPSILON
            {
                scale = t;
                best = Some((t, face));
            }
        }

        best
    }

    /// Returns the parts of this box not covered by `other`.
    ///
    /// The pieces are disjoint and at most six; when the boxes do not overlap the
    /// result is this box alone.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Vec<Self> {
        if !self.intersects(other) {
            return vec![*self];
        }

        let mut pieces = Vec::with_capacity(6);
        let mut rest = *self;
        for i in 0..3 {
            if other.min[i] > rest.min[i] {
                let mut below = rest;
                below.max[i] = other.min[i];
                pieces.push(below);
                rest.min[i] = other.min[i];
            }
            if other.max[i] < rest.max[i] {
                let mut above = rest;
                above.min[i] = other.max[i];
                pieces.push(above);
                rest.max[i] = other.max[i];
            }
        }
        pieces
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Point3::origin(), Point3::origin())
    }
}
