//! The moving body a query is issued for.

use nalgebra::Point3;

use crate::aabb::Aabb;
use crate::shape::Shape;
use crate::voxel::VoxelCoord;

/// Tolerance used by [`QueryContext::is_above`].
const ABOVE_TOLERANCE: f64 = 1.0e-5;

/// Opaque identifier of a moving body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u64);

/// A moving body that anchors a query.
///
/// Only the parts the query engine needs are modelled: the current bounding box,
/// the reference position, and whether the body is actively descending (some
/// block shapes, such as climbable platforms, depend on it).
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Identity of the body.
    pub id: BodyId,
    /// Current world-space bounding box.
    pub bounding_box: Aabb,
    /// Reference position, usually the bottom center of the bounding box.
    pub position: Point3<f64>,
    /// Whether the body is deliberately moving down.
    pub descending: bool,
}

impl Body {
    /// Creates a body positioned at the bottom center of its bounding box.
    #[must_use]
    pub fn new(id: BodyId, bounding_box: Aabb) -> Self {
        let center = bounding_box.center();
        Self {
            id,
            bounding_box,
            position: Point3::new(center.x, bounding_box.min.y, center.z),
            descending: false,
        }
    }

    /// Overrides the reference position.
    #[must_use]
    pub const fn with_position(mut self, position: Point3<f64>) -> Self {
        self.position = position;
        self
    }

    /// Sets the descending flag.
    #[must_use]
    pub const fn with_descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }
}

/// Identifies who is asking, passed through to every block shape lookup.
///
/// An empty context is used for queries not tied to a body (for example a
/// placement check); it also disables the world border guard.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryContext<'a> {
    body: Option<&'a Body>,
}

impl<'a> QueryContext<'a> {
    /// A context with no anchoring body.
    #[must_use]
    pub const fn empty() -> Self {
        Self { body: None }
    }

    /// A context anchored to `body`.
    #[must_use]
    pub const fn of(body: &'a Body) -> Self {
        Self { body: Some(body) }
    }

    /// A context anchored to `body` if present.
    #[must_use]
    pub const fn from_option(body: Option<&'a Body>) -> Self {
        Self { body }
    }

    /// The anchoring body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&'a Body> {
        self.body
    }

    /// Returns `true` if the anchoring body is descending.
    #[must_use]
    pub fn is_descending(&self) -> bool {
        self.body.is_some_and(|b| b.descending)
    }

    /// Returns `true` if the anchoring body rests on or above the top of `shape`
    /// placed at `pos`. Always `false` without a body.
    #[must_use]
    pub fn is_above(&self, shape: &Shape, pos: VoxelCoord) -> bool {
        let (Some(body), Some(bounds)) = (self.body, shape.bounds()) else {
            return false;
        };
        body.bounding_box.min.y > f64::from(pos.y) + bounds.max.y - ABOVE_TOLERANCE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn standing_body(feet: f64) -> Body {
        Body::new(
            BodyId(7),
            Aabb::from_bounds(0.2, feet, 0.2, 0.8, feet + 1.8, 0.8),
        )
    }

    #[test]
    fn test_body_position_is_bottom_center() {
        let body = standing_body(1.0);
        assert_eq!(body.position, Point3::new(0.5, 1.0, 0.5));
        assert!(!body.descending);
    }

    #[test]
    fn test_empty_context() {
        let ctx = QueryContext::empty();
        assert!(ctx.body().is_none());
        assert!(!ctx.is_descending());
        assert!(!ctx.is_above(&Shape::full_cube(), VoxelCoord::origin()));
    }

    #[test]
    fn test_descending() {
        let body = standing_body(1.0).with_descending(true);
        assert!(QueryContext::of(&body).is_descending());
    }

    #[test]
    fn test_is_above() {
        let on_top = standing_body(1.0);
        let sunk = standing_body(0.5);
        let cube = Shape::full_cube();
        assert!(QueryContext::of(&on_top).is_above(&cube, VoxelCoord::origin()));
        assert!(!QueryContext::of(&sunk).is_above(&cube, VoxelCoord::origin()));
    }
}
