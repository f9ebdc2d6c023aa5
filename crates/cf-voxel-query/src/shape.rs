//! Immutable box-list shapes.
//!
//! A [`Shape`] is a region made of axis-aligned boxes. Block collision, outline,
//! interaction and fluid geometry are all shapes, expressed in the cell's local
//! space (`[0, 1]` per axis for an ordinary block) and translated into world space
//! by the query engine.
//!
//! Shapes share their storage: cloning, and translating or combining with an
//! empty shape, never copies boxes. The two hot constants, [`Shape::empty`] and
//! [`Shape::full_cube`], are interned singletons so the collision fast path can
//! recognise a full cube by pointer identity.
//!
//! # Example
//!
//! ```
//! use cf_voxel_query::{Aabb, Shape};
//!
//! let slab = Shape::from_bounds(0.0, 0.0, 0.0, 1.0, 0.5, 1.0);
//! let post = Shape::from_bounds(0.375, 0.0, 0.375, 0.625, 1.0, 0.625);
//! let combined = slab.union(&post);
//!
//! assert!(combined.intersects_aabb(&Aabb::from_bounds(0.4, 0.8, 0.4, 0.6, 0.9, 0.6)));
//! assert!(!combined.intersects_aabb(&Aabb::from_bounds(0.0, 0.8, 0.0, 0.2, 0.9, 0.2)));
//! ```

use std::sync::{Arc, LazyLock};

use nalgebra::{Point3, Vector3};

use crate::aabb::Aabb;
use crate::consts::{CLIP_INSIDE_NUDGE, MIN_CLIP_LENGTH_SQUARED};
use crate::direction::Direction;
use crate::raycast::BlockHit;
use crate::voxel::VoxelCoord;

static EMPTY: LazyLock<Shape> = LazyLock::new(|| Shape {
    boxes: Arc::from(Vec::new()),
});

static FULL_CUBE: LazyLock<Shape> = LazyLock::new(|| Shape {
    boxes: Arc::from(vec![Aabb::unit()]),
});

/// An immutable region composed of axis-aligned boxes.
///
/// Only boxes with positive volume are stored, so a shape is empty exactly when
/// its box list is. Boxes may overlap; all operations treat the shape as the
/// union of its boxes.
#[derive(Debug, Clone)]
pub struct Shape {
    boxes: Arc<[Aabb]>,
}

impl Shape {
    /// The empty shape.
    #[must_use]
    pub fn empty() -> Self {
        EMPTY.clone()
    }

    /// The canonical unit cube `[0, 1]^3`.
    ///
    /// Every call returns the same interned value; see [`Shape::is_full_cube`].
    #[must_use]
    pub fn full_cube() -> Self {
        FULL_CUBE.clone()
    }

    /// A shape made of a single box. Zero-volume boxes give the empty shape.
    #[must_use]
    pub fn cuboid(aabb: Aabb) -> Self {
        Self::from_boxes([aabb])
    }

    /// A single-box shape from six bounds.
    #[must_use]
    pub fn from_bounds(
        min_x: f64,
        min_y: f64,
        min_z: f64,
        max_x: f64,
        max_y: f64,
        max_z: f64,
    ) -> Self {
        Self::cuboid(Aabb::from_bounds(min_x, min_y, min_z, max_x, max_y, max_z))
    }

    /// A shape from any number of boxes. Zero-volume boxes are dropped.
    #[must_use]
    pub fn from_boxes<I>(boxes: I) -> Self
    where
        I: IntoIterator<Item = Aabb>,
    {
        let boxes: Vec<Aabb> = boxes.into_iter().filter(Aabb::has_volume).collect();
        if boxes.is_empty() {
            Self::empty()
        } else {
            Self {
                boxes: Arc::from(boxes),
            }
        }
    }

    /// The boxes making up this shape.
    #[must_use]
    pub fn boxes(&self) -> &[Aabb] {
        &self.boxes
    }

    /// Returns `true` if the shape covers no volume.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Returns `true` if this is the interned unit cube.
    ///
    /// This is an identity test: a geometrically identical shape built some other
    /// way is not the full cube.
    #[must_use]
    pub fn is_full_cube(&self) -> bool {
        Arc::ptr_eq(&self.boxes, &FULL_CUBE.boxes)
    }

    /// Returns the bounding box of the shape, or `None` if it is empty.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        let (first, rest) = self.boxes.split_first()?;
        Some(rest.iter().fold(*first, |acc, b| acc.union(b)))
    }

    /// Returns this shape moved by `offset`. Empty shapes stay empty.
    #[must_use]
    pub fn translate(&self, offset: &Vector3<f64>) -> Self {
        if self.is_empty() {
            return self.clone();
        }
        Self {
            boxes: self.boxes.iter().map(|b| b.translate(offset)).collect(),
        }
    }

    /// Returns this shape moved from local cell space into the cell at `coord`.
    #[must_use]
    pub fn translate_to_cell(&self, coord: VoxelCoord) -> Self {
        self.translate(&coord.to_vector())
    }

    /// Returns the region covered by either shape.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        Self {
            boxes: self.boxes.iter().chain(other.boxes.iter()).copied().collect(),
        }
    }

    /// Returns the region covered by both shapes.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::empty();
        }
        Self::from_boxes(
            self.boxes
                .iter()
                .flat_map(|a| other.boxes.iter().filter_map(move |b| a.intersection(b))),
        )
    }

    /// Returns the region covered by this shape but not by `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return self.clone();
        }
        let mut pieces: Vec<Aabb> = self.boxes.to_vec();
        for cutter in other.boxes.iter() {
            pieces = pieces.iter().flat_map(|p| p.subtract(cutter)).collect();
            if pieces.is_empty() {
                break;
            }
        }
        Self::from_boxes(pieces)
    }

    /// Returns `true` if the two shapes overlap with positive volume.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.boxes
            .iter()
            .any(|a| other.boxes.iter().any(|b| a.intersects(b)))
    }

    /// Returns `true` if the shape overlaps `aabb` with positive volume.
    #[must_use]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.boxes.iter().any(|b| b.intersects(aabb))
    }

    /// Returns `true` if `point` lies inside the shape.
    ///
    /// Minimum faces are inside, maximum faces are not, so a point on a shared
    /// cell boundary belongs to exactly one cell.
    #[must_use]
    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        self.boxes.iter().any(|b| {
            point.x >= b.min.x
                && point.x < b.max.x
                && point.y >= b.min.y
                && point.y < b.max.y
                && point.z >= b.min.z
                && point.z < b.max.z
        })
    }

    /// Returns `true` if both shapes cover exactly the same region.
    #[must_use]
    pub fn same_region(&self, other: &Self) -> bool {
        self.difference(other).is_empty() && other.difference(self).is_empty()
    }

    /// Returns the point of the shape closest to `target`, or `None` if empty.
    #[must_use]
    pub fn closest_point_to(&self, target: &Point3<f64>) -> Option<Point3<f64>> {
        self.boxes
            .iter()
            .map(|b| b.closest_point(target))
            .min_by(|a, b| {
                (a - target)
                    .norm_squared()
                    .total_cmp(&(b - target).norm_squared())
            })
    }

    /// Clips the world-space segment `from -> to` against this shape placed in the
    /// cell at `pos`.
    ///
    /// If the segment starts inside the shape the hit is reported just past the
    /// start, flagged `inside`, with the face opposite the direction of travel.
    /// Otherwise the nearest face crossing wins.
    #[must_use]
    pub fn clip(&self, from: &Point3<f64>, to: &Point3<f64>, pos: VoxelCoord) -> Option<BlockHit> {
        if self.is_empty() {
            return None;
        }
        let delta = to - from;
        if delta.norm_squared() < MIN_CLIP_LENGTH_SQUARED {
            return None;
        }

        let offset = pos.to_vector();
        let nudged = from + delta * CLIP_INSIDE_NUDGE;
        if self.contains_point(&(nudged - offset)) {
            return Some(BlockHit {
                location: nudged,
                face: Direction::nearest(&delta).opposite(),
                coord: pos,
                inside: true,
            });
        }

        let mut scale = 1.0;
        let mut face = None;
        for b in self.boxes.iter() {
            if let Some((t, entered)) = b.translate(&offset).clip_below(from, to, scale) {
                scale = t;
                face = Some(entered);
            }
        }

        face.map(|face| BlockHit {
            location: from + delta * scale,
            face,
            coord: pos,
            inside: false,
        })
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Aabb> for Shape {
    fn from(aabb: Aabb) -> Self {
        Self::cuboid(aabb)
    }
}
