//! Segment traversal and surface ray tracing.
//!
//! [`VoxelTraversal`] walks every cell a line segment passes through using the
//! DDA algorithm (Amanatides & Woo's fast voxel traversal). At each step it
//! crosses whichever cell boundary is nearest along the segment; exact ties are
//! broken X, then Z, then Y so the walk is reproducible.
//!
//! Both endpoints are pushed outward by [`EPSILON`] of the segment before they
//! are snapped to cells. A segment ending exactly on a grid plane therefore
//! always reaches the cell beyond that plane.
//!
//! [`ray_trace`] builds on the walk: per cell it clips the block's shape and,
//! if the caller asks for it, the fluid's shape, and stops at the first cell
//! that produces a hit.
//!
//! # Example
//!
//! ```
//! use cf_voxel_query::{ClipContext, MemoryStore, SimpleBlock, SimpleFluid, VoxelCoord, ray_trace};
//! use cf_voxel_query::Direction;
//! use nalgebra::Point3;
//!
//! let mut store: MemoryStore<SimpleBlock, SimpleFluid> = MemoryStore::new();
//! store.set_block(VoxelCoord::new(0, 0, 0), SimpleBlock::solid());
//!
//! let clip = ClipContext::new(Point3::new(0.5, 10.0, 0.5), Point3::new(0.5, -10.0, 0.5));
//! let result = ray_trace(&store, &clip);
//!
//! assert!(!result.is_miss());
//! assert_eq!(result.face(), Direction::Up);
//! assert_eq!(result.coord(), VoxelCoord::new(0, 0, 0));
//! ```

use nalgebra::Point3;
use tracing::debug;

use crate::consts::EPSILON;
use crate::context::{Body, QueryContext};
use crate::direction::Direction;
use crate::error::{QueryError, QueryResult};
use crate::shape::Shape;
use crate::store::{BlockState, ChunkAccess, ChunkCache, FluidState, VoxelStore};
use crate::voxel::VoxelCoord;

/// A point where a segment meets a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockHit {
    /// World-space hit point.
    pub location: Point3<f64>,
    /// Face the segment entered through.
    pub face: Direction,
    /// Cell the shape belongs to.
    pub coord: VoxelCoord,
    /// Whether the segment started inside the shape.
    pub inside: bool,
}

/// Outcome of [`ray_trace`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitResult {
    /// The segment hit a block shape.
    Block(BlockHit),
    /// The segment hit a fluid surface.
    Fluid(BlockHit),
    /// Nothing was hit. Carries the segment end, the face pointing back toward
    /// the start, and the cell containing the end.
    Miss(BlockHit),
}

impl HitResult {
    fn miss(start: &Point3<f64>, end: &Point3<f64>) -> Self {
        Self::Miss(BlockHit {
            location: *end,
            face: Direction::nearest(&(start - end)),
            coord: VoxelCoord::containing(end),
            inside: false,
        })
    }

    /// Returns `true` if nothing was hit.
    #[must_use]
    pub const fn is_miss(&self) -> bool {
        matches!(self, Self::Miss(_))
    }

    /// Returns the hit, or `None` on a miss.
    #[must_use]
    pub const fn hit(&self) -> Option<&BlockHit> {
        match self {
            Self::Block(hit) | Self::Fluid(hit) => Some(hit),
            Self::Miss(_) => None,
        }
    }

    const fn inner(&self) -> &BlockHit {
        match self {
            Self::Block(hit) | Self::Fluid(hit) | Self::Miss(hit) => hit,
        }
    }

    /// Hit point, or the segment end on a miss.
    #[must_use]
    pub const fn location(&self) -> Point3<f64> {
        self.inner().location
    }

    /// Face entered, or the face nearest the reverse direction on a miss.
    #[must_use]
    pub const fn face(&self) -> Direction {
        self.inner().face
    }

    /// Cell hit, or the cell containing the segment end on a miss.
    #[must_use]
    pub const fn coord(&self) -> VoxelCoord {
        self.inner().coord
    }
}

/// Which block shape a ray is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockShapeKind {
    /// The movement-blocking shape.
    Collider,
    /// The targeting outline.
    #[default]
    Outline,
    /// The sight-blocking shape.
    Visual,
}

impl BlockShapeKind {
    /// Looks up the matching shape of `block`.
    #[must_use]
    pub fn shape<B: BlockState + ?Sized>(
        self,
        block: &B,
        pos: VoxelCoord,
        ctx: &QueryContext<'_>,
    ) -> Shape {
        match self {
            Self::Collider => block.collision_shape(pos, ctx),
            Self::Outline => block.outline_shape(pos, ctx),
            Self::Visual => block.visual_shape(pos, ctx),
        }
    }
}

/// Which fluids a ray can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FluidFilter {
    /// Fluids are transparent.
    #[default]
    None,
    /// Only source fluids.
    SourceOnly,
    /// Any fluid.
    Any,
}

impl FluidFilter {
    /// Returns `true` if `fluid` should be clipped.
    #[must_use]
    pub fn accepts<F: FluidState + ?Sized>(self, fluid: &F) -> bool {
        match self {
            Self::None => false,
            Self::SourceOnly => fluid.is_source(),
            Self::Any => !fluid.is_empty(),
        }
    }
}

/// Parameters of a ray trace.
///
/// # Example
///
/// ```
/// use cf_voxel_query::{BlockShapeKind, ClipContext, FluidFilter};
/// use nalgebra::Point3;
///
/// let clip = ClipContext::new(Point3::new(0.0, 5.0, 0.0), Point3::new(0.0, -5.0, 0.0))
///     .with_block_shape(BlockShapeKind::Collider)
///     .with_fluid(FluidFilter::Any);
/// assert_eq!(clip.fluid, FluidFilter::Any);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClipContext<'a> {
    /// Segment start.
    pub start: Point3<f64>,
    /// Segment end.
    pub end: Point3<f64>,
    /// Block shape to test.
    pub block: BlockShapeKind,
    /// Fluids to test.
    pub fluid: FluidFilter,
    /// Body casting the ray, if any.
    pub body: Option<&'a Body>,
}

impl<'a> ClipContext<'a> {
    /// Creates a context testing outlines and ignoring fluids.
    #[must_use]
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self {
            start,
            end,
            ..Self::default()
        }
    }

    /// Creates a context after checking that both endpoints are finite.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NonFinite`] if either endpoint has a NaN or
    /// infinite component.
    pub fn try_new(start: Point3<f64>, end: Point3<f64>) -> QueryResult<Self> {
        for (what, p) in [("segment start", &start), ("segment end", &end)] {
            if !p.iter().all(|v| v.is_finite()) {
                return Err(QueryError::NonFinite {
                    what,
                    x: p.x,
                    y: p.y,
                    z: p.z,
                });
            }
        }
        Ok(Self::new(start, end))
    }

    /// Sets the block shape kind.
    #[must_use]
    pub const fn with_block_shape(mut self, block: BlockShapeKind) -> Self {
        self.block = block;
        self
    }

    /// Sets the fluid filter.
    #[must_use]
    pub const fn with_fluid(mut self, fluid: FluidFilter) -> Self {
        self.fluid = fluid;
        self
    }

    /// Anchors the trace to a body.
    #[must_use]
    pub const fn with_body(mut self, body: &'a Body) -> Self {
        self.body = Some(body);
        self
    }

    /// The query context handed to block shape lookups.
    #[must_use]
    pub const fn query_context(&self) -> QueryContext<'a> {
        QueryContext::from_option(self.body)
    }
}

/// Iterator over the cells a segment passes through, in order.
///
/// A zero-length segment yields nothing. Consecutive cells always share a face.
///
/// # Example
///
/// ```
/// use cf_voxel_query::{VoxelCoord, VoxelTraversal};
/// use nalgebra::Point3;
///
/// let cells: Vec<_> =
///     VoxelTraversal::new(&Point3::new(0.5, 0.5, 0.5), &Point3::new(2.5, 0.5, 0.5)).collect();
/// assert_eq!(
///     cells,
///     vec![VoxelCoord::new(0, 0, 0), VoxelCoord::new(1, 0, 0), VoxelCoord::new(2, 0, 0)]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct VoxelTraversal {
    /// Current cell.
    current: VoxelCoord,
    /// Step direction per axis (-1, 0 or 1).
    step: [i32; 3],
    /// Segment parameter of the next boundary crossing per axis.
    t_max: [f64; 3],
    /// Segment parameter between boundary crossings per axis.
    t_delta: [f64; 3],
    /// Whether the current cell has not been yielded yet.
    pending: bool,
}

impl VoxelTraversal {
    /// Creates a traversal from `start` to `end`.
    #[must_use]
    pub fn new(start: &Point3<f64>, end: &Point3<f64>) -> Self {
        let delta = end - start;
        let from = start - delta * EPSILON;
        let to = end + delta * EPSILON;
        let current = VoxelCoord::containing(&from);

        let mut step = [0i32; 3];
        let mut t_max = [f64::INFINITY; 3];
        let mut t_delta = [f64::INFINITY; 3];

        let span = to - from;
        for i in 0..3 {
            if span[i] > 0.0 {
                step[i] = 1;
            } else if span[i] < 0.0 {
                step[i] = -1;
            } else {
                continue;
            }
            t_delta[i] = f64::from(step[i]) / span[i];
            let frac = from[i] - from[i].floor();
            t_max[i] = t_delta[i] * if step[i] > 0 { 1.0 - frac } else { frac };
        }

        Self {
            current,
            step,
            t_max,
            t_delta,
            pending: start != end,
        }
    }

    /// Axis to step along next: X on ties with either, then Z, then Y.
    fn next_axis(&self) -> usize {
        let [tx, ty, tz] = self.t_max;
        if tx <= ty && tx <= tz {
            0
        } else if tz <= ty {
            2
        } else {
            1
        }
    }
}

impl Iterator for VoxelTraversal {
    type Item = VoxelCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending {
            self.pending = false;
            return Some(self.current);
        }

        if self.t_max.iter().all(|&t| t > 1.0) {
            return None;
        }

        let axis = self.next_axis();
        match axis {
            0 => self.current.x = self.current.x.wrapping_add(self.step[0]),
            1 => self.current.y = self.current.y.wrapping_add(self.step[1]),
            _ => self.current.z = self.current.z.wrapping_add(self.step[2]),
        }
        self.t_max[axis] += self.t_delta[axis];

        Some(self.current)
    }
}

/// Walks the cells from `start` to `end`, returning the first value `test`
/// produces, or `miss()` if none does.
///
/// A zero-length segment returns `miss()` without testing any cell.
pub fn traverse_blocks<T, F, M>(start: &Point3<f64>, end: &Point3<f64>, test: F, miss: M) -> T
where
    F: FnMut(VoxelCoord) -> Option<T>,
    M: FnOnce() -> T,
{
    VoxelTraversal::new(start, end)
        .find_map(test)
        .unwrap_or_else(miss)
}

/// Clips `shape` at `pos`. When the block's interaction shape is hit strictly
/// closer to `from`, its location and face replace those of the shape hit.
fn clip_with_interaction<B: BlockState + ?Sized>(
    block: &B,
    shape: &Shape,
    from: &Point3<f64>,
    to: &Point3<f64>,
    pos: VoxelCoord,
    ctx: &QueryContext<'_>,
) -> Option<BlockHit> {
    let hit = shape.clip(from, to, pos)?;
    let closer = block
        .interaction_shape(pos, ctx)
        .clip(from, to, pos)
        .filter(|fine| (fine.location - from).norm_squared() < (hit.location - from).norm_squared());
    Some(match closer {
        Some(fine) => BlockHit {
            location: fine.location,
            face: fine.face,
            ..hit
        },
        None => hit,
    })
}

/// Clips the segment against `shape` placed at `pos`, honoring the interaction
/// shape of the block stored there as seen by `ctx`.
#[must_use]
pub fn clip_block<S: VoxelStore>(
    store: &S,
    ctx: &QueryContext<'_>,
    from: &Point3<f64>,
    to: &Point3<f64>,
    pos: VoxelCoord,
    shape: &Shape,
) -> Option<BlockHit> {
    let block = store.chunk(pos.section()).block_state(pos);
    clip_with_interaction(block, shape, from, to, pos, ctx)
}

/// Traces a segment through the world and reports the first surface it meets.
///
/// Block and fluid hits in the same cell are compared by squared distance from
/// the start; the block wins only if strictly closer.
#[must_use]
pub fn ray_trace<S: VoxelStore>(store: &S, clip: &ClipContext<'_>) -> HitResult {
    let ctx = clip.query_context();
    let (start, end) = (&clip.start, &clip.end);
    let mut cache = ChunkCache::new(store);

    let result = traverse_blocks(
        start,
        end,
        |pos| {
            let chunk = cache.chunk_for(pos);
            let block = chunk.block_state(pos);
            let fluid = chunk.fluid_state(pos);

            let block_shape = clip.block.shape(block, pos, &ctx);
            let block_hit = clip_with_interaction(block, &block_shape, start, end, pos, &ctx);
            let fluid_hit = if clip.fluid.accepts(fluid) {
                fluid.shape(pos, &ctx).clip(start, end, pos)
            } else {
                None
            };

            match (block_hit, fluid_hit) {
                (Some(b), Some(f)) => {
                    let block_dist = (b.location - start).norm_squared();
                    let fluid_dist = (f.location - start).norm_squared();
                    if block_dist < fluid_dist {
                        Some(HitResult::Block(b))
                    } else {
                        Some(HitResult::Fluid(f))
                    }
                }
                (Some(b), None) => Some(HitResult::Block(b)),
                (None, Some(f)) => Some(HitResult::Fluid(f)),
                (None, None) => None,
            }
        },
        || HitResult::miss(start, end),
    );

    debug!(
        miss = result.is_miss(),
        x = result.coord().x,
        y = result.coord().y,
        z = result.coord().z,
        chunk_lookups = cache.misses(),
        "ray trace finished"
    );
    result
}
