//! Swept-box obstacle enumeration.
//!
//! [`BlockCollisions`] lazily yields every obstacle shape, already in world
//! space, that overlaps a query box. It walks a [`ShellCursor`] around the box,
//! skips cells whose zone rules out the block found there, and shape-tests the
//! rest. The world border is reported first, at most once, for queries anchored
//! to a body.
//!
//! The sequence is single pass. Dropping it part way is the only form of
//! cancellation and needs no cleanup.
//!
//! # Example
//!
//! ```
//! use cf_voxel_query::{Aabb, MemoryStore, SimpleBlock, SimpleFluid, VoxelCoord, swept_collisions};
//!
//! let mut store: MemoryStore<SimpleBlock, SimpleFluid> = MemoryStore::new();
//! store.set_block(VoxelCoord::new(0, 0, 0), SimpleBlock::solid());
//!
//! let query = Aabb::from_bounds(-0.1, -0.1, -0.1, 1.1, 1.1, 1.1);
//! let shapes: Vec<_> = swept_collisions(&store, None, &query).collect();
//!
//! assert_eq!(shapes.len(), 1);
//! assert_eq!(shapes[0].bounds(), Some(Aabb::unit()));
//! ```

use std::fmt;

use tracing::debug;

use crate::aabb::Aabb;
use crate::border::border_obstacle;
use crate::context::{Body, QueryContext};
use crate::shape::Shape;
use crate::shell::ShellCursor;
use crate::store::{BlockOf, BlockState, ChunkAccess, ChunkCache, VoxelStore};
use crate::voxel::VoxelCoord;

/// Caller-supplied filter deciding which blocks take part in a sweep.
pub type BlockPredicate<'a, B> = Box<dyn FnMut(&B, VoxelCoord) -> bool + 'a>;

/// Parameters of a collision sweep.
///
/// # Example
///
/// ```
/// use cf_voxel_query::{Aabb, CollisionQuery, SimpleBlock};
///
/// let query: CollisionQuery<'_, SimpleBlock> =
///     CollisionQuery::new(Aabb::unit()).with_predicate(|_, pos| pos.y >= 0);
/// assert!(query.has_predicate());
/// ```
pub struct CollisionQuery<'a, B> {
    /// Region to test, usually a body's box expanded by its motion.
    pub aabb: Aabb,
    /// Body the sweep is for, if any.
    pub body: Option<&'a Body>,
    /// Whether a body-anchored sweep also reports the world border.
    pub include_border: bool,
    predicate: Option<BlockPredicate<'a, B>>,
}

impl<'a, B> CollisionQuery<'a, B> {
    /// A sweep over `aabb` with no body, no predicate, and the border enabled.
    #[must_use]
    pub fn new(aabb: Aabb) -> Self {
        Self {
            aabb,
            body: None,
            include_border: true,
            predicate: None,
        }
    }

    /// Anchors the sweep to `body`.
    #[must_use]
    pub const fn with_body(mut self, body: &'a Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Anchors the sweep to `body` if present.
    #[must_use]
    pub const fn with_optional_body(mut self, body: Option<&'a Body>) -> Self {
        self.body = body;
        self
    }

    /// Enables or disables the world border obstacle.
    #[must_use]
    pub const fn with_border(mut self, include_border: bool) -> Self {
        self.include_border = include_border;
        self
    }

    /// Restricts the sweep to blocks accepted by `predicate`.
    #[must_use]
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: FnMut(&B, VoxelCoord) -> bool + 'a,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    /// Returns `true` if a block predicate is set.
    #[must_use]
    pub const fn has_predicate(&self) -> bool {
        self.predicate.is_some()
    }
}

impl<B> Default for CollisionQuery<'_, B> {
    fn default() -> Self {
        Self::new(Aabb::default())
    }
}

impl<B> fmt::Debug for CollisionQuery<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionQuery")
            .field("aabb", &self.aabb)
            .field("body", &self.body.map(|b| b.id))
            .field("include_border", &self.include_border)
            .field("has_predicate", &self.predicate.is_some())
            .finish()
    }
}

/// One obstacle found by a sweep.
#[derive(Debug, Clone)]
pub enum Obstacle {
    /// The world border's exterior.
    Border(Shape),
    /// A block's collision shape, translated into its cell.
    Block {
        /// Cell the block occupies.
        coord: VoxelCoord,
        /// World-space collision shape.
        shape: Shape,
    },
}

impl Obstacle {
    /// The obstacle's world-space shape.
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        match self {
            Self::Border(shape) | Self::Block { shape, .. } => shape,
        }
    }

    /// The block cell, or `None` for the border.
    #[must_use]
    pub const fn coord(&self) -> Option<VoxelCoord> {
        match self {
            Self::Border(_) => None,
            Self::Block { coord, .. } => Some(*coord),
        }
    }

    /// Consumes the obstacle, returning its shape.
    #[must_use]
    pub fn into_shape(self) -> Shape {
        match self {
            Self::Border(shape) | Self::Block { shape, .. } => shape,
        }
    }
}

/// Lazy iterator over the obstacles overlapping a query box.
pub struct BlockCollisions<'w, S: VoxelStore> {
    cache: ChunkCache<'w, S>,
    cursor: ShellCursor,
    aabb: Aabb,
    query_shape: Shape,
    ctx: QueryContext<'w>,
    predicate: Option<BlockPredicate<'w, BlockOf<S>>>,
    border_pending: bool,
    blocks_pending: bool,
    cells_tested: u64,
    yielded: u64,
    finished: bool,
}

impl<'w, S: VoxelStore> BlockCollisions<'w, S> {
    /// Starts a sweep of `store` described by `query`.
    #[must_use]
    pub fn new(store: &'w S, query: CollisionQuery<'w, BlockOf<S>>) -> Self {
        Self {
            cache: ChunkCache::new(store),
            cursor: ShellCursor::new(&query.aabb),
            aabb: query.aabb,
            query_shape: Shape::cuboid(query.aabb),
            ctx: QueryContext::from_option(query.body),
            predicate: query.predicate,
            border_pending: query.include_border && query.body.is_some(),
            // A zero-volume box overlaps no block.
            blocks_pending: query.aabb.has_volume(),
            cells_tested: 0,
            yielded: 0,
            finished: false,
        }
    }

    /// The next obstacle, with its cell if it is a block.
    pub fn next_collision(&mut self) -> Option<Obstacle> {
        if self.border_pending {
            self.border_pending = false;
            if let Some(shape) = self.border_shape() {
                self.yielded += 1;
                return Some(Obstacle::Border(shape));
            }
        }

        while self.blocks_pending {
            let Some((pos, zone)) = self.cursor.next() else {
                self.blocks_pending = false;
                break;
            };
            if !zone.needs_fetch() {
                continue;
            }
            let block = self.cache.chunk_for(pos).block_state(pos);
            if !zone.admits(block) {
                continue;
            }
            if let Some(predicate) = self.predicate.as_mut() {
                if !predicate(block, pos) {
                    continue;
                }
            }

            self.cells_tested += 1;
            let shape = block.collision_shape(pos, &self.ctx);
            let hit = if shape.is_full_cube() {
                self.aabb
                    .intersects_cell(pos)
                    .then(|| shape.translate_to_cell(pos))
            } else {
                let moved = shape.translate_to_cell(pos);
                (!moved.is_empty() && moved.intersects(&self.query_shape)).then_some(moved)
            };

            if let Some(shape) = hit {
                self.yielded += 1;
                return Some(Obstacle::Block { coord: pos, shape });
            }
        }

        if !self.finished {
            self.finished = true;
            debug!(
                cells_tested = self.cells_tested,
                obstacles = self.yielded,
                chunk_hits = self.cache.hits(),
                chunk_misses = self.cache.misses(),
                "collision sweep exhausted"
            );
        }
        None
    }

    fn border_shape(&self) -> Option<Shape> {
        let body = self.ctx.body()?;
        let border = self.cache.store().world_border()?;
        border_obstacle(border, &body.bounding_box)
    }
}

impl<S: VoxelStore> Iterator for BlockCollisions<'_, S> {
    type Item = Shape;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_collision().map(Obstacle::into_shape)
    }
}

impl<S: VoxelStore> fmt::Debug for BlockCollisions<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockCollisions")
            .field("aabb", &self.aabb)
            .field("border_pending", &self.border_pending)
            .field("cells_tested", &self.cells_tested)
            .field("yielded", &self.yielded)
            .finish_non_exhaustive()
    }
}

/// Obstacles overlapping `aabb`, including the world border when `body` is set.
#[must_use]
pub fn swept_collisions<'w, S: VoxelStore>(
    store: &'w S,
    body: Option<&'w Body>,
    aabb: &Aabb,
) -> BlockCollisions<'w, S> {
    BlockCollisions::new(store, CollisionQuery::new(*aabb).with_optional_body(body))
}

/// Block obstacles overlapping `aabb`, never the world border.
#[must_use]
pub fn block_collisions<'w, S: VoxelStore>(
    store: &'w S,
    body: Option<&'w Body>,
    aabb: &Aabb,
) -> BlockCollisions<'w, S> {
    BlockCollisions::new(
        store,
        CollisionQuery::new(*aabb)
            .with_optional_body(body)
            .with_border(false),
    )
}

/// Returns `true` if nothing obstructs `aabb`.
#[must_use]
pub fn no_collision<S: VoxelStore>(store: &S, body: Option<&Body>, aabb: &Aabb) -> bool {
    swept_collisions(store, body, aabb).next().is_none()
}

/// Returns `true` if no block obstacle overlaps `shape`.
///
/// An empty shape is always unobstructed.
#[must_use]
pub fn is_unobstructed_shape<S: VoxelStore>(store: &S, body: Option<&Body>, shape: &Shape) -> bool {
    let Some(bounds) = shape.bounds() else {
        return true;
    };
    !block_collisions(store, body, &bounds).any(|obstacle| obstacle.intersects(shape))
}

/// Returns `true` if nothing, border included, obstructs `body` where it stands.
#[must_use]
pub fn is_unobstructed_body<S: VoxelStore>(store: &S, body: &Body) -> bool {
    no_collision(store, Some(body), &body.bounding_box)
}

/// The obstructing cell inside `aabb` whose center is closest to the body's
/// position. Ties go to the smaller coordinate.
#[must_use]
pub fn find_supporting_block<S: VoxelStore>(
    store: &S,
    body: &Body,
    aabb: &Aabb,
) -> Option<VoxelCoord> {
    let mut sweep = block_collisions(store, Some(body), aabb);
    let mut best: Option<(f64, VoxelCoord)> = None;
    while let Some(obstacle) = sweep.next_collision() {
        let Some(coord) = obstacle.coord() else {
            continue;
        };
        let dist = coord.center_distance_squared(&body.position);
        best = match best {
            Some((best_dist, best_coord))
                if best_dist < dist || (best_dist == dist && best_coord < coord) =>
            {
                Some((best_dist, best_coord))
            }
            _ => Some((dist, coord)),
        };
    }
    best.map(|(_, coord)| coord)
}
