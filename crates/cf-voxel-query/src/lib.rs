//! Spatial queries against a sparse, chunked voxel world.
//!
//! This crate answers the two questions movement and targeting code keeps
//! asking a voxel world:
//!
//! - [`ray_trace`] - what is the first block or fluid surface along a segment?
//! - [`swept_collisions`] - which obstacle shapes overlap a moving box?
//!
//! It owns no world data. Storage backends implement [`VoxelStore`],
//! [`ChunkAccess`], [`BlockState`] and [`FluidState`]; [`MemoryStore`] is a
//! complete in-memory backend for tools and tests.
//!
//! # Building blocks
//!
//! - [`VoxelCoord`] and [`SectionPos`] - integer cell and chunk-section coordinates
//! - [`Aabb`] and [`Shape`] - boxes and immutable box-list regions
//! - [`VoxelTraversal`] - DDA walk over the cells a segment crosses
//! - [`ShellCursor`] and [`Zone`] - padded cell enumeration with zone tags
//! - [`BlockCollisions`] - the lazy swept-box obstacle iterator
//! - [`WorldBorder`] - horizontal world limit and its collision guard
//! - [`ChunkCache`] - single-slot memo of the last resolved chunk
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in
//! servers, CLI tools, headless simulations and other engines.
//!
//! # Coordinate Systems
//!
//! Y is up. North is `-Z`, south `+Z`, west `-X`, east `+X`. Cells are unit
//! cubes; the cell at `(x, y, z)` spans `[x, x + 1)` on each axis. Sections are
//! 16 cells wide in X and Z and unbounded in Y.
//!
//! # Example
//!
//! ```
//! use cf_voxel_query::{
//!     Aabb, ClipContext, Direction, MemoryStore, SimpleBlock, SimpleFluid, VoxelCoord,
//!     ray_trace, swept_collisions,
//! };
//! use nalgebra::Point3;
//!
//! let mut store: MemoryStore<SimpleBlock, SimpleFluid> = MemoryStore::new();
//! store.set_block(VoxelCoord::new(0, 0, 0), SimpleBlock::solid());
//!
//! // Look straight down onto the block.
//! let clip = ClipContext::new(Point3::new(0.5, 10.0, 0.5), Point3::new(0.5, -10.0, 0.5));
//! let hit = ray_trace(&store, &clip);
//! assert_eq!(hit.face(), Direction::Up);
//! assert!((hit.location().y - 1.0).abs() < 1e-9);
//!
//! // A box overlapping the block sees exactly one obstacle.
//! let aabb = Aabb::from_bounds(-0.1, -0.1, -0.1, 1.1, 1.1, 1.1);
//! assert_eq!(swept_collisions(&store, None, &aabb).count(), 1);
//! ```
//!
//! # Errors
//!
//! Queries never fail: unloaded space reads as air. Only the validated
//! constructors ([`Aabb::try_new`], [`ClipContext::try_new`],
//! [`WorldBorder::try_new`]) return [`QueryError`]. Results for NaN input to
//! the infallible entry points are unspecified.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod aabb;
mod border;
mod collision;
mod consts;
mod context;
mod direction;
mod error;
mod grid;
mod memory;
mod raycast;
mod shape;
mod shell;
mod store;
mod voxel;

pub use aabb::Aabb;
pub use border::{WorldBorder, border_obstacle};
pub use collision::{
    BlockCollisions, BlockPredicate, CollisionQuery, Obstacle, block_collisions,
    find_supporting_block, is_unobstructed_body, is_unobstructed_shape, no_collision,
    swept_collisions,
};
pub use consts::{CLIP_INSIDE_NUDGE, DEFAULT_BORDER_SIZE, EPSILON, MAX_WORLD_EXTENT, SECTION_SIZE};
pub use context::{Body, BodyId, QueryContext};
pub use direction::{Axis, Direction};
pub use error::{QueryError, QueryResult};
pub use grid::{GridBounds, GridBoundsIter};
pub use memory::{MemoryChunk, MemoryStore, SimpleBlock, SimpleFluid};
pub use raycast::{
    BlockHit, BlockShapeKind, ClipContext, FluidFilter, HitResult, VoxelTraversal, clip_block,
    ray_trace, traverse_blocks,
};
pub use shape::Shape;
pub use shell::{ShellCursor, Zone};
pub use store::{BlockOf, BlockState, ChunkAccess, ChunkCache, FluidOf, FluidState, VoxelStore};
pub use voxel::{SectionPos, VoxelCoord};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
