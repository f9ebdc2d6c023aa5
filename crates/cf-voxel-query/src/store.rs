//! The voxel storage seam.
//!
//! The query engine never owns world data. It reads block and fluid states through
//! these traits, which a storage backend implements:
//!
//! - [`VoxelStore`] resolves a [`SectionPos`] to a chunk. It never fails; unloaded
//!   or out-of-range sections resolve to an empty chunk whose cells are all air.
//! - [`ChunkAccess`] returns the block and fluid state at a coordinate.
//! - [`BlockState`] and [`FluidState`] expose the shapes and flags the engine
//!   filters and tests against.
//!
//! [`ChunkCache`] sits between the engine and the store and remembers the last
//! resolved chunk, so a sweep through consecutive same-section cells pays for one
//! store lookup.

use crate::border::WorldBorder;
use crate::context::QueryContext;
use crate::shape::Shape;
use crate::voxel::{SectionPos, VoxelCoord};

/// The per-cell block data the query engine reads.
pub trait BlockState {
    /// Shape that obstructs movement.
    fn collision_shape(&self, pos: VoxelCoord, ctx: &QueryContext<'_>) -> Shape;

    /// Shape used for targeting and selection. Defaults to the collision shape.
    fn outline_shape(&self, pos: VoxelCoord, ctx: &QueryContext<'_>) -> Shape {
        self.collision_shape(pos, ctx)
    }

    /// Shape that blocks sight. Defaults to the collision shape.
    fn visual_shape(&self, pos: VoxelCoord, ctx: &QueryContext<'_>) -> Shape {
        self.collision_shape(pos, ctx)
    }

    /// Fine-grained targeting shape layered over the others. Defaults to empty.
    fn interaction_shape(&self, _pos: VoxelCoord, _ctx: &QueryContext<'_>) -> Shape {
        Shape::empty()
    }

    /// Whether the collision shape may extend beyond this cell.
    ///
    /// Blocks that answer `false` are trusted to stay within their own cell; the
    /// collision sweep skips them entirely when they sit in the shell around a
    /// query box.
    fn has_large_collision_shape(&self) -> bool;

    /// Whether this is the placeholder for a block in transit, whose shape is
    /// borrowed from the moving block and may be arbitrary.
    fn is_moving_placeholder(&self) -> bool;
}

/// The per-cell fluid data the query engine reads.
pub trait FluidState {
    /// Shape of the fluid surface volume in this cell.
    fn shape(&self, pos: VoxelCoord, ctx: &QueryContext<'_>) -> Shape;

    /// Whether this is a source (full, still) fluid.
    fn is_source(&self) -> bool;

    /// Whether the cell has no fluid.
    fn is_empty(&self) -> bool;
}

/// Block and fluid lookup within one chunk section.
pub trait ChunkAccess {
    /// Block state type stored in the chunk.
    type Block: BlockState;
    /// Fluid state type stored in the chunk.
    type Fluid: FluidState;

    /// Block state at a world coordinate inside this section.
    fn block_state(&self, pos: VoxelCoord) -> &Self::Block;

    /// Fluid state at a world coordinate inside this section.
    fn fluid_state(&self, pos: VoxelCoord) -> &Self::Fluid;
}

/// A sparse, chunked voxel world.
///
/// Implementations must make [`VoxelStore::chunk`] cheap and safe to call from
/// many independent queries; the engine performs no locking of its own.
pub trait VoxelStore {
    /// Chunk accessor type.
    type Chunk: ChunkAccess;

    /// Resolves a section. Unloaded sections return an all-air chunk.
    fn chunk(&self, section: SectionPos) -> &Self::Chunk;

    /// The world border, if the world has one.
    fn world_border(&self) -> Option<&WorldBorder> {
        None
    }
}

/// Block state type of a store.
pub type BlockOf<S> = <<S as VoxelStore>::Chunk as ChunkAccess>::Block;

/// Fluid state type of a store.
pub type FluidOf<S> = <<S as VoxelStore>::Chunk as ChunkAccess>::Fluid;

/// Single-slot memo of the last resolved chunk, keyed by section.
///
/// Owned by one traversal or enumeration and dropped with it; never shared.
#[derive(Debug)]
pub struct ChunkCache<'w, S: VoxelStore> {
    store: &'w S,
    slot: Option<(SectionPos, &'w S::Chunk)>,
    hits: u64,
    misses: u64,
}

impl<'w, S: VoxelStore> ChunkCache<'w, S> {
    /// Creates an empty cache over `store`.
    #[must_use]
    pub const fn new(store: &'w S) -> Self {
        Self {
            store,
            slot: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the chunk owning `pos`, consulting the store only on a section change.
    pub fn chunk_for(&mut self, pos: VoxelCoord) -> &'w S::Chunk {
        let section = pos.section();
        match self.slot {
            Some((key, chunk)) if key == section => {
                self.hits += 1;
                chunk
            }
            _ => {
                self.misses += 1;
                let chunk = self.store.chunk(section);
                self.slot = Some((section, chunk));
                chunk
            }
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &'w S {
        self.store
    }

    /// Lookups answered from the slot.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that went to the store.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}
