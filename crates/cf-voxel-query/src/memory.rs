//! A sparse in-memory voxel world.
//!
//! [`MemoryStore`] keeps one hash map of blocks and fluids per section and hands
//! out a shared all-air chunk for sections that were never written. It is a
//! complete [`VoxelStore`] for tools and tests; production worlds plug in their
//! own backend through the same traits.
//!
//! # Example
//!
//! ```
//! use cf_voxel_query::{MemoryStore, SimpleBlock, SimpleFluid, VoxelCoord};
//!
//! let mut store: MemoryStore<SimpleBlock, SimpleFluid> = MemoryStore::new();
//! store.set_block(VoxelCoord::new(0, 0, 0), SimpleBlock::solid());
//! store.set_block(VoxelCoord::new(40, 0, 0), SimpleBlock::solid());
//!
//! assert_eq!(store.section_count(), 2);
//! assert!(store.block(VoxelCoord::new(0, 0, 0)).is_some());
//! assert!(store.block(VoxelCoord::new(1, 0, 0)).is_none());
//! ```

use hashbrown::HashMap;

use crate::aabb::Aabb;
use crate::border::WorldBorder;
use crate::context::{BodyId, QueryContext};
use crate::shape::Shape;
use crate::store::{BlockState, ChunkAccess, FluidState, VoxelStore};
use crate::voxel::{SectionPos, VoxelCoord};

/// Height of a source fluid's surface, in cells.
const SOURCE_HEIGHT: f64 = 8.0 / 9.0;

/// Highest flowing fluid level.
const MAX_FLOWING_LEVEL: u8 = 8;

/// How a [`SimpleBlock`] derives its collision shape from the query context.
#[derive(Debug, Clone, Default)]
enum Behavior {
    #[default]
    Static,
    /// Solid only for bodies standing on top that are not descending.
    Platform,
    /// Placeholder for a block in transit; never obstructs the body pushing it.
    Moving { pusher: Option<BodyId> },
}

/// A plain block value with fixed shapes.
///
/// The default value is air.
#[derive(Debug, Clone, Default)]
pub struct SimpleBlock {
    collision: Shape,
    outline: Option<Shape>,
    visual: Option<Shape>,
    interaction: Shape,
    large: bool,
    behavior: Behavior,
}

impl SimpleBlock {
    /// An empty block.
    #[must_use]
    pub fn air() -> Self {
        Self::default()
    }

    /// A full solid cube using the interned unit cube shape.
    #[must_use]
    pub fn solid() -> Self {
        Self::shaped(Shape::full_cube())
    }

    /// A block with an arbitrary collision shape in local cell space.
    ///
    /// The block is flagged as having a large collision shape when the shape
    /// reaches outside `[0, 1]` on any axis.
    #[must_use]
    pub fn shaped(collision: Shape) -> Self {
        let large = collision
            .bounds()
            .is_some_and(|b| !Aabb::unit().contains(&b.min) || !Aabb::unit().contains(&b.max));
        Self {
            collision,
            large,
            ..Self::default()
        }
    }

    /// A block that only obstructs bodies standing on its top surface.
    #[must_use]
    pub fn platform(collision: Shape) -> Self {
        Self {
            behavior: Behavior::Platform,
            ..Self::shaped(collision)
        }
    }

    /// A placeholder for a block being moved by `pusher`, carrying its shape.
    #[must_use]
    pub fn moving_placeholder(collision: Shape, pusher: Option<BodyId>) -> Self {
        Self {
            behavior: Behavior::Moving { pusher },
            ..Self::shaped(collision)
        }
    }

    /// Overrides the large-collision-shape flag.
    #[must_use]
    pub const fn with_large_collision_shape(mut self, large: bool) -> Self {
        self.large = large;
        self
    }

    /// Sets a distinct outline shape.
    #[must_use]
    pub fn with_outline(mut self, outline: Shape) -> Self {
        self.outline = Some(outline);
        self
    }

    /// Sets a distinct visual shape.
    #[must_use]
    pub fn with_visual(mut self, visual: Shape) -> Self {
        self.visual = Some(visual);
        self
    }

    /// Sets the interaction shape.
    #[must_use]
    pub fn with_interaction(mut self, interaction: Shape) -> Self {
        self.interaction = interaction;
        self
    }
}

impl BlockState for SimpleBlock {
    fn collision_shape(&self, pos: VoxelCoord, ctx: &QueryContext<'_>) -> Shape {
        match self.behavior {
            Behavior::Static => self.collision.clone(),
            Behavior::Platform => {
                if ctx.is_above(&self.collision, pos) && !ctx.is_descending() {
                    self.collision.clone()
                } else {
                    Shape::empty()
                }
            }
            Behavior::Moving { pusher } => match (pusher, ctx.body()) {
                (Some(pusher), Some(body)) if pusher == body.id => Shape::empty(),
                _ => self.collision.clone(),
            },
        }
    }

    fn outline_shape(&self, pos: VoxelCoord, ctx: &QueryContext<'_>) -> Shape {
        match &self.outline {
            Some(outline) => outline.clone(),
            None => self.collision_shape(pos, ctx),
        }
    }

    fn visual_shape(&self, pos: VoxelCoord, ctx: &QueryContext<'_>) -> Shape {
        match &self.visual {
            Some(visual) => visual.clone(),
            None => self.collision_shape(pos, ctx),
        }
    }

    fn interaction_shape(&self, _pos: VoxelCoord, _ctx: &QueryContext<'_>) -> Shape {
        self.interaction.clone()
    }

    fn has_large_collision_shape(&self) -> bool {
        self.large
    }

    fn is_moving_placeholder(&self) -> bool {
        matches!(self.behavior, Behavior::Moving { .. })
    }
}

/// A plain fluid value: empty, a source, or flowing at some level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimpleFluid {
    /// No fluid.
    #[default]
    Empty,
    /// A full, still source.
    Source,
    /// Flowing fluid at a level in `1..=8`.
    Flowing(u8),
}

impl SimpleFluid {
    /// A source fluid.
    #[must_use]
    pub const fn source() -> Self {
        Self::Source
    }

    /// Flowing fluid, with `level` clamped to `1..=8`.
    #[must_use]
    pub fn flowing(level: u8) -> Self {
        Self::Flowing(level.clamp(1, MAX_FLOWING_LEVEL))
    }

    /// Surface height within the cell.
    #[must_use]
    pub fn height(self) -> f64 {
        match self {
            Self::Empty => 0.0,
            Self::Source => SOURCE_HEIGHT,
            Self::Flowing(level) => f64::from(level) / 9.0,
        }
    }
}

impl FluidState for SimpleFluid {
    fn shape(&self, _pos: VoxelCoord, _ctx: &QueryContext<'_>) -> Shape {
        match self {
            Self::Empty => Shape::empty(),
            _ => Shape::from_bounds(0.0, 0.0, 0.0, 1.0, self.height(), 1.0),
        }
    }

    fn is_source(&self) -> bool {
        matches!(self, Self::Source)
    }

    fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// One section's worth of sparse block and fluid data.
#[derive(Debug, Clone)]
pub struct MemoryChunk<B, F> {
    blocks: HashMap<VoxelCoord, B>,
    fluids: HashMap<VoxelCoord, F>,
    air: B,
    dry: F,
}

impl<B: Default, F: Default> Default for MemoryChunk<B, F> {
    fn default() -> Self {
        Self {
            blocks: HashMap::new(),
            fluids: HashMap::new(),
            air: B::default(),
            dry: F::default(),
        }
    }
}

impl<B, F> MemoryChunk<B, F> {
    /// Returns `true` if the chunk stores no blocks and no fluids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.fluids.is_empty()
    }
}

impl<B: BlockState, F: FluidState> ChunkAccess for MemoryChunk<B, F> {
    type Block = B;
    type Fluid = F;

    fn block_state(&self, pos: VoxelCoord) -> &B {
        self.blocks.get(&pos).unwrap_or(&self.air)
    }

    fn fluid_state(&self, pos: VoxelCoord) -> &F {
        self.fluids.get(&pos).unwrap_or(&self.dry)
    }
}

/// A sparse voxel world held in memory, keyed by section.
#[derive(Debug, Clone)]
pub struct MemoryStore<B, F> {
    sections: HashMap<SectionPos, MemoryChunk<B, F>>,
    unloaded: MemoryChunk<B, F>,
    border: Option<WorldBorder>,
}

impl<B: Default, F: Default> Default for MemoryStore<B, F> {
    fn default() -> Self {
        Self {
            sections: HashMap::new(),
            unloaded: MemoryChunk::default(),
            border: None,
        }
    }
}

impl<B: Default, F: Default> MemoryStore<B, F> {
    /// Creates an empty world with no border.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn section_mut(&mut self, pos: VoxelCoord) -> &mut MemoryChunk<B, F> {
        self.sections.entry(pos.section()).or_default()
    }

    /// Places a block, returning the one it replaced.
    pub fn set_block(&mut self, pos: VoxelCoord, block: B) -> Option<B> {
        self.section_mut(pos).blocks.insert(pos, block)
    }

    /// Places a fluid, returning the one it replaced.
    pub fn set_fluid(&mut self, pos: VoxelCoord, fluid: F) -> Option<F> {
        self.section_mut(pos).fluids.insert(pos, fluid)
    }

    /// Removes a block, leaving air. Sections left empty are dropped.
    pub fn remove_block(&mut self, pos: VoxelCoord) -> Option<B> {
        let section = pos.section();
        let chunk = self.sections.get_mut(&section)?;
        let removed = chunk.blocks.remove(&pos);
        if chunk.is_empty() {
            self.sections.remove(&section);
        }
        removed
    }

    /// Removes a fluid. Sections left empty are dropped.
    pub fn remove_fluid(&mut self, pos: VoxelCoord) -> Option<F> {
        let section = pos.section();
        let chunk = self.sections.get_mut(&section)?;
        let removed = chunk.fluids.remove(&pos);
        if chunk.is_empty() {
            self.sections.remove(&section);
        }
        removed
    }
}

impl<B, F> MemoryStore<B, F> {
    /// The explicitly stored block at `pos`, if any.
    #[must_use]
    pub fn block(&self, pos: VoxelCoord) -> Option<&B> {
        self.sections.get(&pos.section())?.blocks.get(&pos)
    }

    /// The explicitly stored fluid at `pos`, if any.
    #[must_use]
    pub fn fluid(&self, pos: VoxelCoord) -> Option<&F> {
        self.sections.get(&pos.section())?.fluids.get(&pos)
    }

    /// Installs or clears the world border.
    pub fn set_world_border(&mut self, border: Option<WorldBorder>) {
        self.border = border;
    }

    /// Number of sections holding any data.
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Drops every block, fluid and the border.
    pub fn clear(&mut self) {
        self.sections.clear();
        self.border = None;
    }
}

impl<B: BlockState, F: FluidState> VoxelStore for MemoryStore<B, F> {
    type Chunk = MemoryChunk<B, F>;

    fn chunk(&self, section: SectionPos) -> &Self::Chunk {
        self.sections.get(&section).unwrap_or(&self.unloaded)
    }

    fn world_border(&self) -> Option<&WorldBorder> {
        self.border.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::context::Body;
    use approx::assert_relative_eq;

    type Store = MemoryStore<SimpleBlock, SimpleFluid>;

    #[test]
    fn test_unloaded_section_is_air() {
        let store = Store::new();
        let chunk = store.chunk(SectionPos::new(1000, -1000));
        let pos = VoxelCoord::new(16_000, 64, -16_000);
        assert!(
            chunk
                .block_state(pos)
                .collision_shape(pos, &QueryContext::empty())
                .is_empty()
        );
        assert!(chunk.fluid_state(pos).is_empty());
    }

    #[test]
    fn test_set_and_remove_block() {
        let mut store = Store::new();
        let pos = VoxelCoord::new(-1, 3, -17);
        assert!(store.set_block(pos, SimpleBlock::solid()).is_none());
        assert_eq!(store.section_count(), 1);
        assert!(store.set_block(pos, SimpleBlock::air()).is_some());

        assert!(store.remove_block(pos).is_some());
        assert_eq!(store.section_count(), 0);
        assert!(store.remove_block(pos).is_none());
    }

    #[test]
    fn test_fluid_keeps_section_alive() {
        let mut store = Store::new();
        let pos = VoxelCoord::new(2, 0, 2);
        store.set_block(pos, SimpleBlock::solid());
        store.set_fluid(pos, SimpleFluid::source());
        store.remove_block(pos);
        assert_eq!(store.section_count(), 1);
        assert_eq!(store.fluid(pos), Some(&SimpleFluid::Source));
        store.remove_fluid(pos);
        assert_eq!(store.section_count(), 0);
    }

    #[test]
    fn test_negative_coords_land_in_own_section() {
        let mut store = Store::new();
        store.set_block(VoxelCoord::new(-1, 0, 0), SimpleBlock::solid());
        store.set_block(VoxelCoord::new(0, 0, 0), SimpleBlock::solid());
        assert_eq!(store.section_count(), 2);
    }

    #[test]
    fn test_shaped_block_large_flag() {
        let slab = SimpleBlock::shaped(Shape::from_bounds(0.0, 0.0, 0.0, 1.0, 0.5, 1.0));
        assert!(!slab.has_large_collision_shape());
        let fence = SimpleBlock::shaped(Shape::from_bounds(0.375, 0.0, 0.375, 0.625, 1.5, 0.625));
        assert!(fence.has_large_collision_shape());
        assert!(!fence.with_large_collision_shape(false).has_large_collision_shape());
    }

    #[test]
    fn test_moving_placeholder_exempts_pusher() {
        let pusher = Body::new(BodyId(1), Aabb::from_bounds(0.0, 1.0, 0.0, 1.0, 2.0, 1.0));
        let other = Body::new(BodyId(2), Aabb::from_bounds(0.0, 1.0, 0.0, 1.0, 2.0, 1.0));
        let block = SimpleBlock::moving_placeholder(Shape::full_cube(), Some(BodyId(1)));
        let pos = VoxelCoord::origin();

        assert!(block.is_moving_placeholder());
        assert!(block.collision_shape(pos, &QueryContext::of(&pusher)).is_empty());
        assert!(block.collision_shape(pos, &QueryContext::of(&other)).is_full_cube());
        assert!(block.collision_shape(pos, &QueryContext::empty()).is_full_cube());
    }

    #[test]
    fn test_platform_depends_on_context() {
        let block = SimpleBlock::platform(Shape::full_cube());
        let pos = VoxelCoord::origin();
        let standing = Body::new(BodyId(1), Aabb::from_bounds(0.2, 1.0, 0.2, 0.8, 2.8, 0.8));
        let dropping = standing.clone().with_descending(true);

        assert!(!block.collision_shape(pos, &QueryContext::of(&standing)).is_empty());
        assert!(block.collision_shape(pos, &QueryContext::of(&dropping)).is_empty());
        assert!(block.collision_shape(pos, &QueryContext::empty()).is_empty());
    }

    #[test]
    fn test_outline_defaults_to_collision() {
        let ctx = QueryContext::empty();
        let pos = VoxelCoord::origin();
        let block = SimpleBlock::solid();
        assert!(block.outline_shape(pos, &ctx).is_full_cube());
        assert!(block.interaction_shape(pos, &ctx).is_empty());

        let thin = Shape::from_bounds(0.0, 0.0, 0.0, 1.0, 0.1, 1.0);
        let block = SimpleBlock::air().with_outline(thin.clone());
        assert!(block.outline_shape(pos, &ctx).same_region(&thin));
        assert!(block.visual_shape(pos, &ctx).is_empty());
    }

    #[test]
    fn test_fluid_heights() {
        assert_relative_eq!(SimpleFluid::source().height(), 8.0 / 9.0);
        assert_relative_eq!(SimpleFluid::flowing(4).height(), 4.0 / 9.0);
        assert_eq!(SimpleFluid::flowing(0), SimpleFluid::Flowing(1));
        assert_eq!(SimpleFluid::flowing(200), SimpleFluid::Flowing(8));
        let ctx = QueryContext::empty();
        assert!(SimpleFluid::Empty.shape(VoxelCoord::origin(), &ctx).is_empty());
        let surface = SimpleFluid::flowing(4).shape(VoxelCoord::origin(), &ctx);
        assert_relative_eq!(surface.bounds().unwrap().max.y, 4.0 / 9.0);
        assert!(SimpleFluid::source().is_source());
        assert!(!SimpleFluid::flowing(3).is_source());
    }
}
