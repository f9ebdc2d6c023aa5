//! Property-based tests for segment traversal and collision sweeps.
//!
//! These check invariants that hold for any segment or query box rather than
//! hand-picked cases.
//!
//! Run with: cargo test -p cf-voxel-query -- proptest

#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::cast_precision_loss)]

use cf_voxel_query::{
    Aabb, ClipContext, EPSILON, FluidFilter, MemoryStore, Point3, Shape, SimpleBlock, SimpleFluid,
    VoxelCoord, VoxelTraversal, ray_trace, swept_collisions,
};
use proptest::prelude::*;

type Store = MemoryStore<SimpleBlock, SimpleFluid>;

// =============================================================================
// Strategies
// =============================================================================

/// Generate a point in a modest region straddling the origin.
fn arb_point() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(-40.0..40.0f64)
}

/// Generate a short segment offset from a start point.
fn arb_segment() -> impl Strategy<Value = ([f64; 3], [f64; 3])> {
    (arb_point(), prop::array::uniform3(-12.0..12.0f64))
        .prop_map(|(a, d)| (a, [a[0] + d[0], a[1] + d[1], a[2] + d[2]]))
}

/// Generate an extent that is occasionally zero.
fn arb_extent() -> impl Strategy<Value = f64> {
    prop_oneof![4 => 0.05..3.0f64, 1 => Just(0.0)]
}

/// Generate a query box no larger than a few cells, sometimes flat on an axis.
fn arb_aabb() -> impl Strategy<Value = Aabb> {
    (prop::array::uniform3(-6.0..6.0f64), prop::array::uniform3(arb_extent())).prop_map(
        |(min, size)| {
            Aabb::from_bounds(
                min[0],
                min[1],
                min[2],
                min[0] + size[0],
                min[1] + size[1],
                min[2] + size[2],
            )
        },
    )
}

/// Generate a set of solid cells near the origin.
fn arb_cells() -> impl Strategy<Value = Vec<(i32, i32, i32)>> {
    prop::collection::vec((-6..6i32, -6..6i32, -6..6i32), 0..60)
}

fn manhattan(a: VoxelCoord, b: VoxelCoord) -> i64 {
    i64::from((a.x - b.x).abs()) + i64::from((a.y - b.y).abs()) + i64::from((a.z - b.z).abs())
}

// =============================================================================
// Traversal Properties
// =============================================================================

proptest! {
    /// Consecutive cells share a face.
    #[test]
    fn proptest_traversal_steps_are_face_adjacent((start, end) in arb_segment()) {
        let cells: Vec<_> = VoxelTraversal::new(&Point3::from(start), &Point3::from(end)).collect();
        for pair in cells.windows(2) {
            prop_assert_eq!(manhattan(pair[0], pair[1]), 1);
        }
    }

    /// The first cell contains the start pulled back by the traversal epsilon.
    #[test]
    fn proptest_traversal_starts_at_start_cell((start, end) in arb_segment()) {
        let (a, b) = (Point3::from(start), Point3::from(end));
        prop_assume!(a != b);
        let first = VoxelTraversal::new(&a, &b).next().unwrap();
        let pulled_back = a - (b - a) * EPSILON;
        prop_assert_eq!(first, VoxelCoord::containing(&pulled_back));
    }

    /// Walking the same segment twice gives the same cells.
    #[test]
    fn proptest_traversal_is_deterministic((start, end) in arb_segment()) {
        let (a, b) = (Point3::from(start), Point3::from(end));
        let first: Vec<_> = VoxelTraversal::new(&a, &b).collect();
        let second: Vec<_> = VoxelTraversal::new(&a, &b).collect();
        prop_assert_eq!(first, second);
    }

    /// The walk never visits more cells than the segment can cross.
    #[test]
    fn proptest_traversal_is_bounded((start, end) in arb_segment()) {
        let (a, b) = (Point3::from(start), Point3::from(end));
        let d = b - a;
        let bound = d.x.abs().ceil() + d.y.abs().ceil() + d.z.abs().ceil() + 4.0;
        let count = VoxelTraversal::new(&a, &b).count();
        prop_assert!((count as f64) <= bound);
    }
}

// =============================================================================
// Query Properties
// =============================================================================

proptest! {
    /// Ray tracing is a pure function of the world and the segment.
    #[test]
    fn proptest_ray_trace_is_deterministic(
        cells in arb_cells(),
        (start, end) in arb_segment(),
    ) {
        let mut store = Store::new();
        for (x, y, z) in cells {
            store.set_block(VoxelCoord::new(x, y, z), SimpleBlock::solid());
            store.set_fluid(VoxelCoord::new(z, x, y), SimpleFluid::source());
        }
        let clip = ClipContext::new(Point3::from(start), Point3::from(end))
            .with_fluid(FluidFilter::Any);
        let first = ray_trace(&store, &clip);
        let second = ray_trace(&store, &clip);
        prop_assert_eq!(first, second);
    }

    /// Interned full cubes and explicit unit cuboids produce the same obstacles.
    #[test]
    fn proptest_full_cube_fast_path(cells in arb_cells(), aabb in arb_aabb()) {
        let mut fast = Store::new();
        let mut general = Store::new();
        for (x, y, z) in cells {
            let pos = VoxelCoord::new(x, y, z);
            fast.set_block(pos, SimpleBlock::solid());
            general.set_block(pos, SimpleBlock::shaped(Shape::cuboid(Aabb::unit())));
        }

        let a: Vec<_> = swept_collisions(&fast, None, &aabb).collect();
        let b: Vec<_> = swept_collisions(&general, None, &aabb).collect();
        prop_assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            prop_assert!(x.same_region(y));
        }
    }

    /// Every yielded obstacle really overlaps the query box.
    #[test]
    fn proptest_obstacles_overlap_query(cells in arb_cells(), aabb in arb_aabb()) {
        let mut store = Store::new();
        for (x, y, z) in cells {
            store.set_block(VoxelCoord::new(x, y, z), SimpleBlock::solid());
        }
        for shape in swept_collisions(&store, None, &aabb) {
            prop_assert!(shape.intersects_aabb(&aabb));
        }
    }

    /// A box with no volume never collides.
    #[test]
    fn proptest_zero_volume_box_is_clear(cells in arb_cells(), aabb in arb_aabb()) {
        prop_assume!(!aabb.has_volume());
        let mut store = Store::new();
        for (x, y, z) in cells {
            store.set_block(VoxelCoord::new(x, y, z), SimpleBlock::solid());
        }
        prop_assert_eq!(swept_collisions(&store, None, &aabb).count(), 0);
    }
}
