//! Numeric constants shared by traversal, collision and border code.

/// Boundary epsilon used for grid-plane nudging, cursor padding and border proximity.
pub const EPSILON: f64 = 1.0e-7;

/// Horizontal edge length of a chunk section, in voxels.
pub const SECTION_SIZE: i32 = 16;

/// `log2(SECTION_SIZE)`; voxel-to-section conversion is an arithmetic shift.
pub(crate) const SECTION_SHIFT: u32 = 4;

/// Fraction of a segment a clip start point is advanced by before the
/// "already inside the shape" test.
pub const CLIP_INSIDE_NUDGE: f64 = 0.001;

/// Minimum squared segment length for a shape clip to be attempted.
pub(crate) const MIN_CLIP_LENGTH_SQUARED: f64 = 1.0e-7;

/// Absolute horizontal limit of the world; border centers must lie within it.
pub const MAX_WORLD_EXTENT: f64 = 29_999_984.0;

/// Default world border diameter.
pub const DEFAULT_BORDER_SIZE: f64 = 5.999_996_8e7;
