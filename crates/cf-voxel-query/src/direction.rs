//! Axes and cell faces.

use nalgebra::Vector3;

use crate::voxel::VoxelCoord;

/// A world axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// West/east.
    X,
    /// Down/up.
    Y,
    /// North/south.
    Z,
}

impl Axis {
    /// All axes in X, Y, Z order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Component index of this axis in a point or vector.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Picks the component belonging to this axis.
    #[must_use]
    pub fn choose<T>(self, x: T, y: T, z: T) -> T {
        match self {
            Self::X => x,
            Self::Y => y,
            Self::Z => z,
        }
    }
}

/// One of the six faces of a cell, named by the direction of its outward normal.
///
/// `North` is `-Z`, `South` is `+Z`, `West` is `-X`, `East` is `+X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// `-Y`.
    Down,
    /// `+Y`.
    Up,
    /// `-Z`.
    North,
    /// `+Z`.
    South,
    /// `-X`.
    West,
    /// `+X`.
    East,
}

impl Direction {
    /// All directions in their canonical order.
    pub const ALL: [Self; 6] = [
        Self::Down,
        Self::Up,
        Self::North,
        Self::South,
        Self::West,
        Self::East,
    ];

    /// Returns the direction along `axis`, positive or negative.
    #[must_use]
    pub const fn from_axis(axis: Axis, positive: bool) -> Self {
        match (axis, positive) {
            (Axis::X, true) => Self::East,
            (Axis::X, false) => Self::West,
            (Axis::Y, true) => Self::Up,
            (Axis::Y, false) => Self::Down,
            (Axis::Z, true) => Self::South,
            (Axis::Z, false) => Self::North,
        }
    }

    /// Returns the axis this direction runs along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Down | Self::Up => Axis::Y,
            Self::North | Self::South => Axis::Z,
            Self::West | Self::East => Axis::X,
        }
    }

    /// Returns `true` for `Up`, `South` and `East`.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Up | Self::South | Self::East)
    }

    /// Returns the opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Down => Self::Up,
            Self::Up => Self::Down,
            Self::North => Self::South,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::East => Self::West,
        }
    }

    /// Unit cell offset in this direction.
    #[must_use]
    pub const fn step(self) -> VoxelCoord {
        match self {
            Self::Down => VoxelCoord::new(0, -1, 0),
            Self::Up => VoxelCoord::new(0, 1, 0),
            Self::North => VoxelCoord::new(0, 0, -1),
            Self::South => VoxelCoord::new(0, 0, 1),
            Self::West => VoxelCoord::new(-1, 0, 0),
            Self::East => VoxelCoord::new(1, 0, 0),
        }
    }

    /// Unit normal vector of this face.
    #[must_use]
    pub fn normal(self) -> Vector3<f64> {
        self.step().to_vector()
    }

    /// Returns the direction whose normal has the largest dot product with `v`.
    ///
    /// Ties go to the earlier direction in [`Direction::ALL`]; a zero vector maps
    /// to `North`.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_voxel_query::Direction;
    /// use nalgebra::Vector3;
    ///
    /// assert_eq!(Direction::nearest(&Vector3::new(0.1, -2.0, 0.5)), Direction::Down);
    /// ```
    #[must_use]
    pub fn nearest(v: &Vector3<f64>) -> Self {
        let mut best = Self::North;
        let mut best_dot = 0.0;
        for direction in Self::ALL {
            let dot = direction.normal().dot(v);
            if dot > best_dot {
                best_dot = dot;
                best = direction;
            }
        }
        best
    }
}
