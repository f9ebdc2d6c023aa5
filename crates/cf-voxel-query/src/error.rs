//! Error types for query construction.
//!
//! Query execution itself never fails: unloaded space reads as air. Errors only
//! surface when validated constructors reject malformed input.

/// Errors that can occur while building query inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum QueryError {
    /// A coordinate was NaN or infinite.
    #[error("{what} must be finite, got ({x}, {y}, {z})")]
    NonFinite {
        /// Which input was rejected.
        what: &'static str,
        /// X component.
        x: f64,
        /// Y component.
        y: f64,
        /// Z component.
        z: f64,
    },

    /// The world border size must be positive and finite.
    #[error("world border size must be positive and finite, got {0}")]
    InvalidBorderSize(f64),

    /// The world border center lies outside the absolute world limit.
    #[error("world border center ({x}, {z}) is outside the world limit of {limit}")]
    BorderOutOfRange {
        /// Center X.
        x: f64,
        /// Center Z.
        z: f64,
        /// Absolute world extent.
        limit: f64,
    },
}

/// Result type for query construction.
pub type QueryResult<T> = std::result::Result<T, QueryError>;
