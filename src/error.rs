//! Error taxonomy for the tangent bundle pipeline.
//!
//! Only structural violations are errors. Geometric degeneracy (empty or
//! single-point neighborhoods, coincident points) is reported through the
//! tagged results in [`crate::bundle`] and [`crate::tangent_graph`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TangentError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TangentError {
    #[error("shape mismatch for {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("ragged input: row {row} has {got} coordinates, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("point cloud has zero ambient dimension")]
    EmptyDimension,

    #[error("target dimension must be at least 1")]
    ZeroDimension,

    #[error("target dimension {requested} exceeds available dimension {available}")]
    DimensionTooLarge { requested: usize, available: usize },

    #[error("radius must be positive and finite, got {0}")]
    InvalidRadius(f64),

    #[error("index {index} out of bounds for {len} {what}")]
    IndexOutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("unknown weight method '{0}' (expected one of: distance, cosine, angle)")]
    UnknownMethod(String),

    #[error("weight method '{0}' is declared but not supported")]
    UnsupportedMethod(String),

    #[error("unknown reduction '{0}' (expected one of: mean, max, min, sum, median)")]
    UnknownReduction(String),

    #[error("input is not a distance matrix (square with zero diagonal)")]
    NotADistanceMatrix,

    #[error("input of length {0} is not a condensed set of pairwise distances")]
    NotPairwiseDistances(usize),

    #[error("cover incomplete: {uncovered} of {total} points are not contained in any neighborhood")]
    IncompleteCover { uncovered: usize, total: usize },
}
