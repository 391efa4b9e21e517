//! Error types for wolke point cloud operations

use thiserror::Error;

use crate::layout::FieldSet;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by point cloud operations. Every fallible operation validates its arguments
/// before mutating anything, so receiving an error implies that no visible state change has
/// happened.
#[derive(Debug, Error)]
pub enum Error {
    /// An argument violated the operation's contract
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A point cloud cannot be constructed from the empty field set or the inherit sentinel
    #[error("cannot construct a point cloud from an empty or reserved field set")]
    EmptyOrReservedFieldSet,

    /// The point cloud does not contain all of the expected fields
    #[error("point cloud does not have expected fields: expected {expected}, got {actual}")]
    MissingFields {
        /// The field set the operation requires
        expected: FieldSet,
        /// The field set the cloud actually has
        actual: FieldSet,
    },

    /// The point cloud's field set is not exactly equal to the expected one
    #[error("point cloud does not have the exact expected fields: expected {expected}, got {actual}")]
    FieldSetMismatch {
        /// The field set the operation requires
        expected: FieldSet,
        /// The field set the cloud actually has
        actual: FieldSet,
    },

    /// Two point clouds were expected to have the same size
    #[error("point cloud size mismatch: expected {expected} points, got {actual}")]
    SizeMismatch {
        /// The size the operation requires
        expected: usize,
        /// The size the cloud actually has
        actual: usize,
    },
}
