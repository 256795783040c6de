use std::collections::TryReserveError;

use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
pub enum PackedTreeError {
    /// The points handed to the builder or reader cannot be indexed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The packed buffer could not be allocated, or would be too large to address.
    #[error("Allocation failure: {0}")]
    AllocationFailure(String),

    /// A borrowed buffer is not a valid packed tree.
    #[error("Malformed tree: {0}")]
    MalformedTree(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<TryReserveError> for PackedTreeError {
    fn from(err: TryReserveError) -> Self {
        PackedTreeError::AllocationFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PackedTreeError>;
