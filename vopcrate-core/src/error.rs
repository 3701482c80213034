//! Error types for VopCrate

use thiserror::Error;

/// Main error type for VopCrate operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("batch of {count} voxel locations exceeds the configured capacity of {capacity}")]
    BatchTooLarge { count: usize, capacity: usize },

    #[error("feature buffer holds {actual} values but {required} are required")]
    FeatureBufferTooSmall { required: usize, actual: usize },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Visualization error: {0}")]
    Visualization(String),
}

/// Result type alias for VopCrate operations
pub type Result<T> = std::result::Result<T, Error>;
