use thiserror::Error;

use super::{CategoryId, EntryId};

/// punchcard error types
#[derive(Error, Debug)]
pub enum PunchcardError {
    /// Parent chain of `category` loops back to `repeated`
    #[error("category tree forms a loop: {category} reaches {repeated} twice")]
    CycleDetected {
        category: CategoryId,
        repeated: CategoryId,
    },

    /// `parent` cannot become the parent of `category`
    #[error("category {parent} is not a valid parent for category {category}")]
    InvalidParent {
        category: CategoryId,
        parent: CategoryId,
    },

    /// Caller passed an argument outside the accepted domain
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown category: {0}")]
    UnknownCategory(CategoryId),

    #[error("unknown entry: {0}")]
    UnknownEntry(EntryId),

    /// Input rejected before reaching the store
    #[error("validation error: {0}")]
    Validation(String),

    /// Record store could not be read or written
    #[error("store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for PunchcardError {
    fn from(err: config::ConfigError) -> Self {
        PunchcardError::Config(err.to_string())
    }
}

/// Result type alias for punchcard
pub type Result<T> = std::result::Result<T, PunchcardError>;
