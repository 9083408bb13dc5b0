//! Error types for loading river network datasets.

use thiserror::Error;

/// Result type for swordfix operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while loading a dataset. None of these are
/// recovered from internally: a failed load produces no dataset.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid load options, e.g. an allow-list applied to an empty identifier set.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Level name other than `reaches` or `nodes`.
    #[error("invalid level `{0}`: must be `reaches` or `nodes`")]
    InvalidLevel(String),

    /// The container does not have the expected groups, variables or shapes.
    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),

    /// A centerline range references a point identifier that does not exist.
    #[error("row {row}: centerline point {point} does not exist")]
    DanglingReference { row: usize, point: i64 },

    /// The container was accessed after the session released it.
    #[error("container has been closed")]
    ClosedContainer,

    /// An overlay network has more than one row for the same join key.
    #[error("overlay `{overlay}`: duplicate join key {key}")]
    JoinAmbiguity { overlay: String, key: i64 },

    #[error("reach {0} not found")]
    ReachNotFound(i64),

    /// Error reported by the container backend (e.g. the netCDF library).
    #[error("source error: {0}")]
    Source(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn structural<S: Into<String>>(msg: S) -> Error {
        Error::StructuralMismatch(msg.into())
    }
}
