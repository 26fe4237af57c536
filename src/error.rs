use thiserror::Error;

/// Primary error type for the mining pipeline.
///
/// Configuration errors surface before any work is done; data errors name
/// the offending object id; invariant errors indicate a defect and carry
/// the pattern and level they were detected at.
#[derive(Error, Debug)]
pub enum ColocationError {
    #[error("input object set is empty")]
    EmptyInput,

    #[error("neighbor distance must be positive, got {0}")]
    InvalidDistance(f64),

    #[error("prevalence threshold must lie in [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("duplicate object id: {0}")]
    DuplicateId(String),

    #[error("non-finite coordinate on object {0}")]
    NonFiniteCoordinate(String),

    #[error("invariant violated at level {level} for pattern {{{pattern}}}: {msg}")]
    InternalInvariant {
        pattern: String,
        level: usize,
        msg: String,
    },
}

/// Convenience Result type alias for ColocationError.
pub type Result<T> = std::result::Result<T, ColocationError>;
