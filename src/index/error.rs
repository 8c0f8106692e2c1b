//! Index error types

use thiserror::Error;

/// Errors raised while constructing an index
///
/// Lookups never fail: misses are `None` or an empty result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Stats domain is empty or not a run of consecutive ascending values
    #[error("Invalid stats domain: {0}")]
    InvalidDomain(String),
}

/// Result type alias for index construction
pub type IndexResult<T> = Result<T, IndexError>;
