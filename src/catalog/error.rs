//! Catalog error types
//!
//! Defines all errors that can occur in the catalog layer. Lookup misses
//! are not errors: they surface as `None` or empty results.

use crate::index::IndexError;
use thiserror::Error;

/// Errors that can occur while mutating or loading the catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Another book already uses this ISBN
    #[error("Duplicate ISBN: {0}")]
    DuplicateIsbn(String),

    /// No book has this ISBN
    #[error("Book not found: {0}")]
    BookNotFound(String),

    /// Removal refused while the book has an active loan
    #[error("Book is on loan: {0}")]
    BookOnLoan(String),

    /// Lending refused because the book is not available
    #[error("Book is not available: {0}")]
    BookUnavailable(String),

    /// Another user already uses this id
    #[error("Duplicate user id: {0}")]
    DuplicateUser(String),

    /// No user has this id
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Removal refused while the user has active loans
    #[error("User has active loans: {0}")]
    UserHasLoans(String),

    /// No active loan has this id
    #[error("Loan not found or already returned: {0}")]
    LoanNotFound(String),

    /// A known field carried a value of the wrong shape
    #[error("Invalid value for field {field}: {value:?}")]
    InvalidField { field: String, value: String },

    /// Index construction failed (bad year domain)
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// CSV seed file could not be parsed
    #[error("CSV error: {0}")]
    Csv(String),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for CatalogError {
    fn from(err: csv::Error) -> Self {
        CatalogError::Csv(err.to_string())
    }
}

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
