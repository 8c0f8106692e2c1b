//! Shelfmark Catalog
//!
//! Wires the record store and indexes together for a book catalog:
//!
//! - **types**: `Book` and `User` records with their partial updates
//! - **loans**: `Loan` records and overdue calculation
//! - **engine**: `Catalog`, which keeps stores, indexes, loans and statistics in step
//! - **csv_import**: Seeding a catalog from a CSV file
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust
//! use shelfmark::catalog::{Book, Catalog};
//! use shelfmark::config::CatalogConfig;
//!
//! let mut catalog = Catalog::with_sample_data(&CatalogConfig::default()).unwrap();
//! catalog
//!     .add_book(Book::new("978-0441013593", "Dune", "Frank Herbert", 1965, "Science Fiction"))
//!     .unwrap();
//!
//! assert_eq!(catalog.search_title("du").len(), 1);
//! assert_eq!(catalog.year_stats(1960, 1969).records, 2);
//! ```

pub mod csv_import;
pub mod engine;
pub mod error;
pub mod loans;
pub mod types;

pub use csv_import::{load_books, read_books};
pub use engine::{Catalog, CatalogStats};
pub use error::{CatalogError, CatalogResult};
pub use loans::{Loan, LoanId, LOAN_PERIOD_DAYS};
pub use types::{sample_books, sample_users, Book, BookPatch, User, UserPatch};
