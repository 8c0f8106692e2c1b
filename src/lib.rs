//! # Shelfmark
//!
//! In-memory book catalog with balanced secondary indexes and range
//! statistics over publication years.
//!
//! ## Features
//!
//! - **Canonical store**: Insertion-ordered singly linked record list
//! - **Secondary indexes**: AVL trees for exact and prefix lookup per key
//! - **Year statistics**: Segment tree for O(log n) range sums
//! - **Users and loans**: Borrower registry and dated loan records
//! - **Rebuild on delete**: Indexes are reconstructed from the store on
//!   removal instead of supporting node deletion
//!
//! ## Modules
//!
//! - [`store`]: Canonical record store and record handles
//! - [`index`]: Keyed AVL index and range stats tree
//! - [`catalog`]: Book catalog orchestrating stores, indexes and loans
//! - [`config`]: TOML / environment configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use shelfmark::{Catalog, CatalogConfig};
//!
//! let catalog = Catalog::with_sample_data(&CatalogConfig::default()).unwrap();
//!
//! let hobbit = catalog.search_title("the hob");
//! assert_eq!(hobbit.len(), 1);
//!
//! let totals = catalog.year_stats(1900, 1950);
//! println!("{} books published 1900-1950", totals.records);
//! ```

pub mod catalog;
pub mod config;
pub mod index;
pub mod store;

// Re-export top-level types for convenience
pub use catalog::{
    Book, BookPatch, Catalog, CatalogError, CatalogResult, CatalogStats, Loan, LoanId, User,
    UserPatch,
};

pub use index::{IndexError, KeyRule, KeyedIndex, RangeStatsTree, RangeTotals};

pub use store::{LinkedStore, Patch, RecordId};

pub use config::{generate_default_config, CatalogConfig, Config, ConfigError, LoggingConfig};
