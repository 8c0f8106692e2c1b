//! Shelfmark Index Structures
//!
//! Derived views over the canonical [`LinkedStore`](crate::store::LinkedStore):
//!
//! - **KeyedIndex**: AVL tree for O(log n) exact and prefix lookup on one key
//! - **KeyRule**: Strategy deriving the key a `KeyedIndex` orders by
//! - **RangeStatsTree**: Segment tree for O(log n) range sums over years
//!
//! # Architecture
//!
//! ```text
//! Query: "books whose title starts with 'the'"
//!        ↓
//! KeyedIndex(title): pruned descent → [RecordId(2), RecordId(3)]
//!        ↓
//! LinkedStore::get(id) → &Book
//!
//! Query: "how many books from 1900-1950"
//!        ↓
//! RangeStatsTree: combine O(log n) cached subtotals → RangeTotals
//! ```

mod avl;
mod error;
mod key;
mod range_stats;

#[cfg(test)]
mod proptests;

pub use avl::KeyedIndex;
pub use error::{IndexError, IndexResult};
pub use key::KeyRule;
pub use range_stats::{RangeStatsTree, RangeTotals};
