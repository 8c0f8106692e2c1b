//! Shelfmark Record Store
//!
//! The canonical record set. Every secondary index is a derived view over
//! this store and refers to records through [`RecordId`] handles.
//!
//! - **linked**: Singly linked, insertion-ordered [`LinkedStore`]
//!
//! # Architecture
//!
//! ```text
//! head → [slot 2] → [slot 0] → [slot 3] → None
//!           ↑
//!   KeyedIndex holds RecordId(2), resolved with store.get()
//! ```

mod linked;

pub use linked::{Iter, LinkedStore};

use serde::{Deserialize, Serialize};

/// Handle to a record held by a [`LinkedStore`]
///
/// Valid until the record is removed. Indexes built from the store must be
/// rebuilt after any removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub(crate) usize);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A partial update that knows which fields of `T` it carries
///
/// Implementations set only the fields they carry and leave the rest alone.
pub trait Patch<T> {
    fn apply_to(&self, record: &mut T);
}
