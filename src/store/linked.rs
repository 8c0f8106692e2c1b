//! Linked Store - insertion-ordered singly linked list
//!
//! Nodes live in a slot arena and link to their successor by slot index.
//! A [`RecordId`] is the slot of a live node, so secondary indexes can hold
//! a cheap handle to a record without owning or copying it.
//!
//! # Performance
//! - Append: O(n), seeks the tail from the head on every call
//! - Find / remove / update by predicate: O(n)
//! - Resolve a handle: O(1)

use crate::store::{Patch, RecordId};

/// One node of the list: a record and the slot of the next node
#[derive(Debug)]
struct Node<T> {
    record: T,
    next: Option<usize>,
}

/// Singly linked, append-at-tail record store
///
/// Owns every record. Handles returned by [`LinkedStore::append`] stay valid
/// until that record is removed; freed slots are reused by later appends.
#[derive(Debug)]
pub struct LinkedStore<T> {
    /// Slot arena; `None` marks a free slot
    slots: Vec<Option<Node<T>>>,
    /// Free slot indices available for reuse
    free: Vec<usize>,
    /// First node of the chain
    head: Option<usize>,
    /// Number of reachable nodes
    len: usize,
}

impl<T> Default for LinkedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LinkedStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            len: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Append a record at the tail and return its handle
    pub fn append(&mut self, record: T) -> RecordId {
        let slot = self.alloc(Node { record, next: None });

        match self.head {
            None => self.head = Some(slot),
            Some(head) => {
                let mut current = head;
                while let Some(next) = self.node(current).next {
                    current = next;
                }
                self.node_mut(current).next = Some(slot);
            }
        }

        self.len += 1;
        RecordId(slot)
    }

    /// Remove the first record matching `pred`, returning whether one was removed
    pub fn remove_first_matching<F>(&mut self, pred: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.take_first_matching(pred).is_some()
    }

    /// Remove the first record matching `pred` and hand it back
    pub fn take_first_matching<F>(&mut self, mut pred: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let head = self.head?;

        if pred(&self.node(head).record) {
            self.head = self.node(head).next;
            return Some(self.release(head));
        }

        let mut current = head;
        while let Some(next) = self.node(current).next {
            if pred(&self.node(next).record) {
                self.node_mut(current).next = self.node(next).next;
                return Some(self.release(next));
            }
            current = next;
        }

        None
    }

    /// Find the first record matching `pred`
    pub fn find_first_matching<F>(&self, mut pred: F) -> Option<&T>
    where
        F: FnMut(&T) -> bool,
    {
        self.iter().map(|(_, record)| record).find(|record| pred(*record))
    }

    /// Find the handle of the first record matching `pred`
    pub fn find_first_id<F>(&self, mut pred: F) -> Option<RecordId>
    where
        F: FnMut(&T) -> bool,
    {
        self.iter().find(|(_, record)| pred(*record)).map(|(id, _)| id)
    }

    /// Apply `patch` to the first record matching `pred`
    ///
    /// Returns `false` when no record matched. Fields the patch does not
    /// carry are left untouched.
    pub fn update_first_matching<F, P>(&mut self, pred: F, patch: &P) -> bool
    where
        F: FnMut(&T) -> bool,
        P: Patch<T> + ?Sized,
    {
        match self.find_first_id(pred) {
            Some(id) => {
                if let Some(record) = self.get_mut(id) {
                    patch.apply_to(record);
                }
                true
            }
            None => false,
        }
    }

    /// All records in insertion order
    pub fn to_sequence(&self) -> Vec<&T> {
        self.iter().map(|(_, record)| record).collect()
    }

    /// Iterate `(handle, record)` pairs in insertion order
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            store: self,
            cursor: self.head,
        }
    }

    /// Resolve a handle
    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.slots
            .get(id.0)
            .and_then(|slot| slot.as_ref())
            .map(|node| &node.record)
    }

    /// Resolve a handle for mutation
    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut T> {
        self.slots
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .map(|node| &mut node.record)
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.len = 0;
    }

    fn alloc(&mut self, node: Node<T>) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, slot: usize) -> T {
        let node = self.slots[slot].take();
        debug_assert!(node.is_some(), "released a free slot");
        self.free.push(slot);
        self.len -= 1;
        match node {
            Some(node) => node.record,
            None => unreachable!("linked slot {} was free", slot),
        }
    }

    fn node(&self, slot: usize) -> &Node<T> {
        match &self.slots[slot] {
            Some(node) => node,
            None => unreachable!("linked slot {} was free", slot),
        }
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node<T> {
        match &mut self.slots[slot] {
            Some(node) => node,
            None => unreachable!("linked slot {} was free", slot),
        }
    }
}

/// Insertion-order iterator over a [`LinkedStore`]
pub struct Iter<'a, T> {
    store: &'a LinkedStore<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (RecordId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let store = self.store;
        let node = store.node(slot);
        self.cursor = node.next;
        Some((RecordId(slot), &node.record))
    }
}

impl<'a, T> IntoIterator for &'a LinkedStore<T> {
    type Item = (RecordId, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rename(&'static str);

    impl Patch<String> for Rename {
        fn apply_to(&self, record: &mut String) {
            *record = self.0.to_string();
        }
    }

    fn store_of(items: &[&str]) -> LinkedStore<String> {
        let mut store = LinkedStore::new();
        for item in items {
            store.append(item.to_string());
        }
        store
    }

    #[test]
    fn test_empty_store() {
        let store: LinkedStore<String> = LinkedStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.to_sequence().is_empty());
        assert!(store.find_first_matching(|_| true).is_none());
    }

    #[test]
    fn test_append_preserves_order() {
        let store = store_of(&["Book 1", "Book 2", "Book 3"]);
        assert!(!store.is_empty());
        assert_eq!(store.len(), 3);
        assert_eq!(store.to_sequence(), vec!["Book 1", "Book 2", "Book 3"]);
    }

    #[test]
    fn test_find_first_matching() {
        let store = store_of(&["a", "b", "b", "c"]);
        assert_eq!(store.find_first_matching(|s| s == "b").map(String::as_str), Some("b"));
        assert!(store.find_first_matching(|s| s == "z").is_none());

        let id = store.find_first_id(|s| s == "b").unwrap();
        assert_eq!(store.get(id).map(String::as_str), Some("b"));
    }

    #[test]
    fn test_remove_head() {
        let mut store = store_of(&["Book 1", "Book 2", "Book 3"]);
        assert!(store.remove_first_matching(|s| s == "Book 1"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.to_sequence(), vec!["Book 2", "Book 3"]);
    }

    #[test]
    fn test_remove_interior_and_tail() {
        let mut store = store_of(&["Book 1", "Book 2", "Book 3"]);
        assert!(store.remove_first_matching(|s| s == "Book 2"));
        assert_eq!(store.to_sequence(), vec!["Book 1", "Book 3"]);

        assert!(store.remove_first_matching(|s| s == "Book 3"));
        assert_eq!(store.to_sequence(), vec!["Book 1"]);

        // Tail removed, append must still link correctly
        store.append("Book 4".to_string());
        assert_eq!(store.to_sequence(), vec!["Book 1", "Book 4"]);
    }

    #[test]
    fn test_remove_only_first_duplicate() {
        let mut store = store_of(&["x", "y", "x"]);
        assert!(store.remove_first_matching(|s| s == "x"));
        assert_eq!(store.to_sequence(), vec!["y", "x"]);
    }

    #[test]
    fn test_remove_missing() {
        let mut store = store_of(&["a"]);
        assert!(!store.remove_first_matching(|s| s == "b"));
        assert_eq!(store.len(), 1);

        let mut empty: LinkedStore<String> = LinkedStore::new();
        assert!(!empty.remove_first_matching(|_| true));
    }

    #[test]
    fn test_take_returns_record() {
        let mut store = store_of(&["a", "b"]);
        assert_eq!(store.take_first_matching(|s| s == "b"), Some("b".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_slot_reuse_keeps_order() {
        let mut store = store_of(&["a", "b", "c"]);
        let removed = store.find_first_id(|s| s == "a").unwrap();
        assert!(store.remove_first_matching(|s| s == "a"));
        assert!(store.get(removed).is_none());

        let reused = store.append("d".to_string());
        assert_eq!(reused, removed);
        assert_eq!(store.to_sequence(), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_update_first_matching() {
        let mut store = store_of(&["a", "b"]);
        assert!(store.update_first_matching(|s| s == "b", &Rename("z")));
        assert_eq!(store.to_sequence(), vec!["a", "z"]);

        assert!(!store.update_first_matching(|s| s == "missing", &Rename("q")));
        assert_eq!(store.to_sequence(), vec!["a", "z"]);
    }

    #[test]
    fn test_mutation_visible_through_handle() {
        let mut store = store_of(&["a"]);
        let id = store.find_first_id(|s| s == "a").unwrap();
        store.get_mut(id).unwrap().push('!');
        assert_eq!(store.get(id).map(String::as_str), Some("a!"));
    }

    #[test]
    fn test_clear() {
        let mut store = store_of(&["a", "b"]);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert_eq!(store.iter().count(), 0);
    }
}
