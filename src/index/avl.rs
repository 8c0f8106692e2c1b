//! Keyed Index - AVL tree over a derived string key
//!
//! Maps the key a [`KeyRule`] derives from each record to that record's
//! [`RecordId`] in the canonical store.
//!
//! # Performance
//! - Insert: O(log n)
//! - Exact lookup: O(log n)
//! - Prefix lookup: O(log n + k) where k = results
//!
//! # Design Notes
//! - Insert only. Removing a record, or changing a field a key is derived
//!   from, is handled by [`KeyedIndex::rebuild`] from the store.
//! - Equal keys descend right; order among duplicates is not preserved.
//! - Each node exclusively owns its children.

use crate::index::KeyRule;
use crate::store::RecordId;
use std::cmp::{max, Ordering};

type Link = Option<Box<AvlNode>>;

#[derive(Debug)]
struct AvlNode {
    /// Normalized key, fixed at insertion
    key: String,
    record: RecordId,
    left: Link,
    right: Link,
    height: u32,
}

impl AvlNode {
    fn leaf(key: &str, record: RecordId) -> Box<Self> {
        Box::new(Self {
            key: key.to_string(),
            record,
            left: None,
            right: None,
            height: 1,
        })
    }

    fn update_height(&mut self) {
        self.height = 1 + max(height(&self.left), height(&self.right));
    }

    /// Left height minus right height
    fn balance(&self) -> i64 {
        i64::from(height(&self.left)) - i64::from(height(&self.right))
    }
}

fn height(link: &Link) -> u32 {
    link.as_ref().map_or(0, |node| node.height)
}

fn rotate_right(mut z: Box<AvlNode>) -> Box<AvlNode> {
    let Some(mut y) = z.left.take() else {
        debug_assert!(false, "rotate_right without a left child");
        return z;
    };
    z.left = y.right.take();
    z.update_height();
    y.right = Some(z);
    y.update_height();
    y
}

fn rotate_left(mut z: Box<AvlNode>) -> Box<AvlNode> {
    let Some(mut y) = z.right.take() else {
        debug_assert!(false, "rotate_left without a right child");
        return z;
    };
    z.right = y.left.take();
    z.update_height();
    y.left = Some(z);
    y.update_height();
    y
}

fn insert_node(link: Link, key: &str, record: RecordId) -> Box<AvlNode> {
    let mut node = match link {
        Some(node) => node,
        None => return AvlNode::leaf(key, record),
    };

    if key < node.key.as_str() {
        node.left = Some(insert_node(node.left.take(), key, record));
    } else {
        node.right = Some(insert_node(node.right.take(), key, record));
    }

    node.update_height();
    let balance = node.balance();

    // The heavy child's lean picks single or double rotation; a key equal
    // to the child's key has descended right.
    if balance > 1 {
        let left_left = node.left.as_ref().is_some_and(|left| left.balance() >= 0);
        if left_left {
            return rotate_right(node);
        }
        // left-right
        node.left = node.left.take().map(rotate_left);
        return rotate_right(node);
    }

    if balance < -1 {
        let right_right = node.right.as_ref().is_some_and(|right| right.balance() <= 0);
        if right_right {
            return rotate_left(node);
        }
        // right-left
        node.right = node.right.take().map(rotate_right);
        return rotate_left(node);
    }

    node
}

fn collect_prefix(link: Option<&AvlNode>, prefix: &str, out: &mut Vec<RecordId>) {
    let Some(node) = link else {
        return;
    };

    if node.key.starts_with(prefix) {
        out.push(node.record);
    }

    // Matches may sit left while the prefix does not sort after this key.
    if prefix <= node.key.as_str() {
        collect_prefix(node.left.as_deref(), prefix, out);
    }

    // Matches may sit right while the prefix does not sort before the
    // key's leading prefix-length bytes.
    let key = node.key.as_bytes();
    let head = &key[..prefix.len().min(key.len())];
    if prefix.as_bytes() >= head {
        collect_prefix(node.right.as_deref(), prefix, out);
    }
}

fn collect_in_order<'a>(link: Option<&'a AvlNode>, out: &mut Vec<(&'a str, RecordId)>) {
    if let Some(node) = link {
        collect_in_order(node.left.as_deref(), out);
        out.push((node.key.as_str(), node.record));
        collect_in_order(node.right.as_deref(), out);
    }
}

/// Checks ordering, balance and cached heights; returns the subtree height
///
/// Bounds are inclusive: a left rotation can lift a duplicate above an
/// equal key, so equal keys may appear on either side.
fn validate_node<'a>(
    link: Option<&'a AvlNode>,
    lower: Option<&'a str>,
    upper: Option<&'a str>,
) -> Result<u32, String> {
    let Some(node) = link else {
        return Ok(0);
    };

    if let Some(lower) = lower {
        if node.key.as_str() < lower {
            return Err(format!("key {:?} sorts before its lower bound {:?}", node.key, lower));
        }
    }
    if let Some(upper) = upper {
        if node.key.as_str() > upper {
            return Err(format!("key {:?} sorts after its upper bound {:?}", node.key, upper));
        }
    }

    let left = validate_node(node.left.as_deref(), lower, Some(node.key.as_str()))?;
    let right = validate_node(node.right.as_deref(), Some(node.key.as_str()), upper)?;

    if left.abs_diff(right) > 1 {
        return Err(format!(
            "node {:?} unbalanced: left height {}, right height {}",
            node.key, left, right
        ));
    }

    let expected = 1 + max(left, right);
    if node.height != expected {
        return Err(format!(
            "node {:?} caches height {} but has height {}",
            node.key, node.height, expected
        ));
    }

    Ok(expected)
}

/// Height-balanced secondary index over one key dimension
#[derive(Debug)]
pub struct KeyedIndex<T> {
    rule: KeyRule<T>,
    root: Link,
    len: usize,
}

impl<T> KeyedIndex<T> {
    /// Create an empty index ordered by `rule`
    pub fn new(rule: KeyRule<T>) -> Self {
        Self {
            rule,
            root: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree (0 when empty)
    pub fn height(&self) -> u32 {
        height(&self.root)
    }

    /// Index a record under the key its rule derives
    pub fn insert(&mut self, id: RecordId, record: &T) {
        let key = self.rule.key_of(record);
        tracing::trace!(index = self.rule.name(), key = %key, record = %id, "index insert");
        self.root = Some(insert_node(self.root.take(), &key, id));
        self.len += 1;
    }

    /// Exact-key lookup; the probe is normalized like stored keys
    pub fn find_exact(&self, key: &str) -> Option<RecordId> {
        let probe = self.rule.normalize(key);
        let mut current = self.root.as_deref();

        while let Some(node) = current {
            match probe.as_str().cmp(node.key.as_str()) {
                Ordering::Equal => return Some(node.record),
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Greater => current = node.right.as_deref(),
            }
        }

        None
    }

    /// All records whose key starts with `prefix`
    ///
    /// Results follow tree structure, not key order. An empty prefix
    /// returns every record.
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<RecordId> {
        let probe = self.rule.normalize(prefix);
        let mut out = Vec::new();
        collect_prefix(self.root.as_deref(), &probe, &mut out);
        out
    }

    /// `(key, record)` pairs in key order
    pub fn entries(&self) -> Vec<(&str, RecordId)> {
        let mut out = Vec::with_capacity(self.len);
        collect_in_order(self.root.as_deref(), &mut out);
        out
    }

    /// Keys in non-decreasing order
    pub fn keys(&self) -> Vec<&str> {
        self.entries().into_iter().map(|(key, _)| key).collect()
    }

    /// Discard every node
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Discard the tree and reindex every record handed in
    pub fn rebuild<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = (RecordId, &'a T)>,
        T: 'a,
    {
        self.clear();
        for (id, record) in records {
            self.insert(id, record);
        }
        tracing::debug!(index = self.rule.name(), entries = self.len, height = self.height(), "index rebuilt");
    }

    /// Verify BST ordering, AVL balance and cached heights at every node
    pub fn check_invariants(&self) -> Result<(), String> {
        validate_node(self.root.as_deref(), None, None).map(|_| ())
    }
}
