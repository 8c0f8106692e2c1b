//! Range Stats Tree - static segment tree over an ordinal domain
//!
//! Each leaf is one domain value (a publication year, say) carrying two
//! counters: records and events. Internal nodes cache the sums beneath them.
//!
//! # Performance
//! - Build: O(n) nodes, done once
//! - Point update: O(log n), touches one root-to-leaf path
//! - Range query: O(log n) nodes via range decomposition
//!
//! # Design Notes
//! - Shape is fixed at construction; only counters change.
//! - Values outside the domain are never tracked: updates are no-ops and
//!   queries contribute zero.
//! - Nodes live in an arena addressed by index; the root is slot 0.

use crate::index::{IndexError, IndexResult};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, RangeInclusive};

/// Aggregate counters for a span of the domain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeTotals {
    /// Net number of records
    pub records: i64,
    /// Net number of events (loans, for a catalog)
    pub events: i64,
}

impl RangeTotals {
    pub fn new(records: i64, events: i64) -> Self {
        Self { records, events }
    }

    pub fn is_zero(&self) -> bool {
        self.records == 0 && self.events == 0
    }
}

impl Add for RangeTotals {
    type Output = RangeTotals;

    fn add(self, other: RangeTotals) -> RangeTotals {
        RangeTotals {
            records: self.records + other.records,
            events: self.events + other.events,
        }
    }
}

impl AddAssign for RangeTotals {
    fn add_assign(&mut self, other: RangeTotals) {
        self.records += other.records;
        self.events += other.events;
    }
}

impl std::fmt::Display for RangeTotals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} records, {} events", self.records, self.events)
    }
}

#[derive(Debug, Clone)]
struct SegmentNode {
    lo: i32,
    hi: i32,
    totals: RangeTotals,
    /// Arena slots of the left and right child; `None` at a leaf
    children: Option<(usize, usize)>,
}

impl SegmentNode {
    fn contains(&self, value: i32) -> bool {
        self.lo <= value && value <= self.hi
    }
}

/// Segment tree answering range sums over a fixed contiguous domain
#[derive(Debug, Clone)]
pub struct RangeStatsTree {
    nodes: Vec<SegmentNode>,
}

impl RangeStatsTree {
    /// Build over an ordered, contiguous, non-empty domain
    pub fn new<I>(domain: I) -> IndexResult<Self>
    where
        I: IntoIterator<Item = i32>,
    {
        let values: Vec<i32> = domain.into_iter().collect();

        if values.is_empty() {
            return Err(IndexError::InvalidDomain("domain is empty".to_string()));
        }

        if let Some(gap) = values
            .windows(2)
            .find(|pair| pair[0].checked_add(1) != Some(pair[1]))
        {
            return Err(IndexError::InvalidDomain(format!(
                "values must ascend by one, found {} followed by {}",
                gap[0], gap[1]
            )));
        }

        let mut nodes = Vec::with_capacity(2 * values.len() - 1);
        build(&mut nodes, &values, 0, values.len() - 1);

        tracing::debug!(
            first = values[0],
            last = values[values.len() - 1],
            nodes = nodes.len(),
            "range stats tree built"
        );

        Ok(Self { nodes })
    }

    /// Build over `lo..=hi`
    pub fn from_range(range: RangeInclusive<i32>) -> IndexResult<Self> {
        Self::new(range)
    }

    /// The configured domain
    pub fn domain(&self) -> RangeInclusive<i32> {
        let root = &self.nodes[0];
        root.lo..=root.hi
    }

    pub fn contains(&self, value: i32) -> bool {
        self.nodes[0].contains(value)
    }

    /// Add deltas to the counters of `value` and every range above it
    ///
    /// Values outside the domain are ignored.
    pub fn update(&mut self, value: i32, record_delta: i64, event_delta: i64) {
        if !self.contains(value) {
            tracing::trace!(value, record_delta, event_delta, "stats update outside domain ignored");
            return;
        }

        let delta = RangeTotals::new(record_delta, event_delta);
        let mut slot = 0;
        loop {
            let node = &mut self.nodes[slot];
            node.totals += delta;
            let children = node.children;
            match children {
                None => break,
                Some((left, right)) => {
                    slot = if self.nodes[left].contains(value) {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Totals over the inclusive range `[lo, hi]`
    ///
    /// Parts of the range outside the domain contribute zero; `lo > hi`
    /// yields zero.
    pub fn query(&self, lo: i32, hi: i32) -> RangeTotals {
        if lo > hi {
            return RangeTotals::default();
        }
        self.query_node(0, lo, hi)
    }

    /// Totals for a single domain value
    pub fn point(&self, value: i32) -> RangeTotals {
        self.query(value, value)
    }

    /// Totals over the whole domain
    pub fn totals(&self) -> RangeTotals {
        self.nodes[0].totals
    }

    fn query_node(&self, slot: usize, lo: i32, hi: i32) -> RangeTotals {
        let node = &self.nodes[slot];

        if hi < node.lo || lo > node.hi {
            return RangeTotals::default();
        }

        if lo <= node.lo && node.hi <= hi {
            return node.totals;
        }

        match node.children {
            Some((left, right)) => self.query_node(left, lo, hi) + self.query_node(right, lo, hi),
            // Unreachable in practice: a leaf that overlaps is fully covered.
            None => node.totals,
        }
    }

    /// Verify range shape and cached sums at every node
    pub fn check_invariants(&self) -> Result<(), String> {
        for (slot, node) in self.nodes.iter().enumerate() {
            match node.children {
                None => {
                    if node.lo != node.hi {
                        return Err(format!("leaf {} covers [{}, {}]", slot, node.lo, node.hi));
                    }
                }
                Some((left, right)) => {
                    let (l, r) = (&self.nodes[left], &self.nodes[right]);
                    let mid = node.lo + (node.hi - node.lo) / 2;
                    if l.lo != node.lo || l.hi != mid || r.lo != mid + 1 || r.hi != node.hi {
                        return Err(format!(
                            "node [{}, {}] splits into [{}, {}] and [{}, {}]",
                            node.lo, node.hi, l.lo, l.hi, r.lo, r.hi
                        ));
                    }
                    if l.totals + r.totals != node.totals {
                        return Err(format!(
                            "node [{}, {}] caches {} but children sum to {}",
                            node.lo,
                            node.hi,
                            node.totals,
                            l.totals + r.totals
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

fn build(nodes: &mut Vec<SegmentNode>, values: &[i32], start: usize, end: usize) -> usize {
    let slot = nodes.len();
    nodes.push(SegmentNode {
        lo: values[start],
        hi: values[end],
        totals: RangeTotals::default(),
        children: None,
    });

    if start < end {
        let mid = start + (end - start) / 2;
        let left = build(nodes, values, start, mid);
        let right = build(nodes, values, mid + 1, end);
        nodes[slot].children = Some((left, right));
    }

    slot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn years() -> RangeStatsTree {
        RangeStatsTree::from_range(1900..=2023).unwrap()
    }

    #[test]
    fn test_build_shape() {
        let tree = years();
        assert_eq!(tree.domain(), 1900..=2023);
        assert_eq!(tree.nodes.len(), 2 * 124 - 1);
        assert!(tree.totals().is_zero());
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn test_single_value_domain() {
        let mut tree = RangeStatsTree::new([2000]).unwrap();
        tree.update(2000, 3, 1);
        assert_eq!(tree.query(1990, 2010), RangeTotals::new(3, 1));
        assert_eq!(tree.point(2000), RangeTotals::new(3, 1));
    }

    #[test]
    fn test_invalid_domains() {
        assert!(matches!(
            RangeStatsTree::new(Vec::<i32>::new()),
            Err(IndexError::InvalidDomain(_))
        ));
        assert!(RangeStatsTree::new([1900, 1902]).is_err());
        assert!(RangeStatsTree::new([1901, 1900]).is_err());
        assert!(RangeStatsTree::new([5, 5]).is_err());
    }

    #[test]
    fn test_publication_year_scenario() {
        let mut tree = years();
        for year in [1949, 1960, 1937, 1925, 1813] {
            tree.update(year, 1, 0);
        }

        let early = tree.query(1900, 1950);
        // 1949, 1937, 1925; 1813 is outside the domain
        assert_eq!(early.records, 3);

        let all = tree.query(1900, 2023);
        assert_eq!(all.records, 4);
        assert_eq!(tree.point(1960).records, 1);
        assert_eq!(tree.point(1813), RangeTotals::default());
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn test_events_tracked_separately() {
        let mut tree = years();
        tree.update(1949, 1, 0);
        tree.update(2023, 0, 1);
        tree.update(2023, 0, 1);

        assert_eq!(tree.query(1900, 2023), RangeTotals::new(1, 2));
        assert_eq!(tree.query(2000, 2023), RangeTotals::new(0, 2));
        assert_eq!(tree.query(1949, 1949), RangeTotals::new(1, 0));
    }

    #[test]
    fn test_negative_delta_cancels() {
        let mut tree = years();
        tree.update(1960, 1, 0);
        tree.update(1960, -1, 0);
        assert!(tree.totals().is_zero());
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn test_out_of_domain_update_is_noop() {
        let mut tree = years();
        tree.update(1899, 5, 5);
        tree.update(2024, 5, 5);
        assert!(tree.totals().is_zero());
    }

    #[test]
    fn test_query_outside_domain_is_zero() {
        let mut tree = years();
        tree.update(1950, 1, 1);
        assert_eq!(tree.query(1700, 1800), RangeTotals::default());
        assert_eq!(tree.query(2100, 2200), RangeTotals::default());
        assert_eq!(tree.query(1960, 1950), RangeTotals::default());
    }

    #[test]
    fn test_query_partially_outside_domain() {
        let mut tree = years();
        tree.update(1900, 1, 0);
        tree.update(2023, 1, 0);
        assert_eq!(tree.query(1800, 1900).records, 1);
        assert_eq!(tree.query(2023, 3000).records, 1);
        assert_eq!(tree.query(i32::MIN, i32::MAX).records, 2);
    }

    #[test]
    fn test_matches_brute_force_sums() {
        let mut tree = RangeStatsTree::from_range(0..=37).unwrap();
        let mut counts = vec![(0i64, 0i64); 38];

        for i in 0..200i64 {
            let value = ((i * 7 + 3) % 38) as i32;
            let (r, e) = (i % 3 - 1, i % 2);
            tree.update(value, r, e);
            counts[value as usize].0 += r;
            counts[value as usize].1 += e;
        }

        for lo in 0..38 {
            for hi in lo..38 {
                let expected = counts[lo as usize..=hi as usize]
                    .iter()
                    .fold(RangeTotals::default(), |acc, (r, e)| acc + RangeTotals::new(*r, *e));
                assert_eq!(tree.query(lo, hi), expected, "range [{}, {}]", lo, hi);
            }
        }
        assert!(tree.check_invariants().is_ok());
    }
}
