use super::*;

use crate::store::{LinkedStore, RecordId};
use proptest::prelude::*;
use std::collections::HashSet;

fn identity(s: &String) -> String {
    s.clone()
}

fn build(keys: &[String]) -> (LinkedStore<String>, KeyedIndex<String>) {
    let mut store = LinkedStore::new();
    let mut index = KeyedIndex::new(KeyRule::case_insensitive("key", identity));
    for key in keys {
        let id = store.append(key.clone());
        index.insert(id, store.get(id).unwrap());
        assert_valid(index.check_invariants());
    }
    (store, index)
}

fn assert_valid(result: Result<(), String>) {
    if let Err(msg) = result {
        panic!("invariant violated: {msg}");
    }
}

fn brute_prefix(store: &LinkedStore<String>, prefix: &str) -> HashSet<RecordId> {
    let prefix = prefix.to_lowercase();
    store
        .iter()
        .filter(|(_, key)| key.to_lowercase().starts_with(&prefix))
        .map(|(id, _)| id)
        .collect()
}

// Small alphabet so prefixes collide, share boundaries and equal whole keys.
fn key_strategy() -> impl Strategy<Value = String> {
    "[abAB]{0,4}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn avl_stays_balanced_and_ordered(keys in prop::collection::vec(key_strategy(), 0..80)) {
        let (_store, index) = build(&keys);

        prop_assert_eq!(index.len(), keys.len());
        let in_order = index.keys();
        prop_assert!(in_order.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(index.check_invariants().is_ok());
    }

    #[test]
    fn prefix_search_matches_linear_scan(
        keys in prop::collection::vec(key_strategy(), 0..60),
        prefix in key_strategy(),
    ) {
        let (store, index) = build(&keys);

        let found: Vec<RecordId> = index.find_by_prefix(&prefix);
        let found_set: HashSet<RecordId> = found.iter().copied().collect();
        prop_assert_eq!(found.len(), found_set.len(), "duplicate hits");
        prop_assert_eq!(found_set, brute_prefix(&store, &prefix));
    }

    #[test]
    fn prefix_search_on_existing_keys(keys in prop::collection::vec(key_strategy(), 1..60)) {
        let (store, index) = build(&keys);

        for key in &keys {
            let found: HashSet<RecordId> = index.find_by_prefix(key).into_iter().collect();
            prop_assert_eq!(found, brute_prefix(&store, key));
        }
        prop_assert_eq!(index.find_by_prefix("").len(), keys.len());
    }

    #[test]
    fn exact_lookup_finds_inserted_keys(
        keys in prop::collection::vec("[a-z]{1,6}", 1..60),
        missing in "[0-9]{1,3}",
    ) {
        let (store, index) = build(&keys);

        for key in &keys {
            let id = index.find_exact(key);
            prop_assert!(id.is_some());
            prop_assert_eq!(store.get(id.unwrap()).unwrap(), key);
        }
        prop_assert!(index.find_exact(&missing).is_none());
    }

    #[test]
    fn rebuild_preserves_lookups(
        keys in prop::collection::vec(key_strategy(), 1..40),
        prefix in key_strategy(),
    ) {
        let (store, mut index) = build(&keys);

        let before: HashSet<RecordId> = index.find_by_prefix(&prefix).into_iter().collect();
        let before_keys: Vec<String> = index.keys().into_iter().map(String::from).collect();

        index.rebuild(store.iter());

        let after: HashSet<RecordId> = index.find_by_prefix(&prefix).into_iter().collect();
        let after_keys: Vec<String> = index.keys().into_iter().map(String::from).collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(before_keys, after_keys);
    }

    #[test]
    fn stats_query_matches_per_value_sums(
        updates in prop::collection::vec((1890i32..2035, -3i64..4, -3i64..4), 0..120),
        lo in 1900i32..=2023,
        span in 0i32..124,
    ) {
        let mut tree = RangeStatsTree::from_range(1900..=2023).unwrap();
        let mut per_value = vec![RangeTotals::default(); 124];
        let mut applied = RangeTotals::default();

        for &(value, records, events) in &updates {
            tree.update(value, records, events);
            if (1900..=2023).contains(&value) {
                per_value[(value - 1900) as usize] += RangeTotals::new(records, events);
                applied += RangeTotals::new(records, events);
            }
        }

        let hi = (lo + span).min(2023);
        let expected = per_value[(lo - 1900) as usize..=(hi - 1900) as usize]
            .iter()
            .fold(RangeTotals::default(), |acc, t| acc + *t);

        prop_assert_eq!(tree.query(lo, hi), expected);
        prop_assert_eq!(tree.query(1900, 2023), applied);
        prop_assert_eq!(tree.totals(), applied);
        prop_assert_eq!(tree.query(1700, 1899), RangeTotals::default());
        prop_assert_eq!(tree.query(2024, 2500), RangeTotals::default());
        prop_assert!(tree.check_invariants().is_ok());
    }
}
