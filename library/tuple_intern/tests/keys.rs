//! Tuples as composite keys in standard collections.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::collections::{BTreeMap, HashMap, HashSet};

use pretty_assertions::assert_eq;
use tuple_intern::{is_tuple, tuple, Item, Obj, Tuple};

#[derive(Debug)]
struct Account {
    id: u32,
}

#[test]
fn composite_keys_find_their_entries() {
    let mut grid: HashMap<Tuple, char> = HashMap::new();
    for x in 0..4 {
        for y in 0..4 {
            grid.insert(tuple![x, y], if (x + y) % 2 == 0 { '#' } else { '.' });
        }
    }
    assert_eq!(grid.len(), 16);
    assert_eq!(grid[&tuple![2, 2]], '#');
    assert_eq!(grid[&tuple![1, 2]], '.');
    assert!(!grid.contains_key(&tuple![4, 0]));
}

#[test]
fn object_items_key_by_identity() {
    let alice = Obj::opaque(Account { id: 1 });
    let alice_twin = Obj::opaque(Account { id: 1 });

    let mut roles = HashMap::new();
    roles.insert(tuple![&alice, "admin"], true);

    assert_eq!(roles.get(&tuple![&alice, "admin"]), Some(&true));
    assert_eq!(roles.get(&tuple![&alice_twin, "admin"]), None);
    assert_eq!(
        alice.downcast_ref::<Account>().map(|account| account.id),
        Some(1)
    );
}

#[test]
fn set_collapses_equal_tuples() {
    let mut seen = HashSet::new();
    let inputs = [[1, 2], [2, 1], [1, 2], [3, 3], [2, 1]];
    let fresh: Vec<bool> = inputs
        .iter()
        .map(|pair| seen.insert(tuple(pair.iter().copied())))
        .collect();

    assert_eq!(fresh, vec![true, true, false, true, false]);
    assert_eq!(seen.len(), 3);
}

#[test]
fn nested_tuple_keys() {
    let mut map = HashMap::new();
    map.insert(tuple![tuple![1, 2], tuple!["a"]], "nested");
    assert_eq!(map.get(&tuple![tuple![1, 2], tuple!["a"]]), Some(&"nested"));
    assert_eq!(map.get(&tuple![tuple![1, 2], "a"]), None);
}

#[test]
fn tuple_values_in_ordered_map() {
    // Tuples have no order of their own; key an ordered map by their string
    // form instead.
    let mut by_name = BTreeMap::new();
    for t in [tuple!["b", 2], tuple!["a", 1], tuple!["c", 3]] {
        by_name.insert(t.to_string(), t);
    }
    let keys: Vec<&str> = by_name.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a,1", "b,2", "c,3"]);
    assert_eq!(by_name["a,1"], tuple!["a", 1]);
}

#[test]
fn brand_detection() {
    let t = tuple![1, 2];
    assert!(is_tuple(&t));
    assert!(is_tuple(&Item::from(t.clone())));
    assert!(is_tuple(&Some(t)));
    assert!(!is_tuple(&Item::from(1)));
    assert!(!is_tuple(&Option::<Tuple>::None));
    assert!(!is_tuple("1,2"));
}

/// Stands in for a `Tuple` built by another copy of this crate.
#[derive(Debug)]
struct OtherCopyTuple(#[allow(dead_code)] Vec<i64>);

impl tuple_intern::Branded for OtherCopyTuple {
    fn brand(&self) -> Option<&str> {
        Some(tuple_intern::TUPLE_BRAND)
    }
}

#[test]
fn other_copy_tuples_are_recognised_but_not_identical() {
    let ours = tuple![1, 2];
    let theirs = Item::object(OtherCopyTuple(vec![1, 2]));
    assert!(is_tuple(&theirs));

    // Each copy interns into its own registry, so equal items still give
    // two instances and two distinct keys.
    assert_ne!(Item::from(ours.clone()), theirs);
    let with_ours = tuple!["k", ours];
    let with_theirs = tuple!["k", theirs];
    assert_ne!(with_ours, with_theirs);
}
