//! Property-based tests for tuple interning.
//!
//! Random item sequences are interned and checked for:
//! 1. Canonicalization: equal sequences give the same instance
//! 2. Faithfulness: unequal sequences never share an instance
//! 3. Sequence operations agree with the same operations on plain vectors

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use proptest::prelude::*;
use tuple_intern::{Item, Registry, RegistryConfig, Tuple};

// -- Item Strategies --

/// A float drawn mostly from the awkward corners.
fn float_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(f64::NAN),
        Just(0.0),
        Just(-0.0),
        Just(f64::INFINITY),
        Just(1.0),
        (-100.0..100.0f64),
    ]
}

/// A value-type item. Small domains so collisions actually happen.
fn item_strategy() -> impl Strategy<Value = Item> {
    prop_oneof![
        Just(Item::Null),
        any::<bool>().prop_map(Item::Bool),
        (-3i64..3).prop_map(Item::Int),
        float_strategy().prop_map(Item::Float),
        "[a-c]{0,2}".prop_map(Item::from),
    ]
}

fn items_strategy(max_len: usize) -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec(item_strategy(), 0..=max_len)
}

fn registry() -> Registry {
    Registry::isolated(RegistryConfig::manual())
}

fn same_items(a: &[Item], b: &[Item]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

fn check_items(t: &Tuple, expected: &[Item]) -> Result<(), TestCaseError> {
    prop_assert!(
        same_items(t.as_slice(), expected),
        "{:?} != {:?}",
        t,
        expected
    );
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    /// Interning the same sequence twice yields one instance.
    #[test]
    fn prop_intern_is_canonical(items in items_strategy(8)) {
        let registry = registry();
        let a = registry.intern(items.clone());
        let b = registry.intern(items.clone());
        prop_assert!(a.ptr_eq(&b));
        check_items(&a, &items)?;
    }

    /// Two sequences share an instance exactly when they are item-wise equal.
    #[test]
    fn prop_identity_iff_items_equal(
        left in items_strategy(4),
        right in items_strategy(4),
    ) {
        let registry = registry();
        let a = registry.intern(left.clone());
        let b = registry.intern(right.clone());
        prop_assert_eq!(a.ptr_eq(&b), same_items(&left, &right));
    }

    /// Nesting keeps canonicalization: equal inner tuples make equal outer ones.
    #[test]
    fn prop_nested_canonical(inner in items_strategy(4), extra in item_strategy()) {
        let registry = registry();
        let first = registry.tuple([Item::from(registry.intern(inner.clone())), extra.clone()]);
        let second = registry.tuple([Item::from(registry.intern(inner)), extra]);
        prop_assert!(first.ptr_eq(&second));
    }

    #[test]
    fn prop_slice_matches_vec(items in items_strategy(8), start in -10isize..10, end in -10isize..10) {
        let registry = registry();
        let t = registry.intern(items.clone());

        let len = items.len() as isize;
        let resolve = |i: isize| if i < 0 { (len + i).max(0) } else { i.min(len) };
        let (from, to) = (resolve(start), resolve(end));
        let expected = if from < to {
            items[from as usize..to as usize].to_vec()
        } else {
            Vec::new()
        };

        let sliced = t.slice(start..end);
        check_items(&sliced, &expected)?;
        prop_assert!(sliced.ptr_eq(&registry.intern(expected)));
    }

    /// Splitting a tuple and concatenating the halves gives it back.
    #[test]
    fn prop_split_concat_roundtrip(items in items_strategy(8), at in 0usize..9) {
        let registry = registry();
        let t = registry.intern(items.clone());
        let at = at.min(items.len()) as isize;
        let rejoined = t.slice(..at).concat([t.slice(at..)]);
        prop_assert!(rejoined.ptr_eq(&t));
    }

    #[test]
    fn prop_reverse_twice_is_identity(items in items_strategy(8)) {
        let t = registry().intern(items);
        prop_assert!(t.reverse().reverse().ptr_eq(&t));
        prop_assert!(t.slice(..).ptr_eq(&t));
    }

    #[test]
    fn prop_sort_is_idempotent(items in items_strategy(8)) {
        let t = registry().intern(items);
        let once = t.sort();
        prop_assert!(once.sort().ptr_eq(&once));
        prop_assert_eq!(once.len(), t.len());
    }

    #[test]
    fn prop_join_matches_item_strings(items in items_strategy(6)) {
        let t = registry().intern(items.clone());
        let expected: Vec<String> = items
            .iter()
            .map(|item| if item.is_null() { String::new() } else { item.to_string() })
            .collect();
        prop_assert_eq!(t.join(";"), expected.join(";"));
        prop_assert_eq!(t.to_string(), expected.join(","));
    }

    /// `index_of` agrees with strict equality, `includes` with same-value-zero.
    #[test]
    fn prop_search_matches_vec(items in items_strategy(8), needle in item_strategy()) {
        let t = registry().intern(items.clone());
        prop_assert_eq!(t.index_of(&needle), items.iter().position(|item| item.strict_eq(&needle)));
        prop_assert_eq!(t.includes(&needle), items.iter().any(|item| item.same_value_zero(&needle)));
    }
}
