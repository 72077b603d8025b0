//! Interned immutable tuples.
//!
//! Any two tuples built from pairwise-equal items, in the same order, are
//! the *same* instance:
//!
//! ```
//! use tuple_intern::tuple;
//!
//! let a = tuple![1, "x", true];
//! let b = tuple![1, "x", true];
//! assert!(a.ptr_eq(&b));
//! ```
//!
//! so tuple equality is a pointer comparison and tuples work directly as
//! `HashMap`/`HashSet` keys. Items are value types (compared by value) or
//! reference types (host objects and nested tuples, compared by identity);
//! see [`Item`].
//!
//! # Architecture
//!
//! - [`HybridMap`]: map keyed by items, weak on reference-type keys
//! - [`Registry`]: trie of `HybridMap` nodes, one level per tuple position,
//!   resolving a sequence to its canonical tuple
//! - [`Tuple`]: the immutable, identity-stable instance at a trie terminal
//! - Sequence operations (`map`, `filter`, `slice`, `sort`, `concat`, ...)
//!   on `Tuple`, which re-intern their results
//!
//! # Brand
//!
//! Every tuple carries the shared [`TUPLE_BRAND`] and answers [`is_tuple`]
//! through the [`Branded`] trait from the `tuple_brand` crate. Other copies
//! of this crate linked into the same binary share that crate, so they
//! recognise each other's tuples even though their `Tuple` types differ.
//! Each copy still interns into its own global registry, so equal
//! sequences built by two copies are never the same instance.
//!
//! # Tracing
//!
//! New tuples are logged at `trace`, sweeps at `debug`, under the
//! `tuple_intern` target.

mod config;
mod facade;
mod hybrid_map;
mod item;
mod registry;
mod stack;
mod trie;
mod tuple;

pub use config::{RegistryConfig, DEFAULT_SWEEP_INTERVAL};
pub use hybrid_map::HybridMap;
pub use item::{Item, Obj, Object};
pub use registry::{Registry, RegistryCensus, RegistryStats, SweepReport};
pub use tuple::Tuple;
pub use tuple_brand::{is_tuple, Branded, TUPLE_BRAND};

/// Intern `items` in the global registry.
///
/// ```
/// use tuple_intern::{tuple, Item};
///
/// assert_eq!(tuple([1, 2, 3]), tuple![1, 2, 3]);
/// assert_eq!(tuple(Vec::<Item>::new()), tuple![]);
/// ```
pub fn tuple<I>(items: I) -> Tuple
where
    I: IntoIterator,
    I::Item: Into<Item>,
{
    Registry::global().tuple(items)
}

/// Build a tuple in the global registry from heterogeneous items.
///
/// Each argument goes through `Item::from`.
///
/// ```
/// use tuple_intern::tuple;
///
/// let t = tuple![1, tuple![2, "x"], true];
/// assert_eq!(t.len(), 3);
/// assert_eq!(t.to_string(), "1,2,x,true");
/// ```
#[macro_export]
macro_rules! tuple {
    () => {
        $crate::Registry::global().intern(::std::vec::Vec::new())
    };
    ($($item:expr),+ $(,)?) => {
        $crate::Registry::global().intern(::std::vec![$($crate::Item::from($item)),+])
    };
}
