//! The canonical tuple instance.
//!
//! A [`Tuple`] is a shared handle to an immutable, fixed-length item array
//! that lives at a terminal slot of the intern trie. Every way of building a
//! tuple goes through [`Registry::intern`], so two tuples with pairwise-equal
//! items (see [`Item`]'s equality) are the same allocation, and tuple
//! equality, hashing and ordering-free lookup are all pointer operations.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use tuple_brand::{Branded, TUPLE_BRAND};

use crate::item::Item;
use crate::registry::Registry;
use crate::stack::ensure_sufficient_stack;

/// Storage behind a [`Tuple`] handle.
pub(crate) struct TupleInner {
    /// Hidden brand field, compared by value in `is_tuple`.
    brand: &'static str,
    items: Box<[Item]>,
    /// Registry that derived tuples are interned into.
    registry: Registry,
}

impl TupleInner {
    pub(crate) fn new(items: Vec<Item>, registry: Registry) -> Self {
        TupleInner {
            brand: TUPLE_BRAND,
            items: items.into_boxed_slice(),
            registry,
        }
    }
}

impl Drop for TupleInner {
    // Nested tuples would otherwise drop recursively, one stack frame per
    // nesting level. Unwind the chain iteratively instead.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.items).into_vec();
        while let Some(item) = pending.pop() {
            if let Item::Tuple(Tuple(inner)) = item {
                if let Some(mut inner) = Arc::into_inner(inner) {
                    pending.extend(std::mem::take(&mut inner.items).into_vec());
                }
            }
        }
    }
}

/// An interned, immutable tuple.
///
/// Cloning is cheap (one reference count). `==` and `Hash` use identity,
/// which for interned tuples coincides with element-wise equality.
#[derive(Clone)]
pub struct Tuple(pub(crate) Arc<TupleInner>);

impl Tuple {
    /// Number of items, fixed at construction.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.items.is_empty()
    }

    /// Item at `index`, or `None` when out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.0.items.get(index)
    }

    #[inline]
    pub fn first(&self) -> Option<&Item> {
        self.0.items.first()
    }

    #[inline]
    pub fn last(&self) -> Option<&Item> {
        self.0.items.last()
    }

    /// Iterate items in order. Each call starts over from the first item.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.0.items.iter()
    }

    /// Borrow the items as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[Item] {
        &self.0.items
    }

    /// Copy the items into a fresh, mutable vector.
    pub fn to_vec(&self) -> Vec<Item> {
        self.0.items.to_vec()
    }

    /// True if both handles are the same canonical tuple.
    ///
    /// Tuples from the global registry are identical exactly when their
    /// items are equal. A tuple from an isolated registry is only ever
    /// identical to tuples of that same registry.
    #[inline]
    pub fn ptr_eq(&self, other: &Tuple) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The registry this tuple was interned into.
    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.0.registry
    }

    #[inline]
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub(crate) fn downgrade(&self) -> Weak<TupleInner> {
        Arc::downgrade(&self.0)
    }

    /// Write the items separated by `sep`. `Null` items write nothing.
    pub(crate) fn write_joined(&self, sep: &str, out: &mut impl fmt::Write) -> fmt::Result {
        for (index, item) in self.iter().enumerate() {
            if index > 0 {
                out.write_str(sep)?;
            }
            if !item.is_null() {
                write!(out, "{item}")?;
            }
        }
        Ok(())
    }
}

/// Identity, which for tuples of one registry is item-wise equality.
impl PartialEq for Tuple {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Tuple {}

impl Hash for Tuple {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl Branded for Tuple {
    fn brand(&self) -> Option<&str> {
        Some(self.0.brand)
    }
}

impl<'a> IntoIterator for &'a Tuple {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| {
            let mut out = f.debug_tuple("Tuple");
            for item in self {
                out.field(item);
            }
            out.finish()
        })
    }
}

/// Comma-joined items, same as `join(",")`.
impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| self.write_joined(",", f))
    }
}
