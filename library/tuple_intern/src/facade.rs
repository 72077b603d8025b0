//! Sequence operations on [`Tuple`].
//!
//! Everything here is read-only. Operations whose natural result is another
//! sequence (`map`, `filter`, `slice`, `reverse`, `sort`, `sort_by`,
//! `concat`) build the new item list in a private scratch vector and intern
//! it into the source tuple's registry, so they return canonical tuples.
//! Everything else returns plain values.
//!
//! Callbacks see `(item, index, source)`, where `source` is the tuple being
//! walked. Each callback-taking operation has a `try_` form whose callback
//! returns `Result`; the first error stops the walk and comes back to the
//! caller untouched.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::ops::{Bound, RangeBounds};

use crate::item::Item;
use crate::tuple::Tuple;

#[inline]
fn into_ok<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Resolve a possibly negative index to a position in `0..=len`.
/// Negative indices count back from the end.
fn position(index: isize, len: usize) -> usize {
    if index >= 0 {
        index.unsigned_abs().min(len)
    } else {
        len.saturating_sub(index.unsigned_abs())
    }
}

/// The position just past `index`, clamped to `0..=len`.
fn position_after(index: isize, len: usize) -> usize {
    if index >= 0 {
        index.unsigned_abs().saturating_add(1).min(len)
    } else {
        let back = index.unsigned_abs();
        if back > len {
            0
        } else {
            len - back + 1
        }
    }
}

/// Default sort key: the item's string form as UTF-16 code units, with
/// `Null` after everything else.
fn default_sort_key(item: &Item) -> (bool, Vec<u16>) {
    (item.is_null(), item.to_string().encode_utf16().collect())
}

impl Tuple {
    fn derive(&self, items: Vec<Item>) -> Tuple {
        self.registry().intern(items)
    }

    // Transform

    pub fn try_map<R, E>(
        &self,
        mut f: impl FnMut(&Item, usize, &Tuple) -> Result<R, E>,
    ) -> Result<Tuple, E>
    where
        R: Into<Item>,
    {
        let mut mapped = Vec::with_capacity(self.len());
        for (index, item) in self.iter().enumerate() {
            mapped.push(f(item, index, self)?.into());
        }
        Ok(self.derive(mapped))
    }

    /// Interned tuple of `f` applied to every item.
    pub fn map<R: Into<Item>>(&self, mut f: impl FnMut(&Item, usize, &Tuple) -> R) -> Tuple {
        into_ok(self.try_map(|item, index, source| Ok(f(item, index, source))))
    }

    // Filter

    pub fn try_filter<E>(
        &self,
        mut predicate: impl FnMut(&Item, usize, &Tuple) -> Result<bool, E>,
    ) -> Result<Tuple, E> {
        let mut kept = Vec::new();
        for (index, item) in self.iter().enumerate() {
            if predicate(item, index, self)? {
                kept.push(item.clone());
            }
        }
        Ok(self.derive(kept))
    }

    /// Interned tuple of the items `predicate` accepts, in order.
    pub fn filter(&self, mut predicate: impl FnMut(&Item, usize, &Tuple) -> bool) -> Tuple {
        into_ok(self.try_filter(|item, index, source| Ok(predicate(item, index, source))))
    }

    // Search

    pub fn try_find_index<E>(
        &self,
        mut predicate: impl FnMut(&Item, usize, &Tuple) -> Result<bool, E>,
    ) -> Result<Option<usize>, E> {
        for (index, item) in self.iter().enumerate() {
            if predicate(item, index, self)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Index of the first item `predicate` accepts.
    pub fn find_index(
        &self,
        mut predicate: impl FnMut(&Item, usize, &Tuple) -> bool,
    ) -> Option<usize> {
        into_ok(self.try_find_index(|item, index, source| Ok(predicate(item, index, source))))
    }

    pub fn try_find<E>(
        &self,
        predicate: impl FnMut(&Item, usize, &Tuple) -> Result<bool, E>,
    ) -> Result<Option<&Item>, E> {
        Ok(self.try_find_index(predicate)?.and_then(|index| self.get(index)))
    }

    /// First item `predicate` accepts.
    pub fn find(&self, predicate: impl FnMut(&Item, usize, &Tuple) -> bool) -> Option<&Item> {
        self.find_index(predicate).and_then(|index| self.get(index))
    }

    /// Index of the first item strictly equal to `needle` (see
    /// [`Item::strict_eq`]; `NaN` is never found).
    pub fn index_of(&self, needle: &Item) -> Option<usize> {
        self.iter().position(|item| item.strict_eq(needle))
    }

    /// Index of the last item strictly equal to `needle`.
    pub fn last_index_of(&self, needle: &Item) -> Option<usize> {
        self.iter().rposition(|item| item.strict_eq(needle))
    }

    /// True if some item equals `needle` under
    /// [`Item::same_value_zero`] (`NaN` is found).
    pub fn includes(&self, needle: &Item) -> bool {
        self.iter().any(|item| item.same_value_zero(needle))
    }

    // Fold

    pub fn try_reduce<A, E>(
        &self,
        init: A,
        mut f: impl FnMut(A, &Item, usize, &Tuple) -> Result<A, E>,
    ) -> Result<A, E> {
        let mut acc = init;
        for (index, item) in self.iter().enumerate() {
            acc = f(acc, item, index, self)?;
        }
        Ok(acc)
    }

    /// Fold left to right, starting from `init`.
    pub fn reduce<A>(&self, init: A, mut f: impl FnMut(A, &Item, usize, &Tuple) -> A) -> A {
        into_ok(self.try_reduce(init, |acc, item, index, source| Ok(f(acc, item, index, source))))
    }

    pub fn try_reduce_right<A, E>(
        &self,
        init: A,
        mut f: impl FnMut(A, &Item, usize, &Tuple) -> Result<A, E>,
    ) -> Result<A, E> {
        let mut acc = init;
        for (index, item) in self.iter().enumerate().rev() {
            acc = f(acc, item, index, self)?;
        }
        Ok(acc)
    }

    /// Fold right to left, starting from `init`.
    pub fn reduce_right<A>(&self, init: A, mut f: impl FnMut(A, &Item, usize, &Tuple) -> A) -> A {
        into_ok(
            self.try_reduce_right(init, |acc, item, index, source| {
                Ok(f(acc, item, index, source))
            }),
        )
    }

    // Iterate

    pub fn try_for_each<E>(
        &self,
        mut f: impl FnMut(&Item, usize, &Tuple) -> Result<(), E>,
    ) -> Result<(), E> {
        for (index, item) in self.iter().enumerate() {
            f(item, index, self)?;
        }
        Ok(())
    }

    pub fn for_each(&self, mut f: impl FnMut(&Item, usize, &Tuple)) {
        into_ok(self.try_for_each(|item, index, source| {
            f(item, index, source);
            Ok(())
        }));
    }

    // Predicates

    pub fn try_every<E>(
        &self,
        mut predicate: impl FnMut(&Item, usize, &Tuple) -> Result<bool, E>,
    ) -> Result<bool, E> {
        for (index, item) in self.iter().enumerate() {
            if !predicate(item, index, self)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// True if `predicate` accepts every item (vacuously true when empty).
    pub fn every(&self, mut predicate: impl FnMut(&Item, usize, &Tuple) -> bool) -> bool {
        into_ok(self.try_every(|item, index, source| Ok(predicate(item, index, source))))
    }

    pub fn try_some<E>(
        &self,
        predicate: impl FnMut(&Item, usize, &Tuple) -> Result<bool, E>,
    ) -> Result<bool, E> {
        Ok(self.try_find_index(predicate)?.is_some())
    }

    /// True if `predicate` accepts at least one item.
    pub fn some(&self, predicate: impl FnMut(&Item, usize, &Tuple) -> bool) -> bool {
        self.find_index(predicate).is_some()
    }

    // Format

    /// Items in string form separated by `sep`. `Null` items render empty.
    pub fn join(&self, sep: &str) -> String {
        let mut out = String::new();
        // Items render infallibly, so writing into a String cannot fail.
        let _ = self.write_joined(sep, &mut out);
        out
    }

    // Reshape

    /// Interned tuple of the items in `range`.
    ///
    /// Negative bounds count back from the end (`-1` is the last item),
    /// out-of-range bounds are clamped and an inverted range is empty.
    ///
    /// ```
    /// use tuple_intern::tuple;
    ///
    /// let t = tuple![1, 2, 3, 4, 5];
    /// assert_eq!(t.slice(2..4), tuple![3, 4]);
    /// assert_eq!(t.slice(-3..), tuple![3, 4, 5]);
    /// ```
    pub fn slice(&self, range: impl RangeBounds<isize>) -> Tuple {
        let len = self.len();
        let start = match range.start_bound() {
            Bound::Included(&index) => position(index, len),
            Bound::Excluded(&index) => position_after(index, len),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&index) => position_after(index, len),
            Bound::Excluded(&index) => position(index, len),
            Bound::Unbounded => len,
        };
        let items = self
            .as_slice()
            .get(start..end)
            .map_or_else(Vec::new, <[Item]>::to_vec);
        self.derive(items)
    }

    /// Interned tuple of the items in reverse order. `self` is untouched.
    pub fn reverse(&self) -> Tuple {
        let mut items = self.to_vec();
        items.reverse();
        self.derive(items)
    }

    /// Interned tuple of the items in default order. `self` is untouched.
    ///
    /// The default order compares string forms as UTF-16 code unit
    /// sequences, so `10` sorts before `9`; `Null` items go last. The sort
    /// is stable. Use [`Tuple::sort_by`] for any other order.
    pub fn sort(&self) -> Tuple {
        let mut items = self.to_vec();
        items.sort_by_cached_key(default_sort_key);
        self.derive(items)
    }

    /// Interned tuple of the items stably sorted by `compare`.
    pub fn sort_by(&self, compare: impl FnMut(&Item, &Item) -> Ordering) -> Tuple {
        let mut items = self.to_vec();
        items.sort_by(compare);
        self.derive(items)
    }

    /// Interned tuple of these items followed by `rest`.
    ///
    /// A tuple in `rest` contributes its items, not itself, so tuples
    /// concatenate element-wise:
    ///
    /// ```
    /// use tuple_intern::{tuple, Item};
    ///
    /// let t = tuple![1, 2, 3].concat([Item::from(4), tuple![5, 6].into(), 7.into()]);
    /// assert_eq!(t, tuple![1, 2, 3, 4, 5, 6, 7]);
    /// ```
    ///
    /// Only one level is flattened; a tuple nested inside `rest`'s tuples
    /// stays a single item.
    pub fn concat<I>(&self, rest: I) -> Tuple
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        let mut items = self.to_vec();
        for arg in rest {
            match arg.into() {
                Item::Tuple(t) => items.extend_from_slice(t.as_slice()),
                other => items.push(other),
            }
        }
        self.derive(items)
    }
}
