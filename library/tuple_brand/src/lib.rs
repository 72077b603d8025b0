//! Brand marker shared by every copy of the tuple interner.
//!
//! A build can link more than one copy of `tuple_intern` (two
//! semver-incompatible versions pulled in by different dependencies, for
//! example). Each copy has its own `Tuple` type, so `TypeId` checks and
//! downcasts cannot recognise a tuple made by another copy. What the copies
//! do share is this crate: every tuple carries [`TUPLE_BRAND`] in a hidden
//! field and reports it through [`Branded`], and [`is_tuple`] compares the
//! reported brand by value.
//!
//! Keep this crate tiny and its API frozen. Any change to the shape of
//! [`Branded`] splits the build back into mutually blind copies.

use std::rc::Rc;
use std::sync::Arc;

/// Namespaced sentinel stored on every tuple instance.
pub const TUPLE_BRAND: &str = "immutable-tuple";

/// A value that may carry a brand marker.
///
/// Only tuples return `Some`. Host objects stored inside tuples implement
/// this with the default (unbranded) body.
pub trait Branded {
    /// The brand this value carries, if any.
    fn brand(&self) -> Option<&str> {
        None
    }
}

/// True iff `value` carries the shared tuple brand.
///
/// `None` (the absent value) is never a tuple.
///
/// ```
/// use tuple_brand::{is_tuple, Branded, TUPLE_BRAND};
///
/// struct Foreign;
/// impl Branded for Foreign {
///     fn brand(&self) -> Option<&str> {
///         Some(TUPLE_BRAND)
///     }
/// }
///
/// assert!(is_tuple(&Foreign));
/// assert!(!is_tuple(&None::<Foreign>));
/// ```
#[inline]
pub fn is_tuple<T: Branded + ?Sized>(value: &T) -> bool {
    value.brand() == Some(TUPLE_BRAND)
}

impl<T: Branded> Branded for Option<T> {
    fn brand(&self) -> Option<&str> {
        self.as_ref().and_then(Branded::brand)
    }
}

impl<T: Branded + ?Sized> Branded for &T {
    fn brand(&self) -> Option<&str> {
        (**self).brand()
    }
}

impl<T: Branded + ?Sized> Branded for Box<T> {
    fn brand(&self) -> Option<&str> {
        (**self).brand()
    }
}

impl<T: Branded + ?Sized> Branded for Rc<T> {
    fn brand(&self) -> Option<&str> {
        (**self).brand()
    }
}

impl<T: Branded + ?Sized> Branded for Arc<T> {
    fn brand(&self) -> Option<&str> {
        (**self).brand()
    }
}

// Plain data never carries a brand.
macro_rules! unbranded {
    ($($ty:ty),* $(,)?) => {
        $(impl Branded for $ty {})*
    };
}

unbranded!(
    (), bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    str, String,
);
