//! Tuple elements.
//!
//! An [`Item`] is either a value type (compared by exact value, held strongly
//! by the intern trie) or a reference type (compared by identity, held weakly
//! by the intern trie):
//!
//! | Variant  | Kind      | Trie edge |
//! |----------|-----------|-----------|
//! | `Null`   | value     | strong    |
//! | `Bool`   | value     | strong    |
//! | `Int`    | value     | strong    |
//! | `Float`  | value     | strong    |
//! | `Str`    | value     | strong    |
//! | `Object` | reference | weak      |
//! | `Tuple`  | reference | weak      |
//!
//! `Item`'s `PartialEq`/`Hash` is the trie's edge equality: identity for
//! reference types, exact variant and value for value types, `NaN` equal to
//! itself and `+0.0` distinct from `-0.0`. Two sequences of pairwise-equal
//! items intern to the same tuple.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use tuple_brand::Branded;

use crate::stack::ensure_sufficient_stack;
use crate::tuple::{Tuple, TupleInner};

/// A host value that can be stored by reference inside a tuple.
///
/// Blanket-implemented for every `Branded + Send + Sync + Debug` type. Types
/// that don't implement [`Branded`] go through [`Obj::opaque`] instead.
pub trait Object: Branded + Any + Send + Sync + fmt::Debug {
    /// Upcast for downcasting in [`Obj::downcast_ref`].
    fn as_any(&self) -> &dyn Any;
}

impl<T: Branded + Any + Send + Sync + fmt::Debug> Object for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Wrapper giving arbitrary host values an (empty) brand.
struct Opaque<T>(T);

impl<T> Branded for Opaque<T> {}

impl<T: fmt::Debug> fmt::Debug for Opaque<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Shared handle to a host object. Equality is pointer identity.
///
/// Cloning an `Obj` clones the handle, not the object: both clones are the
/// same trie key.
#[derive(Clone)]
pub struct Obj(Arc<dyn Object>);

impl Obj {
    /// Allocate a new host object.
    pub fn new<T: Object>(value: T) -> Self {
        Obj(Arc::new(value))
    }

    /// Allocate a new host object for a type without a [`Branded`] impl.
    pub fn opaque<T: Any + Send + Sync + fmt::Debug>(value: T) -> Self {
        Obj(Arc::new(Opaque(value)))
    }

    /// Wrap an existing shared allocation, keeping its identity.
    pub fn from_arc(value: Arc<dyn Object>) -> Self {
        Obj(value)
    }

    /// Borrow the object as `T`, if it is one.
    ///
    /// Works for values created by both [`Obj::new`] and [`Obj::opaque`].
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        let any = (*self.0).as_any();
        any.downcast_ref::<T>()
            .or_else(|| any.downcast_ref::<Opaque<T>>().map(|opaque| &opaque.0))
    }

    /// True if both handles point at the same object.
    #[inline]
    pub fn ptr_eq(&self, other: &Obj) -> bool {
        self.addr() == other.addr()
    }

    #[inline]
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }

    pub(crate) fn downgrade(&self) -> Weak<dyn Object> {
        Arc::downgrade(&self.0)
    }
}

impl Branded for Obj {
    fn brand(&self) -> Option<&str> {
        (*self.0).brand()
    }
}

impl fmt::Debug for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl PartialEq for Obj {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Obj {}

impl Hash for Obj {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

/// One element of a tuple.
#[derive(Clone)]
pub enum Item {
    // Value types
    /// The absent value.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),

    // Reference types
    /// Host object, compared by identity.
    Object(Obj),
    /// Nested tuple. Interned, so identity is value equality.
    Tuple(Tuple),
}

impl Item {
    /// Create a string item.
    #[inline]
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Item::Str(s.into())
    }

    /// Create an object item.
    #[inline]
    pub fn object<T: Object>(value: T) -> Self {
        Item::Object(Obj::new(value))
    }

    /// True for items compared by identity and held weakly by the trie.
    #[inline]
    pub fn is_reference(&self) -> bool {
        matches!(self, Item::Object(_) | Item::Tuple(_))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Item::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Item::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Item::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Item::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Item::Str(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Obj> {
        match self {
            Item::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&Tuple> {
        match self {
            Item::Tuple(t) => Some(t),
            _ => None,
        }
    }

    /// Name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Item::Null => "null",
            Item::Bool(_) => "bool",
            Item::Int(_) => "int",
            Item::Float(_) => "float",
            Item::Str(_) => "str",
            Item::Object(_) => "object",
            Item::Tuple(_) => "tuple",
        }
    }

    /// Strict equality, as used by `index_of` and `last_index_of`.
    ///
    /// Like `==` except that `NaN` equals nothing (itself included) and
    /// `+0.0` equals `-0.0`.
    pub fn strict_eq(&self, other: &Item) -> bool {
        match (self, other) {
            (Item::Float(a), Item::Float(b)) => a == b,
            _ => self == other,
        }
    }

    /// Same-value-zero equality, as used by `includes`.
    ///
    /// Like `==` except that `+0.0` equals `-0.0`.
    pub fn same_value_zero(&self, other: &Item) -> bool {
        match (self, other) {
            (Item::Float(a), Item::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => self == other,
        }
    }

    /// Identity address of a reference-type item.
    #[inline]
    pub(crate) fn ref_addr(&self) -> Option<usize> {
        match self {
            Item::Object(obj) => Some(obj.addr()),
            Item::Tuple(t) => Some(t.addr()),
            _ => None,
        }
    }

    /// Strong-store key of a value-type item.
    pub(crate) fn value_key(&self) -> Option<ValueKey> {
        match self.edge_key() {
            EdgeKey::Strong(key) => Some(key),
            EdgeKey::Weak { .. } => None,
        }
    }

    /// How the trie stores an edge labelled with this item.
    pub(crate) fn edge_key(&self) -> EdgeKey {
        match self {
            Item::Null => EdgeKey::Strong(ValueKey::Null),
            Item::Bool(b) => EdgeKey::Strong(ValueKey::Bool(*b)),
            Item::Int(n) => EdgeKey::Strong(ValueKey::Int(*n)),
            Item::Float(n) => EdgeKey::Strong(ValueKey::Float(float_bits(*n))),
            Item::Str(s) => EdgeKey::Strong(ValueKey::Str(Arc::clone(s))),
            Item::Object(obj) => EdgeKey::Weak {
                addr: obj.addr(),
                handle: WeakRef::Object(obj.downgrade()),
            },
            Item::Tuple(t) => EdgeKey::Weak {
                addr: t.addr(),
                handle: WeakRef::Tuple(t.downgrade()),
            },
        }
    }
}

/// Bit pattern used for float identity: every `NaN` collapses to one key,
/// while `+0.0` and `-0.0` keep distinct keys.
#[inline]
fn float_bits(n: f64) -> u64 {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else {
        n.to_bits()
    }
}

/// Hashable key for value-type items.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(Arc<str>),
}

/// Trie edge classification of an item.
pub(crate) enum EdgeKey {
    /// Reference type: identity address plus a liveness handle.
    Weak { addr: usize, handle: WeakRef },
    /// Value type: compared by value, held strongly.
    Strong(ValueKey),
}

/// Weak handle to a reference-type item.
///
/// The handle keeps the allocation (not the value) alive, so the address it
/// was keyed under cannot be handed to another object while it exists.
pub(crate) enum WeakRef {
    Object(Weak<dyn Object>),
    Tuple(Weak<TupleInner>),
}

impl WeakRef {
    #[inline]
    pub(crate) fn is_alive(&self) -> bool {
        match self {
            WeakRef::Object(w) => w.strong_count() > 0,
            WeakRef::Tuple(w) => w.strong_count() > 0,
        }
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Item::Null, Item::Null) => true,
            (Item::Bool(a), Item::Bool(b)) => a == b,
            (Item::Int(a), Item::Int(b)) => a == b,
            (Item::Float(a), Item::Float(b)) => float_bits(*a) == float_bits(*b),
            (Item::Str(a), Item::Str(b)) => a == b,
            (Item::Object(a), Item::Object(b)) => a.ptr_eq(b),
            (Item::Tuple(a), Item::Tuple(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);

        match self {
            Item::Null => {}
            Item::Bool(b) => b.hash(state),
            Item::Int(n) => n.hash(state),
            Item::Float(n) => float_bits(*n).hash(state),
            Item::Str(s) => s.hash(state),
            Item::Object(obj) => obj.addr().hash(state),
            Item::Tuple(t) => t.addr().hash(state),
        }
    }
}

impl Branded for Item {
    fn brand(&self) -> Option<&str> {
        match self {
            Item::Tuple(t) => t.brand(),
            Item::Object(obj) => obj.brand(),
            _ => None,
        }
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Null => write!(f, "Null"),
            Item::Bool(b) => write!(f, "Bool({b})"),
            Item::Int(n) => write!(f, "Int({n})"),
            Item::Float(n) => write!(f, "Float({n:?})"),
            Item::Str(s) => write!(f, "Str({:?})", &**s),
            Item::Object(obj) => write!(f, "Object({obj:?})"),
            Item::Tuple(t) => ensure_sufficient_stack(|| fmt::Debug::fmt(t, f)),
        }
    }
}

/// String form of an item.
///
/// Floats print without a trailing `.0` when integral, `-0.0` prints as `0`,
/// and non-finite floats print as `NaN`, `Infinity` and `-Infinity`. A nested
/// tuple prints as its comma-joined items.
impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Null => write!(f, "null"),
            Item::Bool(b) => write!(f, "{b}"),
            Item::Int(n) => write!(f, "{n}"),
            Item::Float(n) => fmt_float(*n, f),
            Item::Str(s) => f.write_str(s),
            Item::Object(obj) => fmt_object(obj, f),
            Item::Tuple(t) => ensure_sufficient_stack(|| fmt::Display::fmt(t, f)),
        }
    }
}

/// Host objects render through their `Debug` impl. One that fails falls
/// back to a fixed placeholder, so rendering a tuple never fails halfway.
fn fmt_object(obj: &Obj, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut rendered = String::new();
    match fmt::Write::write_fmt(&mut rendered, format_args!("{obj:?}")) {
        Ok(()) => f.write_str(&rendered),
        Err(fmt::Error) => f.write_str(OBJECT_PLACEHOLDER),
    }
}

const OBJECT_PLACEHOLDER: &str = "[object Object]";

/// Plain decimal inside `[1e-6, 1e21)`, exponent form with an explicit sign
/// outside it (`1e+21`, `1.5e-7`).
fn fmt_float(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        return f.write_str("NaN");
    }
    if n.is_infinite() {
        return f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if n == 0.0 {
        return f.write_str("0");
    }

    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return write!(f, "{n}");
    }
    let exp = format!("{n:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => write!(f, "{mantissa}e+{power}"),
        _ => f.write_str(&exp),
    }
}

// Conversions

macro_rules! item_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Item {
            #[inline]
            fn from(n: $ty) -> Self {
                Item::Int(i64::from(n))
            }
        })*
    };
}

item_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Item {
    #[inline]
    fn from(n: f64) -> Self {
        Item::Float(n)
    }
}

impl From<f32> for Item {
    #[inline]
    fn from(n: f32) -> Self {
        Item::Float(f64::from(n))
    }
}

impl From<bool> for Item {
    #[inline]
    fn from(b: bool) -> Self {
        Item::Bool(b)
    }
}

impl From<()> for Item {
    #[inline]
    fn from((): ()) -> Self {
        Item::Null
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item::Str(Arc::from(s))
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Item::Str(Arc::from(s))
    }
}

impl From<Arc<str>> for Item {
    fn from(s: Arc<str>) -> Self {
        Item::Str(s)
    }
}

impl From<Obj> for Item {
    fn from(obj: Obj) -> Self {
        Item::Object(obj)
    }
}

impl From<&Obj> for Item {
    fn from(obj: &Obj) -> Self {
        Item::Object(obj.clone())
    }
}

impl From<Tuple> for Item {
    fn from(t: Tuple) -> Self {
        Item::Tuple(t)
    }
}

impl From<&Tuple> for Item {
    fn from(t: &Tuple) -> Self {
        Item::Tuple(t.clone())
    }
}

impl From<&Item> for Item {
    fn from(item: &Item) -> Self {
        item.clone()
    }
}

impl<T: Into<Item>> From<Option<T>> for Item {
    fn from(value: Option<T>) -> Self {
        value.map_or(Item::Null, Into::into)
    }
}
