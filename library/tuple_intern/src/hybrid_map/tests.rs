use super::*;
use crate::item::Obj;
use crate::tuple;

#[test]
fn test_empty_map_allocates_nothing() {
    let map: HybridMap<u32> = HybridMap::new();
    assert!(map.weak.is_none());
    assert!(map.strong.is_none());
    assert!(map.is_empty());
    assert_eq!(map.get(&Item::Int(1)), None);
}

#[test]
fn test_value_keys() {
    let mut map = HybridMap::new();
    assert_eq!(*map.set(&Item::Int(1), "one"), "one");
    map.set(&Item::from("1"), "string one");
    map.set(&Item::Float(1.0), "float one");

    assert_eq!(map.get(&Item::Int(1)), Some(&"one"));
    assert_eq!(map.get(&Item::from("1")), Some(&"string one"));
    assert_eq!(map.get(&Item::Float(1.0)), Some(&"float one"));
    assert_eq!(map.get(&Item::Bool(true)), None);
    assert_eq!(map.strong_len(), 3);
    assert!(map.weak.is_none());
}

#[test]
fn test_set_replaces() {
    let mut map = HybridMap::new();
    map.set(&Item::Int(1), 10);
    map.set(&Item::Int(1), 11);
    assert_eq!(map.get(&Item::Int(1)), Some(&11));
    assert_eq!(map.len(), 1);

    let obj = Item::from(Obj::opaque("key"));
    map.set(&obj, 20);
    map.set(&obj, 21);
    assert_eq!(map.get(&obj), Some(&21));
    assert_eq!(map.weak_len(), 1);
}

#[test]
fn test_float_key_identity() {
    let mut map = HybridMap::new();
    map.set(&Item::Float(f64::NAN), "nan");
    map.set(&Item::Float(0.0), "zero");

    assert_eq!(map.get(&Item::Float(f64::NAN)), Some(&"nan"));
    assert_eq!(map.get(&Item::Float(-0.0)), None);
}

#[test]
fn test_reference_keys_by_identity() {
    let mut map = HybridMap::new();
    let a = Item::from(Obj::opaque(1));
    let b = Item::from(Obj::opaque(1));
    map.set(&a, "a");

    assert_eq!(map.get(&a), Some(&"a"));
    assert_eq!(map.get(&a.clone()), Some(&"a"));
    assert_eq!(map.get(&b), None);
    assert!(map.strong.is_none());
}

#[test]
fn test_dead_key_is_invisible_then_swept() {
    let mut map = HybridMap::new();
    let keep = Item::from(Obj::opaque("keep"));
    map.set(&keep, 1);
    map.set(&Item::Int(0), 0);
    {
        let temp = Item::from(Obj::opaque("temp"));
        map.set(&temp, 2);
        assert_eq!(map.get(&temp), Some(&2));
    }

    // The dead entry lingers until swept but no longer shows up.
    assert_eq!(map.weak_len(), 2);
    assert_eq!(map.values().count(), 2);

    assert_eq!(map.sweep(), 1);
    assert_eq!(map.weak_len(), 1);
    assert_eq!(map.get(&keep), Some(&1));
    assert_eq!(map.sweep(), 0);
}

#[test]
fn test_tuple_keys_are_weak() {
    let mut map = HybridMap::new();
    let registry = crate::Registry::isolated(crate::RegistryConfig::default());
    {
        let t = registry.tuple([Item::from(Obj::opaque("only here"))]);
        map.set(&Item::from(&t), "tuple");
        assert_eq!(map.get(&Item::from(&t)), Some(&"tuple"));
    }
    assert_eq!(map.sweep(), 1);
    assert!(map.is_empty());
}

#[test]
fn test_value_keys_never_swept() {
    let mut map = HybridMap::new();
    map.set(&Item::from("s"), ());
    map.set(&Item::Null, ());
    assert_eq!(map.sweep(), 0);
    assert_eq!(map.strong_len(), 2);
}

#[test]
fn test_take_values() {
    let mut map = HybridMap::new();
    let key = Item::from(tuple![1, 2]);
    map.set(&key, 1);
    map.set(&Item::Int(2), 2);

    let mut values = map.take_values();
    values.sort_unstable();
    assert_eq!(values, vec![1, 2]);
    assert!(map.is_empty());
}
