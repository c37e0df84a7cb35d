//! The tagged value model.
//!
//! `Value` is a plain sum type, never a runtime-typed field union: every variant the evaluator
//! can observe is a distinct enum arm. Closures and primitive-procedure objects are not separate
//! variants — per the data model, they are ordinary `Pair` structures tagged with the symbols
//! `"closure"` and `"primitive"` respectively, exactly as this interpreter's ancestor represents
//! them. `Value::Primitive` is the raw function handle a `("primitive" <fn-handle>)` pair wraps,
//! not the callable value itself.

use crate::heap::{Heap, ValueRef};

pub type PrimitiveId = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Decimal(f64),
    Symbol(String),
    String(String),
    Pair(ValueRef, ValueRef),
    Primitive(PrimitiveId),
    Error(crate::error::ErrorKind, String),
}

pub const SYM_TRUE: &str = "#t";
pub const SYM_FALSE: &str = "#f";
pub const SYM_CLOSURE: &str = "closure";
pub const SYM_PRIMITIVE: &str = "primitive";

pub fn make_int(heap: &mut Heap, n: i64) -> Result<ValueRef, crate::error::LispError> {
    heap.alloc(Value::Integer(n))
}

pub fn make_decimal(heap: &mut Heap, n: f64) -> Result<ValueRef, crate::error::LispError> {
    heap.alloc(Value::Decimal(n))
}

/// Allocates a fresh symbol cell. Symbols are never interned: two calls with the same name
/// produce two distinct cells, and equality between symbols is always by string comparison, never
/// by `ValueRef` identity.
pub fn make_symbol(heap: &mut Heap, name: &str) -> Result<ValueRef, crate::error::LispError> {
    heap.alloc(Value::Symbol(name.to_string()))
}

pub fn make_string(heap: &mut Heap, s: &str) -> Result<ValueRef, crate::error::LispError> {
    heap.alloc(Value::String(s.to_string()))
}

pub fn make_primitive(heap: &mut Heap, id: PrimitiveId) -> Result<ValueRef, crate::error::LispError> {
    heap.alloc(Value::Primitive(id))
}

pub fn make_error(
    heap: &mut Heap,
    kind: crate::error::ErrorKind,
    message: impl Into<String>,
) -> Result<ValueRef, crate::error::LispError> {
    heap.alloc(Value::Error(kind, message.into()))
}

pub fn cons(heap: &mut Heap, a: ValueRef, b: ValueRef) -> Result<ValueRef, crate::error::LispError> {
    heap.alloc(Value::Pair(a, b))
}

pub fn car(heap: &Heap, v: ValueRef) -> Result<ValueRef, crate::error::LispError> {
    match (!v.is_nil()).then(|| heap.deref(v)) {
        Some(Value::Pair(a, _)) => Ok(*a),
        Some(other) => Err(crate::error::LispError::type_error("car", "pair", type_name(other))),
        None => Err(crate::error::LispError::type_error("car", "pair", "the empty list")),
    }
}

pub fn cdr(heap: &Heap, v: ValueRef) -> Result<ValueRef, crate::error::LispError> {
    match (!v.is_nil()).then(|| heap.deref(v)) {
        Some(Value::Pair(_, b)) => Ok(*b),
        Some(other) => Err(crate::error::LispError::type_error("cdr", "pair", type_name(other))),
        None => Err(crate::error::LispError::type_error("cdr", "pair", "the empty list")),
    }
}

pub fn set_car(heap: &mut Heap, pair: ValueRef, new_car: ValueRef) -> Result<(), crate::error::LispError> {
    if pair.is_nil() {
        return Err(crate::error::LispError::type_error("set-car!", "pair", "the empty list"));
    }
    match heap.deref_mut(pair) {
        Value::Pair(a, _) => {
            *a = new_car;
            Ok(())
        }
        other => Err(crate::error::LispError::type_error(
            "set-car!",
            "pair",
            type_name(other),
        )),
    }
}

pub fn set_cdr(heap: &mut Heap, pair: ValueRef, new_cdr: ValueRef) -> Result<(), crate::error::LispError> {
    if pair.is_nil() {
        return Err(crate::error::LispError::type_error("set-cdr!", "pair", "the empty list"));
    }
    match heap.deref_mut(pair) {
        Value::Pair(_, b) => {
            *b = new_cdr;
            Ok(())
        }
        other => Err(crate::error::LispError::type_error(
            "set-cdr!",
            "pair",
            type_name(other),
        )),
    }
}

/// Walks a proper list counting its elements; fails with `TypeError` if the final cdr is not the
/// empty list.
pub fn length(heap: &Heap, list: ValueRef) -> Result<usize, crate::error::LispError> {
    let mut n = 0usize;
    let mut cur = list;
    while !cur.is_nil() {
        match heap.deref(cur) {
            Value::Pair(_, rest) => {
                n += 1;
                cur = *rest;
            }
            _ => return Err(crate::error::LispError::type_error("length", "proper list", "improper list")),
        }
    }
    Ok(n)
}

/// Collects a proper list into a `Vec` of its elements, left to right.
pub fn list_to_vec(heap: &Heap, list: ValueRef) -> Result<Vec<ValueRef>, crate::error::LispError> {
    let mut out = Vec::new();
    let mut cur = list;
    while !cur.is_nil() {
        match heap.deref(cur) {
            Value::Pair(a, rest) => {
                out.push(*a);
                cur = *rest;
            }
            _ => return Err(crate::error::LispError::type_error("list", "proper list", "improper list")),
        }
    }
    Ok(out)
}

/// Builds a proper list from `items`, right to left, so the result preserves `items`' order.
pub fn vec_to_list(heap: &mut Heap, items: &[ValueRef]) -> Result<ValueRef, crate::error::LispError> {
    let mut list = ValueRef::NIL;
    for item in items.iter().rev() {
        list = cons(heap, *item, list)?;
    }
    Ok(list)
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Integer(_) => "integer",
        Value::Decimal(_) => "decimal",
        Value::Symbol(_) => "symbol",
        Value::String(_) => "string",
        Value::Pair(_, _) => "pair",
        Value::Primitive(_) => "primitive",
        Value::Error(_, _) => "error",
    }
}

/// Structural equality for atoms; reference equality for pairs (two distinct pairs with equal
/// contents are not `eq?`). Cross-type comparisons are always false.
pub fn is_equal(heap: &Heap, a: ValueRef, b: ValueRef) -> bool {
    if a.is_nil() || b.is_nil() {
        return a.is_nil() && b.is_nil();
    }
    if a == b {
        return true;
    }
    match (heap.deref(a), heap.deref(b)) {
        (Value::Integer(x), Value::Integer(y)) => x == y,
        (Value::Decimal(x), Value::Decimal(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Error(k1, m1), Value::Error(k2, m2)) => k1 == k2 && m1 == m2,
        (Value::Pair(_, _), Value::Pair(_, _)) => false,
        _ => false,
    }
}

pub fn is_false(heap: &Heap, v: ValueRef) -> bool {
    !v.is_nil() && matches!(heap.deref(v), Value::Symbol(s) if s == SYM_FALSE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Verbosity;

    fn heap() -> Heap {
        Heap::new(1 << 20, 1 << 20, Verbosity::Silent)
    }

    #[test]
    fn cons_car_cdr_roundtrip() {
        let mut h = heap();
        let a = make_int(&mut h, 1).unwrap();
        let b = make_int(&mut h, 2).unwrap();
        let p = cons(&mut h, a, b).unwrap();
        assert_eq!(car(&h, p).unwrap(), a);
        assert_eq!(cdr(&h, p).unwrap(), b);
    }

    #[test]
    fn car_of_non_pair_is_type_error() {
        let mut h = heap();
        let n = make_int(&mut h, 1).unwrap();
        let err = car(&h, n).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::TypeError);
    }

    #[test]
    fn length_counts_proper_list_and_rejects_improper() {
        let mut h = heap();
        let a = make_int(&mut h, 1).unwrap();
        let b = make_int(&mut h, 2).unwrap();
        let c = make_int(&mut h, 3).unwrap();
        let proper = vec_to_list(&mut h, &[a, b, c]).unwrap();
        assert_eq!(length(&h, proper).unwrap(), 3);

        let improper = cons(&mut h, a, b).unwrap();
        assert!(length(&h, improper).is_err());
    }

    #[test]
    fn eq_is_structural_for_atoms_and_identity_for_pairs() {
        let mut h = heap();
        let s1 = make_symbol(&mut h, "x").unwrap();
        let s2 = make_symbol(&mut h, "x").unwrap();
        assert!(s1 != s2);
        assert!(is_equal(&h, s1, s2));

        let a = make_int(&mut h, 1).unwrap();
        let b = make_int(&mut h, 2).unwrap();
        let p1 = cons(&mut h, a, b).unwrap();
        let p2 = cons(&mut h, a, b).unwrap();
        assert!(!is_equal(&h, p1, p2));
        assert!(is_equal(&h, p1, p1));
    }

    #[test]
    fn is_false_only_for_hash_f_symbol() {
        let mut h = heap();
        let f = make_symbol(&mut h, "#f").unwrap();
        let t = make_symbol(&mut h, "#t").unwrap();
        assert!(is_false(&h, f));
        assert!(!is_false(&h, t));
        assert!(!is_false(&h, ValueRef::NIL));
    }
}
