//! The lexical environment: a chain of frames, each an ordinary heap value.
//!
//! A frame is `Pair(bindings_alist, parent_frame_ref)`, where `bindings_alist` is itself a heap
//! list of `Pair(symbol_ref, value_ref)` nodes. There is no Rust-side table alongside the heap: GC
//! tracing through pairs is what keeps bindings (and the frames that hold them) alive, exactly as
//! closures capture their defining environment by reference rather than by snapshot.

use crate::error::LispError;
use crate::heap::{Heap, ValueRef};
use crate::value::{self, Value};

/// Builds the global environment: `cons(cons(NIL, NIL), NIL)`, matching the reference
/// implementation's `the_empty_environment` before any primitive or bootstrap binding exists.
pub fn new_global(heap: &mut Heap) -> Result<ValueRef, LispError> {
    let bindings = value::cons(heap, ValueRef::NIL, ValueRef::NIL)?;
    value::cons(heap, bindings, ValueRef::NIL)
}

fn symbol_text<'h>(heap: &'h Heap, v: ValueRef) -> Option<&'h str> {
    if v.is_nil() {
        return None;
    }
    match heap.deref(v) {
        Value::Symbol(s) => Some(s.as_str()),
        _ => None,
    }
}

fn frame_bindings(heap: &Heap, frame: ValueRef) -> ValueRef {
    match heap.deref(frame) {
        Value::Pair(bindings, _) => *bindings,
        _ => ValueRef::NIL,
    }
}

fn frame_parent(heap: &Heap, frame: ValueRef) -> ValueRef {
    match heap.deref(frame) {
        Value::Pair(_, parent) => *parent,
        _ => ValueRef::NIL,
    }
}

/// Finds the alist entry `Pair(symbol, value)` for `name` within a single frame's bindings,
/// without walking to the parent frame.
fn find_in_frame(heap: &Heap, frame: ValueRef, name: &str) -> Option<ValueRef> {
    let mut cur = frame_bindings(heap, frame);
    while !cur.is_nil() {
        let entry = match heap.deref(cur) {
            Value::Pair(entry, rest) => {
                let entry = *entry;
                cur = *rest;
                entry
            }
            _ => return None,
        };
        if let Value::Pair(sym, _) = heap.deref(entry) {
            if symbol_text(heap, *sym) == Some(name) {
                return Some(entry);
            }
        }
    }
    None
}

/// Creates a new frame whose bindings alist pairs `params` positionally with `args`, linked to
/// `parent`. Fails with `ArityError` if the counts differ.
pub fn extend(
    heap: &mut Heap,
    params: &[ValueRef],
    args: &[ValueRef],
    parent: ValueRef,
) -> Result<ValueRef, LispError> {
    if params.len() != args.len() {
        return Err(LispError::arity(
            "#<closure>",
            &params.len().to_string(),
            args.len(),
        ));
    }
    let mut bindings = ValueRef::NIL;
    for (p, a) in params.iter().zip(args.iter()).rev() {
        let entry = value::cons(heap, *p, *a)?;
        bindings = value::cons(heap, entry, bindings)?;
    }
    value::cons(heap, bindings, parent)
}

/// Looks up `name` starting at `env` and walking outward. The first frame containing a binding
/// for `name` wins.
pub fn lookup(heap: &Heap, name: &str, env: ValueRef) -> Result<ValueRef, LispError> {
    let mut frame = env;
    while !frame.is_nil() {
        if let Some(entry) = find_in_frame(heap, frame, name) {
            if let Value::Pair(_, value) = heap.deref(entry) {
                return Ok(*value);
            }
        }
        frame = frame_parent(heap, frame);
    }
    Err(LispError::unbound(name))
}

/// Installs `value` under `name` in the head frame of `env`, overwriting any existing binding
/// there (but never shadowing by walking outward).
pub fn define(heap: &mut Heap, name: &str, value: ValueRef, env: ValueRef) -> Result<(), LispError> {
    if let Some(entry) = find_in_frame(heap, env, name) {
        return value::set_cdr(heap, entry, value);
    }
    let sym = value::make_symbol(heap, name)?;
    let entry = value::cons(heap, sym, value)?;
    let bindings = frame_bindings(heap, env);
    let new_bindings = value::cons(heap, entry, bindings)?;
    value::set_car(heap, env, new_bindings)
}

/// Mutates the nearest existing binding for `name`, walking outward from `env`. Fails with
/// `UnboundVariable` if no frame binds it.
pub fn set(heap: &mut Heap, name: &str, value: ValueRef, env: ValueRef) -> Result<(), LispError> {
    let mut frame = env;
    while !frame.is_nil() {
        if let Some(entry) = find_in_frame(heap, frame, name) {
            return value::set_cdr(heap, entry, value);
        }
        frame = frame_parent(heap, frame);
    }
    Err(LispError::unbound(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Verbosity;

    fn heap() -> Heap {
        Heap::new(1 << 20, 1 << 20, Verbosity::Silent)
    }

    #[test]
    fn define_then_lookup_in_same_frame() {
        let mut h = heap();
        let env = new_global(&mut h).unwrap();
        let v = value::make_int(&mut h, 42).unwrap();
        define(&mut h, "x", v, env).unwrap();
        assert_eq!(lookup(&h, "x", env).unwrap(), v);
    }

    #[test]
    fn lookup_missing_is_unbound() {
        let mut h = heap();
        let env = new_global(&mut h).unwrap();
        let err = lookup(&h, "x", env).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::UnboundVariable);
    }

    #[test]
    fn inner_frame_shadows_outer() {
        let mut h = heap();
        let global = new_global(&mut h).unwrap();
        let outer = value::make_int(&mut h, 1).unwrap();
        define(&mut h, "x", outer, global).unwrap();

        let sym = value::make_symbol(&mut h, "x").unwrap();
        let inner_val = value::make_int(&mut h, 2).unwrap();
        let inner = extend(&mut h, &[sym], &[inner_val], global).unwrap();
        assert_eq!(lookup(&h, "x", inner).unwrap(), inner_val);
        assert_eq!(lookup(&h, "x", global).unwrap(), outer);
    }

    #[test]
    fn set_mutates_nearest_binding_and_fails_when_unbound() {
        let mut h = heap();
        let global = new_global(&mut h).unwrap();
        let err = set(&mut h, "y", ValueRef::NIL, global).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::UnboundVariable);

        let v1 = value::make_int(&mut h, 1).unwrap();
        define(&mut h, "y", v1, global).unwrap();
        let v2 = value::make_int(&mut h, 2).unwrap();
        set(&mut h, "y", v2, global).unwrap();
        assert_eq!(lookup(&h, "y", global).unwrap(), v2);
    }

    #[test]
    fn extend_rejects_arity_mismatch() {
        let mut h = heap();
        let global = new_global(&mut h).unwrap();
        let p = value::make_symbol(&mut h, "a").unwrap();
        let err = extend(&mut h, &[p], &[], global).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::ArityError);
    }
}
