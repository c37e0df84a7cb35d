//! `car cdr cons list set-car! set-cdr!`. Thin wrappers over `value`'s pair accessors: the
//! accessor functions already carry the right `TypeError` contract, so these primitives only add
//! the arity check and convert the underlying `Result::Err` into a heap error value.

use super::common::require_arity;
use super::PrimitiveRegistry;
use crate::error::LispError;
use crate::heap::ValueRef;
use crate::interpreter::Interpreter;
use crate::value;

pub fn register(reg: &mut PrimitiveRegistry) {
    reg.add_primitive("car", car_prim);
    reg.add_primitive("cdr", cdr_prim);
    reg.add_primitive("cons", cons_prim);
    reg.add_primitive("list", list_prim);
    reg.add_primitive("set-car!", set_car_prim);
    reg.add_primitive("set-cdr!", set_cdr_prim);
}

fn as_value(interp: &mut Interpreter, result: Result<ValueRef, LispError>) -> Result<ValueRef, LispError> {
    match result {
        Ok(v) => Ok(v),
        Err(e) => interp.fail(e.kind, e.message),
    }
}

fn car_prim(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "car", args, 1);
    let result = value::car(interp.heap(), args[0]);
    as_value(interp, result)
}

fn cdr_prim(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "cdr", args, 1);
    let result = value::cdr(interp.heap(), args[0]);
    as_value(interp, result)
}

fn cons_prim(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "cons", args, 2);
    value::cons(interp.heap_mut(), args[0], args[1])
}

fn list_prim(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    value::vec_to_list(interp.heap_mut(), args)
}

fn set_car_prim(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "set-car!", args, 2);
    match value::set_car(interp.heap_mut(), args[0], args[1]) {
        Ok(()) => value::make_symbol(interp.heap_mut(), "ok"),
        Err(e) => interp.fail(e.kind, e.message),
    }
}

fn set_cdr_prim(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "set-cdr!", args, 2);
    match value::set_cdr(interp.heap_mut(), args[0], args[1]) {
        Ok(()) => value::make_symbol(interp.heap_mut(), "ok"),
        Err(e) => interp.fail(e.kind, e.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::value::Value;

    fn interp() -> Interpreter {
        Interpreter::new(Config::default()).unwrap()
    }

    #[test]
    fn cons_car_cdr_roundtrip() {
        let mut i = interp();
        let a = value::make_int(i.heap_mut(), 1).unwrap();
        let b = value::make_int(i.heap_mut(), 2).unwrap();
        let p = cons_prim(&mut i, &[a, b]).unwrap();
        assert_eq!(car_prim(&mut i, &[p]).unwrap(), a);
        assert_eq!(cdr_prim(&mut i, &[p]).unwrap(), b);
    }

    #[test]
    fn car_of_non_pair_is_type_error_value() {
        let mut i = interp();
        let n = value::make_int(i.heap_mut(), 1).unwrap();
        let v = car_prim(&mut i, &[n]).unwrap();
        match i.heap().deref(v) {
            Value::Error(kind, _) => assert_eq!(*kind, crate::error::ErrorKind::TypeError),
            other => panic!("expected an error value, got {other:?}"),
        }
    }

    #[test]
    fn set_car_mutates_the_pair_in_place() {
        let mut i = interp();
        let a = value::make_int(i.heap_mut(), 1).unwrap();
        let b = value::make_int(i.heap_mut(), 2).unwrap();
        let p = cons_prim(&mut i, &[a, b]).unwrap();
        let nine = value::make_int(i.heap_mut(), 9).unwrap();
        set_car_prim(&mut i, &[p, nine]).unwrap();
        assert_eq!(car_prim(&mut i, &[p]).unwrap(), nine);
    }

    #[test]
    fn list_builds_a_proper_list() {
        let mut i = interp();
        let a = value::make_int(i.heap_mut(), 1).unwrap();
        let b = value::make_int(i.heap_mut(), 2).unwrap();
        let l = list_prim(&mut i, &[a, b]).unwrap();
        assert_eq!(value::list_to_vec(i.heap(), l).unwrap(), vec![a, b]);
    }
}
