//! `number? real? integer? symbol? string? pair? procedure?`. `real?` is a plain alias of
//! `number?`, matching the reference implementation registering both names against the same
//! native function since this interpreter has no distinct exact/inexact tower.

use super::common::{bool_value, require_arity};
use super::PrimitiveRegistry;
use crate::error::LispError;
use crate::heap::ValueRef;
use crate::interpreter::Interpreter;
use crate::value::{self, Value, SYM_CLOSURE, SYM_PRIMITIVE};

pub fn register(reg: &mut PrimitiveRegistry) {
    reg.add_primitive("number?", is_number);
    reg.add_primitive("real?", is_number);
    reg.add_primitive("integer?", is_integer);
    reg.add_primitive("symbol?", is_symbol);
    reg.add_primitive("string?", is_string);
    reg.add_primitive("pair?", is_pair);
    reg.add_primitive("procedure?", is_procedure);
}

fn is_number(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "number?", args, 1);
    let result = super::common::as_number(interp.heap(), args[0]).is_some();
    bool_value(interp, result)
}

fn is_integer(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "integer?", args, 1);
    let result = !args[0].is_nil() && matches!(interp.heap().deref(args[0]), Value::Integer(_));
    bool_value(interp, result)
}

fn is_symbol(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "symbol?", args, 1);
    let result = !args[0].is_nil() && matches!(interp.heap().deref(args[0]), Value::Symbol(_));
    bool_value(interp, result)
}

fn is_string(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "string?", args, 1);
    let result = !args[0].is_nil() && matches!(interp.heap().deref(args[0]), Value::String(_));
    bool_value(interp, result)
}

fn is_pair(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "pair?", args, 1);
    let result = !args[0].is_nil() && matches!(interp.heap().deref(args[0]), Value::Pair(_, _));
    bool_value(interp, result)
}

fn is_procedure(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "procedure?", args, 1);
    let v = args[0];
    let result = !v.is_nil()
        && match interp.heap().deref(v) {
            Value::Primitive(_) => true,
            Value::Pair(car, _) => {
                let car = *car;
                tag_is(interp, car, SYM_CLOSURE) || tag_is(interp, car, SYM_PRIMITIVE)
            }
            _ => false,
        };
    bool_value(interp, result)
}

fn tag_is(interp: &Interpreter, v: ValueRef, tag: &str) -> bool {
    !v.is_nil() && matches!(interp.heap().deref(v), Value::Symbol(s) if s == tag)
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
    fn number_and_integer_predicates() {
        let mut i = interp();
        let n = value::make_int(i.heap_mut(), 1).unwrap();
        let d = value::make_decimal(i.heap_mut(), 1.5).unwrap();
        let v = is_number(&mut i, &[n]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Symbol("#t".to_string()));
        let v = is_integer(&mut i, &[n]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Symbol("#t".to_string()));
        let v = is_integer(&mut i, &[d]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Symbol("#f".to_string()));
    }

    #[test]
    fn pair_and_procedure_predicates() {
        let mut i = interp();
        let a = value::make_int(i.heap_mut(), 1).unwrap();
        let b = value::make_int(i.heap_mut(), 2).unwrap();
        let p = value::cons(i.heap_mut(), a, b).unwrap();
        let v = is_pair(&mut i, &[p]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Symbol("#t".to_string()));
        let v = is_pair(&mut i, &[a]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Symbol("#f".to_string()));
    }

    #[test]
    fn closures_are_procedures() {
        let mut i = interp();
        let closure = i.run_exp("(lambda (x) x)").unwrap();
        let v = is_procedure(&mut i, &[closure]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Symbol("#t".to_string()));
    }
}
