//! `+ - * /`, variadic and grounded in the reference implementation's contract rather than its
//! (buggy) mixed-type branching: integer result iff every input is integer and the result is
//! integer-valued, decimal otherwise.

use super::common::{require_numbers, Number};
use super::PrimitiveRegistry;
use crate::error::{ErrorKind, LispError};
use crate::heap::ValueRef;
use crate::interpreter::Interpreter;
use crate::value;

pub fn register(reg: &mut PrimitiveRegistry) {
    reg.add_primitive("+", add);
    reg.add_primitive("-", sub);
    reg.add_primitive("*", mul);
    reg.add_primitive("/", div);
}

fn as_int(n: Number) -> i64 {
    match n {
        Number::Integer(v) => v,
        Number::Decimal(_) => unreachable!("caller already checked is_integer"),
    }
}

fn add(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    let nums = require_numbers!(interp, "+", args);
    if nums.iter().all(|n| n.is_integer()) {
        value::make_int(interp.heap_mut(), nums.iter().copied().map(as_int).sum())
    } else {
        value::make_decimal(interp.heap_mut(), nums.iter().map(|n| n.as_f64()).sum())
    }
}

fn mul(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    let nums = require_numbers!(interp, "*", args);
    if nums.iter().all(|n| n.is_integer()) {
        value::make_int(interp.heap_mut(), nums.iter().copied().map(as_int).product())
    } else {
        value::make_decimal(interp.heap_mut(), nums.iter().map(|n| n.as_f64()).product())
    }
}

fn sub(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    let nums = require_numbers!(interp, "-", args);
    if nums.is_empty() {
        return interp.fail(ErrorKind::ArityError, "-: expected at least 1 argument, got 0");
    }
    if nums.iter().all(|n| n.is_integer()) {
        let ints: Vec<i64> = nums.into_iter().map(as_int).collect();
        let result = if ints.len() == 1 {
            -ints[0]
        } else {
            ints[0] - ints[1..].iter().sum::<i64>()
        };
        value::make_int(interp.heap_mut(), result)
    } else {
        let floats: Vec<f64> = nums.iter().map(|n| n.as_f64()).collect();
        let result = if floats.len() == 1 {
            -floats[0]
        } else {
            floats[0] - floats[1..].iter().sum::<f64>()
        };
        value::make_decimal(interp.heap_mut(), result)
    }
}

fn div(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    let nums = require_numbers!(interp, "/", args);
    if nums.is_empty() {
        return interp.fail(ErrorKind::ArityError, "/: expected at least 1 argument, got 0");
    }
    let all_integer = nums.iter().all(|n| n.is_integer());
    let floats: Vec<f64> = nums.iter().map(|n| n.as_f64()).collect();

    if floats.len() == 1 {
        if floats[0] == 0.0 {
            return interp.fail(ErrorKind::ArithmeticError, "/: division by zero");
        }
        return finish_div(interp, 1.0 / floats[0], all_integer);
    }

    let mut acc = floats[0];
    for &f in &floats[1..] {
        if f == 0.0 {
            return interp.fail(ErrorKind::ArithmeticError, "/: division by zero");
        }
        acc /= f;
    }
    finish_div(interp, acc, all_integer)
}

fn finish_div(interp: &mut Interpreter, result: f64, all_integer: bool) -> Result<ValueRef, LispError> {
    if all_integer && result.fract() == 0.0 {
        value::make_int(interp.heap_mut(), result as i64)
    } else {
        value::make_decimal(interp.heap_mut(), result)
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
    fn add_stays_integer_when_all_inputs_are() {
        let mut i = interp();
        let args: Vec<ValueRef> = [1, 2, 3]
            .iter()
            .map(|n| value::make_int(i.heap_mut(), *n).unwrap())
            .collect();
        let v = add(&mut i, &args).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Integer(6));
    }

    #[test]
    fn div_exact_stays_integer_inexact_becomes_decimal() {
        let mut i = interp();
        let ten = value::make_int(i.heap_mut(), 10).unwrap();
        let two = value::make_int(i.heap_mut(), 2).unwrap();
        let four = value::make_int(i.heap_mut(), 4).unwrap();
        let v = div(&mut i, &[ten, two]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Integer(5));
        let v = div(&mut i, &[ten, four]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Decimal(2.5));
    }

    #[test]
    fn div_by_zero_is_arithmetic_error() {
        let mut i = interp();
        let one = value::make_int(i.heap_mut(), 1).unwrap();
        let zero = value::make_int(i.heap_mut(), 0).unwrap();
        let v = div(&mut i, &[one, zero]).unwrap();
        match i.heap().deref(v) {
            Value::Error(kind, _) => assert_eq!(*kind, ErrorKind::ArithmeticError),
            other => panic!("expected an error value, got {other:?}"),
        }
    }

    #[test]
    fn sub_with_one_arg_negates() {
        let mut i = interp();
        let five = value::make_int(i.heap_mut(), 5).unwrap();
        let v = sub(&mut i, &[five]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Integer(-5));
    }
}
