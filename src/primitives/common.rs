//! Small helpers shared by every primitive: arity checking and numeric coercion. Every primitive
//! below fails by producing a heap `Value::Error` through `Interpreter::fail` rather than by
//! returning `Result::Err`, matching the error-as-data propagation policy in the specification;
//! only allocation failure bubbles up as a genuine `Err`.

use crate::error::{ErrorKind, LispError};
use crate::heap::ValueRef;
use crate::interpreter::Interpreter;
use crate::value::{self, Value, SYM_FALSE, SYM_TRUE};

/// A number that remembers whether it started life as an `Integer`, so arithmetic primitives can
/// decide whether their result stays an integer or becomes a decimal.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Integer(i64),
    Decimal(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(n) => n as f64,
            Number::Decimal(n) => n,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Number::Integer(_))
    }
}

pub fn as_number(heap: &crate::heap::Heap, v: ValueRef) -> Option<Number> {
    if v.is_nil() {
        return None;
    }
    match heap.deref(v) {
        Value::Integer(n) => Some(Number::Integer(*n)),
        Value::Decimal(n) => Some(Number::Decimal(*n)),
        _ => None,
    }
}

pub fn check_arity(
    interp: &mut Interpreter,
    name: &str,
    args: &[ValueRef],
    expected: usize,
) -> Result<Option<ValueRef>, LispError> {
    if args.len() != expected {
        return Ok(Some(interp.fail(
            ErrorKind::ArityError,
            format!("{name}: expected {expected} argument(s), got {}", args.len()),
        )?));
    }
    Ok(None)
}

pub fn check_at_least(
    interp: &mut Interpreter,
    name: &str,
    args: &[ValueRef],
    min: usize,
) -> Result<Option<ValueRef>, LispError> {
    if args.len() < min {
        return Ok(Some(interp.fail(
            ErrorKind::ArityError,
            format!("{name}: expected at least {min} argument(s), got {}", args.len()),
        )?));
    }
    Ok(None)
}

pub fn type_error(interp: &mut Interpreter, name: &str, expected: &str) -> Result<ValueRef, LispError> {
    interp.fail(ErrorKind::TypeError, format!("{name}: expected {expected}"))
}

/// Coerces every element of `args` to a `Number`, or produces a `TypeError` value (not a Rust
/// `Err`) naming `name` as soon as one isn't numeric. The outer `Result` is reserved for the
/// allocation failure that building that error value could itself suffer.
pub fn numbers(
    interp: &mut Interpreter,
    name: &str,
    args: &[ValueRef],
) -> Result<Result<Vec<Number>, ValueRef>, LispError> {
    let mut out = Vec::with_capacity(args.len());
    for &a in args {
        match as_number(interp.heap(), a) {
            Some(n) => out.push(n),
            None => return Ok(Err(type_error(interp, name, "a number")?)),
        }
    }
    Ok(Ok(out))
}

/// Rebuilds a heap value from a `Number`, preserving whether it started life as an integer.
pub fn to_value(interp: &mut Interpreter, n: Number) -> Result<ValueRef, LispError> {
    match n {
        Number::Integer(v) => value::make_int(interp.heap_mut(), v),
        Number::Decimal(v) => value::make_decimal(interp.heap_mut(), v),
    }
}

pub fn bool_value(interp: &mut Interpreter, b: bool) -> Result<ValueRef, LispError> {
    value::make_symbol(interp.heap_mut(), if b { SYM_TRUE } else { SYM_FALSE })
}

pub fn is_true_symbol(heap: &crate::heap::Heap, v: ValueRef) -> bool {
    !v.is_nil() && matches!(heap.deref(v), Value::Symbol(s) if s == SYM_TRUE)
}

/// `macro_rules!` front door used by every primitive: bail out of the enclosing function with the
/// error value as soon as an arity check fails.
macro_rules! require_arity {
    ($interp:expr, $name:expr, $args:expr, $n:expr) => {
        if let Some(err) = crate::primitives::common::check_arity($interp, $name, $args, $n)? {
            return Ok(err);
        }
    };
}

macro_rules! require_at_least {
    ($interp:expr, $name:expr, $args:expr, $n:expr) => {
        if let Some(err) = crate::primitives::common::check_at_least($interp, $name, $args, $n)? {
            return Ok(err);
        }
    };
}

/// Coerces `args` to numbers via `numbers`, returning early with the error value on failure.
macro_rules! require_numbers {
    ($interp:expr, $name:expr, $args:expr) => {
        match crate::primitives::common::numbers($interp, $name, $args)? {
            Ok(v) => v,
            Err(e) => return Ok(e),
        }
    };
}

pub(crate) use require_arity;
pub(crate) use require_at_least;
pub(crate) use require_numbers;
