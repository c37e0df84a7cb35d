//! `floor ceiling truncate round max min`, grounded in the reference implementation's
//! `prim_floor`/`prim_ceiling`/`prim_trunc`/`prim_round` (all four always return an integer, even
//! when the input already was one) and in the specification's corrected `max`/`min` contract,
//! which seeds the running extreme from the first argument instead of the source's `imax = 0`.

use super::common::{require_arity, require_at_least, require_numbers, to_value, Number};
use super::PrimitiveRegistry;
use crate::error::LispError;
use crate::heap::ValueRef;
use crate::interpreter::Interpreter;
use crate::value;

pub fn register(reg: &mut PrimitiveRegistry) {
    reg.add_primitive("floor", floor_prim);
    reg.add_primitive("ceiling", ceiling_prim);
    reg.add_primitive("truncate", truncate_prim);
    reg.add_primitive("round", round_prim);
    reg.add_primitive("max", max_prim);
    reg.add_primitive("min", min_prim);
}

fn floor_prim(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "floor", args, 1);
    let nums = require_numbers!(interp, "floor", args);
    let n = match nums[0] {
        Number::Integer(v) => v,
        Number::Decimal(d) => d.floor() as i64,
    };
    value::make_int(interp.heap_mut(), n)
}

fn ceiling_prim(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "ceiling", args, 1);
    let nums = require_numbers!(interp, "ceiling", args);
    let n = match nums[0] {
        Number::Integer(v) => v,
        Number::Decimal(d) => d.ceil() as i64,
    };
    value::make_int(interp.heap_mut(), n)
}

fn truncate_prim(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "truncate", args, 1);
    let nums = require_numbers!(interp, "truncate", args);
    let n = match nums[0] {
        Number::Integer(v) => v,
        Number::Decimal(d) => d.trunc() as i64,
    };
    value::make_int(interp.heap_mut(), n)
}

/// Banker's rounding: ties round to the nearest even integer, matching `prim_round` exactly rather
/// than `f64::round`'s round-half-away-from-zero.
fn round_half_to_even(d: f64) -> i64 {
    let floor_val = d.floor();
    let frac = d - floor_val;
    let ipart = floor_val as i64;
    if frac < 0.5 {
        ipart
    } else if frac > 0.5 {
        ipart + 1
    } else if ipart % 2 != 0 {
        ipart + 1
    } else {
        ipart
    }
}

fn round_prim(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "round", args, 1);
    let nums = require_numbers!(interp, "round", args);
    let n = match nums[0] {
        Number::Integer(v) => v,
        Number::Decimal(d) => round_half_to_even(d),
    };
    value::make_int(interp.heap_mut(), n)
}

fn max_prim(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_at_least!(interp, "max", args, 1);
    let nums = require_numbers!(interp, "max", args);
    let mut best = nums[0];
    for &n in &nums[1..] {
        if n.as_f64() > best.as_f64() {
            best = n;
        }
    }
    to_value(interp, best)
}

fn min_prim(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_at_least!(interp, "min", args, 1);
    let nums = require_numbers!(interp, "min", args);
    let mut best = nums[0];
    for &n in &nums[1..] {
        if n.as_f64() < best.as_f64() {
            best = n;
        }
    }
    to_value(interp, best)
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
    fn round_uses_banker_rounding_at_exact_halves() {
        let mut i = interp();
        let two_five = value::make_decimal(i.heap_mut(), 2.5).unwrap();
        let v = round_prim(&mut i, &[two_five]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Integer(2));

        let three_five = value::make_decimal(i.heap_mut(), 3.5).unwrap();
        let v = round_prim(&mut i, &[three_five]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Integer(4));
    }

    #[test]
    fn floor_and_ceiling_always_return_integers() {
        let mut i = interp();
        let d = value::make_decimal(i.heap_mut(), 3.2).unwrap();
        let v = floor_prim(&mut i, &[d]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Integer(3));
        let d2 = value::make_decimal(i.heap_mut(), 3.2).unwrap();
        let v = ceiling_prim(&mut i, &[d2]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Integer(4));
    }

    #[test]
    fn max_seeds_from_first_element_not_zero() {
        let mut i = interp();
        let a = value::make_int(i.heap_mut(), -5).unwrap();
        let b = value::make_int(i.heap_mut(), -1).unwrap();
        let v = max_prim(&mut i, &[a, b]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Integer(-1));
    }

    #[test]
    fn min_seeds_from_first_element_not_zero() {
        let mut i = interp();
        let a = value::make_int(i.heap_mut(), -5).unwrap();
        let b = value::make_int(i.heap_mut(), -1).unwrap();
        let v = min_prim(&mut i, &[a, b]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Integer(-5));
    }
}
