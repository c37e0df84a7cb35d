//! `< > =`, each exactly two arguments. `=` is lenient: a non-numeric operand makes it `#f` rather
//! than a `TypeError`, matching the reference implementation's `prim_comp_eq` contract; `<`/`>`
//! require numbers.

use super::common::{bool_value, require_arity, require_numbers};
use super::PrimitiveRegistry;
use crate::error::LispError;
use crate::heap::ValueRef;
use crate::interpreter::Interpreter;

pub fn register(reg: &mut PrimitiveRegistry) {
    reg.add_primitive("=", num_eq);
    reg.add_primitive("<", less);
    reg.add_primitive(">", more);
}

fn num_eq(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "=", args, 2);
    let a = super::common::as_number(interp.heap(), args[0]);
    let b = super::common::as_number(interp.heap(), args[1]);
    let result = matches!((a, b), (Some(a), Some(b)) if a.as_f64() == b.as_f64());
    bool_value(interp, result)
}

fn less(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "<", args, 2);
    let nums = require_numbers!(interp, "<", args);
    bool_value(interp, nums[0].as_f64() < nums[1].as_f64())
}

fn more(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, ">", args, 2);
    let nums = require_numbers!(interp, ">", args);
    bool_value(interp, nums[0].as_f64() > nums[1].as_f64())
}
