//! `and or not` — the naive, non-short-circuiting variants: every argument is already evaluated by
//! the time a primitive sees it, so there is nothing left to short-circuit. `or` looks for an
//! argument that is literally the symbol `#t`; `and` looks for one that is literally `#f`; neither
//! returns the value of the last argument the way a short-circuiting `and`/`or` special form would.

use super::common::{bool_value, is_true_symbol, require_arity};
use super::PrimitiveRegistry;
use crate::error::LispError;
use crate::heap::ValueRef;
use crate::interpreter::Interpreter;
use crate::value;

pub fn register(reg: &mut PrimitiveRegistry) {
    reg.add_primitive("and", and_prim);
    reg.add_primitive("or", or_prim);
    reg.add_primitive("not", not_prim);
}

fn or_prim(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    let hit = args.iter().any(|&a| is_true_symbol(interp.heap(), a));
    bool_value(interp, hit)
}

fn and_prim(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    let hit = args.iter().any(|&a| value::is_false(interp.heap(), a));
    bool_value(interp, !hit)
}

fn not_prim(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "not", args, 1);
    let is_false = value::is_false(interp.heap(), args[0]);
    bool_value(interp, is_false)
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
    fn or_is_true_only_when_an_arg_is_exactly_hash_t() {
        let mut i = interp();
        let f = value::make_symbol(i.heap_mut(), "#f").unwrap();
        let one = value::make_int(i.heap_mut(), 1).unwrap();
        let v = or_prim(&mut i, &[f, one]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Symbol("#f".to_string()));
    }

    #[test]
    fn and_is_false_when_any_arg_is_hash_f() {
        let mut i = interp();
        let t = value::make_symbol(i.heap_mut(), "#t").unwrap();
        let f = value::make_symbol(i.heap_mut(), "#f").unwrap();
        let v = and_prim(&mut i, &[t, f]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Symbol("#f".to_string()));
    }

    #[test]
    fn not_inverts_hash_f_only() {
        let mut i = interp();
        let f = value::make_symbol(i.heap_mut(), "#f").unwrap();
        let v = not_prim(&mut i, &[f]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Symbol("#t".to_string()));

        let one = value::make_int(i.heap_mut(), 1).unwrap();
        let v = not_prim(&mut i, &[one]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Symbol("#f".to_string()));
    }
}
