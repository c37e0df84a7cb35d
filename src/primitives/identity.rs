//! `eq?` — structural equality for atoms, reference identity for pairs. Thin wrapper over
//! `value::is_equal`, which already implements this exact contract.

use super::common::{bool_value, require_arity};
use super::PrimitiveRegistry;
use crate::error::LispError;
use crate::heap::ValueRef;
use crate::interpreter::Interpreter;
use crate::value;

pub fn register(reg: &mut PrimitiveRegistry) {
    reg.add_primitive("eq?", eq_prim);
}

fn eq_prim(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "eq?", args, 2);
    let result = value::is_equal(interp.heap(), args[0], args[1]);
    bool_value(interp, result)
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
    fn eq_is_structural_for_symbols_and_identity_for_pairs() {
        let mut i = interp();
        let s1 = value::make_symbol(i.heap_mut(), "x").unwrap();
        let s2 = value::make_symbol(i.heap_mut(), "x").unwrap();
        let v = eq_prim(&mut i, &[s1, s2]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Symbol("#t".to_string()));

        let a = value::make_int(i.heap_mut(), 1).unwrap();
        let b = value::make_int(i.heap_mut(), 2).unwrap();
        let p1 = value::cons(i.heap_mut(), a, b).unwrap();
        let p2 = value::cons(i.heap_mut(), a, b).unwrap();
        let v = eq_prim(&mut i, &[p1, p2]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Symbol("#f".to_string()));
    }
}
