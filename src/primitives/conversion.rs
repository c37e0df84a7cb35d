//! `symbol->string` and `string->symbol`.

use super::common::require_arity;
use super::PrimitiveRegistry;
use crate::error::{ErrorKind, LispError};
use crate::heap::ValueRef;
use crate::interpreter::Interpreter;
use crate::value::{self, Value};

pub fn register(reg: &mut PrimitiveRegistry) {
    reg.add_primitive("symbol->string", symbol_to_string);
    reg.add_primitive("string->symbol", string_to_symbol);
}

fn symbol_to_string(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "symbol->string", args, 1);
    let text = match (!args[0].is_nil()).then(|| interp.heap().deref(args[0])) {
        Some(Value::Symbol(s)) => s.clone(),
        _ => {
            return interp.fail(ErrorKind::TypeError, "symbol->string: expected a symbol");
        }
    };
    value::make_string(interp.heap_mut(), &text)
}

fn string_to_symbol(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "string->symbol", args, 1);
    let text = match (!args[0].is_nil()).then(|| interp.heap().deref(args[0])) {
        Some(Value::String(s)) => s.clone(),
        _ => {
            return interp.fail(ErrorKind::TypeError, "string->symbol: expected a string");
        }
    };
    value::make_symbol(interp.heap_mut(), &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn interp() -> Interpreter {
        Interpreter::new(Config::default()).unwrap()
    }

    #[test]
    fn roundtrips_through_string_and_back() {
        let mut i = interp();
        let sym = value::make_symbol(i.heap_mut(), "foo").unwrap();
        let s = symbol_to_string(&mut i, &[sym]).unwrap();
        assert_eq!(i.heap().deref(s), &Value::String("foo".to_string()));
        let back = string_to_symbol(&mut i, &[s]).unwrap();
        assert_eq!(i.heap().deref(back), &Value::Symbol("foo".to_string()));
    }
}
