//! `set-config!` and `get-config` on the four tunables plus the read-only byte counter. Grounded
//! in the reference implementation's `prim_set_config`/`prim_get_config` pair, which dispatch on
//! the config name as a string rather than exposing a typed setter per tunable.

use super::common::require_arity;
use super::PrimitiveRegistry;
use crate::config::Verbosity;
use crate::error::{ErrorKind, LispError};
use crate::heap::ValueRef;
use crate::interpreter::Interpreter;
use crate::value::{self, Value};

const NAME_THREAD_TIMEOUT: &str = "thread_timeout";
const NAME_MEM_LIM_SOFT: &str = "mem_lim_soft";
const NAME_MEM_LIM_HARD: &str = "mem_lim_hard";
const NAME_MEM_VERBOSITY: &str = "mem_verbosity";
const NAME_N_BYTES_ALLOCATED: &str = "n_bytes_allocated";

pub fn register(reg: &mut PrimitiveRegistry) {
    reg.add_primitive("set-config!", set_config);
    reg.add_primitive("get-config", get_config);
}

fn config_name(interp: &Interpreter, v: ValueRef) -> Option<String> {
    if v.is_nil() {
        return None;
    }
    match interp.heap().deref(v) {
        Value::Symbol(s) | Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn as_usize(interp: &Interpreter, v: ValueRef) -> Option<usize> {
    if v.is_nil() {
        return None;
    }
    match interp.heap().deref(v) {
        Value::Integer(n) if *n >= 0 => Some(*n as usize),
        _ => None,
    }
}

fn as_u64(interp: &Interpreter, v: ValueRef) -> Option<u64> {
    if v.is_nil() {
        return None;
    }
    match interp.heap().deref(v) {
        Value::Integer(n) if *n >= 0 => Some(*n as u64),
        _ => None,
    }
}

/// `(set-config! name value)`. Returns the symbol `ok` on success, a `ConfigError` value on an
/// unknown name or a wrongly-typed value, and refuses `n_bytes_allocated` outright since that
/// tunable is read-only.
fn set_config(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "set-config!", args, 2);
    let Some(name) = config_name(interp, args[0]) else {
        return interp.fail(ErrorKind::ConfigError, "set-config!: name must be a symbol or string");
    };

    match name.as_str() {
        NAME_THREAD_TIMEOUT => match as_u64(interp, args[1]) {
            Some(ms) => {
                interp.config_mut().thread_timeout_ms = ms;
                value::make_symbol(interp.heap_mut(), "ok")
            }
            None => interp.fail(ErrorKind::ConfigError, "thread_timeout: expected a non-negative integer"),
        },
        NAME_MEM_LIM_SOFT => match as_usize(interp, args[1]) {
            Some(n) => {
                interp.heap_mut().set_mem_lim_soft(n);
                interp.config_mut().mem_lim_soft = n;
                value::make_symbol(interp.heap_mut(), "ok")
            }
            None => interp.fail(ErrorKind::ConfigError, "mem_lim_soft: expected a non-negative integer"),
        },
        NAME_MEM_LIM_HARD => match as_usize(interp, args[1]) {
            Some(n) => {
                interp.heap_mut().set_mem_lim_hard(n);
                interp.config_mut().mem_lim_hard = n;
                value::make_symbol(interp.heap_mut(), "ok")
            }
            None => interp.fail(ErrorKind::ConfigError, "mem_lim_hard: expected a non-negative integer"),
        },
        NAME_MEM_VERBOSITY => {
            let text = config_name(interp, args[1]);
            let parsed = text.as_deref().and_then(Verbosity::parse);
            match parsed {
                Some(v) => {
                    interp.heap_mut().set_verbosity(v);
                    interp.config_mut().mem_verbosity = v;
                    value::make_symbol(interp.heap_mut(), "ok")
                }
                None => interp.fail(
                    ErrorKind::ConfigError,
                    "mem_verbosity: expected one of silent, normal, verbose",
                ),
            }
        }
        NAME_N_BYTES_ALLOCATED => {
            interp.fail(ErrorKind::ConfigError, "n_bytes_allocated: read-only")
        }
        other => interp.fail(ErrorKind::ConfigError, format!("unknown config name: {other}")),
    }
}

/// `(get-config name)`. Numeric tunables come back as integers, `mem_verbosity` as a symbol, and
/// an unknown name produces a `ConfigError` value rather than panicking.
fn get_config(interp: &mut Interpreter, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    require_arity!(interp, "get-config", args, 1);
    let Some(name) = config_name(interp, args[0]) else {
        return interp.fail(ErrorKind::ConfigError, "get-config: name must be a symbol or string");
    };

    match name.as_str() {
        NAME_THREAD_TIMEOUT => value::make_int(interp.heap_mut(), interp.config().thread_timeout_ms as i64),
        NAME_MEM_LIM_SOFT => value::make_int(interp.heap_mut(), interp.config().mem_lim_soft as i64),
        NAME_MEM_LIM_HARD => value::make_int(interp.heap_mut(), interp.config().mem_lim_hard as i64),
        NAME_MEM_VERBOSITY => {
            let text = match interp.config().mem_verbosity {
                Verbosity::Silent => "silent",
                Verbosity::Normal => "normal",
                Verbosity::Verbose => "verbose",
            };
            value::make_symbol(interp.heap_mut(), text)
        }
        NAME_N_BYTES_ALLOCATED => value::make_int(interp.heap_mut(), interp.heap().n_bytes_allocated() as i64),
        other => interp.fail(ErrorKind::ConfigError, format!("unknown config name: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn interp() -> Interpreter {
        Interpreter::new(Config::default()).unwrap()
    }

    #[test]
    fn set_then_get_thread_timeout() {
        let mut i = interp();
        let name = value::make_symbol(i.heap_mut(), "thread_timeout").unwrap();
        let ms = value::make_int(i.heap_mut(), 2500).unwrap();
        set_config(&mut i, &[name, ms]).unwrap();
        let name2 = value::make_symbol(i.heap_mut(), "thread_timeout").unwrap();
        let v = get_config(&mut i, &[name2]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Integer(2500));
    }

    #[test]
    fn n_bytes_allocated_is_read_only() {
        let mut i = interp();
        let name = value::make_symbol(i.heap_mut(), "n_bytes_allocated").unwrap();
        let n = value::make_int(i.heap_mut(), 0).unwrap();
        let v = set_config(&mut i, &[name, n]).unwrap();
        match i.heap().deref(v) {
            Value::Error(kind, _) => assert_eq!(*kind, ErrorKind::ConfigError),
            other => panic!("expected an error value, got {other:?}"),
        }
    }

    #[test]
    fn unknown_name_is_config_error_on_both_directions() {
        let mut i = interp();
        let name = value::make_symbol(i.heap_mut(), "bogus").unwrap();
        let v = get_config(&mut i, &[name]).unwrap();
        match i.heap().deref(v) {
            Value::Error(kind, _) => assert_eq!(*kind, ErrorKind::ConfigError),
            other => panic!("expected an error value, got {other:?}"),
        }
    }

    #[test]
    fn mem_verbosity_round_trips_as_a_symbol() {
        let mut i = interp();
        let name = value::make_symbol(i.heap_mut(), "mem_verbosity").unwrap();
        let verbose = value::make_symbol(i.heap_mut(), "verbose").unwrap();
        set_config(&mut i, &[name, verbose]).unwrap();
        let name2 = value::make_symbol(i.heap_mut(), "mem_verbosity").unwrap();
        let v = get_config(&mut i, &[name2]).unwrap();
        assert_eq!(i.heap().deref(v), &Value::Symbol("verbose".to_string()));
    }
}
