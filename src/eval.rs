//! The metacircular evaluator: special-form dispatch and procedure application.
//!
//! Deliberately a plain recursive descent with no trampoline — tail-call optimization is out of
//! scope, matching the reference evaluator's own use of the host call stack for Lisp recursion.
//! Cooperative cancellation (`Interpreter::is_cancelled`) is checked at the top of every `eval`
//! call and at the top of `apply`, the suspension points the specification names.

use crate::error::{ErrorKind, LispError};
use crate::heap::ValueRef;
use crate::interpreter::Interpreter;
use crate::value::{self, Value, SYM_CLOSURE, SYM_FALSE, SYM_PRIMITIVE, SYM_TRUE};

fn check_cancel(interp: &Interpreter) -> Result<(), LispError> {
    if interp.is_cancelled() {
        return Err(LispError::timeout());
    }
    Ok(())
}

fn as_symbol<'h>(interp: &'h Interpreter, v: ValueRef) -> Option<&'h str> {
    if v.is_nil() {
        return None;
    }
    match interp.heap().deref(v) {
        Value::Symbol(s) => Some(s.as_str()),
        _ => None,
    }
}

/// Evaluates `expr` in `env`, dispatching on its structural shape per the special-form table.
pub fn eval(interp: &mut Interpreter, expr: ValueRef, env: ValueRef) -> Result<ValueRef, LispError> {
    check_cancel(interp)?;

    if expr.is_nil() {
        return Ok(ValueRef::NIL);
    }

    let value = interp.heap().deref(expr).clone();
    match value {
        Value::Integer(_) | Value::Decimal(_) | Value::String(_) => Ok(expr),
        Value::Primitive(_) | Value::Error(_, _) => Ok(expr),
        Value::Symbol(s) => {
            if s == SYM_TRUE || s == SYM_FALSE {
                Ok(expr)
            } else {
                crate::env::lookup(interp.heap(), &s, env)
            }
        }
        Value::Pair(head, rest) => eval_pair(interp, head, rest, env),
    }
}

fn eval_pair(
    interp: &mut Interpreter,
    head: ValueRef,
    rest: ValueRef,
    env: ValueRef,
) -> Result<ValueRef, LispError> {
    if let Some(op) = as_symbol(interp, head) {
        match op {
            "quote" => return value::car(interp.heap(), rest),
            "if" => return eval_if(interp, rest, env),
            "cond" => return eval_cond(interp, rest, env),
            "define" => return eval_define(interp, rest, env),
            "set!" => return eval_set(interp, rest, env),
            "lambda" => return eval_lambda(interp, rest, env),
            "begin" => return eval_begin(interp, rest, env),
            "let" => return eval_let(interp, rest, env),
            _ => {}
        }
    }

    let proc = eval(interp, head, env)?;
    let arg_exprs = value::list_to_vec(interp.heap(), rest)?;
    let mut args = Vec::with_capacity(arg_exprs.len());
    for a in arg_exprs {
        args.push(eval(interp, a, env)?);
    }
    apply(interp, proc, &args)
}

fn eval_if(interp: &mut Interpreter, rest: ValueRef, env: ValueRef) -> Result<ValueRef, LispError> {
    let clauses = value::list_to_vec(interp.heap(), rest)?;
    if clauses.len() != 2 && clauses.len() != 3 {
        return interp.fail(
            ErrorKind::ArityError,
            format!("if: expected 2 or 3 argument(s), got {}", clauses.len()),
        );
    }
    let test = eval(interp, clauses[0], env)?;
    if !value::is_false(interp.heap(), test) {
        eval(interp, clauses[1], env)
    } else if clauses.len() == 3 {
        eval(interp, clauses[2], env)
    } else {
        value::make_symbol(interp.heap_mut(), SYM_FALSE)
    }
}

/// `(cond (test expr...) ... (else expr...))`. The first clause whose test is not `#f` (or whose
/// test symbol is literally `else`) wins; its body evaluates sequentially and the last value wins.
fn eval_cond(interp: &mut Interpreter, rest: ValueRef, env: ValueRef) -> Result<ValueRef, LispError> {
    let clauses = value::list_to_vec(interp.heap(), rest)?;
    for clause in clauses {
        check_cancel(interp)?;
        let parts = value::list_to_vec(interp.heap(), clause)?;
        let Some((test, body)) = parts.split_first() else {
            continue;
        };
        let is_else = as_symbol(interp, *test) == Some("else");
        let matched = if is_else {
            true
        } else {
            let v = eval(interp, *test, env)?;
            !value::is_false(interp.heap(), v)
        };
        if matched {
            return eval_sequence(interp, body, env);
        }
    }
    value::make_symbol(interp.heap_mut(), SYM_FALSE)
}

/// Evaluates `(name v)` or `(name params... v)` — the two `define` shapes — and returns the
/// defined name as a symbol, the conventional SICP REPL acknowledgement value.
fn eval_define(interp: &mut Interpreter, rest: ValueRef, env: ValueRef) -> Result<ValueRef, LispError> {
    let head = value::car(interp.heap(), rest)?;
    if as_symbol(interp, head).is_some() {
        let parts = value::list_to_vec(interp.heap(), rest)?;
        if parts.len() != 2 {
            return interp.fail(
                ErrorKind::ArityError,
                format!("define: expected 2 argument(s), got {}", parts.len()),
            );
        }
        let name = as_symbol(interp, parts[0]).unwrap().to_string();
        let value = eval(interp, parts[1], env)?;
        crate::env::define(interp.heap_mut(), &name, value, env)?;
        return value::make_symbol(interp.heap_mut(), &name);
    }

    let signature = value::list_to_vec(interp.heap(), head)?;
    let Some((name_ref, params)) = signature.split_first() else {
        return interp.fail(ErrorKind::SyntaxError, "define: missing procedure name");
    };
    let name = as_symbol(interp, *name_ref)
        .ok_or_else(|| LispError::syntax("define: procedure name must be a symbol"))?
        .to_string();
    let body = value::cdr(interp.heap(), rest)?;
    let closure = make_closure(interp, &value::vec_to_list(interp.heap_mut(), params)?, body, env)?;
    crate::env::define(interp.heap_mut(), &name, closure, env)?;
    value::make_symbol(interp.heap_mut(), &name)
}

fn eval_set(interp: &mut Interpreter, rest: ValueRef, env: ValueRef) -> Result<ValueRef, LispError> {
    let parts = value::list_to_vec(interp.heap(), rest)?;
    if parts.len() != 2 {
        return interp.fail(
            ErrorKind::ArityError,
            format!("set!: expected 2 argument(s), got {}", parts.len()),
        );
    }
    let name = as_symbol(interp, parts[0])
        .ok_or_else(|| LispError::syntax("set!: variable name must be a symbol"))?
        .to_string();
    let value = eval(interp, parts[1], env)?;
    crate::env::set(interp.heap_mut(), &name, value, env)?;
    value::make_symbol(interp.heap_mut(), "ok")
}

fn eval_lambda(interp: &mut Interpreter, rest: ValueRef, env: ValueRef) -> Result<ValueRef, LispError> {
    let params = value::car(interp.heap(), rest)?;
    let body = value::cdr(interp.heap(), rest)?;
    make_closure(interp, &params, body, env)
}

fn eval_begin(interp: &mut Interpreter, rest: ValueRef, env: ValueRef) -> Result<ValueRef, LispError> {
    let exprs = value::list_to_vec(interp.heap(), rest)?;
    eval_sequence(interp, &exprs, env)
}

/// `(let ((name val) ...) body...)` desugars to `((lambda (name...) body...) val...)`.
fn eval_let(interp: &mut Interpreter, rest: ValueRef, env: ValueRef) -> Result<ValueRef, LispError> {
    let head = value::car(interp.heap(), rest)?;
    let body = value::cdr(interp.heap(), rest)?;
    let bindings = value::list_to_vec(interp.heap(), head)?;

    let mut names = Vec::with_capacity(bindings.len());
    let mut init_exprs = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let pair = value::list_to_vec(interp.heap(), binding)?;
        if pair.len() != 2 {
            return interp.fail(ErrorKind::SyntaxError, "let: binding must be (name value)");
        }
        names.push(pair[0]);
        init_exprs.push(pair[1]);
    }

    let mut args = Vec::with_capacity(init_exprs.len());
    for e in init_exprs {
        args.push(eval(interp, e, env)?);
    }

    let new_env = crate::env::extend(interp.heap_mut(), &names, &args, env)?;
    let body_exprs = value::list_to_vec(interp.heap(), body)?;
    eval_sequence(interp, &body_exprs, new_env)
}

fn eval_sequence(interp: &mut Interpreter, exprs: &[ValueRef], env: ValueRef) -> Result<ValueRef, LispError> {
    let Some((last, rest)) = exprs.split_last() else {
        return Ok(ValueRef::NIL);
    };
    for e in rest {
        eval(interp, *e, env)?;
    }
    eval(interp, *last, env)
}

fn make_closure(
    interp: &mut Interpreter,
    params: &ValueRef,
    body: ValueRef,
    env: ValueRef,
) -> Result<ValueRef, LispError> {
    let tag = value::make_symbol(interp.heap_mut(), SYM_CLOSURE)?;
    let env_cell = value::cons(interp.heap_mut(), env, ValueRef::NIL)?;
    let body_cell = value::cons(interp.heap_mut(), body, env_cell)?;
    let tail = value::cons(interp.heap_mut(), *params, body_cell)?;
    value::cons(interp.heap_mut(), tag, tail)
}

/// Applies `proc` to already-evaluated `args`. Exposed separately from `eval_pair` so primitives
/// like `apply` and `map` (see `primitives::lists` and the bootstrap library) can invoke a
/// procedure value they only receive at runtime.
pub fn apply(interp: &mut Interpreter, proc: ValueRef, args: &[ValueRef]) -> Result<ValueRef, LispError> {
    check_cancel(interp)?;

    if proc.is_nil() {
        return interp.fail(ErrorKind::NotApplicable, "cannot apply the empty list");
    }
    let Value::Pair(tag, tail) = interp.heap().deref(proc).clone() else {
        return interp.fail(ErrorKind::NotApplicable, format!("not a procedure: {}", interp.print(proc)));
    };
    let tag_name = as_symbol(interp, tag);
    match tag_name {
        Some(SYM_PRIMITIVE) => {
            let handle = value::car(interp.heap(), tail)?;
            let id = match interp.heap().deref(handle) {
                Value::Primitive(id) => *id,
                _ => {
                    return interp.fail(ErrorKind::NotApplicable, "malformed primitive procedure");
                }
            };
            let func = interp.primitives().func(id);
            func(interp, args)
        }
        Some(SYM_CLOSURE) => {
            let parts = value::list_to_vec(interp.heap(), tail)?;
            if parts.len() != 3 {
                return interp.fail(ErrorKind::NotApplicable, "malformed closure");
            }
            let (params, body, closure_env) = (parts[0], parts[1], parts[2]);
            let param_list = value::list_to_vec(interp.heap(), params)?;
            if param_list.len() != args.len() {
                return interp.fail(
                    ErrorKind::ArityError,
                    format!(
                        "#<closure>: expected {} argument(s), got {}",
                        param_list.len(),
                        args.len()
                    ),
                );
            }
            let call_env = crate::env::extend(interp.heap_mut(), &param_list, args, closure_env)?;
            let body_exprs = value::list_to_vec(interp.heap(), body)?;
            eval_sequence(interp, &body_exprs, call_env)
        }
        _ => interp.fail(ErrorKind::NotApplicable, format!("not a procedure: {}", interp.print(proc))),
    }
}
