//! The error types shared by every stage of the interpreter.
//!
//! Most failures (type mismatches, arity mismatches, unbound variables, ...) are not meant to
//! unwind the Rust call stack: they are converted into heap `Value::Error` cells at the point of
//! failure and continue to flow through the program as ordinary data, matching how the original
//! evaluator treated errors. Only allocator exhaustion, evaluation timeout, and reader syntax
//! errors are genuine `Result::Err`s, since in each of those cases there is no sensible value to
//! hand back.

use std::fmt;

pub const ARITY_TWO: &str = "2";

/// The kinds of failure the core distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SyntaxError,
    UnboundVariable,
    TypeError,
    ArityError,
    ArithmeticError,
    NotApplicable,
    OutOfMemory,
    Timeout,
    ConfigError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::UnboundVariable => "UnboundVariable",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ArityError => "ArityError",
            ErrorKind::ArithmeticError => "ArithmeticError",
            ErrorKind::NotApplicable => "NotApplicable",
            ErrorKind::OutOfMemory => "OutOfMemory",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::ConfigError => "ConfigError",
        };
        write!(f, "{s}")
    }
}

/// An interpreter-level failure.
///
/// Unlike `ErrorKind` alone, this carries a human-readable message and is the type that actually
/// crosses function boundaries via `Result`. Most call sites convert this into a heap value via
/// `Interpreter::fail` rather than propagating it with `?`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct LispError {
    pub kind: ErrorKind,
    pub message: String,
}

impl LispError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        LispError {
            kind,
            message: message.into(),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SyntaxError, message)
    }

    pub fn unbound(name: &str) -> Self {
        Self::new(ErrorKind::UnboundVariable, format!("unbound variable: {name}"))
    }

    pub fn type_error(function: &str, expected: &str, actual: &str) -> Self {
        Self::new(
            ErrorKind::TypeError,
            format!("{function}: expected {expected}, got {actual}"),
        )
    }

    pub fn arity(function: &str, expected: &str, actual: usize) -> Self {
        Self::new(
            ErrorKind::ArityError,
            format!("{function}: expected {expected} argument(s), got {actual}"),
        )
    }

    pub fn arithmetic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ArithmeticError, message)
    }

    pub fn not_applicable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotApplicable, message)
    }

    pub fn out_of_memory() -> Self {
        Self::new(ErrorKind::OutOfMemory, "allocation exceeds mem_lim_hard")
    }

    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout, "evaluation exceeded thread_timeout")
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigError, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let e = LispError::type_error("car", "pair", "integer");
        assert_eq!(e.to_string(), "TypeError: car: expected pair, got integer");
    }

    #[test]
    fn arity_message_names_the_function() {
        let e = LispError::arity("cons", ARITY_TWO, 3);
        assert!(e.message.contains("cons"));
        assert_eq!(e.kind, ErrorKind::ArityError);
    }
}
