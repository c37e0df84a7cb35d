//! The interpreter: owns the heap, the global environment, the primitive table, and the running
//! configuration, and drives the supervised read-eval-print cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::{ErrorKind, LispError};
use crate::heap::{GcMode, Heap, ValueRef};
use crate::value::{self, Value};
use crate::{bootstrap, env, eval, printer, reader};
use crate::primitives::{self, PrimitiveRegistry};

/// How often the evaluation thread checks the cancellation flag while the watchdog sleeps.
const WATCHDOG_POLL_MS: u64 = 10;

pub struct Interpreter {
    heap: Heap,
    global_env: ValueRef,
    primitives: PrimitiveRegistry,
    config: Config,
    cancel: Arc<AtomicBool>,
}

impl Interpreter {
    /// Builds a fresh interpreter: an empty heap sized by `config`, the global environment, every
    /// native primitive bound into it, and the bootstrap library evaluated on top.
    pub fn new(config: Config) -> Result<Self, LispError> {
        let mut heap = Heap::new(config.mem_lim_soft, config.mem_lim_hard, config.mem_verbosity);
        let global_env = env::new_global(&mut heap)?;
        let mut primitives = PrimitiveRegistry::new();
        primitives::register_all(&mut primitives);

        let mut interp = Interpreter {
            heap,
            global_env,
            primitives,
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        };
        interp.setup_environment()?;
        Ok(interp)
    }

    /// Binds every native primitive as `(primitive <id>)` in the global environment, then evaluates
    /// the bootstrap library on top of it. Mirrors the reference implementation's
    /// `setup_environment`, which does the same two things in the same order before the REPL starts.
    fn setup_environment(&mut self) -> Result<(), LispError> {
        let names: Vec<(usize, &'static str)> = self.primitives.iter().collect();
        for (id, name) in names {
            let tag = value::make_symbol(&mut self.heap, value::SYM_PRIMITIVE)?;
            let handle = value::make_primitive(&mut self.heap, id)?;
            let tail = value::cons(&mut self.heap, handle, ValueRef::NIL)?;
            let proc = value::cons(&mut self.heap, tag, tail)?;
            env::define(&mut self.heap, name, proc, self.global_env)?;
        }
        for form in bootstrap::FORMS {
            self.run_exp(form)?;
        }
        self.collect(GcMode::Force);
        Ok(())
    }

    /// Drops every heap value, as if the interpreter were starting over. The global environment and
    /// primitive bindings are gone too: a fresh `Interpreter` must be built to keep going.
    pub fn cleanup(&mut self) {
        self.heap.clear();
        self.global_env = ValueRef::NIL;
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    pub fn global_env(&self) -> ValueRef {
        self.global_env
    }

    pub fn primitives(&self) -> &PrimitiveRegistry {
        &self.primitives
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn alloc(&mut self, v: Value) -> Result<ValueRef, LispError> {
        self.heap.alloc(v)
    }

    /// Converts a failure into a heap `Value::Error` cell, per the data-propagation error policy:
    /// almost every primitive and evaluator failure becomes a value the caller can inspect rather
    /// than an unwind. Only the allocation of the error cell itself can fail, in which case that
    /// failure does propagate.
    pub fn fail(&mut self, kind: ErrorKind, message: impl Into<String>) -> Result<ValueRef, LispError> {
        value::make_error(&mut self.heap, kind, message)
    }

    pub fn print(&self, v: ValueRef) -> String {
        printer::print(&self.heap, v)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Runs a garbage collection rooted at the global environment. GC only ever runs at
    /// top-level-form boundaries (here, and on an allocation-failure retry in `run_exp`), never
    /// mid-evaluation, so the global environment is the only root any collection needs.
    pub fn collect(&mut self, mode: GcMode) -> usize {
        let global_env = self.global_env;
        self.heap.run_gc(mode, &[global_env])
    }

    /// Reads and evaluates every top-level form in `text`, returning the value of the last one
    /// (or the empty list if `text` contains none). On `OutOfMemory`, forces a collection and
    /// retries the whole read-eval pass exactly once: because the failed attempt is discarded
    /// entirely rather than resumed mid-expression, there is nothing in-flight on the Rust stack
    /// that needs to survive the retry, so no per-expression rooting is required for this to be
    /// sound.
    pub fn run_exp(&mut self, text: &str) -> Result<ValueRef, LispError> {
        match self.run_exp_once(text) {
            Err(e) if e.kind == ErrorKind::OutOfMemory => {
                self.collect(GcMode::Force);
                self.run_exp_once(text)
            }
            other => other,
        }
    }

    fn run_exp_once(&mut self, text: &str) -> Result<ValueRef, LispError> {
        let mut result = ValueRef::NIL;
        let mut rest = text;
        loop {
            let trimmed = rest.trim_start();
            if trimmed.is_empty() {
                break;
            }
            let mut consumed = 0usize;
            let expr = reader::read_exp(&mut self.heap, trimmed, &mut consumed)?;
            result = self.eval(expr, self.global_env)?;
            rest = &trimmed[consumed..];
        }
        Ok(result)
    }

    pub fn eval(&mut self, expr: ValueRef, env: ValueRef) -> Result<ValueRef, LispError> {
        eval::eval(self, expr, env)
    }

    /// Runs `body` under a watchdog: a second OS thread sleeps for `timeout_ms` and then flips the
    /// shared cancellation flag, which `eval` polls at every recursive descent and every loop
    /// iteration. The watchdog never touches the heap, so the heap stays single-threaded even
    /// though two threads are alive at once.
    fn supervised<F>(&mut self, timeout_ms: u64, body: F) -> Result<ValueRef, LispError>
    where
        F: FnOnce(&mut Self) -> Result<ValueRef, LispError>,
    {
        self.cancel.store(false, Ordering::Relaxed);
        let done = Arc::new(AtomicBool::new(false));
        let cancel = Arc::clone(&self.cancel);
        let done_for_watchdog = Arc::clone(&done);

        let watchdog = thread::spawn(move || {
            let deadline = Duration::from_millis(timeout_ms);
            let mut waited = Duration::ZERO;
            while waited < deadline {
                if done_for_watchdog.load(Ordering::Relaxed) {
                    return;
                }
                let step = Duration::from_millis(WATCHDOG_POLL_MS);
                thread::sleep(step);
                waited += step;
            }
            cancel.store(true, Ordering::Relaxed);
        });

        let result = body(self);
        done.store(true, Ordering::Relaxed);
        let _ = watchdog.join();

        match result {
            Err(e) if self.cancel.load(Ordering::Relaxed) && e.kind != ErrorKind::OutOfMemory => {
                Err(LispError::timeout())
            }
            other => other,
        }
    }

    /// Reads and evaluates every top-level form in `text` under the configured `thread_timeout_ms`
    /// watchdog. The public surface named `run_exp` in the specification's external interfaces;
    /// this is its timeout-supervised counterpart.
    pub fn run_exp_supervised(&mut self, text: &str) -> Result<ValueRef, LispError> {
        let timeout_ms = self.config.thread_timeout_ms;
        self.supervised(timeout_ms, |interp| interp.run_exp(text))
    }

    /// `eval_with_timeout(expr, env, ms)` from the specification's external interfaces: evaluates
    /// an already-read expression under a watchdog with an explicit timeout, independent of the
    /// configured `thread_timeout_ms`.
    pub fn eval_with_timeout(&mut self, expr: ValueRef, env: ValueRef, ms: u64) -> Result<ValueRef, LispError> {
        self.supervised(ms, |interp| interp.eval(expr, env))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interp() -> Interpreter {
        Interpreter::new(Config::default()).unwrap()
    }

    #[test]
    fn bootstrap_binds_primitives_and_library_procedures() {
        let mut i = interp();
        let v = i.run_exp("(+ 1 2)").unwrap();
        assert_eq!(i.heap().deref(v), &Value::Integer(3));
        let v = i.run_exp("(square 5)").unwrap();
        assert_eq!(i.heap().deref(v), &Value::Integer(25));
    }

    #[test]
    fn cleanup_releases_everything() {
        let mut i = interp();
        i.run_exp("(cons 1 2)").unwrap();
        assert!(i.heap().n_bytes_allocated() > 0);
        i.cleanup();
        assert_eq!(i.heap().n_bytes_allocated(), 0);
    }

    #[test]
    fn supervised_eval_returns_the_value_when_it_finishes_in_time() {
        let mut i = interp();
        let v = i.run_exp_supervised("(+ 1 2)").unwrap();
        assert_eq!(i.heap().deref(v), &Value::Integer(3));
    }
}
