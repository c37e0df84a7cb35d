//! The command-line front end: an interactive REPL built on `rustyline`, and a batch mode that
//! evaluates a script file form by form. Both are thin wrappers over `sicp_lisp::Interpreter`; the
//! interesting behavior lives entirely in the library crate.

use std::path::PathBuf;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::{Config as RlConfig, DefaultEditor};

use sicp_lisp::config::{Config, Verbosity, DEFAULT_MEM_LIM_HARD, DEFAULT_MEM_LIM_SOFT, DEFAULT_THREAD_TIMEOUT_MS};
use sicp_lisp::heap::GcMode;
use sicp_lisp::interpreter::Interpreter;
use sicp_lisp::value::Value;

const HISTORY_FILE: &str = ".sicp_lisp_history";

/// A small Lisp interpreter in the SICP tradition.
#[derive(Parser, Debug)]
#[command(name = "sicp-lisp")]
#[command(version = sicp_lisp::config::VERSION)]
#[command(about = "A small Lisp interpreter in the SICP tradition")]
struct CliArgs {
    /// Script file to execute (optional; if absent, starts the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Wall-clock timeout for each top-level expression, in milliseconds
    #[arg(long = "timeout", value_name = "MS", default_value_t = DEFAULT_THREAD_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Soft memory threshold that triggers opportunistic GC, in bytes
    #[arg(long = "mem-soft", value_name = "BYTES", default_value_t = DEFAULT_MEM_LIM_SOFT)]
    mem_soft: usize,

    /// Hard memory threshold that refuses further allocation, in bytes
    #[arg(long = "mem-hard", value_name = "BYTES", default_value_t = DEFAULT_MEM_LIM_HARD)]
    mem_hard: usize,

    /// Allocator/GC log verbosity: silent, normal, or verbose
    #[arg(long = "verbosity", value_name = "LEVEL", default_value = "silent")]
    verbosity: String,
}

fn main() {
    env_logger::init();
    let args = CliArgs::parse();

    let verbosity = Verbosity::parse(&args.verbosity).unwrap_or_else(|| {
        eprintln!("unknown verbosity {:?}, defaulting to silent", args.verbosity);
        Verbosity::Silent
    });
    let config = Config {
        thread_timeout_ms: args.timeout_ms,
        mem_lim_soft: args.mem_soft,
        mem_lim_hard: args.mem_hard,
        mem_verbosity: verbosity,
    };

    let mut interp = match Interpreter::new(config) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("error: failed to set up the interpreter: {e}");
            std::process::exit(1);
        }
    };

    let outcome = match &args.script {
        Some(path) => run_script(&mut interp, path),
        None => run_repl(&mut interp),
    };

    interp.cleanup();

    if let Err(code) = outcome {
        std::process::exit(code);
    }
}

/// Reads and evaluates `path` one top-level form at a time, running a `LowMem` GC between forms —
/// the same cadence the REPL loop uses — and stopping at the first error without evaluating the
/// rest of the file.
fn run_script(interp: &mut Interpreter, path: &PathBuf) -> Result<(), i32> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        eprintln!("cannot read script file {}: {e}", path.display());
        1
    })?;

    let mut rest = contents.as_str();
    loop {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            return Ok(());
        }
        let mut consumed = 0usize;
        let expr = sicp_lisp::reader::read_exp(interp.heap_mut(), trimmed, &mut consumed).map_err(|e| {
            eprintln!("error: {e}");
            1
        })?;
        let env = interp.global_env();
        match interp.eval(expr, env) {
            Ok(value) => {
                if let Value::Error(kind, message) = interp.heap().deref(value) {
                    eprintln!("error: {kind}: {message}");
                    return Err(1);
                }
            }
            Err(e) => {
                eprintln!("error: {e}");
                return Err(1);
            }
        }
        interp.collect(GcMode::LowMem);
        rest = &trimmed[consumed..];
    }
}

/// The interactive loop. `(exit)` and `(quit)` are REPL-level commands handled before the line
/// ever reaches the reader, not Lisp forms the evaluator sees; every other line is read, evaluated
/// under the configured timeout, and printed as `=> <value>` or `error: <message>`.
fn run_repl(interp: &mut Interpreter) -> Result<(), i32> {
    println!("sicp-lisp {}", sicp_lisp::config::VERSION);
    println!("enter an expression, or (exit)/(quit) to leave");

    let rl_config = RlConfig::builder().auto_add_history(true).build();
    let mut rl = DefaultEditor::with_config(rl_config).expect("failed to initialize the line editor");
    let _ = rl.load_history(HISTORY_FILE);

    loop {
        match rl.readline("lisp> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "(exit)" || trimmed == "(quit)" {
                    break;
                }

                match interp.run_exp_supervised(trimmed) {
                    Ok(value) => {
                        if let Value::Error(kind, message) = interp.heap().deref(value) {
                            println!("error: {kind}: {message}");
                        } else {
                            println!("=> {}", interp.print(value));
                        }
                    }
                    Err(e) => println!("error: {e}"),
                }
                interp.collect(GcMode::LowMem);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("error: {e}");
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
    Ok(())
}
