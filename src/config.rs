//! Runtime-tunable knobs: memory thresholds, evaluation timeout, and logging verbosity.
//!
//! These are the values `set-config!`/`get-config` read and write (see
//! `primitives::config_prims`), and the values the CLI's flags populate before
//! `Interpreter::setup_environment` runs.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 768 KiB, the soft threshold used by the reference implementation this interpreter follows.
pub const DEFAULT_MEM_LIM_SOFT: usize = 768 * 1024;

/// 1 MiB, the hard threshold used by the reference implementation this interpreter follows.
pub const DEFAULT_MEM_LIM_HARD: usize = 1024 * 1024;

pub const DEFAULT_THREAD_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Silent,
    Normal,
    Verbose,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Silent
    }
}

impl Verbosity {
    pub fn parse(s: &str) -> Option<Verbosity> {
        match s {
            "silent" => Some(Verbosity::Silent),
            "normal" => Some(Verbosity::Normal),
            "verbose" => Some(Verbosity::Verbose),
            _ => None,
        }
    }
}

/// The mutable tunables of a running interpreter.
///
/// `n_bytes_allocated` is deliberately not part of this struct: it lives on the heap itself and is
/// exposed read-only through `get-config`.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub thread_timeout_ms: u64,
    pub mem_lim_soft: usize,
    pub mem_lim_hard: usize,
    pub mem_verbosity: Verbosity,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            thread_timeout_ms: DEFAULT_THREAD_TIMEOUT_MS,
            mem_lim_soft: DEFAULT_MEM_LIM_SOFT,
            mem_lim_hard: DEFAULT_MEM_LIM_HARD,
            mem_verbosity: Verbosity::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_thresholds() {
        let cfg = Config::default();
        assert_eq!(cfg.mem_lim_soft, 768 * 1024);
        assert_eq!(cfg.mem_lim_hard, 1024 * 1024);
    }

    #[test]
    fn verbosity_parses_known_names_only() {
        assert_eq!(Verbosity::parse("verbose"), Some(Verbosity::Verbose));
        assert_eq!(Verbosity::parse("loud"), None);
    }
}
