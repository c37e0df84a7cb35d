//! The managed heap: a single arena of tagged cells, a byte-accounted allocation budget, and a
//! mark-and-sweep collector.
//!
//! Grounded in the arena/free-list/mark-sweep design used by this interpreter family's heap
//! (`Arena<T>` plus a `BitVec` of mark bits alongside the pool, and an iterative worklist mark
//! phase rather than a recursive one that could blow the Rust stack on deep or cyclic structures),
//! but collapsed to a single homogeneous arena since every `Value` variant here fits in one enum
//! rather than four separate cell kinds.

use std::panic::Location;

use bit_vec::BitVec;
use log::{debug, info, trace};

use crate::config::Verbosity;
use crate::error::LispError;
use crate::value::Value;

/// A handle to a heap-allocated `Value`. `NIL` is the distinguished empty list and never points
/// at a cell: the reader, evaluator, and primitives must check `is_nil()` before dereferencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueRef(Option<usize>);

impl ValueRef {
    pub const NIL: ValueRef = ValueRef(None);

    pub fn is_nil(&self) -> bool {
        self.0.is_none()
    }

    fn index(&self) -> Option<usize> {
        self.0
    }
}

/// How a collection was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcMode {
    /// Always collects.
    Force,
    /// Collects only if `n_bytes_allocated >= mem_lim_soft`.
    LowMem,
}

pub struct Heap {
    slots: Vec<Option<Value>>,
    /// One mark bit per slot, transient scratch space used only during `run_gc`. Kept as a
    /// separate bitset alongside the object pool rather than inline per-cell, the same shape as
    /// this interpreter family's arena.
    marked: BitVec,
    free: Vec<usize>,
    n_bytes_allocated: usize,
    mem_lim_soft: usize,
    mem_lim_hard: usize,
    verbosity: Verbosity,
}

fn size_of_value(value: &Value) -> usize {
    const HEADER: usize = 16;
    match value {
        Value::Integer(_) => HEADER,
        Value::Decimal(_) => HEADER,
        Value::Symbol(s) => HEADER + s.len(),
        Value::String(s) => HEADER + s.len(),
        Value::Pair(_, _) => HEADER,
        Value::Primitive(_) => HEADER,
        Value::Error(_, message) => HEADER + message.len(),
    }
}

impl Heap {
    pub fn new(mem_lim_soft: usize, mem_lim_hard: usize, verbosity: Verbosity) -> Self {
        Heap {
            slots: Vec::new(),
            marked: BitVec::new(),
            free: Vec::new(),
            n_bytes_allocated: 0,
            mem_lim_soft,
            mem_lim_hard,
            verbosity,
        }
    }

    pub fn n_bytes_allocated(&self) -> usize {
        self.n_bytes_allocated
    }

    pub fn mem_lim_soft(&self) -> usize {
        self.mem_lim_soft
    }

    pub fn set_mem_lim_soft(&mut self, n: usize) {
        self.mem_lim_soft = n;
    }

    pub fn mem_lim_hard(&self) -> usize {
        self.mem_lim_hard
    }

    pub fn set_mem_lim_hard(&mut self, n: usize) {
        self.mem_lim_hard = n;
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, v: Verbosity) {
        self.verbosity = v;
    }

    #[track_caller]
    pub fn alloc(&mut self, value: Value) -> Result<ValueRef, LispError> {
        let size = size_of_value(&value);
        if self.n_bytes_allocated + size > self.mem_lim_hard {
            return Err(LispError::out_of_memory());
        }
        if matches!(self.verbosity, Verbosity::Verbose) {
            let loc = Location::caller();
            trace!("alloc {size}B at {}:{}", loc.file(), loc.line());
        }
        self.n_bytes_allocated += size;
        let idx = if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(value);
            idx
        } else {
            self.slots.push(Some(value));
            self.slots.len() - 1
        };
        Ok(ValueRef(Some(idx)))
    }

    pub fn deref(&self, r: ValueRef) -> &Value {
        let idx = r.index().expect("deref of the empty list");
        self.slots[idx].as_ref().expect("deref of a freed cell")
    }

    pub fn deref_mut(&mut self, r: ValueRef) -> &mut Value {
        let idx = r.index().expect("deref_mut of the empty list");
        self.slots[idx].as_mut().expect("deref_mut of a freed cell")
    }

    /// Runs a collection according to `mode`, tracing from `extra_roots` (the global environment,
    /// the only root set the interpreter ever passes: GC only ever runs at top-level-form
    /// boundaries in `interpreter.rs`/`main.rs`, never mid-evaluation, so no other Rust-side value
    /// needs to be rooted while a collection runs). Returns the number of bytes reclaimed.
    pub fn run_gc(&mut self, mode: GcMode, extra_roots: &[ValueRef]) -> usize {
        if mode == GcMode::LowMem && self.n_bytes_allocated < self.mem_lim_soft {
            return 0;
        }

        self.marked = BitVec::from_elem(self.slots.len(), false);

        let mut worklist: Vec<ValueRef> = extra_roots.to_vec();

        while let Some(r) = worklist.pop() {
            let Some(idx) = r.index() else { continue };
            if self.slots[idx].is_none() {
                continue;
            }
            if self.marked[idx] {
                continue;
            }
            self.marked.set(idx, true);
            if let Some(Value::Pair(a, b)) = &self.slots[idx] {
                worklist.push(*a);
                worklist.push(*b);
            }
        }

        let mut reclaimed = 0usize;
        for idx in 0..self.slots.len() {
            let should_free = self.slots[idx].is_some() && !self.marked[idx];
            if should_free {
                let value = self.slots[idx].take().unwrap();
                reclaimed += size_of_value(&value);
                self.free.push(idx);
            }
        }
        self.n_bytes_allocated -= reclaimed;

        match self.verbosity {
            Verbosity::Verbose => debug!(
                "gc({mode:?}): reclaimed {reclaimed}B, {}B live",
                self.n_bytes_allocated
            ),
            Verbosity::Normal => info!("gc({mode:?}): reclaimed {reclaimed}B"),
            Verbosity::Silent => {}
        }

        reclaimed
    }

    /// Releases everything: used by `cleanup()` so that `n_bytes_allocated` reaches zero even if
    /// the caller no longer has a live root set to trace from.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.marked.clear();
        self.free.clear();
        self.n_bytes_allocated = 0;
    }
}
