//! The primitives registry and the native procedures it holds.
//!
//! `PrimitiveRegistry` is the Rust analogue of the reference implementation's doubly-linked
//! `prim_proc_list`: an append-only sequence of `(name, native_fn)` entries, built once during
//! `Interpreter::setup_environment` and indexed by `PrimitiveId` thereafter. Each submodule here
//! covers one contract group from the specification and registers its functions through
//! `add_primitive`.

use crate::error::LispError;
use crate::heap::ValueRef;
use crate::interpreter::Interpreter;
use crate::value::PrimitiveId;

pub mod arithmetic;
pub mod comparison;
pub mod config_prims;
pub mod conversion;
mod common;
pub mod identity;
pub mod lists;
pub mod logic;
pub mod numeric;
pub mod predicates;

/// A native procedure: takes the interpreter (for allocation, config, and error construction) and
/// the already-evaluated argument list, in order.
pub type PrimitiveFn = fn(&mut Interpreter, &[ValueRef]) -> Result<ValueRef, LispError>;

struct PrimitiveEntry {
    name: &'static str,
    func: PrimitiveFn,
}

/// The append-only name → native-function table bound into the initial global environment.
#[derive(Default)]
pub struct PrimitiveRegistry {
    entries: Vec<PrimitiveEntry>,
}

impl PrimitiveRegistry {
    pub fn new() -> Self {
        PrimitiveRegistry { entries: Vec::new() }
    }

    pub fn add_primitive(&mut self, name: &'static str, func: PrimitiveFn) {
        self.entries.push(PrimitiveEntry { name, func });
    }

    pub fn func(&self, id: PrimitiveId) -> PrimitiveFn {
        self.entries[id].func
    }

    pub fn iter(&self) -> impl Iterator<Item = (PrimitiveId, &'static str)> + '_ {
        self.entries.iter().enumerate().map(|(id, e)| (id, e.name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Registers the complete native primitive set, in the order the bootstrap library relies on
/// being visible (none of the bootstrap definitions depend on registration order, but this
/// mirrors the grouping the specification documents them in).
pub fn register_all(registry: &mut PrimitiveRegistry) {
    arithmetic::register(registry);
    comparison::register(registry);
    logic::register(registry);
    numeric::register(registry);
    lists::register(registry);
    predicates::register(registry);
    conversion::register(registry);
    identity::register(registry);
    config_prims::register(registry);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Interpreter, _: &[ValueRef]) -> Result<ValueRef, LispError> {
        Ok(ValueRef::NIL)
    }

    #[test]
    fn add_primitive_appends_and_preserves_order() {
        let mut reg = PrimitiveRegistry::new();
        reg.add_primitive("a", noop);
        reg.add_primitive("b", noop);
        let names: Vec<_> = reg.iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn register_all_registers_every_contract_group() {
        let mut reg = PrimitiveRegistry::new();
        register_all(&mut reg);
        let names: Vec<_> = reg.iter().map(|(_, n)| n).collect();
        for expected in ["+", "<", "and", "floor", "car", "number?", "symbol->string", "eq?", "set-config!"] {
            assert!(names.contains(&expected), "missing primitive: {expected}");
        }
    }
}
