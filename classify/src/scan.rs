use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use sigrole_netlist::{BitRole, Role, Signal};

/// The complete classification of one module: the verdict for every analyzed
/// slice, plus the per-bit codes of one analysis pass (aligned with the
/// module's entering signals, bit 0 at the lsb).
#[derive(Debug, Clone, Default)]
pub struct ModuleRoles {
    pub signals: Vec<(Signal, Role)>,
    pub slices: Vec<(Signal, Vec<BitRole>)>,
}

impl ModuleRoles {
    /// OR-reduced verdict of every entry whose signal carries `name`.
    pub fn role_of(&self, name: &str) -> Role {
        self.signals
            .iter()
            .filter(|(signal, _)| signal.name() == name)
            .fold(Role::NONE, |role, (_, verdict)| role.merge(*verdict))
    }
}

/// Memoized analysis results, keyed by module identity (the module's index in
/// the design list), never by instance: two placeholder instances of one
/// module type share a single computation.
///
/// The cache is owned by one scheduler run and shared by reference with every
/// engine that run creates, including the engines deep scan spawns
/// recursively.
#[derive(Debug, Default)]
pub struct ResultCache {
    results: RefCell<HashMap<usize, Rc<ModuleRoles>>>,
}

impl ResultCache {
    pub fn new() -> ResultCache {
        ResultCache::default()
    }

    pub fn get(&self, module: usize) -> Option<Rc<ModuleRoles>> {
        self.results.borrow().get(&module).cloned()
    }

    pub fn insert(&self, module: usize, roles: Rc<ModuleRoles>) {
        self.results.borrow_mut().insert(module, roles);
    }

    pub fn contains(&self, module: usize) -> bool {
        self.results.borrow().contains_key(&module)
    }

    pub fn len(&self) -> usize {
        self.results.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.borrow().is_empty()
    }
}
