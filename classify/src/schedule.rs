use std::collections::VecDeque;
use std::fmt::Display;
use std::rc::Rc;

use sigrole_netlist::{BitRole, CheckError, Module, Role, Signal, check_module};
use tracing::{debug, warn};

use crate::dfs::DfsEngine;
use crate::scan::ResultCache;

/// Execution switches for [`classify_design`].
#[derive(Debug, Clone, Copy)]
pub struct ClassifyOptions {
    /// Resolve placeholder ports against the instantiated module's own
    /// classification instead of treating placeholders as opaque.
    pub deep_scan: bool,
}

impl Default for ClassifyOptions {
    fn default() -> ClassifyOptions {
        ClassifyOptions { deep_scan: true }
    }
}

/// Fatal failures of a design classification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// A module failed its construction-time consistency battery.
    Inconsistent { module: String, errors: Vec<CheckError> },
    /// The submodule-instantiation relation is cyclic; the listed modules
    /// never become eligible for analysis.
    HierarchyCycle { modules: Vec<String> },
}

impl Display for ClassifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ClassifyError::Inconsistent { module, errors } => {
                write!(f, "module {module} failed {} consistency check(s)", errors.len())?;
                for error in errors {
                    write!(f, "\n  {error}")?;
                }
                Ok(())
            }
            ClassifyError::HierarchyCycle { modules } => {
                write!(f, "instantiation cycle involving: {}", modules.join(", "))
            }
        }
    }
}

impl std::error::Error for ClassifyError {}

/// The classification of one module, ready for report generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleReport {
    pub module: String,
    /// True iff the module instantiates no submodules.
    pub atomic: bool,
    pub inner_modules: Vec<(String, String)>,
    /// Per-slice verdicts, in report order.
    pub signals: Vec<(Signal, Role)>,
    /// Per-bit codes for every entering signal, bit 0 at the lsb.
    pub slices: Vec<(Signal, Vec<BitRole>)>,
}

/// Classifies every module of a design, submodules before their users.
///
/// Each module is first validated by the consistency battery. Modules are
/// then processed in a topological order of the instantiation relation; after
/// a module completes, the roles discovered for its boundary signals are
/// applied in one step to every placeholder node instantiating it, so that
/// later modules see their submodules' data/selection ports. Results are
/// memoized per module type, never per instance, and reused when deep scan
/// already computed a module. Reports are returned in design order with
/// signals sorted for deterministic output.
pub fn classify_design<'c>(
    modules: &mut [Module<'c>],
    options: &ClassifyOptions,
) -> Result<Vec<ModuleReport>, ClassifyError> {
    for module in modules.iter() {
        let errors = check_module(module);
        if !errors.is_empty() {
            return Err(ClassifyError::Inconsistent { module: module.name().to_owned(), errors });
        }
    }

    let order = instantiation_order(modules)?;
    let cache = ResultCache::new();

    for index in order {
        let roles = match cache.get(index) {
            Some(roles) => roles,
            None => {
                let engine = DfsEngine::new(modules, index, options.deep_scan, &cache);
                let roles = Rc::new(engine.full_track_analysis());
                cache.insert(index, roles.clone());
                roles
            }
        };
        modules[index].merge_slices(&roles.slices);
        debug!(module = modules[index].name(), signals = roles.signals.len(), "module classified");

        // One deterministic propagation step: every placeholder of the
        // completed type, in every other module, learns the port roles.
        let ty = modules[index].name().to_owned();
        for (other_index, other) in modules.iter_mut().enumerate() {
            if other_index == index {
                continue;
            }
            for node in other.graph_mut().nodes_mut() {
                if !node.is_placeholder() || node.ty() != ty {
                    continue;
                }
                for (signal, role) in &roles.signals {
                    node.mark_module_port(signal.name(), role.data, role.select);
                }
            }
        }
    }

    let mut reports = Vec::new();
    for (index, module) in modules.iter().enumerate() {
        if let Some(roles) = cache.get(index) {
            let mut signals = roles.signals.clone();
            signals.sort_by(|(a, _), (b, _)| a.cmp(b));
            reports.push(ModuleReport {
                module: module.name().to_owned(),
                atomic: module.is_atomic(),
                inner_modules: module.inner_modules().to_vec(),
                signals,
                slices: module.slice_structure().to_vec(),
            });
        }
    }
    Ok(reports)
}

/// A topological order of the module list under "instantiates": every module
/// appears after every module type it instantiates. Unknown types are
/// reported and skipped; a cycle is an error.
fn instantiation_order(modules: &[Module]) -> Result<Vec<usize>, ClassifyError> {
    let mut deps: Vec<Vec<usize>> = vec![Vec::new(); modules.len()];
    for (user, module) in modules.iter().enumerate() {
        for (instance, ty) in module.inner_modules() {
            match modules.iter().position(|candidate| candidate.name() == ty) {
                Some(dep) => {
                    if !deps[user].contains(&dep) {
                        deps[user].push(dep);
                    }
                }
                None => {
                    warn!(module = module.name(), %instance, %ty, "submodule type not found in design");
                }
            }
        }
    }

    let mut users: Vec<Vec<usize>> = vec![Vec::new(); modules.len()];
    let mut pending: Vec<usize> = deps.iter().map(Vec::len).collect();
    for (user, list) in deps.iter().enumerate() {
        for &dep in list {
            users[dep].push(user);
        }
    }

    let mut queue: VecDeque<usize> = (0..modules.len()).filter(|&index| pending[index] == 0).collect();
    let mut order = Vec::with_capacity(modules.len());
    while let Some(index) = queue.pop_front() {
        order.push(index);
        for &user in &users[index] {
            pending[user] -= 1;
            if pending[user] == 0 {
                queue.push_back(user);
            }
        }
    }

    if order.len() != modules.len() {
        let stuck = (0..modules.len())
            .filter(|&index| pending[index] > 0)
            .map(|index| modules[index].name().to_owned())
            .collect();
        return Err(ClassifyError::HierarchyCycle { modules: stuck });
    }
    Ok(order)
}
