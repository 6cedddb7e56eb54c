use std::rc::Rc;

use sigrole_netlist::{BitRole, Module, Node, Port, Role, Signal};
use tracing::{debug, trace, warn};

use crate::scan::{ModuleRoles, ResultCache};

/// Depth-first classification engine over one module of a design.
///
/// The engine never mutates anything except the shared [`ResultCache`]; the
/// verdict for a signal is computed from two reachability questions asked of
/// the module graph:
///
/// - *data*: does the signal reach an extern-connected output without being
///   consumed purely as control along the way (discriminating traversal)?
/// - *select*: does the signal reach a selection-class port of some node,
///   either directly or transitively (non-discriminating traversal)?
///
/// With deep scan enabled, placeholder nodes are resolved against the
/// instantiated module's own classification, computed on demand and memoized
/// per module type.
pub struct DfsEngine<'e, 'c> {
    modules: &'e [Module<'c>],
    current: usize,
    deep_scan: bool,
    cache: &'e ResultCache,
}

impl<'e, 'c> DfsEngine<'e, 'c> {
    pub fn new(
        modules: &'e [Module<'c>],
        current: usize,
        deep_scan: bool,
        cache: &'e ResultCache,
    ) -> DfsEngine<'e, 'c> {
        assert!(current < modules.len(), "module index out of range");
        DfsEngine { modules, current, deep_scan, cache }
    }

    pub fn current_module(&self) -> &'e Module<'c> {
        &self.modules[self.current]
    }

    pub fn is_deep_scan_enabled(&self) -> bool {
        self.deep_scan
    }

    /// Classifies a single node: can anything leaving it reach a data sink,
    /// and can anything leaving it land in a selection-class port. Both
    /// searches start from fresh visited sets.
    pub fn analyze_node(&self, node: &Node) -> Role {
        let mut visited = vec![false; self.current_module().graph().len()];
        let data = self.data_reachable(node, &mut visited);
        visited.fill(false);
        let select = self.select_reachable(node, &mut visited);
        Role::new(data, select)
    }

    /// Classifies a single boundary signal.
    ///
    /// Returns [`Role::NONE`] for signals that are not external to the
    /// module. A signal with no pure entry point that still enters the graph
    /// somewhere is pure control. Every pure entry point then contributes its
    /// node verdict, with two adjustments: a signal that also enters a
    /// selection-class port anywhere is select regardless of what the
    /// discriminating search saw, and a placeholder entry only contributes
    /// data if the instantiated module itself uses the entered port as data.
    pub fn analyze_signal(&self, signal: &Signal) -> Role {
        let module = self.current_module();
        if !module.is_external_name(signal.name()) {
            return Role::NONE;
        }

        let starters = module.starting_nodes(signal, true, false);
        if starters.is_empty() {
            if module.starting_nodes(signal, false, false).is_empty() {
                return Role::NONE;
            }
            // Every entry of the signal is a selection port with no other
            // fan-out.
            return Role::SELECT;
        }

        let mut role = Role::NONE;
        // The discriminating starter search drops entries into selection
        // ports before any analysis can see them; a second, undiscriminated
        // pass recovers the select verdict for those entries.
        if self.enters_selection_port(signal) {
            role.select = true;
        }
        for node in starters {
            let mut contribution = self.analyze_node(node);
            if self.deep_scan && node.is_placeholder() && !self.used_as_module_data(node, signal) {
                contribution.data = false;
            }
            role = role.merge(contribution);
        }
        role
    }

    /// Classifies every entering signal of the module, slice by slice.
    ///
    /// Each entering signal is expanded to the differently ranged references
    /// sharing its name (plus itself when single-bit, or when nothing is
    /// bound at any other range), every slice is classified independently,
    /// and a slice renamed straight through to a module output is data by
    /// definition. The per-bit codes of this pass are joined into the
    /// returned buffers; the caller decides when to fold them into the
    /// module's slice structure.
    pub fn full_track_analysis(&self) -> ModuleRoles {
        let module = self.current_module();
        debug!(module = module.name(), deep_scan = self.deep_scan, "classifying boundary signals");

        let mut signals = Vec::new();
        let mut slices: Vec<(Signal, Vec<BitRole>)> = module
            .entering_signals()
            .iter()
            .map(|signal| (signal.clone(), vec![BitRole::None; signal.width().max(0) as usize]))
            .collect();

        for (index, entering) in module.entering_signals().iter().enumerate() {
            let mut expanded = module.find_signal_friends(entering, entering.width() == 1);
            if expanded.is_empty() {
                expanded.push(entering.clone());
            }
            for slice in expanded {
                let mut role = self.analyze_signal(&slice);
                if module.is_coupled_to_output(slice.name()) {
                    role.data = true;
                }
                trace!(module = module.name(), signal = %slice, verdict = %role, "slice classified");

                let buffer = &mut slices[index].1;
                for bit in slice.lsb()..=slice.msb() {
                    let offset = bit - entering.lsb();
                    if offset >= 0 && (offset as usize) < buffer.len() {
                        buffer[offset as usize] = buffer[offset as usize].join(role);
                    }
                }
                signals.push((slice, role));
            }
        }
        ModuleRoles { signals, slices }
    }

    /// The instantiated module's own verdict for a placeholder port: the
    /// OR-reduction over the memoized classification entries sharing the
    /// port's name. Runs (and caches) the submodule's analysis on demand.
    pub fn resolve_submodule_port(&self, node: &Node, port: &Port) -> Role {
        let Some(target) = self.modules.iter().position(|module| module.name() == node.ty()) else {
            warn!(
                module = self.current_module().name(),
                instance = node.name(),
                ty = node.ty(),
                "submodule type not found in design, port left unclassified"
            );
            return Role::NONE;
        };
        self.module_roles(target).role_of(port.name())
    }

    /// The memoized classification of `target`, computing it with a deep-scan
    /// engine sharing this engine's cache when absent. Assumes the
    /// instantiation relation is acyclic.
    pub fn module_roles(&self, target: usize) -> Rc<ModuleRoles> {
        if let Some(cached) = self.cache.get(target) {
            return cached;
        }
        let engine = DfsEngine::new(self.modules, target, true, self.cache);
        let roles = Rc::new(engine.full_track_analysis());
        self.cache.insert(target, roles.clone());
        roles
    }

    fn data_reachable(&self, node: &Node, visited: &mut Vec<bool>) -> bool {
        if node.emits() {
            return true;
        }
        visited[node.id() as usize] = true;
        let graph = self.current_module().graph();
        for next in graph.all_next_nodes(node, true) {
            if !visited[next.id() as usize] && self.data_reachable(next, visited) {
                return true;
            }
        }
        false
    }

    fn select_reachable(&self, node: &Node, visited: &mut Vec<bool>) -> bool {
        visited[node.id() as usize] = true;
        let graph = self.current_module().graph();

        // Direct hops are checked over every outgoing port before recursing.
        let mut select = false;
        for port in node.outputs() {
            for dst in graph.next_nodes(node, port, false) {
                for (dst_port, _matches) in graph.reached_ports(node, port, dst) {
                    if graph.is_selection_port(dst, dst_port) {
                        select = true;
                    }
                }
            }
        }
        if select {
            return true;
        }

        for next in graph.all_next_nodes(node, false) {
            if !visited[next.id() as usize] && self.select_reachable(next, visited) {
                return true;
            }
        }
        false
    }

    /// True iff the signal enters a selection-class port somewhere among its
    /// undiscriminated starting nodes.
    fn enters_selection_port(&self, signal: &Signal) -> bool {
        let module = self.current_module();
        for node in module.starting_nodes(signal, false, false) {
            for port in node.inputs() {
                if port.driving_signals().contains(signal) && module.graph().is_selection_port(node, port) {
                    return true;
                }
            }
        }
        false
    }

    /// True iff some port the signal enters on this placeholder is used as a
    /// data port by the instantiated module, per the scheduler-discovered
    /// role sets or the deep-scan memo.
    fn used_as_module_data(&self, node: &Node, signal: &Signal) -> bool {
        for port in node.inputs() {
            if !port.driving_signals().contains(signal) {
                continue;
            }
            if node.is_module_data_port(port.name()) {
                return true;
            }
            if self.resolve_submodule_port(node, port).data {
                return true;
            }
        }
        false
    }
}
