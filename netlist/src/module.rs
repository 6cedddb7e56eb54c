use crate::{BitRole, ModuleGraph, Node, Signal};

/// One module of the design: its connectivity graph plus everything derived
/// from the boundary declarations by the netlist extraction step.
///
/// `entering`/`exiting` are the subsets of the external signals driven from
/// outside and driving outside, already corrected for renaming; `coupled`
/// records `(new_name, old_name)` pairs for signals renamed end-to-end
/// between the boundary and internal use. `inner` lists `(instance, type)`
/// for every placeholder node. The slice structure holds one per-bit
/// classification buffer per entering signal (bit 0 is the lsb); it starts
/// all-`None` and is only ever joined upward by the scheduler.
#[derive(Debug)]
pub struct Module<'c> {
    name: String,
    graph: ModuleGraph<'c>,
    external: Vec<Signal>,
    entering: Vec<Signal>,
    exiting: Vec<Signal>,
    inout: Vec<Signal>,
    coupled: Vec<(String, String)>,
    inner: Vec<(String, String)>,
    slices: Vec<(Signal, Vec<BitRole>)>,
}

impl<'c> Module<'c> {
    pub fn new(name: impl Into<String>, graph: ModuleGraph<'c>) -> Module<'c> {
        Module {
            name: name.into(),
            graph,
            external: Vec::new(),
            entering: Vec::new(),
            exiting: Vec::new(),
            inout: Vec::new(),
            coupled: Vec::new(),
            inner: Vec::new(),
            slices: Vec::new(),
        }
    }

    pub fn with_external(mut self, signals: impl IntoIterator<Item = Signal>) -> Module<'c> {
        self.external.extend(signals);
        self
    }

    /// Registers the entering signals and allocates their slice buffers.
    pub fn with_entering(mut self, signals: impl IntoIterator<Item = Signal>) -> Module<'c> {
        for signal in signals {
            let width = signal.width().max(0) as usize;
            self.slices.push((signal.clone(), vec![BitRole::None; width]));
            self.entering.push(signal);
        }
        self
    }

    pub fn with_exiting(mut self, signals: impl IntoIterator<Item = Signal>) -> Module<'c> {
        self.exiting.extend(signals);
        self
    }

    pub fn with_inout(mut self, signals: impl IntoIterator<Item = Signal>) -> Module<'c> {
        self.inout.extend(signals);
        self
    }

    /// Registers `(new_name, old_name)` rename pairs.
    pub fn with_coupled(
        mut self,
        pairs: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Module<'c> {
        self.coupled.extend(pairs.into_iter().map(|(new, old)| (new.into(), old.into())));
        self
    }

    /// Registers `(instance, type)` pairs for the placeholder nodes.
    pub fn with_inner(
        mut self,
        pairs: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Module<'c> {
        self.inner.extend(pairs.into_iter().map(|(inst, ty)| (inst.into(), ty.into())));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &ModuleGraph<'c> {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut ModuleGraph<'c> {
        &mut self.graph
    }

    pub fn external_signals(&self) -> &[Signal] {
        &self.external
    }

    pub fn entering_signals(&self) -> &[Signal] {
        &self.entering
    }

    pub fn exiting_signals(&self) -> &[Signal] {
        &self.exiting
    }

    pub fn inout_signals(&self) -> &[Signal] {
        &self.inout
    }

    pub fn coupled_signals(&self) -> &[(String, String)] {
        &self.coupled
    }

    pub fn inner_modules(&self) -> &[(String, String)] {
        &self.inner
    }

    /// True iff the module instantiates no submodules.
    pub fn is_atomic(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_external_name(&self, name: &str) -> bool {
        self.external.iter().any(|signal| signal.name() == name)
    }

    /// True iff `name` is the entering side of a rename pair, i.e. the signal
    /// is wired straight through to a module output under another name.
    pub fn is_coupled_to_output(&self, name: &str) -> bool {
        self.coupled.iter().any(|(_, old)| old == name)
    }

    /// Every node where `signal` enters through an input-capable port.
    ///
    /// Matching is by full equality, or by name alone with `by_name_only`.
    /// With `discriminating` set, a match into a selection-class port is
    /// suppressed; the node is still found if the signal also enters it
    /// through a non-selection port. Fails closed when the signal is not
    /// external to this module. The result is deduplicated by node.
    pub fn starting_nodes(&self, signal: &Signal, discriminating: bool, by_name_only: bool) -> Vec<&Node> {
        if !self.is_external_name(signal.name()) {
            return Vec::new();
        }
        let mut starters: Vec<&Node> = Vec::new();
        for node in self.graph.nodes() {
            'ports: for port in node.inputs() {
                for bound in port.driving_signals() {
                    let matched = if by_name_only { bound.same_name(signal) } else { bound == signal };
                    if !matched {
                        continue;
                    }
                    if discriminating && self.graph.is_selection_port(node, port) {
                        continue;
                    }
                    starters.push(node);
                    break 'ports;
                }
            }
        }
        starters
    }

    /// All bit-range references sharing `signal`'s name found on any port of
    /// the graph. The signal itself is appended (if not already found) with
    /// `include_self`, and stripped otherwise.
    pub fn find_signal_friends(&self, signal: &Signal, include_self: bool) -> Vec<Signal> {
        let mut friends: Vec<Signal> = Vec::new();
        for node in self.graph.nodes() {
            for port in node.ports() {
                for bound in port.signals() {
                    if bound.same_name(signal) && !friends.contains(bound) {
                        friends.push(bound.clone());
                    }
                }
            }
        }
        if include_self {
            if !friends.contains(signal) {
                friends.push(signal.clone());
            }
        } else {
            friends.retain(|friend| friend != signal);
        }
        friends
    }

    /// Nodes where some entering signal enters, matched by name.
    pub fn signal_receivers(&self, discriminating: bool) -> Vec<&Node> {
        let mut receivers: Vec<&Node> = Vec::new();
        for signal in &self.entering {
            for node in self.starting_nodes(signal, discriminating, true) {
                if !receivers.iter().any(|found| found.id() == node.id()) {
                    receivers.push(node);
                }
            }
        }
        receivers
    }

    /// Nodes with an extern-connected output.
    pub fn signal_emitters(&self) -> Vec<&Node> {
        self.graph.nodes().iter().filter(|node| node.emits()).collect()
    }

    pub fn slice_structure(&self) -> &[(Signal, Vec<BitRole>)] {
        &self.slices
    }

    pub fn slice_for(&self, signal: &Signal) -> Option<&[BitRole]> {
        self.slices.iter().find(|(own, _)| own == signal).map(|(_, codes)| codes.as_slice())
    }

    /// Joins a pass's per-bit codes into the stored slice structure. Buffers
    /// are matched by entering signal; codes only ever move up the lattice.
    pub fn merge_slices(&mut self, updates: &[(Signal, Vec<BitRole>)]) {
        for (signal, codes) in updates {
            if let Some((_, buffer)) = self.slices.iter_mut().find(|(own, _)| own == signal) {
                for (slot, code) in buffer.iter_mut().zip(codes) {
                    *slot = slot.join(code.as_role());
                }
            }
        }
    }
}
