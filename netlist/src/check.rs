use std::fmt::Display;

use crate::Module;

/// One construction-time consistency violation found in a module.
///
/// Any violation is fatal for the module: the classification engine assumes a
/// consistent graph and gives no meaningful answers on a broken one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckError {
    pub module: String,
    pub node: Option<String>,
    pub message: String,
}

impl Display for CheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.node {
            Some(node) => write!(f, "module {}, node {}: {}", self.module, node, self.message),
            None => write!(f, "module {}: {}", self.module, self.message),
        }
    }
}

impl std::error::Error for CheckError {}

struct Checker<'a, 'c> {
    module: &'a Module<'c>,
    errors: Vec<CheckError>,
}

impl Checker<'_, '_> {
    fn err(&mut self, node: Option<&str>, message: impl Into<String>) {
        self.errors.push(CheckError {
            module: self.module.name().to_owned(),
            node: node.map(str::to_owned),
            message: message.into(),
        });
    }

    fn check_ports(&mut self) {
        for node in self.module.graph().nodes() {
            for port in node.ports() {
                let mut seen = 0;
                for other in node.ports() {
                    if other.name() == port.name() {
                        seen += 1;
                    }
                }
                if seen > 1 {
                    self.err(Some(node.name()), format!("duplicate port name {}", port.name()));
                }
                if port.is_input() {
                    if !port.driven_signals().is_empty() {
                        self.err(Some(node.name()), format!("input port {} carries driven signals", port.name()));
                    }
                    if port.is_extern_connected() {
                        self.err(Some(node.name()), format!("input port {} marked extern-connected", port.name()));
                    }
                } else if port.is_output() && !port.driving_signals().is_empty() {
                    self.err(Some(node.name()), format!("output port {} carries driving signals", port.name()));
                }
            }
        }
    }

    fn check_signal_sets(&mut self) {
        let sets = [
            ("entering", self.module.entering_signals()),
            ("exiting", self.module.exiting_signals()),
            ("inout", self.module.inout_signals()),
        ];
        for (kind, signals) in sets {
            for signal in signals {
                if !self.module.is_external_name(signal.name()) {
                    self.err(None, format!("{kind} signal {signal} is not external"));
                }
            }
        }
    }

    fn check_slices(&mut self) {
        for (signal, buffer) in self.module.slice_structure() {
            if buffer.len() != signal.width().max(0) as usize {
                self.err(
                    None,
                    format!("slice buffer for {signal} has {} codes, expected {}", buffer.len(), signal.width()),
                );
            }
        }
    }

    // A boundary signal must be backed by a node unless it only exists as a
    // rename of another boundary signal; an empty graph (pure pass-through
    // module) has nothing to back it with.
    fn check_boundary_nodes(&mut self) {
        if self.module.graph().is_empty() {
            return;
        }
        let coupled = self.module.coupled_signals();
        let has_uncoupled_exit = self
            .module
            .exiting_signals()
            .iter()
            .any(|signal| !coupled.iter().any(|(new, _)| new == signal.name()));
        if has_uncoupled_exit && self.module.signal_emitters().is_empty() {
            self.err(None, "module has exiting signals but no emitting node");
        }
        let has_uncoupled_entry = self
            .module
            .entering_signals()
            .iter()
            .any(|signal| !coupled.iter().any(|(_, old)| old == signal.name()));
        if has_uncoupled_entry && self.module.signal_receivers(false).is_empty() {
            self.err(None, "module has entering signals but no receiving node");
        }
    }

    fn check_placeholders(&mut self) {
        for node in self.module.graph().nodes() {
            if node.is_placeholder() {
                let listed = self
                    .module
                    .inner_modules()
                    .iter()
                    .any(|(inst, ty)| inst == node.name() && ty == node.ty());
                if !listed {
                    self.err(Some(node.name()), "placeholder not listed among inner modules");
                }
            }
        }
        for (inst, ty) in self.module.inner_modules() {
            match self.module.graph().node_named(inst) {
                None => self.err(None, format!("inner module {inst} ({ty}) has no placeholder node")),
                Some(node) if !node.is_placeholder() => {
                    self.err(Some(inst.as_str()), format!("inner module node is not a placeholder ({ty})"));
                }
                Some(node) if node.ty() != ty => {
                    self.err(
                        Some(inst.as_str()),
                        format!("placeholder type {} does not match inner list ({ty})", node.ty()),
                    );
                }
                Some(_) => {}
            }
        }
    }
}

/// Runs the full battery of independent consistency checks over a module and
/// returns every violation found. An empty result means the module is safe to
/// analyze.
pub fn check_module(module: &Module) -> Vec<CheckError> {
    let mut checker = Checker { module, errors: Vec::new() };
    checker.check_ports();
    checker.check_signal_sets();
    checker.check_slices();
    checker.check_boundary_nodes();
    checker.check_placeholders();
    checker.errors
}
