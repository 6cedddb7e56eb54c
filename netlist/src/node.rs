use std::fmt::Display;

use indexmap::IndexSet;

use crate::{Port, PortDirection, Signal};

/// One node of a module graph: a primitive cell instance, or a placeholder
/// standing in for an instantiated submodule.
///
/// Ports are partitioned by direction; [`Node::inputs`] and [`Node::outputs`]
/// both include inout ports, which is the form every traversal wants. For a
/// placeholder, the roles its input ports play *inside* the instantiated
/// module are not known at construction; they are discovered by the hierarchy
/// scheduler and accumulated in the module-data / module-selection name sets.
#[derive(Debug, Clone)]
pub struct Node {
    id: u32,
    name: String,
    ty: String,
    placeholder: bool,
    input_ports: Vec<Port>,
    output_ports: Vec<Port>,
    inout_ports: Vec<Port>,
    module_data_ports: IndexSet<String>,
    module_select_ports: IndexSet<String>,
}

impl Node {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Node {
        Node {
            id: 0,
            name: name.into(),
            ty: ty.into(),
            placeholder: false,
            input_ports: Vec::new(),
            output_ports: Vec::new(),
            inout_ports: Vec::new(),
            module_data_ports: IndexSet::new(),
            module_select_ports: IndexSet::new(),
        }
    }

    /// A node standing in for an instance of the module type `ty`.
    pub fn placeholder(name: impl Into<String>, ty: impl Into<String>) -> Node {
        Node { placeholder: true, ..Node::new(name, ty) }
    }

    pub fn with_port(mut self, port: Port) -> Node {
        self.add_port(port);
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: u32) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &str {
        &self.ty
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Adds a port, assigning it the next id unique within this node.
    pub fn add_port(&mut self, mut port: Port) -> u32 {
        let id = (self.input_ports.len() + self.output_ports.len() + self.inout_ports.len()) as u32;
        port.assign_id(id);
        match port.direction() {
            PortDirection::Input => self.input_ports.push(port),
            PortDirection::Output => self.output_ports.push(port),
            PortDirection::Inout => self.inout_ports.push(port),
        }
        id
    }

    /// Input-capable ports: inputs, then inouts.
    pub fn inputs(&self) -> impl Iterator<Item = &Port> {
        self.input_ports.iter().chain(self.inout_ports.iter())
    }

    /// Output-capable ports: outputs, then inouts.
    pub fn outputs(&self) -> impl Iterator<Item = &Port> {
        self.output_ports.iter().chain(self.inout_ports.iter())
    }

    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.input_ports.iter().chain(self.output_ports.iter()).chain(self.inout_ports.iter())
    }

    pub fn port(&self, id: u32) -> Option<&Port> {
        self.ports().find(|port| port.id() == id)
    }

    pub fn port_named(&self, name: &str) -> Option<&Port> {
        self.ports().find(|port| port.name() == name)
    }

    /// True iff at least one output/inout port is wired to the module
    /// boundary.
    pub fn emits(&self) -> bool {
        self.outputs().any(|port| port.is_extern_connected())
    }

    /// Signals feeding any input-capable port.
    pub fn input_signals(&self) -> impl Iterator<Item = &Signal> {
        self.inputs().flat_map(|port| port.driving_signals().iter())
    }

    /// Signals driven by any output-capable port.
    pub fn output_signals(&self) -> impl Iterator<Item = &Signal> {
        self.outputs().flat_map(|port| port.driven_signals().iter())
    }

    /// Records a role discovered for one of this placeholder's input ports.
    /// Ports that do not exist on the input side are ignored.
    pub fn mark_module_port(&mut self, port_name: &str, data: bool, select: bool) {
        if !self.inputs().any(|port| port.name() == port_name) {
            return;
        }
        if data {
            self.module_data_ports.insert(port_name.to_owned());
        }
        if select {
            self.module_select_ports.insert(port_name.to_owned());
        }
    }

    pub fn module_data_ports(&self) -> impl Iterator<Item = &str> {
        self.module_data_ports.iter().map(String::as_str)
    }

    pub fn module_select_ports(&self) -> impl Iterator<Item = &str> {
        self.module_select_ports.iter().map(String::as_str)
    }

    pub fn is_module_data_port(&self, port_name: &str) -> bool {
        self.module_data_ports.contains(port_name)
    }

    pub fn is_module_select_port(&self, port_name: &str) -> bool {
        self.module_select_ports.contains(port_name)
    }

    /// True iff the port was discovered as a selection port and never as a
    /// data port. A port playing both roles does not discriminate.
    pub fn is_select_only_port(&self, port_name: &str) -> bool {
        self.module_select_ports.contains(port_name) && !self.module_data_ports.contains(port_name)
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {} ({})", if self.placeholder { "instance" } else { "cell" }, self.name, self.ty)?;
        for port in self.ports() {
            write!(f, "\n  {port}")?;
        }
        Ok(())
    }
}
