use std::fmt::Display;

use crate::{CellCatalog, Node, Port};

/// The connectivity graph of one module.
///
/// Nodes are stored in insertion order; a node's id is its slot in the store
/// and is assigned by [`ModuleGraph::add_node`]. The catalog is shared by
/// reference: one immutable instance serves every graph of a design.
#[derive(Debug)]
pub struct ModuleGraph<'c> {
    catalog: &'c CellCatalog,
    nodes: Vec<Node>,
}

impl<'c> ModuleGraph<'c> {
    pub fn new(catalog: &'c CellCatalog) -> ModuleGraph<'c> {
        ModuleGraph { catalog, nodes: Vec::new() }
    }

    pub fn catalog(&self) -> &'c CellCatalog {
        self.catalog
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a node, assigning its id. Returns `None` (and drops the node)
    /// when its name collides with an existing node; names are unique within
    /// a graph.
    pub fn add_node(&mut self, mut node: Node) -> Option<u32> {
        if self.node_named(node.name()).is_some() {
            return None;
        }
        let id = self.nodes.len() as u32;
        node.assign_id(id);
        self.nodes.push(node);
        Some(id)
    }

    pub fn node(&self, id: u32) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    pub fn node_mut(&mut self, id: u32) -> Option<&mut Node> {
        self.nodes.get_mut(id as usize)
    }

    pub fn node_named(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name() == name)
    }

    /// True iff the target port counts as selection-class on its owning node:
    /// a catalog selection input for an atomic node, or a discovered
    /// select-only module port for a placeholder.
    pub fn is_selection_port(&self, node: &Node, port: &Port) -> bool {
        if node.is_placeholder() {
            node.is_select_only_port(port.name())
        } else {
            match self.catalog.get(node.ty()) {
                Some(info) => info.is_select_input(port.name()),
                None => false,
            }
        }
    }

    /// Nodes reachable in one hop from `node` through `port`: every other
    /// node with an input-capable port sharing an edge id with `port`.
    ///
    /// With `discriminating` set, a match landing in a selection-class port
    /// is ignored; the target node is still returned if some other, non-
    /// selection port of it matches. A node is never its own neighbor, and
    /// the result holds no duplicates.
    pub fn next_nodes(&self, node: &Node, port: &Port, discriminating: bool) -> Vec<&Node> {
        let mut next: Vec<&Node> = Vec::new();
        let Some(port) = node.outputs().find(|out| out.name() == port.name()) else {
            return next;
        };
        for edge in port.edges() {
            for other in &self.nodes {
                if other.id() == node.id() {
                    continue;
                }
                for input in other.inputs() {
                    if !input.has_edge(edge) {
                        continue;
                    }
                    if discriminating && self.is_selection_port(other, input) {
                        continue;
                    }
                    if !next.iter().any(|found| found.id() == other.id()) {
                        next.push(other);
                    }
                }
            }
        }
        next
    }

    /// Union of [`ModuleGraph::next_nodes`] over every output/inout port.
    pub fn all_next_nodes(&self, node: &Node, discriminating: bool) -> Vec<&Node> {
        let mut reachable: Vec<&Node> = Vec::new();
        for port in node.outputs() {
            for next in self.next_nodes(node, port, discriminating) {
                if !reachable.iter().any(|found| found.id() == next.id()) {
                    reachable.push(next);
                }
            }
        }
        reachable
    }

    /// For a forward hop from `source_port` to `dst`, the input ports of
    /// `dst` together with their positive edge-match counts. Empty when
    /// `source_port` does not belong to `source`.
    pub fn reached_ports<'n>(&self, source: &Node, source_port: &Port, dst: &'n Node) -> Vec<(&'n Port, usize)> {
        if source.port(source_port.id()).is_none_or(|port| port.name() != source_port.name()) {
            return Vec::new();
        }
        dst.inputs()
            .map(|input| (input, source_port.shared_edges(input)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

impl Display for ModuleGraph<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "graph with {} node(s)", self.nodes.len())?;
        for node in &self.nodes {
            write!(f, "\n{node}")?;
        }
        Ok(())
    }
}
