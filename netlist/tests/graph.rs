use sigrole_netlist::{
    BitRole, CellCatalog, Module, ModuleGraph, Node, Port, Role, Signal, check_module,
};

/// One 2-to-1 mux fed by `A`, `B` and `SEL`, output wired to the boundary.
fn mux_module(catalog: &CellCatalog) -> Module<'_> {
    let mut graph = ModuleGraph::new(catalog);
    graph
        .add_node(
            Node::new("mux0", "$mux")
                .with_port(Port::input("\\A").with_edge(1).with_driving(Signal::bit("A", 0)))
                .with_port(Port::input("\\B").with_edge(2).with_driving(Signal::bit("B", 0)))
                .with_port(Port::input("\\S").with_edge(3).with_driving(Signal::bit("SEL", 0)))
                .with_port(Port::output("\\Y").with_edge(4).with_extern(true).with_driven(Signal::bit("Y", 0))),
        )
        .unwrap();
    Module::new("mux_mod", graph)
        .with_external([Signal::bit("A", 0), Signal::bit("B", 0), Signal::bit("SEL", 0), Signal::bit("Y", 0)])
        .with_entering([Signal::bit("A", 0), Signal::bit("B", 0), Signal::bit("SEL", 0)])
        .with_exiting([Signal::bit("Y", 0)])
}

/// `and0` (fed by `A`, `B`) drives the select input of `mux0`; `mux0` is fed
/// by `C` and emits. Exercises multi-hop traversal.
fn chain_module(catalog: &CellCatalog) -> Module<'_> {
    let mut graph = ModuleGraph::new(catalog);
    graph
        .add_node(
            Node::new("and0", "$and")
                .with_port(Port::input("\\A").with_edge(1).with_driving(Signal::bit("A", 0)))
                .with_port(Port::input("\\B").with_edge(2).with_driving(Signal::bit("B", 0)))
                .with_port(Port::output("\\Y").with_edge(3)),
        )
        .unwrap();
    graph
        .add_node(
            Node::new("mux0", "$mux")
                .with_port(Port::input("\\A").with_edge(4).with_driving(Signal::bit("C", 0)))
                .with_port(Port::input("\\B").with_edge(5))
                .with_port(Port::input("\\S").with_edge(3))
                .with_port(Port::output("\\Y").with_edge(6).with_extern(true).with_driven(Signal::bit("Y", 0))),
        )
        .unwrap();
    Module::new("chain_mod", graph)
        .with_external([Signal::bit("A", 0), Signal::bit("B", 0), Signal::bit("C", 0), Signal::bit("Y", 0)])
        .with_entering([Signal::bit("A", 0), Signal::bit("B", 0), Signal::bit("C", 0)])
        .with_exiting([Signal::bit("Y", 0)])
}

#[test]
fn next_nodes_follows_shared_edges() {
    let catalog = CellCatalog::new();
    let module = chain_module(&catalog);
    let graph = module.graph();

    let and0 = graph.node_named("and0").unwrap();
    let y = and0.port_named("\\Y").unwrap();

    let next = graph.next_nodes(and0, y, false);
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].name(), "mux0");

    // The only edge out of and0 lands in the mux select input, which the
    // discriminating traversal refuses to enter.
    assert!(graph.next_nodes(and0, y, true).is_empty());
}

#[test]
fn next_nodes_never_returns_the_source() {
    let catalog = CellCatalog::new();
    let mut graph = ModuleGraph::new(&catalog);
    // Output looped straight back into the node's own input.
    graph
        .add_node(
            Node::new("loop0", "$not")
                .with_port(Port::input("\\A").with_edge(1))
                .with_port(Port::output("\\Y").with_edge(1)),
        )
        .unwrap();
    let node = graph.node_named("loop0").unwrap();
    assert!(graph.all_next_nodes(node, false).is_empty());
}

#[test]
fn reached_ports_counts_edge_matches() {
    let catalog = CellCatalog::new();
    let module = chain_module(&catalog);
    let graph = module.graph();

    let and0 = graph.node_named("and0").unwrap();
    let mux0 = graph.node_named("mux0").unwrap();
    let y = and0.port_named("\\Y").unwrap();

    let reached = graph.reached_ports(and0, y, mux0);
    assert_eq!(reached.len(), 1);
    assert_eq!(reached[0].0.name(), "\\S");
    assert_eq!(reached[0].1, 1);

    // A port that does not belong to the claimed source yields nothing.
    let stray = mux0.port_named("\\Y").unwrap();
    assert!(graph.reached_ports(and0, stray, mux0).is_empty());
}

#[test]
fn reached_ports_counts_every_shared_bit() {
    let catalog = CellCatalog::new();
    let mut graph = ModuleGraph::new(&catalog);
    graph
        .add_node(
            Node::new("src", "$add")
                .with_port(Port::input("\\A").with_edges([1, 2]).with_driving(Signal::new("A", 1, 0)))
                .with_port(Port::input("\\B").with_edges([3, 4]).with_driving(Signal::new("B", 1, 0)))
                .with_port(Port::output("\\Y").with_edges([5, 6])),
        )
        .unwrap();
    graph
        .add_node(
            Node::new("dst", "$not")
                .with_port(Port::input("\\A").with_edges([5, 6]).with_driving(Signal::new("T", 1, 0)))
                .with_port(Port::output("\\Y").with_edges([7, 8]).with_extern(true)),
        )
        .unwrap();

    let src = graph.node_named("src").unwrap();
    let dst = graph.node_named("dst").unwrap();
    let y = src.port_named("\\Y").unwrap();
    let reached = graph.reached_ports(src, y, dst);
    assert_eq!(reached.len(), 1);
    assert_eq!(reached[0].1, 2);
}

#[test]
fn rendering_lists_nodes_and_ports() {
    let catalog = CellCatalog::new();
    let module = mux_module(&catalog);
    let rendered = module.graph().to_string();
    assert!(rendered.starts_with("graph with 1 node(s)"));
    assert!(rendered.contains("cell mux0 ($mux)"));
    assert!(rendered.contains("input \\S"));
    assert!(rendered.contains("output \\Y (extern)"));
    assert!(rendered.contains("SEL [0:0]"));
}

#[test]
fn unknown_node_id_is_none() {
    let catalog = CellCatalog::new();
    let graph = ModuleGraph::new(&catalog);
    assert!(graph.node(7).is_none());
    assert!(graph.node_named("nope").is_none());
}

#[test]
fn duplicate_node_name_is_rejected() {
    let catalog = CellCatalog::new();
    let mut graph = ModuleGraph::new(&catalog);
    assert!(graph.add_node(Node::new("n0", "$and")).is_some());
    assert!(graph.add_node(Node::new("n0", "$or")).is_none());
    assert_eq!(graph.len(), 1);
}

#[test]
fn starting_nodes_discriminates_selection_entries() {
    let catalog = CellCatalog::new();
    let module = mux_module(&catalog);

    let sel = Signal::bit("SEL", 0);
    assert!(module.starting_nodes(&sel, true, false).is_empty());
    let loose = module.starting_nodes(&sel, false, false);
    assert_eq!(loose.len(), 1);
    assert_eq!(loose[0].name(), "mux0");

    let a = Signal::bit("A", 0);
    assert_eq!(module.starting_nodes(&a, true, false).len(), 1);

    // Unknown signals fail closed.
    assert!(module.starting_nodes(&Signal::bit("ghost", 0), false, false).is_empty());
}

#[test]
fn starting_nodes_by_name_ignores_ranges() {
    let catalog = CellCatalog::new();
    let module = mux_module(&catalog);
    let wide = Signal::new("A", 7, 0);
    // "A" is external with another range; by-name matching still finds the
    // bound occurrence, exact matching does not.
    assert!(module.starting_nodes(&wide, false, false).is_empty());
    assert!(!module.starting_nodes(&wide, false, true).is_empty());
}

#[test]
fn placeholder_discrimination_uses_discovered_roles() {
    let catalog = CellCatalog::new();
    let mut graph = ModuleGraph::new(&catalog);
    graph
        .add_node(
            Node::placeholder("u0", "child")
                .with_port(Port::input("S").with_edge(1).with_driving(Signal::bit("PS", 0)))
                .with_port(Port::output("Q").with_edge(2)),
        )
        .unwrap();
    let mut module = Module::new("top", graph)
        .with_external([Signal::bit("PS", 0)])
        .with_entering([Signal::bit("PS", 0)])
        .with_inner([("u0", "child")]);

    let ps = Signal::bit("PS", 0);
    // Before any role is discovered the placeholder does not discriminate.
    assert_eq!(module.starting_nodes(&ps, true, false).len(), 1);

    module.graph_mut().nodes_mut()[0].mark_module_port("S", false, true);
    assert!(module.starting_nodes(&ps, true, false).is_empty());

    // A port that is data as well as selection stops discriminating.
    module.graph_mut().nodes_mut()[0].mark_module_port("S", true, false);
    assert_eq!(module.starting_nodes(&ps, true, false).len(), 1);
}

#[test]
fn signal_friends_share_the_name() {
    let catalog = CellCatalog::new();
    let mut graph = ModuleGraph::new(&catalog);
    graph
        .add_node(
            Node::new("m0", "$mux")
                .with_port(Port::input("\\A").with_edge(1).with_driving(Signal::new("W", 3, 2)))
                .with_port(Port::input("\\S").with_edge(2).with_driving(Signal::new("W", 1, 0)))
                .with_port(Port::output("\\Y").with_edge(3)),
        )
        .unwrap();
    let module = Module::new("m", graph)
        .with_external([Signal::new("W", 3, 0)])
        .with_entering([Signal::new("W", 3, 0)]);

    let w = Signal::new("W", 3, 0);
    let friends = module.find_signal_friends(&w, false);
    assert_eq!(friends, vec![Signal::new("W", 3, 2), Signal::new("W", 1, 0)]);

    let with_self = module.find_signal_friends(&w, true);
    assert_eq!(with_self.len(), 3);
    assert!(with_self.contains(&w));
}

#[test]
fn receivers_and_emitters() {
    let catalog = CellCatalog::new();
    let module = chain_module(&catalog);

    let receivers = module.signal_receivers(false);
    assert_eq!(receivers.len(), 2);

    let emitters = module.signal_emitters();
    assert_eq!(emitters.len(), 1);
    assert_eq!(emitters[0].name(), "mux0");
    assert_eq!(emitters[0].output_signals().count(), 1);
    assert_eq!(emitters[0].input_signals().count(), 1);
    assert!(module.is_atomic());
}

#[test]
fn merge_slices_joins_upward() {
    let catalog = CellCatalog::new();
    let graph = ModuleGraph::new(&catalog);
    let mut module = Module::new("m", graph).with_entering([Signal::new("W", 1, 0)]).with_external([Signal::new(
        "W", 1, 0,
    )]);

    module.merge_slices(&[(Signal::new("W", 1, 0), vec![BitRole::Data, BitRole::None])]);
    assert_eq!(module.slice_for(&Signal::new("W", 1, 0)).unwrap(), &[BitRole::Data, BitRole::None]);

    module.merge_slices(&[(Signal::new("W", 1, 0), vec![BitRole::Select, BitRole::None])]);
    assert_eq!(module.slice_for(&Signal::new("W", 1, 0)).unwrap(), &[BitRole::Both, BitRole::None]);

    // Joining lower codes never loses information.
    module.merge_slices(&[(Signal::new("W", 1, 0), vec![BitRole::None, BitRole::None])]);
    assert_eq!(module.slice_for(&Signal::new("W", 1, 0)).unwrap(), &[BitRole::Both, BitRole::None]);
}

#[test]
fn check_battery_accepts_consistent_module() {
    let catalog = CellCatalog::new();
    let module = mux_module(&catalog);
    assert!(check_module(&module).is_empty());
}

#[test]
fn check_battery_flags_misused_ports() {
    let catalog = CellCatalog::new();
    let mut graph = ModuleGraph::new(&catalog);
    graph
        .add_node(
            Node::new("bad", "$and")
                .with_port(Port::input("\\A").with_edge(1).with_driven(Signal::bit("X", 0)))
                .with_port(Port::input("\\B").with_edge(2).with_extern(true))
                .with_port(Port::output("\\Y").with_edge(3).with_driving(Signal::bit("X", 0))),
        )
        .unwrap();
    let module = Module::new("m", graph);
    let errors = check_module(&module);
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().all(|error| error.module == "m"));
}

#[test]
fn check_battery_flags_boundary_mismatch() {
    let catalog = CellCatalog::new();
    let mut graph = ModuleGraph::new(&catalog);
    graph
        .add_node(Node::new("n0", "$and").with_port(Port::output("\\Y").with_edge(1)))
        .unwrap();
    // Exiting signal declared, but no node emits; entering signal declared,
    // but nothing receives it; and the entering signal is not external.
    let module = Module::new("m", graph)
        .with_entering([Signal::bit("A", 0)])
        .with_exiting([Signal::bit("Y", 0)])
        .with_external([Signal::bit("Y", 0)]);
    let errors = check_module(&module);
    assert_eq!(errors.len(), 3);
}

#[test]
fn check_battery_flags_placeholder_mismatch() {
    let catalog = CellCatalog::new();
    let mut graph = ModuleGraph::new(&catalog);
    graph.add_node(Node::placeholder("u0", "child")).unwrap();
    let module = Module::new("m", graph).with_inner([("u1", "child")]);
    let errors = check_module(&module);
    // u0 is not listed, and u1 has no node.
    assert_eq!(errors.len(), 2);

    let role = Role::new(true, false);
    assert_eq!(role.merge(Role::SELECT), Role::new(true, true));
}
