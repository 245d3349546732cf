use metromap::geom::point;
use metromap::{Line, Link, Node, NodeKind, Topology, TopologyError};

fn corridor() -> Topology {
    Topology::new(
        vec![
            Node::new("a", 0.0, 0.0),
            Node::new("b", 10.0, 0.0),
            Node::new("c", 20.0, 0.0),
        ],
        vec![
            Link::new("ab", "a", "b").on_lines(["red", "blue"]),
            Link::new("bc", "b", "c").on_lines(["red"]),
        ],
        vec![
            Line::new("red", ["a", "b", "c"]),
            Line::new("blue", ["b", "a"]),
        ],
    )
    .expect("valid corridor")
}

fn stops(t: &Topology, line: &str) -> Vec<String> {
    t.line(line).expect("line").nodes.clone()
}

#[test]
fn insert_bend_splits_link_and_every_line_through_it() {
    let mut t = corridor();
    let dummy = t.insert_bend("ab", point(5.0, 5.0)).expect("insert");
    assert_eq!(dummy, "dummy0");

    let node = t.node(&dummy).expect("dummy node");
    assert!(node.is_dummy());
    assert_eq!((node.x, node.y), (5.0, 5.0));
    assert_eq!(node.label, None);
    assert_eq!(
        node.edges.get("red"),
        Some(&["ab".to_string(), "dummy0-link".to_string()])
    );
    assert_eq!(node.edges.get("blue"), node.edges.get("red"));

    let original = t.link("ab").expect("ab");
    assert_eq!((original.source.as_str(), original.target.as_str()), ("a", "dummy0"));
    let added = t.link("dummy0-link").expect("new link");
    assert_eq!((added.source.as_str(), added.target.as_str()), ("dummy0", "b"));
    assert_eq!(added.path, vec!["red".to_string(), "blue".to_string()]);

    assert_eq!(stops(&t, "red"), ["a", "dummy0", "b", "c"]);
    assert_eq!(stops(&t, "blue"), ["b", "dummy0", "a"]);
    t.validate().expect("still consistent");
}

#[test]
fn remove_bend_restores_the_original_graph() {
    let mut t = corridor();
    let nodes: Vec<Node> = t.nodes().cloned().collect();
    let links: Vec<Link> = t.links().cloned().collect();
    let lines: Vec<Line> = t.lines().cloned().collect();

    let dummy = t.insert_bend("ab", point(5.0, 5.0)).expect("insert");
    t.remove_bend(&dummy).expect("remove");

    assert_eq!(t.nodes().cloned().collect::<Vec<_>>(), nodes);
    assert_eq!(t.links().cloned().collect::<Vec<_>>(), links);
    assert_eq!(t.lines().cloned().collect::<Vec<_>>(), lines);
    assert_eq!(t.dummy_counter(), 1);
}

#[test]
fn chained_bends_keep_dummy_edges_consistent() {
    let mut t = corridor();
    let first = t.insert_bend("ab", point(5.0, 5.0)).expect("first");
    let second = t.insert_bend("dummy0-link", point(7.0, 5.0)).expect("second");
    // Splitting the incoming link of an existing dummy re-routes that dummy's incoming edge.
    let third = t.insert_bend("ab", point(2.0, 5.0)).expect("third");
    t.validate().expect("consistent after inserts");

    assert_eq!(stops(&t, "red"), ["a", "dummy2", "dummy0", "dummy1", "b", "c"]);
    assert_eq!(
        t.node(&first).and_then(|n| n.edges.get("red")),
        Some(&["dummy2-link".to_string(), "dummy0-link".to_string()])
    );

    t.remove_bend(&third).expect("remove third");
    t.validate().expect("consistent after removing third");
    assert_eq!(
        t.node(&first).and_then(|n| n.edges.get("red")),
        Some(&["ab".to_string(), "dummy0-link".to_string()])
    );
    t.remove_bend(&second).expect("remove second");
    t.remove_bend(&first).expect("remove first");
    assert_eq!(stops(&t, "red"), ["a", "b", "c"]);
    assert_eq!(t.node_count(), 3);
    assert_eq!(t.link_count(), 2);
}

#[test]
fn bend_ids_skip_ids_already_taken() {
    let mut t = Topology::new(
        vec![
            Node::new("a", 0.0, 0.0),
            Node::new("b", 10.0, 0.0),
            Node::new("dummy0", 20.0, 0.0),
        ],
        vec![Link::new("ab", "a", "b").on_lines(["red"])],
        vec![Line::new("red", ["a", "b"])],
    )
    .expect("valid");
    assert_eq!(t.insert_bend("ab", point(5.0, 0.0)).expect("insert"), "dummy1");
}

#[test]
fn degenerate_bend_requests_are_rejected_without_changes() {
    let mut t = Topology::new(
        vec![Node::new("a", 0.0, 0.0), Node::new("b", 1.0, 0.0)],
        vec![Link::new("aa", "a", "a"), Link::new("ab", "a", "b")],
        Vec::new(),
    )
    .expect("valid");

    assert!(matches!(
        t.insert_bend("aa", point(0.0, 0.0)),
        Err(TopologyError::SelfLoop { .. })
    ));
    assert!(matches!(
        t.insert_bend("ab", point(0.0, 0.0)),
        Err(TopologyError::Lineless { .. })
    ));
    assert!(matches!(
        t.insert_bend("gone", point(0.0, 0.0)),
        Err(TopologyError::UnknownLink { .. })
    ));
    assert_eq!(
        t.remove_bend("a"),
        Err(TopologyError::NotDummy {
            id: "a".to_string()
        })
    );
    assert_eq!((t.node_count(), t.link_count()), (2, 2));
    assert_eq!(t.dummy_counter(), 0);
}

#[test]
fn dragging_a_pinned_node_moves_the_pinned_group() {
    let mut t = Topology::new(
        vec![
            Node::new("a", 0.0, 0.0).pinned(),
            Node::new("b", 10.0, 10.0).pinned(),
            Node::new("c", 20.0, 0.0),
        ],
        Vec::new(),
        Vec::new(),
    )
    .expect("valid");

    let delta = t.drag_to("a", point(3.0, 4.0)).expect("drag");
    assert_eq!((delta.x, delta.y), (3.0, 4.0));
    let b = t.node("b").expect("b");
    assert_eq!((b.x, b.y, b.px, b.py), (13.0, 14.0, 13.0, 14.0));
    let c = t.node("c").expect("c");
    assert_eq!((c.x, c.y), (20.0, 0.0));

    t.drag_to("c", point(25.0, 1.0)).expect("drag free");
    assert_eq!(t.node("c").map(|n| (n.x, n.y)), Some((25.0, 1.0)));
    assert_eq!(t.node("a").map(|n| (n.x, n.y)), Some((3.0, 4.0)));
}

#[test]
fn interaction_flags_are_independent_of_the_pin() {
    let mut t = corridor();
    t.set_dragging("a", true).expect("drag");
    t.set_hover("a", true).expect("hover");
    let a = t.node("a").expect("a");
    assert!(a.dragging && a.hover && !a.fixed);

    assert!(t.toggle_fixed("b").expect("toggle"));
    assert!(!t.toggle_fixed("b").expect("toggle"));
    t.set_fixed("c", true).expect("pin");
    assert_eq!(t.clear_fixed(), 1);
    assert!(t.nodes().all(|n| !n.fixed));
}

#[test]
fn selection_by_id() {
    let mut t = corridor();
    t.select_only("b").expect("select");
    assert_eq!(t.selected_ids(), ["b"]);
    assert_eq!(t.set_selection(["a", "missing", "c"]), 2);
    assert_eq!(t.selected_ids(), ["a", "c"]);
    t.clear_selection();
    assert!(t.selected_ids().is_empty());
    assert!(t.select_only("missing").is_err());
}

fn dummy(id: &str, x: f64, y: f64, edges: &[(&str, &str, &str)]) -> Node {
    let mut node = Node::new(id, x, y);
    node.kind = NodeKind::Dummy;
    for (line, incoming, outgoing) in edges {
        node.edges
            .insert(line.to_string(), [incoming.to_string(), outgoing.to_string()]);
    }
    node
}

type Snapshot = (Vec<Node>, Vec<Link>, Vec<Line>);

fn snapshot(t: &Topology) -> Snapshot {
    (
        t.nodes().cloned().collect(),
        t.links().cloned().collect(),
        t.lines().cloned().collect(),
    )
}

fn assert_unbend_rejected(mut t: Topology, node: &str) -> TopologyError {
    let before = snapshot(&t);
    let err = t.remove_bend(node).expect_err("removal must be rejected");
    assert_eq!(snapshot(&t), before, "rejected removal changed the graph");
    err
}

#[test]
fn unchained_dummy_edges_are_rejected_on_construction() {
    let err = Topology::new(
        vec![
            Node::new("a", 0.0, 0.0),
            Node::new("b", 10.0, 0.0),
            dummy("d", 5.0, 5.0, &[("red", "db", "ad")]),
        ],
        vec![
            Link::new("ad", "a", "d").on_lines(["red"]),
            Link::new("db", "d", "b").on_lines(["red"]),
        ],
        vec![Line::new("red", ["a", "d", "b"])],
    )
    .expect_err("reversed pair does not chain");
    assert_eq!(err, TopologyError::BrokenChain { id: "d".to_string() });
}

#[test]
fn unbend_rejects_a_dummy_touched_by_another_link() {
    let t = Topology::new(
        vec![
            Node::new("a", 0.0, 0.0),
            Node::new("b", 10.0, 0.0),
            Node::new("c", 5.0, 10.0),
            dummy("d", 5.0, 5.0, &[("red", "ad", "db")]),
        ],
        vec![
            Link::new("ad", "a", "d").on_lines(["red"]),
            Link::new("db", "d", "b").on_lines(["red"]),
            Link::new("cd", "c", "d"),
        ],
        vec![Line::new("red", ["a", "d", "b"])],
    )
    .expect("valid");
    assert_eq!(
        assert_unbend_rejected(t, "d"),
        TopologyError::BrokenChain { id: "d".to_string() }
    );
}

#[test]
fn unbend_rejects_disagreeing_edge_pairs() {
    let t = Topology::new(
        vec![
            Node::new("a", 0.0, 0.0),
            Node::new("b", 10.0, 0.0),
            dummy("d", 5.0, 5.0, &[("red", "ad", "db"), ("blue", "ad2", "db2")]),
        ],
        vec![
            Link::new("ad", "a", "d").on_lines(["red"]),
            Link::new("db", "d", "b").on_lines(["red"]),
            Link::new("ad2", "a", "d").on_lines(["blue"]),
            Link::new("db2", "d", "b").on_lines(["blue"]),
        ],
        vec![
            Line::new("red", ["a", "d", "b"]),
            Line::new("blue", ["a", "d", "b"]),
        ],
    )
    .expect("valid");
    assert!(matches!(
        assert_unbend_rejected(t, "d"),
        TopologyError::BrokenChain { .. }
    ));
}

#[test]
fn unbend_rejects_a_line_visiting_the_dummy_without_an_edge_entry() {
    let t = Topology::new(
        vec![
            Node::new("a", 0.0, 0.0),
            Node::new("b", 10.0, 0.0),
            dummy("d", 5.0, 5.0, &[("red", "ad", "db")]),
        ],
        vec![
            Link::new("ad", "a", "d").on_lines(["red", "blue"]),
            Link::new("db", "d", "b").on_lines(["red"]),
        ],
        vec![
            Line::new("red", ["a", "d", "b"]),
            Line::new("blue", ["a", "d"]),
        ],
    )
    .expect("valid");
    assert!(matches!(
        assert_unbend_rejected(t, "d"),
        TopologyError::BrokenChain { .. }
    ));
}

#[test]
fn unbend_rejects_a_bridge_that_would_loop() {
    let t = Topology::new(
        vec![
            Node::new("a", 0.0, 0.0),
            dummy("d", 5.0, 5.0, &[("red", "ad", "da")]),
        ],
        vec![
            Link::new("ad", "a", "d").on_lines(["red"]),
            Link::new("da", "d", "a").on_lines(["red"]),
        ],
        vec![Line::new("red", ["a", "d", "a"])],
    )
    .expect("valid");
    assert_eq!(
        assert_unbend_rejected(t, "d"),
        TopologyError::SelfLoop {
            link: "ad".to_string(),
            node: "a".to_string()
        }
    );
}
