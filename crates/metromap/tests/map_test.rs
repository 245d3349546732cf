use metromap::geom::point;
use metromap::{
    Error, Line, Link, MetroMap, Mode, Node, PointerEvent, Renderer, Scene, SvgRenderer, Target,
    Topology,
};
use std::cell::Cell;
use std::rc::Rc;

fn triangle() -> Topology {
    Topology::new(
        vec![
            Node::new("a", 0.0, 0.0).with_label("Alpha & Omega"),
            Node::new("b", 40.0, 0.0),
            Node::new("c", 40.0, 40.0),
        ],
        vec![
            Link::new("ab", "a", "b").on_lines(["red"]),
            Link::new("bc", "b", "c").on_lines(["red", "blue"]),
        ],
        vec![
            Line::new("red", ["a", "b", "c"]),
            Line::new("blue", ["b", "c"]),
        ],
    )
    .expect("valid topology")
}

fn click(target: Target, shift: bool) -> PointerEvent {
    PointerEvent::Click {
        target,
        at: point(20.0, 5.0),
        shift,
    }
}

#[test]
fn paused_alpha_changes_apply_only_on_unpause() {
    let mut map = MetroMap::new(triangle());
    map.start();
    assert!(map.set_paused(true));
    assert_eq!(map.alpha(), 0.1);

    map.set_alpha(0.5);
    assert_eq!(map.alpha(), 0.5);
    assert!(!map.is_running());
    assert!(!map.step().expect("step"), "a paused map must not tick");

    map.set_paused(false);
    assert_eq!(map.alpha(), 0.5);
    assert!(map.is_running());
}

#[test]
fn view_mode_restores_the_previous_pause_state() {
    let mut map = MetroMap::new(triangle());
    map.start();

    map.set_mode(Mode::View);
    assert!(map.is_paused());
    assert!(!map.set_paused(false), "pause is locked in view mode");
    map.set_mode(Mode::Edit);
    assert!(!map.is_paused());
    assert!(map.is_running());

    map.set_paused(true);
    map.set_mode(Mode::View);
    map.set_mode(Mode::Edit);
    assert!(map.is_paused());
}

#[test]
fn start_while_paused_is_replayed_on_unpause() {
    let mut map = MetroMap::new(triangle());
    map.set_paused(true);
    map.start();
    assert!(!map.step().expect("step"));
    map.set_paused(false);
    assert!(map.step().expect("step"));
}

#[test]
fn layout_cools_after_a_fixed_number_of_ticks() {
    let mut map = MetroMap::new(triangle());
    let ticks = Rc::new(Cell::new(0usize));
    let seen = Rc::clone(&ticks);
    map.on_tick("debug", move |tick, topology| {
        assert!(tick.alpha > 0.0);
        assert_eq!(topology.node_count(), 3);
        seen.set(seen.get() + 1);
    });
    // Re-registering a name replaces the listener.
    let replaced = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&replaced);
    map.on_tick("debug", move |_, _| counter.set(counter.get() + 1));

    map.start();
    let steps = map.run(10_000).expect("run");
    assert_eq!(steps, 298);
    assert_eq!(ticks.get(), 0);
    assert_eq!(replaced.get(), 298);
    assert!(map.remove_tick_listener("debug"));
    assert!(!map.remove_tick_listener("debug"));
}

#[test]
fn restart_unpauses_and_heats_the_layout() {
    let mut map = MetroMap::new(triangle());
    map.set_paused(true);
    assert!(map.restart());
    assert!(!map.is_paused());
    assert_eq!(map.alpha(), 0.1);
}

#[test]
fn edit_mode_clicks_bend_and_unbend_links() {
    let mut map = MetroMap::new(triangle());
    assert!(map.handle(click(Target::Link("bc".into()), false)));
    assert_eq!(map.topology().node_count(), 4);
    let dummy = map.topology().node("dummy0").expect("dummy");
    assert_eq!((dummy.x, dummy.y), (20.0, 5.0));
    assert!(map.is_running());

    // Without shift a node click does nothing; plain nodes can never be removed.
    assert!(!map.handle(click(Target::Node("dummy0".into()), false)));
    assert!(!map.handle(click(Target::Node("a".into()), true)));
    assert!(map.handle(click(Target::Node("dummy0".into()), true)));
    assert_eq!(map.topology().node_count(), 3);
    assert_eq!(map.topology().link_count(), 2);
    assert!(!map.handle(click(Target::Link("missing".into()), false)));
}

#[test]
fn edit_mode_drag_pin_and_hover() {
    let mut map = MetroMap::new(triangle());
    assert!(map.handle(PointerEvent::DoubleClick { node: "a".into() }));
    assert!(map.topology().node("a").expect("a").fixed);

    assert!(map.handle(PointerEvent::DragStart { node: "b".into() }));
    assert!(map.topology().node("b").expect("b").dragging);
    assert!(map.handle(PointerEvent::Drag {
        node: "b".into(),
        to: point(50.0, 10.0),
    }));
    assert!(map.handle(PointerEvent::DragEnd { node: "b".into() }));
    let b = map.topology().node("b").expect("b");
    assert_eq!((b.x, b.y), (50.0, 10.0));
    assert!(!b.dragging && !b.fixed);
    assert!(map.is_running(), "dragging resumes the layout");

    assert!(map.handle(PointerEvent::HoverEnter { node: "c".into() }));
    assert!(map.topology().node("c").expect("c").hover);
    assert!(map.handle(PointerEvent::HoverLeave { node: "c".into() }));
    assert!(!map.topology().node("c").expect("c").hover);

    assert_eq!(map.clear_fixed(), 1);
}

#[test]
fn dragging_while_paused_moves_without_running() {
    let mut map = MetroMap::new(triangle());
    map.set_paused(true);
    map.drag("a", point(-10.0, 0.0)).expect("drag");
    assert_eq!(map.topology().node("a").map(|n| n.x), Some(-10.0));
    assert!(!map.is_running());
}

#[test]
fn view_mode_clicks_select_instead_of_editing() {
    let mut map = MetroMap::new(triangle());
    map.set_mode(Mode::View);

    assert!(map.handle(click(Target::Node("a".into()), false)));
    assert_eq!(map.topology().selected_ids(), ["a"]);
    assert!(map.handle(click(Target::Node("b".into()), true)));
    assert_eq!(map.topology().selected_ids(), ["b"]);
    assert_eq!(map.topology().node_count(), 3);

    assert!(!map.handle(PointerEvent::Drag {
        node: "b".into(),
        to: point(99.0, 99.0),
    }));
    assert!(!map.handle(PointerEvent::DoubleClick { node: "b".into() }));
    assert_eq!(map.topology().node("b").map(|n| n.x), Some(40.0));

    assert!(map.handle(click(Target::Link("ab".into()), false)));
    assert!(map.topology().selected_ids().is_empty());
    assert_eq!(map.topology().link_count(), 2);
}

#[test]
fn graph_edits_are_rejected_in_view_mode() {
    let mut map = MetroMap::new(triangle());
    let dummy = map.insert_bend("bc", point(40.0, 20.0)).expect("bend in edit mode");
    map.set_mode(Mode::View);
    let before = map.state();

    assert!(matches!(
        map.insert_bend("ab", point(5.0, 5.0)),
        Err(Error::WrongMode {
            operation: "insert_bend",
            mode: Mode::View
        })
    ));
    assert!(matches!(
        map.remove_bend(&dummy),
        Err(Error::WrongMode { .. })
    ));
    assert!(matches!(
        map.drag("a", point(-50.0, 0.0)),
        Err(Error::WrongMode { .. })
    ));
    assert!(matches!(map.toggle_fixed("b"), Err(Error::WrongMode { .. })));

    assert_eq!(map.state(), before);
    assert_eq!(map.topology().node_count(), 4);
    assert!(!map.topology().node("b").expect("b").fixed);

    map.set_mode(Mode::Edit);
    map.remove_bend(&dummy).expect("unbend in edit mode");
    assert_eq!(map.topology().node_count(), 3);
}

#[derive(Default)]
struct Recorder {
    rebuilds: Vec<Vec<String>>,
    redraws: usize,
}

impl Renderer for Recorder {
    fn rebuild(&mut self, scene: &Scene<'_>) {
        self.rebuilds.push(scene.topology.selected_ids());
    }

    fn redraw(&mut self, _scene: &Scene<'_>) {
        self.redraws += 1;
    }
}

#[test]
fn reload_and_selection_land_in_one_update() {
    let mut map = MetroMap::with_renderer(triangle(), Recorder::default());
    let state = map.state();
    let (rebuilds, redraws) = (map.renderer().rebuilds.len(), map.renderer().redraws);

    map.set_state_with_selection(state, ["c"]).expect("reload");

    let r = map.renderer();
    assert_eq!(r.rebuilds.len(), rebuilds + 1);
    assert_eq!(r.redraws, redraws);
    assert_eq!(r.rebuilds.last(), Some(&vec!["c".to_string()]));
    assert_eq!(map.topology().selected_ids(), ["c"]);
}

#[test]
fn svg_renderer_draws_lines_nodes_and_captions() {
    let mut map = MetroMap::with_renderer(triangle(), SvgRenderer::new());
    map.set_size([320.0, 240.0]).expect("size");
    map.toggle_fixed("b").expect("pin");
    map.set_mode(Mode::View);
    map.handle(click(Target::Node("a".into()), false));

    let svg = map.renderer().document();
    assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="320" height="240">"#));
    assert!(svg.contains(r#"data-id="ab" x1="0" y1="0" x2="40" y2="0" style="stroke:#1f77b4;stroke-width:7""#));
    assert!(svg.contains(r#"data-id="bc" x1="40" y1="0" x2="40" y2="40" style="stroke:#000;"#));
    assert!(svg.contains(r##"data-id="b" r="8" stroke="#EEE""##));
    assert!(svg.contains(r##"data-id="a" r="8" stroke="#000""##));
    assert!(svg.contains(r#"transform="translate(0,0)"><text text-anchor="middle" y="-13">Alpha &amp; Omega</text>"#));
    assert_eq!(svg.matches("<g class=\"caption\"").count(), 1);
    assert_eq!(map.renderer().line_color("red"), Some("#1f77b4"));
    assert_eq!(map.renderer().line_color("blue"), None);
}
