use narwhal::{Body, BodyGraph, Edge, Error, Force, ForceGraph, Simulation};

fn pair(distance: f64) -> BodyGraph {
    BodyGraph::new(
        vec![Body::at(0.0, 0.0), Body::at(distance, 0.0)],
        vec![Edge::new(0, 1)],
    )
}

#[test]
fn set_alpha_clamps_non_positive_values_to_stopped() {
    let mut force = Force::new();
    force.set_alpha(0.3);
    assert_eq!(force.alpha(), 0.3);
    force.set_alpha(-1.0);
    assert_eq!(force.alpha(), 0.0);
    force.set_alpha(f64::NAN);
    assert_eq!(force.alpha(), 0.0);
    assert!(!force.is_running());
}

#[test]
fn start_and_resume_use_default_alpha() {
    let mut force = Force::new();
    force.start();
    assert_eq!(force.alpha(), narwhal::DEFAULT_ALPHA);
    force.stop();
    assert_eq!(force.alpha(), 0.0);
    force.resume();
    assert_eq!(force.alpha(), narwhal::DEFAULT_ALPHA);
}

#[test]
fn stopped_layout_does_not_tick() {
    let mut force = Force::new();
    let mut graph = pair(10.0);
    assert_eq!(force.tick(&mut graph).expect("tick"), None);
    assert_eq!(graph.bodies[1].x, 10.0);
}

#[test]
fn layout_cools_after_a_fixed_number_of_ticks() {
    let mut force = Force::new();
    force.set_charge(0.0).set_gravity(0.0);
    let mut graph = pair(20.0);
    force.start();

    let mut events = 0usize;
    let mut last_alpha = f64::INFINITY;
    while let Some(ev) = force.tick(&mut graph).expect("tick") {
        assert!(ev.alpha < last_alpha);
        last_alpha = ev.alpha;
        events += 1;
        assert!(events < 1000, "layout never cooled");
    }
    // 0.1 * 0.99^k stays above 0.005 for k <= 298.
    assert_eq!(events, 298);
    assert_eq!(force.alpha(), 0.0);
}

#[test]
fn link_relaxation_pulls_toward_link_distance() {
    let mut force = Force::new();
    force
        .set_charge(0.0)
        .set_gravity(0.0)
        .set_link_distance(40.0);
    let mut graph = pair(10.0);
    force.start();
    let ev = force.tick(&mut graph).expect("tick").expect("event");

    // Relaxation opens the gap by `correction`; integration then carries the resulting
    // velocity forward, damped by friction.
    let correction = ev.alpha * (40.0 - 10.0);
    let expected = 10.0 + correction * (1.0 + Force::DEFAULT_FRICTION);
    let gap = graph.bodies[1].x - graph.bodies[0].x;
    assert!((gap - expected).abs() < 1e-9, "gap: {gap}");
    assert_eq!(graph.bodies[0].y, 0.0);
    assert_eq!(graph.bodies[1].y, 0.0);
}

#[test]
fn charge_pushes_unlinked_nodes_apart() {
    let mut force = Force::new();
    force.set_gravity(0.0).set_charge(-100.0);
    let mut graph = BodyGraph::new(vec![Body::at(0.0, 0.0), Body::at(5.0, 0.0)], Vec::new());
    force.start();
    for _ in 0..10 {
        force.tick(&mut graph).expect("tick");
    }
    assert!(graph.bodies[1].x - graph.bodies[0].x > 5.0);
}

#[test]
fn gravity_pulls_toward_size_center() {
    let mut force = Force::new();
    force.set_charge(0.0).set_gravity(0.5).set_size([100.0, 100.0]);
    let mut graph = BodyGraph::new(vec![Body::at(0.0, 0.0)], Vec::new());
    force.start();
    force.tick(&mut graph).expect("tick");
    let b = graph.bodies[0];
    assert!(b.x > 0.0 && b.x < 50.0);
    assert!((b.x - b.y).abs() < 1e-12);
}

#[test]
fn fixed_bodies_hold_their_previous_position() {
    let mut force = Force::new();
    force.set_link_distance(100.0);
    let mut graph = BodyGraph::new(
        vec![Body::at(0.0, 0.0).pinned(), Body::at(10.0, 0.0)],
        vec![Edge::new(0, 1)],
    );
    force.start();
    for _ in 0..50 {
        force.tick(&mut graph).expect("tick");
    }
    assert_eq!((graph.bodies[0].x, graph.bodies[0].y), (0.0, 0.0));
    assert!(graph.bodies[1].x > 10.0);
}

#[test]
fn unplaced_bodies_are_positioned_on_start() {
    let mut force = Force::new().with_seed(42);
    force.set_size([200.0, 100.0]).set_charge(0.0).set_gravity(0.0);
    let mut graph = BodyGraph::new(
        vec![Body::at(30.0, 40.0), Body::unplaced(), Body::unplaced()],
        vec![Edge::new(0, 1)],
    );
    force.start();
    force.tick(&mut graph).expect("tick");

    for b in &graph.bodies {
        assert!(b.x.is_finite() && b.y.is_finite());
        assert!(b.px.is_finite() && b.py.is_finite());
    }
    // Node 2 has no neighbours and is scattered inside the canvas.
    let lone = graph.bodies[2];
    assert!((0.0..200.0).contains(&lone.x));
    assert!((0.0..100.0).contains(&lone.y));
}

#[test]
fn unplaced_body_starts_at_its_placed_neighbour() {
    let mut force = Force::new();
    force.set_charge(0.0).set_gravity(0.0).set_link_strength(0.0);
    let mut graph = BodyGraph::new(
        vec![Body::at(30.0, 40.0), Body::unplaced()],
        vec![Edge::new(0, 1)],
    );
    force.start();
    force.tick(&mut graph).expect("tick");
    assert_eq!((graph.bodies[1].x, graph.bodies[1].y), (30.0, 40.0));
}

#[test]
fn edge_with_missing_endpoint_is_rejected() {
    let mut force = Force::new();
    let mut graph = BodyGraph::new(vec![Body::at(0.0, 0.0)], vec![Edge::new(0, 3)]);
    force.start();
    let err = force.tick(&mut graph).expect_err("missing endpoint");
    assert!(matches!(err, Error::MissingEndpoint { link: 0, to: 3, .. }));
}

#[test]
fn graph_resize_triggers_a_new_preparation() {
    let mut force = Force::new();
    force.set_charge(0.0).set_gravity(0.0);
    let mut graph = pair(10.0);
    force.start();
    force.tick(&mut graph).expect("tick");

    graph.bodies.push(Body::unplaced());
    graph.edges.push(Edge::new(1, 2));
    force.tick(&mut graph).expect("tick");
    assert!(graph.body(2).x.is_finite());
}

#[test]
fn exact_charge_keeps_a_symmetric_row_balanced() {
    let mut force = Force::new();
    force.set_gravity(0.0).set_charge(-50.0).set_theta(0.0);
    assert_eq!(force.theta(), 0.0);
    let mut graph = BodyGraph::new(
        vec![Body::at(0.0, 0.0), Body::at(10.0, 0.0), Body::at(20.0, 0.0)],
        Vec::new(),
    );
    force.start();
    force.tick(&mut graph).expect("tick");

    // With theta 0 every pair is computed exactly, so the middle body feels no net force.
    assert!((graph.bodies[1].x - 10.0).abs() < 1e-9, "middle: {}", graph.bodies[1].x);
    assert!(graph.bodies[0].x < 0.0 && graph.bodies[2].x > 20.0);
    assert!(graph.bodies.iter().all(|b| b.y == 0.0));
}
