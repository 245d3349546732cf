use crate::error::Result;
use crate::graph::{Body, Edge, ForceGraph, validate};
use crate::pausable::Simulation;
use crate::quadtree::QuadTree;
use crate::rng::XorShift64Star;

/// Emitted after every completed tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickEvent {
    /// Cooling parameter after this tick's decay.
    pub alpha: f64,
}

/// Verlet-integrated force layout.
///
/// Each tick relaxes links toward their rest length, pulls nodes toward the center of `size`,
/// applies Barnes-Hut charge repulsion and integrates velocities with `friction`. `alpha`
/// scales every force and decays geometrically; once it drops below [`Force::ALPHA_MIN`] the
/// layout stops on its own.
#[derive(Debug, Clone)]
pub struct Force {
    alpha: f64,
    charge: f64,
    gravity: f64,
    friction: f64,
    link_strength: f64,
    link_distance: f64,
    theta: f64,
    size: [f64; 2],
    rng: XorShift64Star,

    needs_prepare: bool,
    prepared_for: (usize, usize),
    weights: Vec<f64>,
    distances: Vec<f64>,
    strengths: Vec<f64>,
    scratch: Vec<Body>,
}

impl Default for Force {
    fn default() -> Self {
        Self::new()
    }
}

impl Force {
    pub const DEFAULT_CHARGE: f64 = -30.0;
    pub const DEFAULT_GRAVITY: f64 = 0.1;
    pub const DEFAULT_FRICTION: f64 = 0.9;
    pub const DEFAULT_LINK_STRENGTH: f64 = 1.0;
    pub const DEFAULT_LINK_DISTANCE: f64 = 20.0;
    pub const DEFAULT_THETA: f64 = 0.8;
    pub const ALPHA_DECAY: f64 = 0.99;
    pub const ALPHA_MIN: f64 = 0.005;

    pub fn new() -> Self {
        Self {
            alpha: 0.0,
            charge: Self::DEFAULT_CHARGE,
            gravity: Self::DEFAULT_GRAVITY,
            friction: Self::DEFAULT_FRICTION,
            link_strength: Self::DEFAULT_LINK_STRENGTH,
            link_distance: Self::DEFAULT_LINK_DISTANCE,
            theta: Self::DEFAULT_THETA,
            size: [1.0, 1.0],
            rng: XorShift64Star::new(0),
            needs_prepare: true,
            prepared_for: (0, 0),
            weights: Vec::new(),
            distances: Vec::new(),
            strengths: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Seeds the generator used for initial placement and coincidence jitter.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = XorShift64Star::new(seed);
        self
    }

    pub fn charge(&self) -> f64 {
        self.charge
    }

    pub fn set_charge(&mut self, charge: f64) -> &mut Self {
        self.charge = charge;
        self
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: f64) -> &mut Self {
        self.gravity = gravity;
        self
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn set_friction(&mut self, friction: f64) -> &mut Self {
        self.friction = friction;
        self
    }

    pub fn link_strength(&self) -> f64 {
        self.link_strength
    }

    /// Takes effect on the next `start`.
    pub fn set_link_strength(&mut self, strength: f64) -> &mut Self {
        self.link_strength = strength;
        self
    }

    pub fn link_distance(&self) -> f64 {
        self.link_distance
    }

    /// Takes effect on the next `start`.
    pub fn set_link_distance(&mut self, distance: f64) -> &mut Self {
        self.link_distance = distance;
        self
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn set_theta(&mut self, theta: f64) -> &mut Self {
        self.theta = theta;
        self
    }

    pub fn size(&self) -> [f64; 2] {
        self.size
    }

    pub fn set_size(&mut self, size: [f64; 2]) -> &mut Self {
        self.size = size;
        self
    }

    pub fn is_running(&self) -> bool {
        self.alpha > 0.0
    }

    /// Advances the layout by one step.
    ///
    /// Returns `Ok(None)` when the layout is stopped or has just cooled below
    /// [`Force::ALPHA_MIN`]; the scheduler should stop calling `tick` at that point.
    pub fn tick<G: ForceGraph + ?Sized>(&mut self, graph: &mut G) -> Result<Option<TickEvent>> {
        if self.alpha <= 0.0 {
            return Ok(None);
        }

        let node_count = graph.node_count();
        let edge_count = graph.edges().len();
        if self.needs_prepare || self.prepared_for != (node_count, edge_count) {
            self.prepare(graph)?;
        }

        self.alpha *= Self::ALPHA_DECAY;
        if self.alpha < Self::ALPHA_MIN {
            self.alpha = 0.0;
            tracing::debug!(nodes = node_count, "force layout cooled");
            return Ok(None);
        }
        let alpha = self.alpha;

        let mut bodies = std::mem::take(&mut self.scratch);
        bodies.clear();
        bodies.extend((0..node_count).map(|i| graph.body(i)));

        self.relax_links(&mut bodies, graph.edges(), alpha);
        self.apply_gravity(&mut bodies, alpha);
        self.apply_charge(&mut bodies, alpha);
        integrate(&mut bodies, self.friction);

        for (i, b) in bodies.iter().enumerate() {
            graph.set_body(i, *b);
        }
        self.scratch = bodies;

        tracing::trace!(alpha, nodes = node_count, edges = edge_count, "force tick");
        Ok(Some(TickEvent { alpha }))
    }

    fn prepare<G: ForceGraph + ?Sized>(&mut self, graph: &mut G) -> Result<()> {
        validate(&*graph)?;

        let node_count = graph.node_count();
        let edges: Vec<Edge> = graph.edges().to_vec();

        self.weights = vec![0.0; node_count];
        let mut neighbours: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        for e in &edges {
            self.weights[e.source] += 1.0;
            self.weights[e.target] += 1.0;
            neighbours[e.source].push(e.target);
            neighbours[e.target].push(e.source);
        }
        self.distances = vec![self.link_distance; edges.len()];
        self.strengths = vec![self.link_strength; edges.len()];

        for (i, adjacent) in neighbours.iter().enumerate() {
            let mut b = graph.body(i);
            if !b.x.is_finite() {
                b.x = self.place(&*graph, adjacent, 0);
            }
            if !b.y.is_finite() {
                b.y = self.place(&*graph, adjacent, 1);
            }
            if !b.px.is_finite() {
                b.px = b.x;
            }
            if !b.py.is_finite() {
                b.py = b.y;
            }
            graph.set_body(i, b);
        }

        self.needs_prepare = false;
        self.prepared_for = (node_count, edges.len());
        tracing::debug!(
            nodes = node_count,
            edges = edges.len(),
            "force layout prepared"
        );
        Ok(())
    }

    /// Initial coordinate along `axis` for an unplaced node: the first placed neighbour's, or a
    /// random point inside `size`.
    fn place<G: ForceGraph + ?Sized>(&mut self, graph: &G, adjacent: &[usize], axis: usize) -> f64 {
        for &j in adjacent {
            let b = graph.body(j);
            let v = if axis == 0 { b.x } else { b.y };
            if v.is_finite() {
                return v;
            }
        }
        self.rng.next_f64_unit() * self.size[axis]
    }

    fn relax_links(&self, bodies: &mut [Body], edges: &[Edge], alpha: f64) {
        for (i, e) in edges.iter().enumerate() {
            let (s, t) = (e.source, e.target);
            let mut x = bodies[t].x - bodies[s].x;
            let mut y = bodies[t].y - bodies[s].y;
            let l2 = x * x + y * y;
            if l2 == 0.0 || !l2.is_finite() {
                continue;
            }
            let l = l2.sqrt();
            let f = alpha * self.strengths[i] * (l - self.distances[i]) / l;
            x *= f;
            y *= f;

            let k = self.weights[s] / (self.weights[t] + self.weights[s]);
            bodies[t].x -= x * k;
            bodies[t].y -= y * k;
            let k = 1.0 - k;
            bodies[s].x += x * k;
            bodies[s].y += y * k;
        }
    }

    fn apply_gravity(&self, bodies: &mut [Body], alpha: f64) {
        let k = alpha * self.gravity;
        if k == 0.0 {
            return;
        }
        let cx = self.size[0] / 2.0;
        let cy = self.size[1] / 2.0;
        for b in bodies {
            b.x += (cx - b.x) * k;
            b.y += (cy - b.y) * k;
        }
    }

    fn apply_charge(&mut self, bodies: &mut [Body], alpha: f64) {
        if self.charge == 0.0 || bodies.is_empty() {
            return;
        }
        let mut tree = QuadTree::build(bodies);
        tree.accumulate(bodies, alpha * self.charge, &mut self.rng);
        for i in 0..bodies.len() {
            if !bodies[i].fixed {
                tree.repulse(i, bodies, self.theta);
            }
        }
    }
}

fn integrate(bodies: &mut [Body], friction: f64) {
    for b in bodies {
        if b.fixed {
            b.x = b.px;
            b.y = b.py;
        } else {
            let vx = (b.px - b.x) * friction;
            let vy = (b.py - b.y) * friction;
            b.px = b.x;
            b.py = b.y;
            b.x -= vx;
            b.y -= vy;
        }
    }
}

impl Simulation for Force {
    fn alpha(&self) -> f64 {
        self.alpha
    }

    fn set_alpha(&mut self, alpha: f64) {
        // Zero, negative and NaN all stop the layout.
        self.alpha = if alpha > 0.0 { alpha } else { 0.0 };
    }

    fn start(&mut self) {
        self.needs_prepare = true;
        self.resume();
    }
}
