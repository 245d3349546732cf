use crate::error::{Error, Result};

/// Simulation state of a single node, copied out of and back into the caller's storage on
/// every tick.
///
/// `px`/`py` hold the previous position; the difference to `x`/`y` is the node's velocity.
/// Non-finite coordinates mark a node that has not been placed yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub px: f64,
    pub py: f64,
    /// Fixed bodies are excluded from integration and snap back to `px`/`py`.
    pub fixed: bool,
}

impl Body {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            px: x,
            py: y,
            fixed: false,
        }
    }

    pub fn unplaced() -> Self {
        Self {
            x: f64::NAN,
            y: f64::NAN,
            px: f64::NAN,
            py: f64::NAN,
            fixed: false,
        }
    }

    pub fn pinned(mut self) -> Self {
        self.fixed = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
}

impl Edge {
    pub fn new(source: usize, target: usize) -> Self {
        Self { source, target }
    }
}

/// Node and link storage driven by a [`crate::Force`].
///
/// A given graph is meant to be driven by exactly one simulation at a time; two simulations
/// stepping the same bodies would overwrite each other's previous positions.
pub trait ForceGraph {
    fn node_count(&self) -> usize;
    fn body(&self, index: usize) -> Body;
    fn set_body(&mut self, index: usize, body: Body);
    fn edges(&self) -> &[Edge];
}

/// Checks that every edge endpoint addresses an existing node.
pub fn validate<G: ForceGraph + ?Sized>(graph: &G) -> Result<()> {
    let node_count = graph.node_count();
    for (idx, e) in graph.edges().iter().enumerate() {
        if e.source >= node_count || e.target >= node_count {
            return Err(Error::MissingEndpoint {
                link: idx,
                from: e.source,
                to: e.target,
                node_count,
            });
        }
    }
    Ok(())
}

/// Plain vector-backed graph, for callers that do not keep their own node storage.
#[derive(Debug, Clone, Default)]
pub struct BodyGraph {
    pub bodies: Vec<Body>,
    pub edges: Vec<Edge>,
}

impl BodyGraph {
    pub fn new(bodies: Vec<Body>, edges: Vec<Edge>) -> Self {
        Self { bodies, edges }
    }
}

impl ForceGraph for BodyGraph {
    fn node_count(&self) -> usize {
        self.bodies.len()
    }

    fn body(&self, index: usize) -> Body {
        self.bodies[index]
    }

    fn set_body(&mut self, index: usize, body: Body) {
        self.bodies[index] = body;
    }

    fn edges(&self) -> &[Edge] {
        &self.edges
    }
}
