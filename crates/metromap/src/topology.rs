use crate::error::TopologyError;
use crate::model::{Line, Link, Node};
use indexmap::IndexMap;
use indexmap::map::Entry;
use narwhal::{Body, Edge, ForceGraph};
use rustc_hash::FxHashSet;

/// Nodes, links and lines of one metro map, keyed by id in insertion order.
///
/// Links and lines refer to nodes (and dummy nodes to links) by id; the id maps are the
/// registry those references resolve through. Index-based wiring for the simulation and the
/// constraint passes is rebuilt after every structural edit.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub(crate) nodes: IndexMap<String, Node>,
    pub(crate) links: IndexMap<String, Link>,
    pub(crate) lines: IndexMap<String, Line>,
    pub(crate) dummy_counter: u64,
    wiring: Wiring,
}

#[derive(Debug, Clone, Default)]
struct Wiring {
    edges: Vec<Edge>,
    routes: Vec<Vec<usize>>,
}

impl Topology {
    pub fn new(nodes: Vec<Node>, links: Vec<Link>, lines: Vec<Line>) -> Result<Self, TopologyError> {
        let mut topology = Self::default();
        for n in nodes {
            insert_unique(&mut topology.nodes, "node", n.id.clone(), n)?;
        }
        for l in links {
            insert_unique(&mut topology.links, "link", l.id.clone(), l)?;
        }
        for l in lines {
            insert_unique(&mut topology.lines, "line", l.id.clone(), l)?;
        }
        topology.validate()?;
        topology.rewire();
        Ok(topology)
    }

    pub fn with_dummy_counter(mut self, counter: u64) -> Self {
        self.dummy_counter = counter;
        self
    }

    /// Next suffix used when naming a freshly inserted dummy node.
    pub fn dummy_counter(&self) -> u64 {
        self.dummy_counter
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.values()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links.get(id)
    }

    pub fn line(&self, id: &str) -> Option<&Line> {
        self.lines.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn node_at_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_index_mut(index).map(|(_, n)| n)
    }

    pub(crate) fn node_at(&self, index: usize) -> Option<&Node> {
        self.nodes.get_index(index).map(|(_, n)| n)
    }

    /// Link endpoints as node indices, in link order.
    pub(crate) fn edge_indices(&self) -> &[Edge] {
        &self.wiring.edges
    }

    /// Each line's stops as node indices, in line order.
    pub(crate) fn routes(&self) -> &[Vec<usize>] {
        &self.wiring.routes
    }

    /// Checks every cross reference and the dummy-chain and line-adjacency invariants.
    pub fn validate(&self) -> Result<(), TopologyError> {
        for link in self.links.values() {
            for end in [&link.source, &link.target] {
                if !self.nodes.contains_key(end) {
                    return Err(TopologyError::DanglingLink {
                        link: link.id.clone(),
                        node: end.clone(),
                    });
                }
            }
            if let Some(missing) = link.path.iter().find(|l| !self.lines.contains_key(*l)) {
                return Err(TopologyError::UnknownLine {
                    id: missing.clone(),
                });
            }
        }

        // Undirected (a, b, line) triples for every link.
        let mut carried: FxHashSet<(&str, &str, &str)> = FxHashSet::default();
        for link in self.links.values() {
            for line in &link.path {
                carried.insert((link.source.as_str(), link.target.as_str(), line.as_str()));
                carried.insert((link.target.as_str(), link.source.as_str(), line.as_str()));
            }
        }
        for line in self.lines.values() {
            if let Some(missing) = line.nodes.iter().find(|n| !self.nodes.contains_key(*n)) {
                return Err(TopologyError::DanglingLine {
                    line: line.id.clone(),
                    node: missing.clone(),
                });
            }
            for pair in line.nodes.windows(2) {
                if !carried.contains(&(pair[0].as_str(), pair[1].as_str(), line.id.as_str())) {
                    return Err(TopologyError::InconsistentLine {
                        line: line.id.clone(),
                        link: format!("{}-{}", pair[0], pair[1]),
                    });
                }
            }
        }

        for node in self.nodes.values().filter(|n| n.is_dummy()) {
            if node.edges.is_empty() {
                return Err(TopologyError::BrokenChain {
                    id: node.id.clone(),
                });
            }
            for (line, [incoming, outgoing]) in &node.edges {
                if !self.lines.contains_key(line) {
                    return Err(TopologyError::UnknownLine { id: line.clone() });
                }
                let chained = match (self.links.get(incoming), self.links.get(outgoing)) {
                    (Some(i), Some(o)) => i.target == node.id && o.source == node.id,
                    _ => false,
                };
                if !chained {
                    return Err(TopologyError::BrokenChain {
                        id: node.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Rebuilds index wiring after nodes, links or lines changed.
    pub(crate) fn rewire(&mut self) {
        let nodes = &self.nodes;
        self.wiring.edges = self
            .links
            .values()
            .filter_map(|l| {
                Some(Edge::new(
                    nodes.get_index_of(&l.source)?,
                    nodes.get_index_of(&l.target)?,
                ))
            })
            .collect();
        self.wiring.routes = self
            .lines
            .values()
            .map(|l| l.nodes.iter().filter_map(|n| nodes.get_index_of(n)).collect())
            .collect();
    }
}

fn insert_unique<T>(
    map: &mut IndexMap<String, T>,
    kind: &'static str,
    id: String,
    value: T,
) -> Result<(), TopologyError> {
    match map.entry(id) {
        Entry::Occupied(e) => Err(TopologyError::DuplicateId {
            kind,
            id: e.key().clone(),
        }),
        Entry::Vacant(e) => {
            e.insert(value);
            Ok(())
        }
    }
}

impl ForceGraph for Topology {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn body(&self, index: usize) -> Body {
        match self.node_at(index) {
            Some(n) => Body {
                x: n.x,
                y: n.y,
                px: n.px,
                py: n.py,
                fixed: n.fixed,
            },
            None => Body::unplaced(),
        }
    }

    fn set_body(&mut self, index: usize, body: Body) {
        if let Some(n) = self.node_at_mut(index) {
            n.x = body.x;
            n.y = body.y;
            n.px = body.px;
            n.py = body.py;
        }
    }

    fn edges(&self) -> &[Edge] {
        self.edge_indices()
    }
}
