//! Interactive edits of a [`Topology`]: bend points, dragging, pins, hover and selection.
//!
//! Every edit checks its preconditions before touching anything, so an `Err` leaves the
//! topology exactly as it was.

use crate::error::TopologyError;
use crate::geom::{Point, Vector, point};
use crate::model::{Link, Node};
use crate::topology::Topology;

impl Topology {
    /// Splits `link_id` at `at` with a new dummy node and returns the dummy's id.
    ///
    /// The original link keeps its id and source and now ends at the dummy; a new link carries
    /// the same lines from the dummy to the old target. Every line through the link gets the
    /// dummy spliced in between the two endpoints.
    pub fn insert_bend(&mut self, link_id: &str, at: Point) -> Result<String, TopologyError> {
        let link = self
            .links
            .get(link_id)
            .ok_or_else(|| TopologyError::UnknownLink {
                id: link_id.to_string(),
            })?;
        if link.source == link.target {
            return Err(TopologyError::SelfLoop {
                link: link.id.clone(),
                node: link.source.clone(),
            });
        }
        if link.path.is_empty() {
            return Err(TopologyError::Lineless {
                link: link.id.clone(),
            });
        }

        let mut splices: Vec<(String, usize)> = Vec::with_capacity(link.path.len());
        for line_id in &link.path {
            let line = self
                .lines
                .get(line_id)
                .ok_or_else(|| TopologyError::UnknownLine {
                    id: line_id.clone(),
                })?;
            let index = splice_position(&line.nodes, &link.source, &link.target).ok_or_else(|| {
                TopologyError::InconsistentLine {
                    line: line_id.clone(),
                    link: link.id.clone(),
                }
            })?;
            splices.push((line_id.clone(), index));
        }

        let original = link.id.clone();
        let old_target = link.target.clone();
        let path = link.path.clone();
        let (dummy_id, new_link_id) = self.fresh_bend_ids();

        let mut dummy = Node::dummy(dummy_id.clone(), at);
        for line_id in &path {
            dummy
                .edges
                .insert(line_id.clone(), [original.clone(), new_link_id.clone()]);
        }

        // A dummy further down the chain now receives the new link instead of the original.
        if let Some(next) = self.nodes.get_mut(&old_target).filter(|n| n.is_dummy()) {
            for pair in next.edges.values_mut() {
                if pair[0] == original {
                    pair[0] = new_link_id.clone();
                }
            }
        }

        if let Some(l) = self.links.get_mut(&original) {
            l.target = dummy_id.clone();
        }
        self.links.insert(
            new_link_id.clone(),
            Link::new(new_link_id.clone(), dummy_id.clone(), old_target).on_lines(path),
        );
        self.nodes.insert(dummy_id.clone(), dummy);
        for (line_id, index) in splices {
            if let Some(line) = self.lines.get_mut(&line_id) {
                line.nodes.insert(index, dummy_id.clone());
            }
        }
        self.rewire();

        tracing::debug!(
            link = %original,
            dummy = %dummy_id,
            new_link = %new_link_id,
            "bend point inserted"
        );
        Ok(dummy_id)
    }

    /// Removes a dummy node, bridging its incoming link over to the outgoing link's target and
    /// deleting the outgoing link. Undoes exactly one [`Topology::insert_bend`].
    pub fn remove_bend(&mut self, node_id: &str) -> Result<(), TopologyError> {
        let node = self
            .nodes
            .get(node_id)
            .ok_or_else(|| TopologyError::UnknownNode {
                id: node_id.to_string(),
            })?;
        if !node.is_dummy() {
            return Err(TopologyError::NotDummy {
                id: node_id.to_string(),
            });
        }
        let broken = || TopologyError::BrokenChain {
            id: node_id.to_string(),
        };

        let mut pairs = node.edges.values();
        let [incoming, outgoing] = pairs.next().ok_or_else(broken)?.clone();
        if pairs.any(|p| p[0] != incoming || p[1] != outgoing) {
            return Err(broken());
        }
        let (Some(l0), Some(l1)) = (self.links.get(&incoming), self.links.get(&outgoing)) else {
            return Err(broken());
        };
        if l0.target != node_id || l1.source != node_id {
            return Err(broken());
        }
        if l0.source == l1.target {
            return Err(TopologyError::SelfLoop {
                link: incoming,
                node: l0.source.clone(),
            });
        }
        let touches = |l: &Link| l.source == node_id || l.target == node_id;
        if self
            .links
            .values()
            .any(|l| l.id != incoming && l.id != outgoing && touches(l))
        {
            return Err(broken());
        }
        if self
            .lines
            .values()
            .any(|l| l.nodes.iter().any(|n| n == node_id) && !node.edges.contains_key(&l.id))
        {
            return Err(broken());
        }

        let bridged = l1.target.clone();
        if let Some(next) = self.nodes.get_mut(&bridged).filter(|n| n.is_dummy()) {
            for pair in next.edges.values_mut() {
                if pair[0] == outgoing {
                    pair[0] = incoming.clone();
                }
            }
        }
        if let Some(l) = self.links.get_mut(&incoming) {
            l.target = bridged;
        }
        self.links.shift_remove(&outgoing);
        self.nodes.shift_remove(node_id);
        for line in self.lines.values_mut() {
            line.nodes.retain(|n| n != node_id);
        }
        self.rewire();

        tracing::debug!(dummy = %node_id, link = %incoming, removed = %outgoing, "bend point removed");
        Ok(())
    }

    /// Drags `id` so that its previous position lands on `to` and returns the applied delta.
    ///
    /// Dragging a pinned node translates every pinned node by the same delta; dragging a free
    /// node moves only that node. Current positions follow previous positions so the move is
    /// visible even while the layout is stopped.
    pub fn drag_to(&mut self, id: &str, to: Point) -> Result<Vector, TopologyError> {
        let node = self.nodes.get(id).ok_or_else(|| TopologyError::UnknownNode {
            id: id.to_string(),
        })?;
        let delta = to - point(node.px, node.py);
        let pinned = node.fixed;
        let translate = |n: &mut Node| {
            n.px += delta.x;
            n.py += delta.y;
            n.x = n.px;
            n.y = n.py;
        };
        if pinned {
            self.nodes.values_mut().filter(|n| n.fixed).for_each(translate);
        } else if let Some(n) = self.nodes.get_mut(id) {
            translate(n);
        }
        Ok(delta)
    }

    /// Flips the persistent pin of `id` and returns the new value.
    pub fn toggle_fixed(&mut self, id: &str) -> Result<bool, TopologyError> {
        let node = self.require_node(id)?;
        node.fixed = !node.fixed;
        Ok(node.fixed)
    }

    pub fn set_fixed(&mut self, id: &str, fixed: bool) -> Result<(), TopologyError> {
        self.require_node(id)?.fixed = fixed;
        Ok(())
    }

    /// Unpins every node and returns how many were pinned.
    pub fn clear_fixed(&mut self) -> usize {
        let mut cleared = 0;
        for n in self.nodes.values_mut().filter(|n| n.fixed) {
            n.fixed = false;
            cleared += 1;
        }
        cleared
    }

    pub fn set_dragging(&mut self, id: &str, dragging: bool) -> Result<(), TopologyError> {
        self.require_node(id)?.dragging = dragging;
        Ok(())
    }

    pub fn set_hover(&mut self, id: &str, hover: bool) -> Result<(), TopologyError> {
        self.require_node(id)?.hover = hover;
        Ok(())
    }

    /// Selects `id` and deselects everything else.
    pub fn select_only(&mut self, id: &str) -> Result<(), TopologyError> {
        if !self.nodes.contains_key(id) {
            return Err(TopologyError::UnknownNode { id: id.to_string() });
        }
        for n in self.nodes.values_mut() {
            n.selected = n.id == id;
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        for n in self.nodes.values_mut() {
            n.selected = false;
        }
    }

    /// Replaces the selection with the nodes named in `ids`. Ids that are not present are
    /// skipped; returns how many nodes ended up selected.
    pub fn set_selection<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.clear_selection();
        let mut selected = 0;
        for id in ids {
            if let Some(n) = self.nodes.get_mut(id.as_ref()) {
                if !n.selected {
                    n.selected = true;
                    selected += 1;
                }
            }
        }
        selected
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.nodes
            .values()
            .filter(|n| n.selected)
            .map(|n| n.id.clone())
            .collect()
    }

    fn require_node(&mut self, id: &str) -> Result<&mut Node, TopologyError> {
        self.node_mut(id)
            .ok_or_else(|| TopologyError::UnknownNode { id: id.to_string() })
    }

    /// Ids for a new dummy node and the link leaving it, skipping any already taken.
    fn fresh_bend_ids(&mut self) -> (String, String) {
        loop {
            let n = self.dummy_counter;
            self.dummy_counter += 1;
            let node = format!("dummy{n}");
            let link = format!("{node}-link");
            if !self.nodes.contains_key(&node) && !self.links.contains_key(&link) {
                return (node, link);
            }
        }
    }
}

/// Index at which a bend between `source` and `target` goes into a line's stop sequence: right
/// between the first adjacent occurrence of the two, in either order.
fn splice_position(stops: &[String], source: &str, target: &str) -> Option<usize> {
    stops
        .windows(2)
        .position(|w| (w[0] == source && w[1] == target) || (w[0] == target && w[1] == source))
        .map(|i| i + 1)
}
