//! The persisted JSON form of a metro map.
//!
//! Cross references are stored as ids. Loading builds id registries for nodes, links and lines
//! first and resolves every reference against them, failing on the first one that does not
//! resolve; a half-wired graph is never produced.

use crate::config::Tunables;
use crate::error::StateError;
use crate::geom::{point, vector};
use crate::map::Mode;
use crate::model::{Line, Link, Node, NodeKind};
use crate::topology::Topology;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// A complete snapshot: graph, dummy id counter, tunables and mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetroState {
    pub nodes: Vec<NodeRecord>,
    pub lines: Vec<LineRecord>,
    pub links: Vec<LinkRecord>,
    #[serde(rename = "dummyid", default)]
    pub dummy_id: u64,
    #[serde(flatten)]
    pub tunables: Tunables,
    #[serde(default)]
    pub mode: Mode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// `None` for a node that has not been placed yet.
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub fixed: FixedFlag,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(rename = "labelrot", default, skip_serializing_if = "Option::is_none")]
    pub label_rotation: Option<f64>,
    #[serde(rename = "textoffset", default, skip_serializing_if = "Option::is_none")]
    pub text_offset: Option<[f64; 2]>,
    #[serde(default)]
    pub edges: Vec<EdgeEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<[f64; 2]>,
}

/// The legacy fixed bitmask. Only bit 0 (persistent pin) survives a round trip; older files
/// may also hold a plain boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixedFlag {
    Bits(u64),
    Flag(bool),
}

impl Default for FixedFlag {
    fn default() -> Self {
        FixedFlag::Bits(0)
    }
}

impl FixedFlag {
    pub fn is_pinned(self) -> bool {
        match self {
            FixedFlag::Bits(bits) => bits & 1 != 0,
            FixedFlag::Flag(flag) => flag,
        }
    }
}

impl From<bool> for FixedFlag {
    fn from(pinned: bool) -> Self {
        FixedFlag::Bits(u64::from(pinned))
    }
}

/// One `line id -> [incoming, outgoing]` entry of a dummy node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeEntry {
    pub key: String,
    pub value: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub path: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub id: String,
    #[serde(default)]
    pub nodes: Vec<String>,
}

impl MetroState {
    pub fn capture(topology: &Topology, tunables: &Tunables, mode: Mode) -> Self {
        Self {
            nodes: topology.nodes().map(NodeRecord::from_node).collect(),
            lines: topology
                .lines()
                .map(|l| LineRecord {
                    id: l.id.clone(),
                    nodes: l.nodes.clone(),
                })
                .collect(),
            links: topology
                .links()
                .map(|l| LinkRecord {
                    id: l.id.clone(),
                    source: l.source.clone(),
                    target: l.target.clone(),
                    path: l.path.clone(),
                })
                .collect(),
            dummy_id: topology.dummy_counter(),
            tunables: tunables.clone(),
            mode,
        }
    }

    /// Resolves every id reference and rebuilds the topology.
    ///
    /// Tunables are returned as stored; validating them is up to the caller.
    pub fn into_parts(self) -> Result<(Topology, Tunables, Mode), StateError> {
        let node_ids = registry("node", self.nodes.iter().map(|n| n.id.as_str()))?;
        let link_ids = registry("link", self.links.iter().map(|l| l.id.as_str()))?;
        let line_ids = registry("line", self.lines.iter().map(|l| l.id.as_str()))?;

        let mut links = Vec::with_capacity(self.links.len());
        for l in self.links {
            let by = || format!("link {}", l.id);
            for end in [&l.source, &l.target] {
                if !node_ids.contains(end.as_str()) {
                    return Err(StateError::UnknownNode {
                        id: end.clone(),
                        referenced_by: by(),
                    });
                }
            }
            if let Some(missing) = l.path.iter().find(|p| !line_ids.contains(p.as_str())) {
                return Err(StateError::UnknownLine {
                    id: missing.clone(),
                    referenced_by: by(),
                });
            }
            links.push(Link::new(l.id, l.source, l.target).on_lines(l.path));
        }

        let mut lines = Vec::with_capacity(self.lines.len());
        for l in self.lines {
            if let Some(missing) = l.nodes.iter().find(|n| !node_ids.contains(n.as_str())) {
                return Err(StateError::UnknownNode {
                    id: missing.clone(),
                    referenced_by: format!("line {}", l.id),
                });
            }
            lines.push(Line::new(l.id, l.nodes));
        }

        let mut nodes = Vec::with_capacity(self.nodes.len());
        for record in self.nodes {
            nodes.push(record.into_node(&link_ids, &line_ids)?);
        }

        let topology = Topology::new(nodes, links, lines)?.with_dummy_counter(self.dummy_id);
        tracing::debug!(
            nodes = topology.node_count(),
            links = topology.link_count(),
            lines = topology.line_count(),
            "state resolved"
        );
        Ok((topology, self.tunables, self.mode))
    }
}

fn registry<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<FxHashSet<String>, StateError> {
    let mut seen = FxHashSet::default();
    for id in ids {
        if !seen.insert(id.to_string()) {
            return Err(StateError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(seen)
}

impl NodeRecord {
    pub fn from_node(n: &Node) -> Self {
        Self {
            id: n.id.clone(),
            label: n.label.clone(),
            date: n.date.map(format_date),
            x: Some(n.x).filter(|v| v.is_finite()),
            y: Some(n.y).filter(|v| v.is_finite()),
            fixed: n.fixed.into(),
            kind: n.kind,
            label_rotation: n.label_rotation,
            text_offset: n.text_offset.map(|v| [v.x, v.y]),
            edges: n
                .edges
                .iter()
                .map(|(line, pair)| EdgeEntry {
                    key: line.clone(),
                    value: pair.to_vec(),
                })
                .collect(),
            origin: n.origin.map(|p| [p.x, p.y]),
        }
    }

    fn into_node(
        self,
        link_ids: &FxHashSet<String>,
        line_ids: &FxHashSet<String>,
    ) -> Result<Node, StateError> {
        let by = || format!("node {}", self.id);

        let mut edges = IndexMap::with_capacity(self.edges.len());
        for entry in &self.edges {
            if !line_ids.contains(&entry.key) {
                return Err(StateError::UnknownLine {
                    id: entry.key.clone(),
                    referenced_by: by(),
                });
            }
            let [incoming, outgoing] = entry.value.as_slice() else {
                return Err(StateError::MalformedEdges {
                    node: self.id.clone(),
                    line: entry.key.clone(),
                    count: entry.value.len(),
                });
            };
            if let Some(missing) = [incoming, outgoing]
                .into_iter()
                .find(|l| !link_ids.contains(l.as_str()))
            {
                return Err(StateError::UnknownLink {
                    id: missing.clone(),
                    referenced_by: by(),
                });
            }
            edges.insert(entry.key.clone(), [incoming.clone(), outgoing.clone()]);
        }

        let date = match &self.date {
            Some(raw) => Some(parse_date(raw).ok_or_else(|| StateError::InvalidDate {
                node: self.id.clone(),
                value: raw.clone(),
            })?),
            None => None,
        };

        let mut node = Node::new(
            self.id,
            self.x.unwrap_or(f64::NAN),
            self.y.unwrap_or(f64::NAN),
        );
        node.kind = self.kind;
        node.fixed = self.fixed.is_pinned();
        node.edges = edges;
        node.label_rotation = self.label_rotation;
        node.text_offset = self.text_offset.map(|[x, y]| vector(x, y));
        node.origin = self.origin.map(|[x, y]| point(x, y));
        // Bend points carry no story data.
        if !node.is_dummy() {
            node.label = self.label;
            node.date = date;
        }
        Ok(node)
    }
}

/// ISO-8601 with milliseconds and a `Z` suffix.
pub fn format_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Accepts full RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}
