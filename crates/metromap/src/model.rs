use crate::geom::{Point, Vector, point};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A story node (station). Older maps tagged hub and satellite stories separately; both
    /// load as plain nodes.
    #[default]
    #[serde(alias = "sun", alias = "satellite")]
    Plain,
    /// A bend point with no meaning of its own, inserted so a line can change direction.
    Dummy,
}

/// A station of the metro map.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    /// Previous position, used by Verlet integration and as the drag origin.
    pub px: f64,
    pub py: f64,
    /// Persistent pin: excluded from integration, dragged as a rigid group.
    pub fixed: bool,
    /// Transient: a drag gesture is in progress on this node.
    pub dragging: bool,
    /// Transient: the pointer is over this node.
    pub hover: bool,
    pub label: Option<String>,
    pub date: Option<DateTime<Utc>>,
    /// Advisory coordinates from the story source.
    pub origin: Option<Point>,
    /// Dummy nodes only: per line id, the `[incoming, outgoing]` link ids around this node.
    pub edges: IndexMap<String, [String; 2]>,
    pub label_rotation: Option<f64>,
    pub text_offset: Option<Vector>,
    pub selected: bool,
}

impl Node {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Plain,
            x,
            y,
            px: x,
            py: y,
            fixed: false,
            dragging: false,
            hover: false,
            label: None,
            date: None,
            origin: None,
            edges: IndexMap::new(),
            label_rotation: None,
            text_offset: None,
            selected: false,
        }
    }

    /// A node the simulation will place when it starts.
    pub fn unplaced(id: impl Into<String>) -> Self {
        Self::new(id, f64::NAN, f64::NAN)
    }

    pub(crate) fn dummy(id: impl Into<String>, at: Point) -> Self {
        Self {
            kind: NodeKind::Dummy,
            ..Self::new(id, at.x, at.y)
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn pinned(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn is_dummy(&self) -> bool {
        self.kind == NodeKind::Dummy
    }

    pub fn position(&self) -> Point {
        point(self.x, self.y)
    }
}

/// A track segment between two stations, shared by every line in `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: String,
    pub source: String,
    pub target: String,
    pub path: Vec<String>,
}

impl Link {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            path: Vec::new(),
        }
    }

    pub fn on_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = lines.into_iter().map(Into::into).collect();
        self
    }
}

/// One narrative thread: the ordered stations a metro line visits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub id: String,
    pub nodes: Vec<String>,
}

impl Line {
    pub fn new<I, S>(id: impl Into<String>, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            nodes: nodes.into_iter().map(Into::into).collect(),
        }
    }
}
