/// Rejected topology edits and violated structural invariants.
///
/// Edits check everything before they mutate, so receiving one of these means nothing changed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    #[error("unknown node: {id}")]
    UnknownNode { id: String },
    #[error("unknown link: {id}")]
    UnknownLink { id: String },
    #[error("unknown line: {id}")]
    UnknownLine { id: String },
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },
    #[error("link {link} is a self-loop on {node}")]
    SelfLoop { link: String, node: String },
    #[error("link {link} carries no lines and cannot be bent")]
    Lineless { link: String },
    #[error("node {id} is not a dummy node")]
    NotDummy { id: String },
    #[error("dummy node {id} does not sit on a two-edge chain")]
    BrokenChain { id: String },
    #[error("line {line} does not traverse link {link} between consecutive stops")]
    InconsistentLine { line: String, link: String },
    #[error("link {link} references missing node {node}")]
    DanglingLink { link: String, node: String },
    #[error("line {line} references missing node {node}")]
    DanglingLine { line: String, node: String },
}

/// Persisted state that cannot be turned back into a consistent graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateError {
    #[error("{referenced_by} references unknown node {id}")]
    UnknownNode { id: String, referenced_by: String },
    #[error("{referenced_by} references unknown link {id}")]
    UnknownLink { id: String, referenced_by: String },
    #[error("{referenced_by} references unknown line {id}")]
    UnknownLine { id: String, referenced_by: String },
    #[error("duplicate {kind} id in state: {id}")]
    DuplicateId { kind: &'static str, id: String },
    #[error("node {node} has an unparseable date: {value}")]
    InvalidDate { node: String, value: String },
    #[error("node {node} edge entry for line {line} must list exactly two links, found {count}")]
    MalformedEdges {
        node: String,
        line: String,
        count: usize,
    },
    #[error("unknown mode: {0}")]
    UnknownMode(u8),
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// Tunables rejected at the configuration boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },
    #[error("{name} range must be finite, got {range:?}")]
    NonFiniteRange { name: &'static str, range: [f64; 2] },
    #[error("{name} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("canvas size must be positive and finite, got {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Simulation(#[from] narwhal::Error),
    #[error("state JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{operation} is only available in edit mode (current mode: {mode:?})")]
    WrongMode {
        operation: &'static str,
        mode: crate::map::Mode,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
