#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("link {link} references a missing node ({from} -> {to}, graph has {node_count} nodes)")]
    MissingEndpoint {
        link: usize,
        from: usize,
        to: usize,
        node_count: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
