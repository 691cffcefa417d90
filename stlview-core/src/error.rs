/// Error types shared by the viewer core

/// Errors raised while decoding STL bytes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StlError {
    #[error("buffer of {0} bytes is too small to hold a binary STL header")]
    TooSmall(usize),

    #[error("binary STL declares {declared} triangles but the buffer only holds {available}")]
    Truncated { declared: usize, available: usize },

    #[error("malformed binary STL record at triangle {0}")]
    MalformedRecord(usize),

    #[error("ASCII STL contains no vertices")]
    NoVertices,

    #[error("ASCII STL has {0} vertices, which is not a whole number of triangles")]
    PartialTriangle(usize),
}

/// Errors raised while retrieving model bytes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("unsupported model URL: {0}")]
    UnsupportedUrl(String),
}

/// Everything that can go wrong between requesting a model and attaching it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("failed to fetch model: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to parse model: {0}")]
    Parse(#[from] StlError),

    #[error("model contains no triangles")]
    Empty,

    #[error("engine rejected the mesh: {0}")]
    Engine(String),
}

impl LoadError {
    /// Short text shown on the error overlay.
    pub fn user_message(&self) -> &'static str {
        "Failed to load model"
    }
}

/// Errors raised by the host environment (listeners, frame scheduling).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    #[error("failed to register {kind} listener: {reason}")]
    Listen { kind: &'static str, reason: String },

    #[error("failed to schedule frame: {0}")]
    Frame(String),

    #[error("host element unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by viewer lifecycle operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewerError {
    #[error("engine error: {0}")]
    Engine(String),

    #[error(transparent)]
    Host(#[from] HostError),
}
