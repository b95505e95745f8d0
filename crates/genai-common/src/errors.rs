use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures while turning bytes into schema messages.
///
/// A whole message is rejected on either variant; no partial result is
/// returned once framing or the payload contract cannot be trusted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("schema violation: {0}")]
    SchemaViolation(String),
}

/// Failures while reassembling node fragments into nodes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FragmentError {
    #[error("malformed fragment for node '{id}': {reason}")]
    Malformed { id: String, reason: String },

    #[error("session ended with incomplete fragment sequences: {}", ids.join(", "))]
    IncompleteSession { ids: Vec<String> },

    #[error("reassembly limit exceeded: {0}")]
    LimitExceeded(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GenaiError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Fragment(#[from] FragmentError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("content error: {0}")]
    Content(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}
