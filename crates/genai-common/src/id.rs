use serde::{Deserialize, Serialize};
use std::fmt;

/// Globally unique identifier, usable as a node id.
///
/// 32 lowercase hex characters (a v4 UUID without hyphens).
pub fn unique_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub fn new_session_id() -> SessionId {
    SessionId::new()
}

/// Identifies one bidirectional session for logging and reassembly bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
