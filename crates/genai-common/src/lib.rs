//! Shared error types and identifiers for the genai workspace.

pub mod errors;
pub mod id;

pub use errors::{ConfigError, FragmentError, GenaiError, WireError};
pub use id::{new_session_id, unique_id, SessionId};

pub type Result<T> = std::result::Result<T, GenaiError>;
