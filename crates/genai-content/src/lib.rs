//! Content API for genai sessions.
//!
//! - `Chunk` / `Content`: typed wrappers around schema chunks
//! - Conversion of content into node fragments (optionally split)
//! - Fragment reassembly with bounded memory
//! - `Session` over any `BidiStream`

pub mod chunk;
pub mod content;
pub mod metadata;
pub mod reassembly;
pub mod session;

pub use chunk::{assistant_chunk, proto_mimetype, system_chunk, user_chunk, Chunk, Role};
pub use content::{fragment_chunk, Content};
pub use metadata::{merge_metadata, mimetype, MetadataExt};
pub use reassembly::{NodeIndex, PendingNode, Reassembler, ReassemblyLimits};
pub use session::{BidiStream, MemoryStream, Session, Writable};

pub use genai_common::unique_id;
