//! Sessions: content written to and read from a bidirectional stream of
//! `SessionMessage`s, with incoming fragments reassembled into nodes.

mod manager;
mod stream;
mod types;

#[cfg(test)]
mod tests;

pub use manager::Session;
pub use stream::{BidiStream, MemoryStream};
pub use types::Writable;
