//! Structural checks on protobuf wire bytes.
//!
//! prost resolves a oneof by letting the last alternative on the wire win.
//! The session contract is stricter: a chunk that carries both `ref` and
//! `data` is rejected. The shadow messages below mirror every path that can
//! hold a [`crate::Chunk`], with the two alternatives as independent optional
//! fields, so decoding them leaves both set exactly when the wire has both.
//! Repeated occurrences of a singular chunk merge, so a conflict split across
//! occurrences is caught too.

use genai_common::WireError;
use prost::encoding::{decode_key, skip_field, DecodeContext};
use prost::Message;

#[derive(Clone, PartialEq, ::prost::Message)]
struct ChunkPayloads {
    #[prost(string, optional, tag = "2")]
    reference: Option<String>,
    #[prost(bytes = "vec", optional, tag = "3")]
    data: Option<Vec<u8>>,
}

impl ChunkPayloads {
    fn conflicting(&self) -> bool {
        self.reference.is_some() && self.data.is_some()
    }
}

/// `Node` with only the fields the check reads.
#[derive(Clone, PartialEq, ::prost::Message)]
struct NodePayloads {
    #[prost(string, tag = "1")]
    id: String,
    #[prost(message, optional, tag = "3")]
    chunk: Option<ChunkPayloads>,
}

/// `NodeFragment` with only the fields the check reads.
#[derive(Clone, PartialEq, ::prost::Message)]
struct FragmentPayloads {
    #[prost(string, tag = "1")]
    id: String,
    #[prost(message, optional, tag = "5")]
    chunk_fragment: Option<ChunkPayloads>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
struct SessionPayloads {
    #[prost(message, repeated, tag = "1")]
    node_fragments: Vec<FragmentPayloads>,
}

fn decode_error(e: prost::DecodeError) -> WireError {
    WireError::Decode(e.to_string())
}

fn shadow<M: Message + Default>(buf: &[u8]) -> Result<M, WireError> {
    M::decode(buf).map_err(decode_error)
}

fn conflict(kind: &str, id: &str, chunk: Option<&ChunkPayloads>) -> Result<(), WireError> {
    match chunk {
        Some(chunk) if chunk.conflicting() => Err(WireError::SchemaViolation(format!(
            "{kind} '{id}' carries a chunk with both ref and data set"
        ))),
        _ => Ok(()),
    }
}

/// Tags present at the top level of an encoded message, in wire order.
pub fn top_level_tags(mut buf: &[u8]) -> Result<Vec<u32>, WireError> {
    let mut tags = Vec::new();
    while !buf.is_empty() {
        let (tag, wire_type) = decode_key(&mut buf).map_err(decode_error)?;
        skip_field(wire_type, tag, &mut buf, DecodeContext::default()).map_err(decode_error)?;
        tags.push(tag);
    }
    Ok(tags)
}

pub(crate) fn check_chunk(buf: &[u8]) -> Result<(), WireError> {
    if shadow::<ChunkPayloads>(buf)?.conflicting() {
        return Err(WireError::SchemaViolation(
            "chunk carries both ref and data".into(),
        ));
    }
    Ok(())
}

pub(crate) fn check_node(buf: &[u8]) -> Result<(), WireError> {
    let node: NodePayloads = shadow(buf)?;
    conflict("node", &node.id, node.chunk.as_ref())
}

pub(crate) fn check_node_fragment(buf: &[u8]) -> Result<(), WireError> {
    let fragment: FragmentPayloads = shadow(buf)?;
    conflict("node fragment", &fragment.id, fragment.chunk_fragment.as_ref())
}

pub(crate) fn check_session_message(buf: &[u8]) -> Result<(), WireError> {
    let message: SessionPayloads = shadow(buf)?;
    for fragment in &message.node_fragments {
        conflict("node fragment", &fragment.id, fragment.chunk_fragment.as_ref())?;
    }
    Ok(())
}
