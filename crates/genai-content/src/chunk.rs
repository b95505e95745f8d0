//! `Chunk`: a schema chunk paired with the id it travels under.

use std::fmt;

use genai_common::{unique_id, GenaiError, Result};
use genai_proto::{self as pb, chunk::Payload, ChunkMetadata, Message, Name};

use crate::metadata::{merge_metadata, MetadataExt};

/// Mimetype carried by chunks that hold an encoded protobuf message.
pub fn proto_mimetype<M: Name>() -> String {
    format!("application/x-protobuf; type={}", M::full_name())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
            Role::System => "SYSTEM",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    proto: pb::Chunk,
    id: String,
}

impl Chunk {
    /// UTF-8 text with mimetype `text/plain`.
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_proto(pb::Chunk {
            metadata: Some(crate::metadata::mimetype("text/plain")),
            payload: Some(Payload::Data(text.into().into_bytes())),
        })
    }

    /// Raw bytes. The metadata must name a mimetype.
    pub fn bytes(data: impl Into<Vec<u8>>, metadata: ChunkMetadata) -> Result<Self> {
        if metadata.mimetype.is_empty() {
            return Err(GenaiError::InvalidArgument(
                "a mimetype is required when providing bytes as the chunk value".into(),
            ));
        }
        Ok(Self::from_proto(pb::Chunk {
            metadata: Some(metadata),
            payload: Some(Payload::Data(data.into())),
        }))
    }

    /// A reference to externally stored content.
    pub fn reference(reference: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self::from_proto(pb::Chunk {
            metadata: Some(metadata),
            payload: Some(Payload::Ref(reference.into())),
        })
    }

    /// An encoded protobuf message, tagged with its type in the mimetype.
    pub fn from_message<M: Message + Name>(message: &M) -> Self {
        Self::from_proto(pb::Chunk {
            metadata: Some(crate::metadata::mimetype(proto_mimetype::<M>())),
            payload: Some(Payload::Data(message.encode_to_vec())),
        })
    }

    pub fn from_proto(proto: pb::Chunk) -> Self {
        Self {
            proto,
            id: unique_id(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Merge `metadata` over the chunk's existing metadata.
    pub fn with_metadata(mut self, metadata: &ChunkMetadata) -> Self {
        let target = self.proto.metadata.get_or_insert_with(ChunkMetadata::default);
        merge_metadata(target, metadata);
        self
    }

    pub fn with_role(self, role: Role) -> Self {
        self.with_metadata(&ChunkMetadata::default().with_role(role.as_str()))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn proto(&self) -> &pb::Chunk {
        &self.proto
    }

    pub fn into_proto(self) -> pb::Chunk {
        self.proto
    }

    pub fn metadata(&self) -> ChunkMetadata {
        self.proto.metadata.clone().unwrap_or_default()
    }

    pub fn mimetype(&self) -> &str {
        self.proto
            .metadata
            .as_ref()
            .map(|m| m.mimetype.as_str())
            .unwrap_or("")
    }

    pub fn role(&self) -> &str {
        self.proto
            .metadata
            .as_ref()
            .map(|m| m.role.as_str())
            .unwrap_or("")
    }

    /// The payload as text.
    ///
    /// Empty or reference-only chunks yield `""`. Otherwise the mimetype must
    /// be `text/*` or end in `/url`; with `raise_on_error == false` a
    /// non-text chunk yields `""` instead of an error.
    pub fn as_text(&self, raise_on_error: bool) -> Result<String> {
        let data = match self.proto.data() {
            Some(data) if !data.is_empty() => data,
            _ => return Ok(String::new()),
        };
        let mimetype = self.mimetype();
        if !mimetype.starts_with("text/") && !mimetype.ends_with("/url") {
            if raise_on_error {
                return Err(GenaiError::Content(format!(
                    "cannot convert chunk of type {mimetype} to text"
                )));
            }
            return Ok(String::new());
        }
        String::from_utf8(data.to_vec())
            .map_err(|e| GenaiError::Content(format!("chunk text is not UTF-8: {e}")))
    }

    /// Decode the payload as message `M`; the mimetype must name `M`.
    pub fn as_message<M: Message + Name + Default>(&self) -> Result<M> {
        let expected = proto_mimetype::<M>();
        if self.mimetype() != expected {
            return Err(GenaiError::Content(format!(
                "mismatching protobuf message mimetype. Expected={expected}, Got={}",
                self.mimetype()
            )));
        }
        M::decode(self.proto.data().unwrap_or_default())
            .map_err(|e| GenaiError::Wire(genai_common::WireError::Decode(e.to_string())))
    }
}

impl From<&str> for Chunk {
    fn from(text: &str) -> Self {
        Chunk::text(text)
    }
}

impl From<String> for Chunk {
    fn from(text: String) -> Self {
        Chunk::text(text)
    }
}

impl From<pb::Chunk> for Chunk {
    fn from(proto: pb::Chunk) -> Self {
        Chunk::from_proto(proto)
    }
}

pub fn user_chunk(value: impl Into<Chunk>) -> Chunk {
    value.into().with_role(Role::User)
}

pub fn assistant_chunk(value: impl Into<Chunk>) -> Chunk {
    value.into().with_role(Role::Assistant)
}

pub fn system_chunk(value: impl Into<Chunk>) -> Chunk {
    value.into().with_role(Role::System)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::mimetype;
    use genai_proto::TargetSpec;

    #[test]
    fn text_chunk_defaults() {
        let chunk = Chunk::text("hello");
        assert_eq!(chunk.mimetype(), "text/plain");
        assert_eq!(chunk.as_text(true).unwrap(), "hello");
        assert_eq!(chunk.id().len(), 32);
    }

    #[test]
    fn bytes_require_mimetype() {
        let err = Chunk::bytes(vec![1, 2], ChunkMetadata::default()).unwrap_err();
        assert!(matches!(err, GenaiError::InvalidArgument(_)));

        let chunk = Chunk::bytes(vec![1, 2], mimetype("image/png")).unwrap();
        assert_eq!(chunk.proto().data(), Some(&[1u8, 2][..]));
    }

    #[test]
    fn non_text_chunk_as_text() {
        let chunk = Chunk::bytes(vec![0xff], mimetype("image/png")).unwrap();
        assert!(matches!(chunk.as_text(true), Err(GenaiError::Content(_))));
        assert_eq!(chunk.as_text(false).unwrap(), "");
    }

    #[test]
    fn url_mimetype_counts_as_text() {
        let chunk = Chunk::bytes(b"https://example.com".to_vec(), mimetype("application/url"))
            .unwrap();
        assert_eq!(chunk.as_text(true).unwrap(), "https://example.com");
    }

    #[test]
    fn reference_chunk_has_no_text() {
        let chunk = Chunk::reference("blob://1", mimetype("video/mp4"));
        assert_eq!(chunk.as_text(true).unwrap(), "");
        assert_eq!(chunk.proto().reference(), Some("blob://1"));
    }

    #[test]
    fn invalid_utf8_text_is_an_error() {
        let chunk = Chunk::bytes(vec![0xff, 0xfe], mimetype("text/plain")).unwrap();
        assert!(chunk.as_text(true).is_err());
    }

    #[test]
    fn message_round_trip_checks_mimetype() {
        let target = TargetSpec { id: "gemini".into() };
        let chunk = Chunk::from_message(&target);
        assert_eq!(
            chunk.mimetype(),
            "application/x-protobuf; type=genai.v1.TargetSpec"
        );
        assert_eq!(chunk.as_message::<TargetSpec>().unwrap(), target);

        let err = chunk.as_message::<pb::NamedParameter>().unwrap_err();
        assert!(err.to_string().contains("Expected=application/x-protobuf; type=genai.v1.NamedParameter"));
    }

    #[test]
    fn role_helpers_merge_into_metadata() {
        let chunk = user_chunk("hi");
        assert_eq!(chunk.role(), "USER");
        assert_eq!(chunk.mimetype(), "text/plain");
        assert_eq!(assistant_chunk("a").role(), "ASSISTANT");
        assert_eq!(system_chunk("s").role(), "SYSTEM");
    }

    #[test]
    fn with_metadata_keeps_existing_fields() {
        let chunk = Chunk::text("x").with_metadata(&ChunkMetadata::default().with_file_name("x.txt"));
        let meta = chunk.metadata();
        assert_eq!(meta.mimetype, "text/plain");
        assert_eq!(meta.original_file_name, "x.txt");
    }

    #[test]
    fn equality_includes_id() {
        let a = Chunk::text("same").with_id("1");
        let b = Chunk::text("same").with_id("1");
        let c = Chunk::text("same").with_id("2");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
