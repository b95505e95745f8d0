//! Declared and reserved field tags, read from the compiled schema.
//!
//! Tags are the wire identity of a field. A reserved tag belonged to a
//! retired field; reusing it would let old peers misread new data. The table
//! here comes from the `FileDescriptorSet` emitted while compiling
//! `session.proto`, so it always matches the generated message types.

use std::ops::Range;

use genai_common::WireError;
use prost::Message;
use prost_types::{DescriptorProto, FileDescriptorSet};

use crate::wire::top_level_tags;

/// Encoded `FileDescriptorSet` for package `genai.v1` and its imports.
pub const FILE_DESCRIPTOR_SET: &[u8] =
    include_bytes!(concat!(env!("OUT_DIR"), "/genai_descriptor.bin"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTags {
    pub name: String,
    pub fields: Vec<(String, u32)>,
    /// Half-open ranges, as stored in the descriptor.
    pub reserved: Vec<Range<u32>>,
}

fn tag(number: i32) -> u32 {
    u32::try_from(number).unwrap_or(0)
}

impl MessageTags {
    fn from_descriptor(message: &DescriptorProto) -> Self {
        Self {
            name: message.name().to_string(),
            fields: message
                .field
                .iter()
                .map(|f| (f.name().to_string(), tag(f.number())))
                .collect(),
            reserved: message
                .reserved_range
                .iter()
                .map(|r| tag(r.start())..tag(r.end()))
                .collect(),
        }
    }

    pub fn tag_of(&self, field: &str) -> Option<u32> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, tag)| *tag)
    }

    pub fn declares(&self, tag: u32) -> bool {
        self.fields.iter().any(|(_, t)| *t == tag)
    }

    pub fn is_reserved(&self, tag: u32) -> bool {
        self.reserved.iter().any(|range| range.contains(&tag))
    }
}

/// Every message of package `genai.v1`.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    messages: Vec<MessageTags>,
}

impl Schema {
    /// The schema this crate was built from.
    pub fn compiled() -> Result<Self, WireError> {
        let set = FileDescriptorSet::decode(FILE_DESCRIPTOR_SET)
            .map_err(|e| WireError::Decode(format!("compiled descriptor: {e}")))?;
        Ok(Self::from_set(&set))
    }

    pub fn from_set(set: &FileDescriptorSet) -> Self {
        let messages = set
            .file
            .iter()
            .filter(|file| file.package() == crate::PACKAGE)
            .flat_map(|file| file.message_type.iter())
            .map(MessageTags::from_descriptor)
            .collect();
        Self { messages }
    }

    pub fn messages(&self) -> &[MessageTags] {
        &self.messages
    }

    pub fn message(&self, name: &str) -> Option<&MessageTags> {
        self.messages.iter().find(|m| m.name == name)
    }

    /// Every problem in the table: a declared tag that is reserved, or a tag
    /// declared twice in one message.
    pub fn check_reserved(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for message in &self.messages {
            for (i, (field, tag)) in message.fields.iter().enumerate() {
                if message.is_reserved(*tag) {
                    problems.push(format!(
                        "{}.{field} uses reserved tag {tag}",
                        message.name
                    ));
                }
                if message.fields[..i].iter().any(|(_, t)| t == tag) {
                    problems.push(format!("{}.{field} reuses tag {tag}", message.name));
                }
            }
        }
        problems
    }

    /// Confirm an encoded message only carries declared, unreserved tags.
    pub fn verify_encoded(&self, message: &str, buf: &[u8]) -> Result<(), WireError> {
        let tags = self
            .message(message)
            .ok_or_else(|| WireError::SchemaViolation(format!("unknown message {message}")))?;
        for tag in top_level_tags(buf)? {
            if tags.is_reserved(tag) {
                return Err(WireError::SchemaViolation(format!(
                    "{message} carries reserved tag {tag}"
                )));
            }
            if !tags.declares(tag) {
                return Err(WireError::SchemaViolation(format!(
                    "{message} carries undeclared tag {tag}"
                )));
            }
        }
        Ok(())
    }
}

/// [`Schema::check_reserved`] over the compiled schema.
pub fn check_reserved() -> Result<Vec<String>, WireError> {
    Ok(Schema::compiled()?.check_reserved())
}

/// [`Schema::verify_encoded`] against the compiled schema.
pub fn verify_encoded(message: &str, buf: &[u8]) -> Result<(), WireError> {
    Schema::compiled()?.verify_encoded(message, buf)
}
