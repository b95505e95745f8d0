//! Helpers for building and merging `ChunkMetadata`.

use chrono::{DateTime, Utc};
use genai_proto::{Any, ChunkMetadata, Timestamp};

/// Builder-style setters on `ChunkMetadata`.
pub trait MetadataExt: Sized {
    fn with_mimetype(self, mimetype: impl Into<String>) -> Self;
    fn with_role(self, role: impl Into<String>) -> Self;
    fn with_file_name(self, name: impl Into<String>) -> Self;
    fn with_capture_time(self, at: DateTime<Utc>) -> Self;
    fn with_extension(self, extension: Any) -> Self;
    fn capture_time_utc(&self) -> Option<DateTime<Utc>>;
}

impl MetadataExt for ChunkMetadata {
    fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = mimetype.into();
        self
    }

    fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.original_file_name = name.into();
        self
    }

    fn with_capture_time(mut self, at: DateTime<Utc>) -> Self {
        self.capture_time = Some(to_timestamp(at));
        self
    }

    fn with_extension(mut self, extension: Any) -> Self {
        self.experimental.push(extension);
        self
    }

    fn capture_time_utc(&self) -> Option<DateTime<Utc>> {
        self.capture_time.as_ref().and_then(from_timestamp)
    }
}

pub fn mimetype(mimetype: impl Into<String>) -> ChunkMetadata {
    ChunkMetadata::default().with_mimetype(mimetype)
}

/// Protobuf merge: non-empty scalars in `other` overwrite, extension lists
/// append, a set capture time replaces the existing one.
pub fn merge_metadata(target: &mut ChunkMetadata, other: &ChunkMetadata) {
    if !other.mimetype.is_empty() {
        target.mimetype = other.mimetype.clone();
    }
    if !other.role.is_empty() {
        target.role = other.role.clone();
    }
    if !other.original_file_name.is_empty() {
        target.original_file_name = other.original_file_name.clone();
    }
    if other.capture_time.is_some() {
        target.capture_time = other.capture_time.clone();
    }
    target
        .experimental
        .extend(other.experimental.iter().cloned());
}

pub fn to_timestamp(at: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: at.timestamp(),
        nanos: at.timestamp_subsec_nanos() as i32,
    }
}

pub fn from_timestamp(ts: &Timestamp) -> Option<DateTime<Utc>> {
    let nanos = u32::try_from(ts.nanos).ok()?;
    DateTime::from_timestamp(ts.seconds, nanos)
}
