//! `Content`: an identified, ordered sequence of chunks.

use std::ops::Add;

use genai_common::{unique_id, Result};
use genai_proto::{self as pb, chunk::Payload, NodeFragment};

use crate::chunk::Chunk;

#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    id: String,
    chunks: Vec<Chunk>,
}

impl Content {
    pub fn new() -> Self {
        Self {
            id: unique_id(),
            chunks: Vec::new(),
        }
    }

    pub fn from_chunks(chunks: impl IntoIterator<Item = Chunk>) -> Self {
        Self {
            id: unique_id(),
            chunks: chunks.into_iter().collect(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn push(&mut self, chunk: impl Into<Chunk>) {
        self.chunks.push(chunk.into());
    }

    /// Append every chunk of `other`, keeping this content's id.
    pub fn append(&mut self, other: Content) {
        self.chunks.extend(other.chunks);
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> {
        self.chunks.iter()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn as_text(&self, raise_on_error: bool) -> Result<String> {
        let mut text = String::new();
        for chunk in &self.chunks {
            text.push_str(&chunk.as_text(raise_on_error)?);
        }
        Ok(text)
    }

    /// One single-fragment node per chunk, then a root fragment carrying
    /// this content's id and listing the chunk nodes as children.
    pub fn node_fragments(&self) -> Vec<NodeFragment> {
        self.node_fragments_split(0)
    }

    /// Like [`Content::node_fragments`], but inline data longer than
    /// `max_bytes` is spread over several sequenced fragments. `0` disables
    /// splitting.
    pub fn node_fragments_split(&self, max_bytes: usize) -> Vec<NodeFragment> {
        let mut fragments = Vec::with_capacity(self.chunks.len() + 1);
        let mut root = NodeFragment {
            id: self.id.clone(),
            ..Default::default()
        };
        for chunk in &self.chunks {
            let chunk_id = unique_id();
            fragments.extend(fragment_chunk(&chunk_id, chunk.proto(), max_bytes));
            root.child_ids.push(chunk_id);
        }
        fragments.push(root);
        fragments
    }
}

/// Fragments for one chunk node. Metadata rides on the first fragment only.
pub fn fragment_chunk(id: &str, chunk: &pb::Chunk, max_bytes: usize) -> Vec<NodeFragment> {
    let data = match &chunk.payload {
        Some(Payload::Data(data)) if max_bytes > 0 && data.len() > max_bytes => data,
        _ => {
            return vec![NodeFragment {
                id: id.to_string(),
                chunk_fragment: Some(chunk.clone()),
                ..Default::default()
            }]
        }
    };

    let pieces: Vec<&[u8]> = data.chunks(max_bytes).collect();
    let last = pieces.len() - 1;
    pieces
        .into_iter()
        .enumerate()
        .map(|(seq, piece)| NodeFragment {
            id: id.to_string(),
            seq: seq as u64,
            continued: seq != last,
            child_ids: Vec::new(),
            chunk_fragment: Some(pb::Chunk {
                metadata: if seq == 0 { chunk.metadata.clone() } else { None },
                payload: Some(Payload::Data(piece.to_vec())),
            }),
        })
        .collect()
}

impl Default for Content {
    fn default() -> Self {
        Self::new()
    }
}

impl Add for Content {
    type Output = Content;

    /// Concatenation keeps the left-hand id.
    fn add(mut self, rhs: Content) -> Content {
        self.append(rhs);
        self
    }
}

impl Extend<Chunk> for Content {
    fn extend<T: IntoIterator<Item = Chunk>>(&mut self, iter: T) {
        self.chunks.extend(iter);
    }
}

impl FromIterator<Chunk> for Content {
    fn from_iter<T: IntoIterator<Item = Chunk>>(iter: T) -> Self {
        Content::from_chunks(iter)
    }
}

impl IntoIterator for Content {
    type Item = Chunk;
    type IntoIter = std::vec::IntoIter<Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.into_iter()
    }
}

impl<'a> IntoIterator for &'a Content {
    type Item = &'a Chunk;
    type IntoIter = std::slice::Iter<'a, Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}

impl From<Chunk> for Content {
    fn from(chunk: Chunk) -> Self {
        Content::from_chunks([chunk])
    }
}

impl From<Vec<Chunk>> for Content {
    fn from(chunks: Vec<Chunk>) -> Self {
        Content::from_chunks(chunks)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Chunk::text(text).into()
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Chunk::text(text).into()
    }
}

impl From<pb::Chunk> for Content {
    fn from(proto: pb::Chunk) -> Self {
        Chunk::from_proto(proto).into()
    }
}
