//! Per-id reassembly state.

use std::collections::BTreeMap;
use std::time::Instant;

use genai_common::FragmentError;
use genai_proto::{self as pb, chunk::Payload, Message, Node, NodeFragment};

use crate::metadata::merge_metadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadKind {
    Data,
    Ref,
}

/// Fragments received so far for one node id.
#[derive(Debug)]
pub struct PendingNode {
    id: String,
    fragments: BTreeMap<u64, NodeFragment>,
    /// Lowest seq not yet received; everything below it is contiguous.
    next_seq: u64,
    terminal_seq: Option<u64>,
    payload_kind: Option<PayloadKind>,
    buffered_bytes: usize,
    last_activity: Instant,
}

impl PendingNode {
    pub fn new(id: impl Into<String>, now: Instant) -> Self {
        Self {
            id: id.into(),
            fragments: BTreeMap::new(),
            next_seq: 0,
            terminal_seq: None,
            payload_kind: None,
            buffered_bytes: 0,
            last_activity: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn terminal_seq(&self) -> Option<u64> {
        self.terminal_seq
    }

    pub fn buffered_bytes(&self) -> usize {
        self.buffered_bytes
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Buffer `fragment`. Nothing is modified when it is rejected.
    pub fn accept(&mut self, fragment: NodeFragment, now: Instant) -> Result<(), FragmentError> {
        let seq = fragment.seq;
        if self.fragments.contains_key(&seq) {
            return Err(self.malformed(format!("duplicate seq {seq}")));
        }
        if !fragment.continued {
            if let Some(terminal) = self.terminal_seq {
                return Err(self.malformed(format!(
                    "second terminal fragment at seq {seq} (terminal already at {terminal})"
                )));
            }
            if let Some((&highest, _)) = self.fragments.last_key_value() {
                if highest > seq {
                    return Err(self.malformed(format!(
                        "terminal seq {seq} precedes received seq {highest}"
                    )));
                }
            }
        } else if let Some(terminal) = self.terminal_seq {
            if seq > terminal {
                return Err(self.malformed(format!(
                    "seq {seq} is past the terminal seq {terminal}"
                )));
            }
        }

        let kind = match fragment.chunk_fragment.as_ref().and_then(|c| c.payload.as_ref()) {
            Some(Payload::Data(_)) => Some(PayloadKind::Data),
            Some(Payload::Ref(_)) => Some(PayloadKind::Ref),
            None => None,
        };
        if let (Some(seen), Some(kind)) = (self.payload_kind, kind) {
            if seen != kind {
                return Err(self.malformed(format!(
                    "seq {seq} mixes ref and data payloads"
                )));
            }
        }

        if kind.is_some() {
            self.payload_kind = kind;
        }
        if !fragment.continued {
            self.terminal_seq = Some(seq);
        }
        self.buffered_bytes += fragment.encoded_len();
        self.last_activity = now;
        self.fragments.insert(seq, fragment);
        while self.fragments.contains_key(&self.next_seq) {
            self.next_seq += 1;
        }
        Ok(())
    }

    /// Terminal fragment known and every seq up to it received.
    pub fn is_complete(&self) -> bool {
        self.terminal_seq.is_some_and(|terminal| self.next_seq > terminal)
    }

    /// Merge buffered fragments in seq order into a node.
    pub fn assemble(self) -> Node {
        let mut child_ids = Vec::new();
        let mut chunk: Option<pb::Chunk> = None;
        let mut data = Vec::new();
        let mut reference = String::new();

        for fragment in self.fragments.into_values() {
            child_ids.extend(fragment.child_ids);
            let Some(part) = fragment.chunk_fragment else {
                continue;
            };
            let target = chunk.get_or_insert_with(pb::Chunk::default);
            if let Some(metadata) = part.metadata {
                merge_metadata(
                    target.metadata.get_or_insert_with(Default::default),
                    &metadata,
                );
            }
            match part.payload {
                Some(Payload::Data(bytes)) => data.extend_from_slice(&bytes),
                Some(Payload::Ref(r)) => reference.push_str(&r),
                None => {}
            }
        }

        if let Some(chunk) = chunk.as_mut() {
            chunk.payload = match self.payload_kind {
                Some(PayloadKind::Data) => Some(Payload::Data(data)),
                Some(PayloadKind::Ref) => Some(Payload::Ref(reference)),
                None => None,
            };
        }

        Node {
            id: self.id,
            child_ids,
            chunk,
        }
    }

    fn malformed(&self, reason: String) -> FragmentError {
        FragmentError::Malformed {
            id: self.id.clone(),
            reason,
        }
    }
}
