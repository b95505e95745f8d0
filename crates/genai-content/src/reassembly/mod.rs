//! Consumer-side reassembly of node fragments.
//!
//! Fragments sharing an id are buffered per id until the terminal fragment
//! (`continued == false`) is known and every seq from 0 through it has
//! arrived. Arrival order does not matter. Completed ids (ids only, never
//! payload) are remembered for the life of the reassembler so a late fragment
//! for them is rejected. Ids dropped by idle eviction are remembered until
//! [`Reassembler::finish`] reports them as incomplete.

mod index;
mod pending;


pub use index::NodeIndex;
pub use pending::PendingNode;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::{Duration, Instant};

use genai_common::FragmentError;
use genai_proto::{Message, Node, NodeFragment};
use tracing::{debug, warn};

/// Bounds on the memory a single reassembler may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReassemblyLimits {
    /// Pending ids without activity for longer than this are evicted.
    pub idle_timeout: Duration,
    pub max_pending_nodes: usize,
    pub max_buffered_bytes: usize,
}

impl Default for ReassemblyLimits {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(300),
            max_pending_nodes: 4096,
            max_buffered_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Arena of pending nodes for one session. Single writer.
#[derive(Debug, Default)]
pub struct Reassembler {
    pending: HashMap<String, PendingNode>,
    completed: HashSet<String>,
    /// Started sequences dropped by `evict_idle` and never restarted to
    /// completion.
    evicted: BTreeSet<String>,
    buffered_bytes: usize,
    limits: ReassemblyLimits,
}

impl Reassembler {
    pub fn new(limits: ReassemblyLimits) -> Self {
        Self {
            limits,
            ..Default::default()
        }
    }

    pub fn limits(&self) -> &ReassemblyLimits {
        &self.limits
    }

    pub fn push(&mut self, fragment: NodeFragment) -> Result<Option<Node>, FragmentError> {
        self.push_at(fragment, Instant::now())
    }

    /// Feed one fragment observed at `now`. Returns the node once complete.
    ///
    /// A malformed fragment discards everything buffered for its id.
    pub fn push_at(
        &mut self,
        fragment: NodeFragment,
        now: Instant,
    ) -> Result<Option<Node>, FragmentError> {
        let id = fragment.id.clone();
        if id.is_empty() {
            return Err(FragmentError::Malformed {
                id,
                reason: "fragment has an empty node id".into(),
            });
        }
        if self.completed.contains(&id) {
            return Err(FragmentError::Malformed {
                id,
                reason: "node already completed in this session".into(),
            });
        }

        let size = fragment.encoded_len();
        if !self.pending.contains_key(&id) && self.pending.len() >= self.limits.max_pending_nodes {
            return Err(FragmentError::LimitExceeded(format!(
                "more than {} pending nodes",
                self.limits.max_pending_nodes
            )));
        }
        if self.buffered_bytes + size > self.limits.max_buffered_bytes {
            return Err(FragmentError::LimitExceeded(format!(
                "buffering node '{id}' would exceed {} bytes",
                self.limits.max_buffered_bytes
            )));
        }

        let seq = fragment.seq;
        let accepted = {
            let entry = self
                .pending
                .entry(id.clone())
                .or_insert_with(|| PendingNode::new(id.clone(), now));
            entry.accept(fragment, now).map(|()| entry.is_complete())
        };

        match accepted {
            Err(err) => {
                self.discard(&id);
                warn!(id = %id, seq, error = %err, "Discarding malformed fragment sequence");
                Err(err)
            }
            Ok(false) => {
                self.buffered_bytes += size;
                debug!(id = %id, seq, "Buffered fragment");
                Ok(None)
            }
            Ok(true) => {
                self.buffered_bytes += size;
                let Some(pending) = self.discard(&id) else {
                    return Ok(None);
                };
                self.evicted.remove(&id);
                self.completed.insert(id.clone());
                debug!(id = %id, "Node complete");
                Ok(Some(pending.assemble()))
            }
        }
    }

    /// Drop ids idle longer than the configured timeout.
    ///
    /// Evicted ids still count as incomplete at [`Reassembler::finish`]
    /// unless a later sequence for the same id completes.
    pub fn evict_idle(&mut self, now: Instant) -> Vec<String> {
        let timeout = self.limits.idle_timeout;
        let stale: Vec<String> = self
            .pending
            .values()
            .filter(|p| now.saturating_duration_since(p.last_activity()) > timeout)
            .map(|p| p.id().to_string())
            .collect();
        for id in &stale {
            if let Some(pending) = self.discard(id) {
                warn!(
                    id = %id,
                    next_seq = pending.next_seq(),
                    "Evicting idle fragment sequence"
                );
                self.evicted.insert(id.clone());
            }
        }
        stale
    }

    /// Ids still waiting for fragments, sorted.
    pub fn pending_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.pending.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn buffered_bytes(&self) -> usize {
        self.buffered_bytes
    }

    /// Ids evicted while idle and not completed since, sorted.
    pub fn evicted_ids(&self) -> Vec<String> {
        self.evicted.iter().cloned().collect()
    }

    /// End of session: any pending or evicted id is an incomplete sequence.
    pub fn finish(&mut self) -> Result<(), FragmentError> {
        if self.pending.is_empty() && self.evicted.is_empty() {
            return Ok(());
        }
        let mut ids: BTreeSet<String> = std::mem::take(&mut self.evicted);
        ids.extend(self.pending.drain().map(|(id, _)| id));
        self.buffered_bytes = 0;
        Err(FragmentError::IncompleteSession {
            ids: ids.into_iter().collect(),
        })
    }

    fn discard(&mut self, id: &str) -> Option<PendingNode> {
        let pending = self.pending.remove(id)?;
        self.buffered_bytes = self.buffered_bytes.saturating_sub(pending.buffered_bytes());
        Some(pending)
    }
}
