//! `Session`: content-level reads and writes over a `BidiStream`.

use std::collections::VecDeque;
use std::time::Instant;

use genai_common::{GenaiError, Result, SessionId};
use genai_proto::{Node, SessionMessage};
use tracing::{debug, warn};

use crate::chunk::Chunk;
use crate::content::Content;
use crate::reassembly::{NodeIndex, Reassembler, ReassemblyLimits};

use super::stream::BidiStream;
use super::types::Writable;

pub struct Session<S> {
    id: SessionId,
    stream: S,
    reassembler: Reassembler,
    /// Completed nodes kept for `resolve`. Off unless `with_index` was called.
    index: Option<NodeIndex>,
    /// Completed nodes not yet handed out by `next_node`.
    ready: VecDeque<Node>,
    finished: bool,
}

impl<S: BidiStream> Session<S> {
    pub fn new(stream: S) -> Self {
        Self::with_limits(stream, ReassemblyLimits::default())
    }

    pub fn with_limits(stream: S, limits: ReassemblyLimits) -> Self {
        Self {
            id: SessionId::new(),
            stream,
            reassembler: Reassembler::new(limits),
            index: None,
            ready: VecDeque::new(),
            finished: false,
        }
    }

    /// Keep every completed node for [`Session::resolve`].
    ///
    /// Each node is then held twice: once in the index and once by whoever
    /// takes it from `next_node`. Sessions that only stream chunks should
    /// leave this off.
    pub fn with_index(mut self) -> Self {
        self.index.get_or_insert_with(NodeIndex::new);
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn index(&self) -> Option<&NodeIndex> {
        self.index.as_ref()
    }

    /// Write a value, optionally under `id`.
    ///
    /// A raw `SessionMessage` already carries its ids, so passing one with it
    /// is an error.
    pub async fn write(&mut self, value: impl Into<Writable>, id: Option<&str>) -> Result<()> {
        let message = match value.into() {
            Writable::Message(message) => {
                if id.is_some() {
                    return Err(GenaiError::InvalidArgument(
                        "an id cannot be given with a SessionMessage".into(),
                    ));
                }
                message
            }
            Writable::Fragment(mut fragment) => {
                if let Some(id) = id {
                    fragment.id = id.to_string();
                }
                SessionMessage::from_fragments(vec![fragment])
            }
            Writable::Action(action) => SessionMessage::from_action(action),
            Writable::Content(content) => {
                let content = match id {
                    Some(id) => content.with_id(id),
                    None => content,
                };
                SessionMessage::from_fragments(content.node_fragments())
            }
        };
        debug!(
            session = %self.id,
            fragments = message.node_fragments.len(),
            actions = message.actions.len(),
            "Writing session message"
        );
        self.stream.write(message).await
    }

    pub async fn done_writing(&mut self) -> Result<()> {
        debug!(session = %self.id, "Done writing");
        self.stream.done_writing().await
    }

    /// Next completed node, in completion order.
    ///
    /// Returns `Ok(None)` at end of stream, or `IncompleteSession` if a
    /// started sequence (pending or evicted while idle) never completed.
    ///
    /// Every fragment of a message is fed to the reassembler even when one of
    /// them is rejected. The first rejection is returned after the message is
    /// processed, and nodes completed by the rest stay queued for later calls.
    pub async fn next_node(&mut self) -> Result<Option<Node>> {
        loop {
            if let Some(node) = self.ready.pop_front() {
                return Ok(Some(node));
            }
            if self.finished {
                return Ok(None);
            }

            let message = match self.stream.read().await {
                Some(message) => message?,
                None => {
                    self.finished = true;
                    self.reassembler.finish()?;
                    debug!(session = %self.id, "Stream finished");
                    return Ok(None);
                }
            };

            let evicted = self.reassembler.evict_idle(Instant::now());
            if !evicted.is_empty() {
                warn!(session = %self.id, count = evicted.len(), "Evicted idle fragment sequences");
            }
            for action in &message.actions {
                debug!(session = %self.id, action = %action.name, "Skipping action from peer");
            }
            let mut first_error = None;
            for fragment in message.node_fragments {
                match self.reassembler.push(fragment) {
                    Ok(Some(node)) => {
                        if let Some(index) = self.index.as_mut() {
                            index.insert(node.clone());
                        }
                        self.ready.push_back(node);
                    }
                    Ok(None) => {}
                    Err(err) => {
                        if first_error.is_none() {
                            first_error = Some(err);
                        }
                    }
                }
            }
            if let Some(err) = first_error {
                return Err(err.into());
            }
        }
    }

    /// Next completed node that carries a chunk, as a `Chunk` with the node id.
    pub async fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        while let Some(node) = self.next_node().await? {
            if let Some(chunk) = node.chunk {
                return Ok(Some(Chunk::from_proto(chunk).with_id(node.id)));
            }
        }
        Ok(None)
    }

    /// Content of the tree rooted at `root`, from nodes completed so far.
    /// Requires [`Session::with_index`].
    pub fn resolve(&self, root: &str) -> Result<Content> {
        let index = self.index.as_ref().ok_or_else(|| {
            GenaiError::InvalidArgument("resolve needs a session built with_index".into())
        })?;
        Ok(index.resolve(root)?)
    }

    pub fn into_stream(self) -> S {
        self.stream
    }
}
