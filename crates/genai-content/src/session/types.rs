//! Values that can be written to a session.

use genai_proto::{Action, NodeFragment, SessionMessage};

use crate::chunk::Chunk;
use crate::content::Content;

#[derive(Debug, Clone)]
pub enum Writable {
    Message(SessionMessage),
    Fragment(NodeFragment),
    Action(Action),
    Content(Content),
}

impl From<SessionMessage> for Writable {
    fn from(message: SessionMessage) -> Self {
        Writable::Message(message)
    }
}

impl From<NodeFragment> for Writable {
    fn from(fragment: NodeFragment) -> Self {
        Writable::Fragment(fragment)
    }
}

impl From<Action> for Writable {
    fn from(action: Action) -> Self {
        Writable::Action(action)
    }
}

impl From<Content> for Writable {
    fn from(content: Content) -> Self {
        Writable::Content(content)
    }
}

impl From<Chunk> for Writable {
    fn from(chunk: Chunk) -> Self {
        Writable::Content(chunk.into())
    }
}

impl From<&str> for Writable {
    fn from(text: &str) -> Self {
        Writable::Content(text.into())
    }
}

impl From<String> for Writable {
    fn from(text: String) -> Self {
        Writable::Content(text.into())
    }
}
