//! Session schema message types (package `genai.v1`).
//!
//! Generated from `proto/genai/v1/session.proto` at build time. Field tags
//! are the wire identity of each field and must never be reassigned.
//! `Action` tag 1 is reserved in the schema; see [`crate::descriptor`].

include!(concat!(env!("OUT_DIR"), "/genai.v1.rs"));

macro_rules! impl_name {
    ($($ty:ident),* $(,)?) => {
        $(
            impl ::prost::Name for $ty {
                const NAME: &'static str = stringify!($ty);
                const PACKAGE: &'static str = crate::PACKAGE;

                fn full_name() -> ::prost::alloc::string::String {
                    format!("{}.{}", crate::PACKAGE, stringify!($ty))
                }

                fn type_url() -> ::prost::alloc::string::String {
                    format!("{}{}", crate::TYPE_URL_PREFIX, Self::full_name())
                }
            }
        )*
    };
}

impl_name!(
    ChunkMetadata,
    Chunk,
    Node,
    NodeFragment,
    NamedParameter,
    TargetSpec,
    Action,
    SessionMessage,
);

impl Chunk {
    /// Inline bytes, or `None` when the payload is a reference or unset.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.payload {
            Some(chunk::Payload::Data(data)) => Some(data),
            _ => None,
        }
    }

    /// Reference string, or `None` when the payload is inline or unset.
    pub fn reference(&self) -> Option<&str> {
        match &self.payload {
            Some(chunk::Payload::Ref(reference)) => Some(reference),
            _ => None,
        }
    }
}

impl SessionMessage {
    pub fn from_fragments(node_fragments: Vec<NodeFragment>) -> Self {
        Self {
            node_fragments,
            actions: Vec::new(),
        }
    }

    pub fn from_action(action: Action) -> Self {
        Self {
            node_fragments: Vec::new(),
            actions: vec![action],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.node_fragments.is_empty() && self.actions.is_empty()
    }
}
