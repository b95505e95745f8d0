//! Type-tagged extension records (`ChunkMetadata.experimental`,
//! `Action.configs`).
//!
//! Each entry is a `google.protobuf.Any`: a type URL plus opaque bytes. A
//! registry maps type names to decoders; entries with unregistered types are
//! retained raw or dropped according to [`UnknownExtensionPolicy`].

use std::any::Any as StdAny;
use std::collections::HashMap;
use std::fmt;

use genai_common::WireError;
use prost::{Message, Name};
use prost_types::Any;
use tracing::debug;

/// A decoded extension value, downcastable to its concrete message type.
pub trait ExtensionMessage: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn StdAny;
    fn type_url(&self) -> String;
    fn encode_value(&self) -> Vec<u8>;
}

impl<M> ExtensionMessage for M
where
    M: Message + Name + 'static,
{
    fn as_any(&self) -> &dyn StdAny {
        self
    }

    fn type_url(&self) -> String {
        M::type_url()
    }

    fn encode_value(&self) -> Vec<u8> {
        self.encode_to_vec()
    }
}

#[derive(Debug)]
pub enum Extension {
    Known {
        type_name: String,
        value: Box<dyn ExtensionMessage>,
    },
    /// Unregistered type, kept byte-for-byte for pass-through.
    Unknown(Any),
}

impl Extension {
    pub fn type_name(&self) -> &str {
        match self {
            Extension::Known { type_name, .. } => type_name,
            Extension::Unknown(any) => type_name_of(&any.type_url),
        }
    }

    pub fn downcast_ref<M: 'static>(&self) -> Option<&M> {
        match self {
            Extension::Known { value, .. } => value.as_any().downcast_ref::<M>(),
            Extension::Unknown(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Extension::Known { .. })
    }

    /// Re-encode for transmission.
    pub fn to_any(&self) -> Any {
        match self {
            Extension::Known { value, .. } => Any {
                type_url: value.type_url(),
                value: value.encode_value(),
            },
            Extension::Unknown(any) => any.clone(),
        }
    }
}

/// What to do with entries whose type is not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownExtensionPolicy {
    #[default]
    Retain,
    Drop,
}

type DecodeFn = fn(&Any) -> Result<Box<dyn ExtensionMessage>, prost::DecodeError>;

fn decode_boxed<M>(any: &Any) -> Result<Box<dyn ExtensionMessage>, prost::DecodeError>
where
    M: Message + Name + Default + 'static,
{
    Ok(Box::new(any.to_msg::<M>()?))
}

/// The message name portion of a type URL (everything after the last `/`),
/// used as the registry key.
pub fn type_name_of(type_url: &str) -> &str {
    match type_url.rfind('/') {
        Some(idx) => &type_url[idx + 1..],
        None => type_url,
    }
}

#[derive(Default)]
pub struct ExtensionRegistry {
    decoders: HashMap<String, DecodeFn>,
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.decoders.keys().collect();
        names.sort();
        f.debug_struct("ExtensionRegistry")
            .field("types", &names)
            .finish()
    }
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<M>(&mut self) -> &mut Self
    where
        M: Message + Name + Default + 'static,
    {
        self.decoders.insert(M::full_name(), decode_boxed::<M>);
        self
    }

    pub fn with<M>(mut self) -> Self
    where
        M: Message + Name + Default + 'static,
    {
        self.register::<M>();
        self
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.decoders.contains_key(type_name)
    }

    /// Decode one entry. A registered type whose bytes fail to decode is an
    /// error, never downgraded to `Unknown`.
    pub fn decode(&self, any: &Any) -> Result<Extension, WireError> {
        let type_name = type_name_of(&any.type_url);
        match self.decoders.get(type_name) {
            Some(decode) => {
                let value = decode(any).map_err(|e| {
                    WireError::Decode(format!("extension {type_name}: {e}"))
                })?;
                Ok(Extension::Known {
                    type_name: type_name.to_string(),
                    value,
                })
            }
            None => Ok(Extension::Unknown(any.clone())),
        }
    }

    pub fn decode_all(
        &self,
        entries: &[Any],
        policy: UnknownExtensionPolicy,
    ) -> Result<Vec<Extension>, WireError> {
        let mut out = Vec::with_capacity(entries.len());
        for any in entries {
            match self.decode(any)? {
                Extension::Unknown(raw) if policy == UnknownExtensionPolicy::Drop => {
                    debug!(type_url = %raw.type_url, "Dropping unknown extension");
                }
                ext => out.push(ext),
            }
        }
        Ok(out)
    }
}
