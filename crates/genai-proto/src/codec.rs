//! Encoding and validated decoding of schema messages.
//!
//! Decoding tolerates unknown fields (they are skipped, not preserved) and
//! fills absent fields with defaults. Before the real decode, the
//! [`crate::wire`] check rejects chunks that set both payload alternatives.

use genai_common::WireError;
use prost::Message;

use crate::messages::{
    Action, Chunk, ChunkMetadata, NamedParameter, Node, NodeFragment, SessionMessage, TargetSpec,
};
use crate::wire;

/// A schema message that knows how to pre-validate its own wire bytes.
pub trait WireCheck: Message + Default + Sized {
    fn check_wire(buf: &[u8]) -> Result<(), WireError>;
}

/// Messages that hold no chunk; prost's own decode is the whole check.
macro_rules! no_chunks {
    ($($ty:ty),* $(,)?) => {
        $(
            impl WireCheck for $ty {
                fn check_wire(_buf: &[u8]) -> Result<(), WireError> {
                    Ok(())
                }
            }
        )*
    };
}

no_chunks!(ChunkMetadata, NamedParameter, TargetSpec, Action);

impl WireCheck for Chunk {
    fn check_wire(buf: &[u8]) -> Result<(), WireError> {
        wire::check_chunk(buf)
    }
}

impl WireCheck for Node {
    fn check_wire(buf: &[u8]) -> Result<(), WireError> {
        wire::check_node(buf)
    }
}

impl WireCheck for NodeFragment {
    fn check_wire(buf: &[u8]) -> Result<(), WireError> {
        wire::check_node_fragment(buf)
    }
}

impl WireCheck for SessionMessage {
    fn check_wire(buf: &[u8]) -> Result<(), WireError> {
        wire::check_session_message(buf)
    }
}

pub fn encode<M: Message>(message: &M) -> Vec<u8> {
    message.encode_to_vec()
}

/// Validate then decode one message. The whole buffer is rejected on error.
pub fn decode<M: WireCheck>(buf: &[u8]) -> Result<M, WireError> {
    M::check_wire(buf)?;
    M::decode(buf).map_err(|e| WireError::Decode(e.to_string()))
}

pub fn decode_session_message(buf: &[u8]) -> Result<SessionMessage, WireError> {
    decode(buf)
}

pub fn decode_node_fragment(buf: &[u8]) -> Result<NodeFragment, WireError> {
    decode(buf)
}

pub fn decode_node(buf: &[u8]) -> Result<Node, WireError> {
    decode(buf)
}

pub fn decode_chunk(buf: &[u8]) -> Result<Chunk, WireError> {
    decode(buf)
}

pub fn decode_action(buf: &[u8]) -> Result<Action, WireError> {
    decode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Payload;

    fn populated_session() -> SessionMessage {
        SessionMessage {
            node_fragments: vec![
                NodeFragment {
                    id: "c1".into(),
                    seq: 0,
                    continued: true,
                    child_ids: vec![],
                    chunk_fragment: Some(Chunk {
                        metadata: Some(ChunkMetadata {
                            mimetype: "text/plain".into(),
                            role: "USER".into(),
                            original_file_name: "prompt.txt".into(),
                            capture_time: Some(prost_types::Timestamp {
                                seconds: 1_700_000_000,
                                nanos: 42,
                            }),
                            experimental: vec![prost_types::Any {
                                type_url: "type.googleapis.com/acme.Tag".into(),
                                value: vec![1, 2, 3],
                            }],
                        }),
                        payload: Some(Payload::Data(b"hello ".to_vec())),
                    }),
                },
                NodeFragment {
                    id: "root".into(),
                    seq: 0,
                    continued: false,
                    child_ids: vec!["c1".into(), "c2".into()],
                    chunk_fragment: None,
                },
                NodeFragment {
                    id: "c2".into(),
                    chunk_fragment: Some(Chunk {
                        metadata: None,
                        payload: Some(Payload::Ref("blob://abc".into())),
                    }),
                    ..Default::default()
                },
            ],
            actions: vec![Action {
                name: "GENERATE".into(),
                inputs: vec![NamedParameter {
                    name: "prompt".into(),
                    id: "root".into(),
                }],
                outputs: vec![NamedParameter {
                    name: "response".into(),
                    id: "out".into(),
                }],
                target_spec: Some(TargetSpec { id: "gemini".into() }),
                configs: vec![],
            }],
        }
    }

    #[test]
    fn populated_session_round_trips() {
        let msg = populated_session();
        let decoded = decode_session_message(&encode(&msg)).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn default_session_round_trips_to_empty_bytes() {
        let msg = SessionMessage::default();
        let bytes = encode(&msg);
        assert!(bytes.is_empty());
        assert_eq!(decode_session_message(&bytes).unwrap(), msg);
    }

    #[test]
    fn unset_optionals_stay_unset() {
        let fragment = NodeFragment {
            id: "n".into(),
            ..Default::default()
        };
        let decoded = decode_node_fragment(&encode(&fragment)).unwrap();
        assert!(decoded.chunk_fragment.is_none());
        assert!(!decoded.continued);
        assert_eq!(decoded.seq, 0);
    }

    #[test]
    fn exactly_one_payload_after_decode() {
        let chunk = Chunk {
            metadata: None,
            payload: Some(Payload::Ref("blob://x".into())),
        };
        let decoded = decode_chunk(&encode(&chunk)).unwrap();
        assert_eq!(decoded.reference(), Some("blob://x"));
        assert!(decoded.data().is_none());
    }

    #[test]
    fn both_payloads_on_the_wire_are_rejected() {
        let with_ref = encode(&Chunk {
            metadata: None,
            payload: Some(Payload::Ref("blob://x".into())),
        });
        let with_data = encode(&Chunk {
            metadata: None,
            payload: Some(Payload::Data(b"abc".to_vec())),
        });
        // Concatenated encodings merge into one chunk carrying both.
        let mut both = with_ref.clone();
        both.extend_from_slice(&with_data);

        let err = decode_chunk(&both).unwrap_err();
        assert!(matches!(err, WireError::SchemaViolation(_)));

        // prost alone would silently keep the last alternative.
        let lenient = <Chunk as Message>::decode(both.as_slice()).unwrap();
        assert!(lenient.data().is_some());
    }

    #[test]
    fn conflict_nested_in_session_is_rejected() {
        let mut fragment = NodeFragment {
            id: "n1".into(),
            chunk_fragment: Some(Chunk {
                metadata: None,
                payload: Some(Payload::Ref("blob://x".into())),
            }),
            ..Default::default()
        };
        let mut bytes = encode(&fragment);
        fragment.id.clear();
        fragment.chunk_fragment = Some(Chunk {
            metadata: None,
            payload: Some(Payload::Data(b"x".to_vec())),
        });
        bytes.extend(encode(&fragment));

        // SessionMessage field 1 wrapping the merged fragment.
        let mut outer = vec![0x0a, bytes.len() as u8];
        outer.extend_from_slice(&bytes);

        let err = decode_session_message(&outer).unwrap_err();
        assert!(matches!(err, WireError::SchemaViolation(ref m) if m.contains("n1")));
    }

    #[test]
    fn conflict_in_node_is_rejected() {
        let mut bytes = encode(&Node {
            id: "n".into(),
            child_ids: vec![],
            chunk: Some(Chunk {
                metadata: None,
                payload: Some(Payload::Data(b"x".to_vec())),
            }),
        });
        bytes.extend(encode(&Node {
            id: String::new(),
            child_ids: vec![],
            chunk: Some(Chunk {
                metadata: None,
                payload: Some(Payload::Ref("r".into())),
            }),
        }));
        assert!(matches!(
            decode_node(&bytes),
            Err(WireError::SchemaViolation(_))
        ));
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let mut bytes = encode(&TargetSpec { id: "t".into() });
        // field 15, varint 7; field 16, length-delimited "zz"
        bytes.extend_from_slice(&[0x78, 0x07, 0x82, 0x01, 0x02, b'z', b'z']);
        let decoded: TargetSpec = decode(&bytes).unwrap();
        assert_eq!(decoded.id, "t");
    }

    #[test]
    fn unknown_fields_in_session_are_skipped() {
        let msg = populated_session();
        let mut bytes = encode(&msg);
        bytes.extend_from_slice(&[0x78, 0x01]);
        assert_eq!(decode_session_message(&bytes).unwrap(), msg);
    }

    #[test]
    fn malformed_bytes_are_decode_errors() {
        let err = decode_session_message(&[0x0a, 0x05, 0x01]).unwrap_err();
        assert!(matches!(err, WireError::Decode(_)));

        let err = decode_action(&[0xff]).unwrap_err();
        assert!(matches!(err, WireError::Decode(_)));
    }

    #[test]
    fn wrong_wire_type_for_known_field_is_decode_error() {
        // Action.name (tag 2) sent as a varint.
        let err = decode_action(&[0x10, 0x01]).unwrap_err();
        assert!(matches!(err, WireError::Decode(_)));
    }
}
