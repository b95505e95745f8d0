//! gRPC codec for `SessionMessage` streams.
//!
//! Responses go through the validating decoder. A message that fails
//! validation is handed to the reader as a `WireError` rather than a
//! transport `Status`, so callers see the same error they would for a local
//! decode.

use genai_common::WireError;
use genai_proto::{decode_session_message, Message, SessionMessage};
use prost::bytes::{Buf, BufMut};
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::Status;

pub type Decoded = Result<SessionMessage, WireError>;

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCodec;

impl Codec for SessionCodec {
    type Encode = SessionMessage;
    type Decode = Decoded;
    type Encoder = SessionEncoder;
    type Decoder = SessionDecoder;

    fn encoder(&mut self) -> Self::Encoder {
        SessionEncoder
    }

    fn decoder(&mut self) -> Self::Decoder {
        SessionDecoder
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionEncoder;

impl Encoder for SessionEncoder {
    type Item = SessionMessage;
    type Error = Status;

    fn encode(&mut self, item: SessionMessage, dst: &mut EncodeBuf<'_>) -> Result<(), Status> {
        encode_into(&item, dst)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionDecoder;

impl Decoder for SessionDecoder {
    type Item = Decoded;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Decoded>, Status> {
        Ok(Some(decode_from(src)))
    }
}

pub(crate) fn encode_into(message: &SessionMessage, dst: &mut impl BufMut) -> Result<(), Status> {
    message
        .encode(dst)
        .map_err(|e| Status::internal(format!("failed to encode session message: {e}")))
}

pub(crate) fn decode_from(src: &mut impl Buf) -> Decoded {
    let bytes = src.copy_to_bytes(src.remaining());
    decode_session_message(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai_proto::NodeFragment;
    use prost::bytes::BytesMut;

    #[test]
    fn encoded_message_decodes_with_validation() {
        let message = SessionMessage::from_fragments(vec![NodeFragment {
            id: "n".into(),
            ..Default::default()
        }]);
        let mut buf = BytesMut::new();
        encode_into(&message, &mut buf).unwrap();
        assert_eq!(decode_from(&mut buf.freeze()).unwrap(), message);
    }

    #[test]
    fn invalid_payload_surfaces_as_wire_error() {
        // node_fragments[0].chunk_fragment carries both ref and data
        let mut raw = BytesMut::new();
        raw.put_slice(&[0x0a, 0x08, 0x2a, 0x06, 0x12, 0x01, b'r', 0x1a, 0x01, b'd']);
        assert!(matches!(
            decode_from(&mut raw.freeze()),
            Err(WireError::SchemaViolation(_))
        ));
    }

    #[test]
    fn truncated_bytes_are_a_decode_error() {
        let mut raw = BytesMut::new();
        raw.put_slice(&[0x0a, 0x10, 0x01]);
        assert!(matches!(
            decode_from(&mut raw.freeze()),
            Err(WireError::Decode(_))
        ));
    }
}
