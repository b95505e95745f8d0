//! Bidirectional message streams.

use async_trait::async_trait;
use genai_common::{GenaiError, Result};
use genai_proto::{decode_session_message, encode, SessionMessage};
use tokio::sync::mpsc;

/// One side of a bidirectional session.
///
/// `read` yields `None` once the peer has finished writing.
#[async_trait]
pub trait BidiStream: Send {
    async fn write(&mut self, message: SessionMessage) -> Result<()>;

    /// Half-close: no further writes from this side.
    async fn done_writing(&mut self) -> Result<()>;

    async fn read(&mut self) -> Option<Result<SessionMessage>>;
}

/// In-process stream carrying encoded messages over mpsc channels.
///
/// Bytes are decoded on read with the validating decoder, so a peer that
/// writes a malformed message surfaces the same errors a network peer would.
#[derive(Debug)]
pub struct MemoryStream {
    tx: Option<mpsc::Sender<Vec<u8>>>,
    rx: mpsc::Receiver<Vec<u8>>,
}

impl MemoryStream {
    /// Two connected ends; each reads what the other writes.
    pub fn pair(capacity: usize) -> (MemoryStream, MemoryStream) {
        let (a_tx, b_rx) = mpsc::channel(capacity.max(1));
        let (b_tx, a_rx) = mpsc::channel(capacity.max(1));
        (
            MemoryStream {
                tx: Some(a_tx),
                rx: a_rx,
            },
            MemoryStream {
                tx: Some(b_tx),
                rx: b_rx,
            },
        )
    }

    /// Send bytes as-is, bypassing encoding.
    pub async fn write_raw(&mut self, bytes: Vec<u8>) -> Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| GenaiError::Transport("write after done_writing".into()))?;
        tx.send(bytes)
            .await
            .map_err(|_| GenaiError::Transport("peer closed the stream".into()))
    }
}

#[async_trait]
impl BidiStream for MemoryStream {
    async fn write(&mut self, message: SessionMessage) -> Result<()> {
        self.write_raw(encode(&message)).await
    }

    async fn done_writing(&mut self) -> Result<()> {
        self.tx = None;
        Ok(())
    }

    async fn read(&mut self) -> Option<Result<SessionMessage>> {
        let bytes = self.rx.recv().await?;
        Some(decode_session_message(&bytes).map_err(GenaiError::from))
    }
}
