//! `BidiStream` over a tonic bidirectional streaming call.

use async_trait::async_trait;
use genai_common::{GenaiError, Result};
use genai_content::BidiStream;
use genai_proto::SessionMessage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tonic::{Status, Streaming};
use tracing::debug;

use crate::codec::Decoded;

pub(crate) type PendingCall = JoinHandle<std::result::Result<Streaming<Decoded>, Status>>;

enum Responses {
    /// Call still waiting for response headers.
    Pending(PendingCall),
    Open(Streaming<Decoded>),
    Closed,
}

/// Requests flow through a bounded channel into the call's request stream;
/// responses are read from the call once its headers arrive.
pub struct GrpcStream {
    tx: Option<mpsc::Sender<SessionMessage>>,
    responses: Responses,
}

impl GrpcStream {
    pub(crate) fn new(tx: mpsc::Sender<SessionMessage>, call: PendingCall) -> Self {
        Self {
            tx: Some(tx),
            responses: Responses::Pending(call),
        }
    }
}

pub(crate) fn status_error(status: Status) -> GenaiError {
    GenaiError::Transport(format!("{:?}: {}", status.code(), status.message()))
}

#[async_trait]
impl BidiStream for GrpcStream {
    async fn write(&mut self, message: SessionMessage) -> Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| GenaiError::Transport("write after done_writing".into()))?;
        tx.send(message)
            .await
            .map_err(|_| GenaiError::Transport("session request stream closed".into()))
    }

    async fn done_writing(&mut self) -> Result<()> {
        self.tx = None;
        Ok(())
    }

    async fn read(&mut self) -> Option<Result<SessionMessage>> {
        loop {
            match std::mem::replace(&mut self.responses, Responses::Closed) {
                Responses::Pending(call) => match call.await {
                    Ok(Ok(streaming)) => {
                        debug!("Session response stream open");
                        self.responses = Responses::Open(streaming);
                    }
                    Ok(Err(status)) => return Some(Err(status_error(status))),
                    Err(e) => {
                        return Some(Err(GenaiError::Transport(format!(
                            "session call task failed: {e}"
                        ))))
                    }
                },
                Responses::Open(mut streaming) => {
                    return match streaming.message().await {
                        Ok(Some(decoded)) => {
                            self.responses = Responses::Open(streaming);
                            Some(decoded.map_err(GenaiError::from))
                        }
                        Ok(None) => None,
                        Err(status) => Some(Err(status_error(status))),
                    };
                }
                Responses::Closed => return None,
            }
        }
    }
}
