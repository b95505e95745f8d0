//! Client: authenticated sessions against a StartSession service.

use genai_actions::Action;
use genai_common::{GenaiError, Result};
use genai_content::{Chunk, Content, Session};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, ClientTlsConfig, Endpoint as TransportEndpoint};
use tracing::{debug, info};

use crate::codec::SessionCodec;
use crate::config::ClientConfig;
use crate::endpoint::address_and_method;
use crate::stream::GrpcStream;

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct Client {
    config: ClientConfig,
    address: String,
    method: &'static str,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let (address, method) = address_and_method(config.endpoint, config.host.as_deref())?;
        Ok(Self {
            config,
            address,
            method,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    async fn connect(&self) -> Result<Channel> {
        let mut endpoint = TransportEndpoint::from_shared(self.address.clone())
            .map_err(|e| GenaiError::InvalidArgument(format!("invalid address {}: {e}", self.address)))?
            .connect_timeout(self.config.connect_timeout);
        if self.address.starts_with("https://") {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new().with_native_roots())
                .map_err(|e| GenaiError::Transport(format!("TLS setup failed: {e}")))?;
        }
        endpoint
            .connect()
            .await
            .map_err(|e| GenaiError::Transport(format!("failed to connect to {}: {e}", self.address)))
    }

    /// Open a bidirectional session.
    ///
    /// The call runs on its own task so writes are accepted before the
    /// server sends response headers.
    pub async fn start_session(&self) -> Result<Session<GrpcStream>> {
        let channel = self.connect().await?;
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));

        let mut request = tonic::Request::new(ReceiverStream::new(rx));
        let key: MetadataValue<Ascii> = MetadataValue::try_from(self.config.api_key.as_str())
            .map_err(|_| GenaiError::InvalidArgument("API key is not valid header text".into()))?;
        request.metadata_mut().insert(API_KEY_HEADER, key);

        let path = PathAndQuery::from_static(self.method);
        let call = tokio::spawn(async move {
            let mut grpc = tonic::client::Grpc::new(channel);
            grpc.ready().await.map_err(|e| {
                tonic::Status::unavailable(format!("service was not ready: {e}"))
            })?;
            grpc.streaming(request, path, SessionCodec)
                .await
                .map(tonic::Response::into_inner)
        });

        let session = Session::with_limits(GrpcStream::new(tx, call), self.config.reassembly);
        info!(
            session = %session.id(),
            address = %self.address,
            method = self.method,
            "Session started"
        );
        Ok(session)
    }

    /// Open a session, run `action`, and return its response.
    pub async fn run(
        &self,
        action: &Action,
        on_chunk: impl FnMut(&Chunk) + Send,
    ) -> Result<Content> {
        let mut session = self.start_session().await?;
        let response = action.run(&mut session, on_chunk).await?;
        debug!(session = %session.id(), chunks = response.len(), "Run finished");
        Ok(response)
    }
}
