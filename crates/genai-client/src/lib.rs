//! gRPC client for genai sessions.
//!
//! Connects to a StartSession service, authenticates with an API key and
//! exposes the bidirectional call as a `genai_content::Session`.

pub mod client;
pub mod codec;
pub mod config;
pub mod endpoint;
pub mod stream;

pub use client::Client;
pub use codec::SessionCodec;
pub use config::ClientConfig;
pub use endpoint::{address_and_method, Endpoint};
pub use stream::GrpcStream;
