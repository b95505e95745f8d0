//! Client configuration.

use std::time::Duration;

use genai_content::ReassemblyLimits;

use crate::endpoint::Endpoint;

#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub endpoint: Endpoint,
    /// Only used with `Endpoint::CustomApi`.
    pub host: Option<String>,
    /// Outgoing messages buffered before `write` waits.
    pub channel_capacity: usize,
    pub connect_timeout: Duration,
    pub reassembly: ReassemblyLimits,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("host", &self.host)
            .field("channel_capacity", &self.channel_capacity)
            .field("connect_timeout", &self.connect_timeout)
            .field("reassembly", &self.reassembly)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: Endpoint::GeminiApi,
            host: None,
            channel_capacity: 16,
            connect_timeout: Duration::from_secs(10),
            reassembly: ReassemblyLimits::default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_reassembly(mut self, limits: ReassemblyLimits) -> Self {
        self.reassembly = limits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_api_key() {
        let config = ClientConfig::new("secret-key-123").with_endpoint(Endpoint::GdmApi);
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key-123"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("GdmApi"));
    }

    #[test]
    fn builder_defaults() {
        let config = ClientConfig::new("k")
            .with_host("localhost:1")
            .with_channel_capacity(4)
            .with_connect_timeout(Duration::from_secs(3));
        assert_eq!(config.endpoint, Endpoint::GeminiApi);
        assert_eq!(config.host.as_deref(), Some("localhost:1"));
        assert_eq!(config.channel_capacity, 4);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.reassembly, ReassemblyLimits::default());
    }
}
