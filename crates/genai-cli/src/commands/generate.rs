//! `genai generate`: run a GENERATE action against the configured service.

use std::time::Duration;

use genai_actions::{debug_format_text, Generate};
use genai_client::{Client, ClientConfig, Endpoint};
use genai_common::{GenaiError, Result};
use genai_config::GenaiConfig;
use genai_content::ReassemblyLimits;
use tracing::debug;

pub struct GenerateOptions<'a> {
    pub prompt: &'a str,
    pub target: &'a str,
    pub endpoint: Option<&'a str>,
    pub host: Option<&'a str>,
}

/// Client settings from the config file, overridden by command-line flags.
pub fn client_config(
    config: &GenaiConfig,
    options: &GenerateOptions<'_>,
    api_key: String,
) -> Result<ClientConfig> {
    let endpoint: Endpoint = options
        .endpoint
        .unwrap_or(config.client.endpoint.as_str())
        .parse()?;
    let reassembly = ReassemblyLimits {
        idle_timeout: config.reassembly.idle_timeout(),
        max_pending_nodes: usize::try_from(config.reassembly.max_pending_nodes)
            .unwrap_or(usize::MAX),
        max_buffered_bytes: usize::try_from(config.reassembly.max_buffered_bytes)
            .unwrap_or(usize::MAX),
    };

    let mut client = ClientConfig::new(api_key)
        .with_endpoint(endpoint)
        .with_channel_capacity(config.client.channel_capacity as usize)
        .with_connect_timeout(Duration::from_secs(config.client.connect_timeout_secs))
        .with_reassembly(reassembly);
    if let Some(host) = options.host.or(config.client.host.as_deref()) {
        client = client.with_host(host);
    }
    Ok(client)
}

pub async fn run(config: &GenaiConfig, options: &GenerateOptions<'_>) -> Result<()> {
    let key_var = &config.client.api_key_env;
    let api_key = std::env::var(key_var).map_err(|_| {
        GenaiError::InvalidArgument(format!("set {key_var} to your API key"))
    })?;

    let client = Client::new(client_config(config, options, api_key)?)?;
    let action = Generate::new(options.prompt, options.target);
    let response = client
        .run(&action, |chunk| {
            debug!(id = %chunk.id(), mimetype = %chunk.mimetype(), "Received chunk");
        })
        .await?;
    println!("{}", debug_format_text(&response)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai_config::EndpointKind;

    fn options<'a>(endpoint: Option<&'a str>, host: Option<&'a str>) -> GenerateOptions<'a> {
        GenerateOptions {
            prompt: "hi",
            target: "t",
            endpoint,
            host,
        }
    }

    #[test]
    fn flags_override_config() {
        let mut config = GenaiConfig::default();
        config.client.endpoint = EndpointKind::Gdm;
        config.client.channel_capacity = 8;

        let client = client_config(
            &config,
            &options(Some("custom"), Some("localhost:50051")),
            "key".into(),
        )
        .unwrap();
        assert_eq!(client.endpoint, Endpoint::CustomApi);
        assert_eq!(client.host.as_deref(), Some("localhost:50051"));
        assert_eq!(client.channel_capacity, 8);
    }

    #[test]
    fn config_values_used_without_flags() {
        let mut config = GenaiConfig::default();
        config.client.endpoint = EndpointKind::Custom;
        config.client.host = Some("example.internal:443".into());
        config.reassembly.idle_timeout_secs = 5;

        let client = client_config(&config, &options(None, None), "key".into()).unwrap();
        assert_eq!(client.endpoint, Endpoint::CustomApi);
        assert_eq!(client.host.as_deref(), Some("example.internal:443"));
        assert_eq!(client.reassembly.idle_timeout, Duration::from_secs(5));
    }

    #[test]
    fn unknown_endpoint_flag_fails() {
        let result = client_config(
            &GenaiConfig::default(),
            &options(Some("vertex"), None),
            "key".into(),
        );
        assert!(matches!(result, Err(GenaiError::InvalidArgument(_))));
    }
}
