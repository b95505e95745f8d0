//! Configuration validation.
//!
//! Every check runs; failures are collected into a single `ConfigError`.

mod helpers;


use crate::schema::{EndpointKind, GenaiConfig};
use genai_common::ConfigError;
use helpers::validate_range;

pub fn validate(config: &GenaiConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_client(&mut errors, config);
    validate_reassembly(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_client(errors: &mut Vec<String>, config: &GenaiConfig) {
    let client = &config.client;
    validate_range(
        errors,
        "client.channel_capacity",
        client.channel_capacity.into(),
        1,
        4096,
    );
    validate_range(
        errors,
        "client.connect_timeout_secs",
        client.connect_timeout_secs,
        1,
        300,
    );
    if client.api_key_env.trim().is_empty() {
        errors.push("client.api_key_env must not be empty".into());
    }
    let has_host = client.host.as_deref().is_some_and(|h| !h.trim().is_empty());
    if client.endpoint == EndpointKind::Custom && !has_host {
        errors.push("client.host is required when client.endpoint = \"custom\"".into());
    }
}

fn validate_reassembly(errors: &mut Vec<String>, config: &GenaiConfig) {
    let r = &config.reassembly;
    validate_range(
        errors,
        "reassembly.idle_timeout_secs",
        r.idle_timeout_secs,
        1,
        86_400,
    );
    validate_range(
        errors,
        "reassembly.max_pending_nodes",
        r.max_pending_nodes,
        1,
        1_000_000,
    );
    validate_range(
        errors,
        "reassembly.max_buffered_bytes",
        r.max_buffered_bytes,
        1024,
        4 * 1024 * 1024 * 1024,
    );
}
