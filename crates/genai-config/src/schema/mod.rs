//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod client;
mod logging;
mod reassembly;

pub use client::*;
pub use logging::*;
pub use reassembly::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GenaiConfig {
    pub client: ClientSection,
    pub reassembly: ReassemblySection,
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GenaiConfig::default();
        assert_eq!(config.client.endpoint, EndpointKind::Gemini);
        assert_eq!(config.client.api_key_env, "GENAI_API_KEY");
        assert_eq!(config.reassembly.idle_timeout_secs, 300);
        assert_eq!(config.logging.directive(), "genai=info");
    }

    #[test]
    fn empty_toml_is_default() {
        let config: GenaiConfig = toml::from_str("").unwrap();
        assert_eq!(config, GenaiConfig::default());
    }

    #[test]
    fn enums_use_lowercase_names() {
        let config: GenaiConfig = toml::from_str(
            r#"
[client]
endpoint = "custom"
host = "localhost:50051"

[logging]
level = "debug"
"#,
        )
        .unwrap();
        assert_eq!(config.client.endpoint, EndpointKind::Custom);
        assert_eq!(config.client.host.as_deref(), Some("localhost:50051"));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.directive(), "genai=debug");
    }

    #[test]
    fn unknown_endpoint_fails_to_parse() {
        let result: Result<GenaiConfig, _> = toml::from_str("[client]\nendpoint = \"vertex\"\n");
        assert!(result.is_err());
    }
}
