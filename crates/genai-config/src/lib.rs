//! genai configuration.
//!
//! TOML-based configuration for the client, reassembly limits and logging.
//! Every section has defaults, so partial files work out of the box.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    ClientSection, EndpointKind, GenaiConfig, LogLevel, LoggingConfig, ReassemblySection,
    CONFIG_SCHEMA_VERSION,
};

use genai_common::ConfigError;
use std::path::Path;

/// Load from `path` when given, otherwise from the platform default
/// location (created with defaults if missing).
pub fn load_config(path: Option<&Path>) -> Result<GenaiConfig, ConfigError> {
    match path {
        Some(path) => toml_loader::load_from_path(path),
        None => toml_loader::load_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_must_exist() {
        let result = load_config(Some(Path::new("/tmp/definitely_missing_genai.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn config_schema_version_is_1() {
        assert_eq!(CONFIG_SCHEMA_VERSION, 1);
    }
}
