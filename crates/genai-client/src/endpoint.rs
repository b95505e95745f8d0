//! Service endpoints and their StartSession methods.

use std::fmt;
use std::str::FromStr;

use genai_common::{GenaiError, Result};

const GEMINI_ADDRESS: &str = "https://generativelanguage.googleapis.com";
const GEMINI_METHOD: &str = "/google.ai.generativelanguage.v1alpha.EvergreenService/StartSession";
const GDM_ADDRESS: &str = "https://gdmlabs.googleapis.com:443";
const EVERGREEN_METHOD: &str = "/evergreen.v2.EvergreenService/StartSession";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endpoint {
    #[default]
    GeminiApi,
    GdmApi,
    CustomApi,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::GeminiApi => "gemini",
            Endpoint::GdmApi => "gdm",
            Endpoint::CustomApi => "custom",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = GenaiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" => Ok(Endpoint::GeminiApi),
            "gdm" => Ok(Endpoint::GdmApi),
            "custom" => Ok(Endpoint::CustomApi),
            other => Err(GenaiError::InvalidArgument(format!(
                "unknown endpoint '{other}' (expected gemini, gdm or custom)"
            ))),
        }
    }
}

/// Service address and gRPC method path for `endpoint`.
///
/// A custom host without a scheme is assumed to speak TLS.
pub fn address_and_method(endpoint: Endpoint, host: Option<&str>) -> Result<(String, &'static str)> {
    match endpoint {
        Endpoint::GeminiApi => Ok((GEMINI_ADDRESS.to_string(), GEMINI_METHOD)),
        Endpoint::GdmApi => Ok((GDM_ADDRESS.to_string(), EVERGREEN_METHOD)),
        Endpoint::CustomApi => {
            let host = host.filter(|h| !h.is_empty()).ok_or_else(|| {
                GenaiError::InvalidArgument(
                    "host must be specified when using a custom backend".into(),
                )
            })?;
            let address = if host.contains("://") {
                host.to_string()
            } else {
                format!("https://{host}")
            };
            Ok((address, EVERGREEN_METHOD))
        }
    }
}
