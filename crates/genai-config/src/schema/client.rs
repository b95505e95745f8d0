use serde::{Deserialize, Serialize};

/// Which StartSession service to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    #[default]
    Gemini,
    Gdm,
    Custom,
}

impl EndpointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointKind::Gemini => "gemini",
            EndpointKind::Gdm => "gdm",
            EndpointKind::Custom => "custom",
        }
    }
}

/// Connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    pub endpoint: EndpointKind,
    /// Required when `endpoint = "custom"`.
    pub host: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub channel_capacity: u32,
    pub connect_timeout_secs: u64,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            endpoint: EndpointKind::Gemini,
            host: None,
            api_key_env: "GENAI_API_KEY".into(),
            channel_capacity: 16,
            connect_timeout_secs: 10,
        }
    }
}
