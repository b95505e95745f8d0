//! Default TOML config template with inline documentation comments.

pub(crate) fn default_config_toml() -> &'static str {
    r##"# genai configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[client]
# endpoint = "gemini"            # gemini, gdm, custom
# host = "localhost:50051"       # required for endpoint = "custom"
# api_key_env = "GENAI_API_KEY"  # environment variable holding the API key
# channel_capacity = 16          # 1-4096 outgoing messages buffered
# connect_timeout_secs = 10      # 1-300

[reassembly]
# idle_timeout_secs = 300        # 1-86400, pending fragments dropped after this
# max_pending_nodes = 4096       # 1-1000000
# max_buffered_bytes = 67108864  # 1024-4294967296

[logging]
# level = "info"                 # trace, debug, info, warn, error
"##
}
