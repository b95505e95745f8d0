use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// genai: talk to StartSession services and work with session message files.
#[derive(Parser, Debug)]
#[command(name = "genai", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter directive (e.g. `genai=debug`).
    #[arg(long, global = true, value_parser = log_directive)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a GENERATE action and print the response.
    Generate {
        prompt: String,

        /// Execution target id.
        #[arg(long, default_value = "default")]
        target: String,

        /// gemini, gdm or custom. Defaults to the configured endpoint.
        #[arg(long)]
        endpoint: Option<String>,

        /// Host for the custom endpoint.
        #[arg(long)]
        host: Option<String>,
    },

    /// Wrap a file as content and write it as an encoded SessionMessage.
    Pack {
        input: PathBuf,

        #[arg(long)]
        mimetype: String,

        #[arg(long)]
        role: Option<String>,

        /// Split inline data into fragments of at most this many bytes (0 = no split).
        #[arg(long, default_value_t = 0)]
        max_fragment_bytes: usize,

        #[arg(long)]
        out: PathBuf,
    },

    /// Decode a SessionMessage file and print a JSON summary.
    Inspect { file: PathBuf },
}

/// Accept only directives `EnvFilter` can parse.
fn log_directive(value: &str) -> Result<String, String> {
    EnvFilter::try_new(value)
        .map(|_| value.to_string())
        .map_err(|e| format!("invalid log directive: {e}"))
}
