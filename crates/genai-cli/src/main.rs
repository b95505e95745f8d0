mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use genai_common::Result;
use genai_config::GenaiConfig;
use tracing_subscriber::EnvFilter;

use cli::{Args, Command};
use commands::{generate, inspect, pack};

const DEFAULT_DIRECTIVE: &str = "genai=info";

fn load_config(args: &Args) -> Result<GenaiConfig> {
    match &args.config {
        Some(path) => Ok(genai_config::load_config(Some(path))?),
        None => match genai_config::load_config(None) {
            Ok(config) => Ok(config),
            Err(e) => {
                eprintln!("warning: {e}; using default configuration");
                Ok(GenaiConfig::default())
            }
        },
    }
}

/// `--log-level` wins, then `RUST_LOG`, then the configured level.
fn init_logging(cli_directive: Option<&str>, config_directive: &str) {
    let filter = match cli_directive {
        // Already validated by the argument parser.
        Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|e| {
            eprintln!("warning: invalid log directive {directive:?}: {e}; using {DEFAULT_DIRECTIVE}");
            EnvFilter::new(DEFAULT_DIRECTIVE)
        }),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config_directive)),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run(args: Args, config: GenaiConfig) -> Result<()> {
    match &args.command {
        Command::Generate {
            prompt,
            target,
            endpoint,
            host,
        } => {
            let options = generate::GenerateOptions {
                prompt,
                target,
                endpoint: endpoint.as_deref(),
                host: host.as_deref(),
            };
            generate::run(&config, &options).await
        }
        Command::Pack {
            input,
            mimetype,
            role,
            max_fragment_bytes,
            out,
        } => {
            let options = pack::PackOptions {
                input,
                mimetype,
                role: role.as_deref(),
                max_fragment_bytes: *max_fragment_bytes,
            };
            pack::run(&options, out)
        }
        Command::Inspect { file } => inspect::run(file),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(args.log_level.as_deref(), &config.logging.directive());
    tracing::debug!("genai v{} starting", env!("CARGO_PKG_VERSION"));

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
