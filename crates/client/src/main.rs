//! `invoke` - send an image to the deblur service and save the result.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use client::{init_logging, save_and_compare, ClientConfig, DeblurClient};

/// Deblur an image through the deblur HTTP service.
#[derive(Parser, Debug)]
#[command(name = "invoke")]
#[command(version, about, long_about = None)]
struct Args {
    /// Image to deblur.
    #[arg(value_name = "IMAGE_PATH")]
    image_path: PathBuf,

    /// Deblur endpoint, e.g. http://localhost:8081/deblur.
    #[arg(value_name = "API_URL")]
    api_url: Option<String>,

    /// Skip TLS certificate verification (self-signed tunnels).
    #[arg(long)]
    insecure: bool,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Also write <stem>_comparison.png with the original and the result side by side.
    #[arg(long)]
    compare: bool,

    /// Config file (defaults to ./invoke.toml when present).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(if args.verbose { "debug" } else { "info" });

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether a result was saved
async fn run(args: Args) -> Result<bool> {
    if !args.image_path.is_file() {
        anyhow::bail!("Input file does not exist: {}", args.image_path.display());
    }

    let config = resolve_config(&args)?;
    let client = DeblurClient::new(&config)?;
    let Some(result) = client.deblur(&args.image_path).await? else {
        return Ok(false);
    };

    save_and_compare(&args.image_path, &result, config.compare)?;
    Ok(true)
}

/// Config file and environment, then command-line overrides
fn resolve_config(args: &Args) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(args.config.as_deref())
        .context("failed to load client configuration")?;
    if let Some(api_url) = &args.api_url {
        config.api_url = api_url.clone();
    }
    if args.insecure {
        config.verify_tls = false;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    if args.compare {
        config.compare = true;
    }
    Ok(config)
}
