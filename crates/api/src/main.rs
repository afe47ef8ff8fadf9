//! Deblur Inference Service - Main Entry Point

use std::path::PathBuf;

use anyhow::Context;
use api::{init_logging, run_server, ServerConfig};
use clap::Parser;
use tracing::info;

/// Serve the deblur generator over HTTP
#[derive(Parser, Debug)]
#[command(name = "deblur-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file (defaults to ./deblur.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Override the model weight path
    #[arg(long, value_name = "FILE")]
    model: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::load(args.config.as_deref())
        .context("failed to load server configuration")?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(model) = args.model {
        config.model_path = model;
    }

    init_logging(&config.log_level, config.log_json);

    info!("=== Deblur Service v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Loading deblurring model...");

    run_server(config).await?;

    Ok(())
}
