use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vertex::app;
use vertex::config::Config;

#[derive(Parser, Debug)]
#[command(version, about = "Vertex - triangular arbitrage bot for Solana swap-API cycles")]
struct Args {
    /// Run a single scan across all paths and exit without executing
    #[arg(long)]
    scan: bool,

    /// Path to TOML config file (otherwise configuration comes from the
    /// environment / .env)
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    app::run(config, args.scan).await
}
