use clap::Parser;

use chainmirror::AppConfig;
use chainmirror::ChainMirror;
use chainmirror::Result;
use tracing::info;

/// Incremental chain-state mirror service.
///
/// Long-running process: bootstraps the document store, then polls account
/// diffs forever until terminated.
#[derive(Parser)]
#[command(name = "chainmirror", version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    if cli.verbose {
        chainmirror::logging::init_logging_with_level("debug")?;
    } else {
        chainmirror::logging::init_logging(Some(&config))?;
    }

    if config.logging.backtrace {
        std::env::set_var("RUST_BACKTRACE", "1");
    }

    let mut mirror = ChainMirror::new(&config).await?;
    mirror.init_schema().await?;
    mirror.start().await?;

    info!(
        partitions = config.sync.partitions.len(),
        "Mirror service running, press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c().await?;
    info!("Termination signal received");
    mirror.stop().await;

    Ok(())
}
