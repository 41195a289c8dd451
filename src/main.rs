//! TrimX Studio
//!
//! Command-line client for the TrimX trimming service.
//!
//! # Usage
//!
//! ```bash
//! studio health
//! studio upload --input clip.mp4
//! studio run --input clip.mp4 --segment 10-20 --segment 0:50-1:10 --download
//! studio run --input clip.mp4 --keys "Digit1 KeyI Space wait:5 KeyO input:Enter"
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use trimx_studio::adapters::toml_config::TomlConfigAdapter;
use trimx_studio::adapters::tracing_log::init_tracing;
use trimx_studio::app::DefaultAppContainer;
use trimx_studio::cli::{commands, Cli, Commands};
use trimx_studio::config_initialization::initialize_configuration_hierarchy;

/// Main entry point for the TrimX Studio CLI
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TomlConfigAdapter::new();
    let settings = initialize_configuration_hierarchy(&config, &cli)
        .await
        .context("Failed to load configuration")?;

    init_tracing(settings.log_level, settings.log_json);
    info!("Starting TrimX Studio against {}", settings.backend_url);

    let container =
        DefaultAppContainer::new(&settings).context("Failed to initialize adapters")?;

    match cli.command {
        Commands::Health => commands::health(&container).await?,
        Commands::Videos(args) => commands::videos(&container, args).await?,
        Commands::Upload(args) => commands::upload(&container, args).await?,
        Commands::Run(args) => commands::run(&container, args).await?,
        Commands::DeleteVideo(args) => commands::delete_video(&container, args).await?,
        Commands::DeleteOutput(args) => commands::delete_output(&container, args).await?,
    }

    info!("TrimX Studio completed successfully");
    Ok(())
}
