//! Medical Terminology Importer - Main entry point

use clap::Parser;
use mti_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use mti_importer::{commands, Cli, Commands, ImporterConfig};
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let defaults = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("mti-importer")
        .include_targets(cli.verbose)
        .build();

    // Environment variables take precedence over the defaults above
    let log_config = match defaults.clone().merge_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Ignoring invalid logging environment: {:#}", e);
            defaults
        }
    };

    // Held until exit so buffered file logs are flushed
    let guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            None
        }
    };

    if let Err(e) = execute_command(cli).await {
        error!(error = %format!("{:#}", e), "Import failed");
        drop(guard);
        process::exit(1);
    }
}

async fn execute_command(cli: Cli) -> anyhow::Result<()> {
    let config = ImporterConfig::from_env()?;

    match cli.command {
        Commands::Import(args) => {
            let summary = commands::import::run(args, &config).await?;
            info!(
                processed = summary.processed,
                dropped_batches = summary.dropped_batches,
                "Import finished"
            );
        }
        Commands::Upload(args) => {
            let key = commands::upload::run(args, &config).await?;
            info!(key = %key, "Upload finished");
        }
    }

    Ok(())
}
