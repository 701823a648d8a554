// Tabmask - Tabular Data Masking Tool
// Copyright (c) 2025 Tabmask Contributors
// Licensed under the MIT License

use clap::Parser;
use std::process;
use tabmask::cli::{Cli, Commands, EXIT_CONFIG, EXIT_FATAL};
use tabmask::config::{load_config_or_default, LoggingConfig};
use tabmask::logging::init_logging;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the config; a broken config still gets console logs
    // so the command itself can report the problem.
    let (config_level, logging_config) = match load_config_or_default(&cli.config) {
        Ok(config) => (config.application.log_level, config.logging),
        Err(_) => (
            "info".to_string(),
            LoggingConfig {
                local_enabled: false,
                ..LoggingConfig::default()
            },
        ),
    };
    let log_level = cli.log_level.clone().unwrap_or(config_level);

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_CONFIG);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Tabmask - Tabular Data Masking Tool"
    );

    // Create shutdown signal channel for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create SIGTERM handler");
                    return;
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT (Ctrl+C), stopping after the current field...");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, stopping after the current field...");
                }
            }
            eprintln!("\n⚠️  Shutdown signal received, stopping after the current field...");
            let _ = shutdown_tx.send(true);
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                tracing::info!("Received SIGINT (Ctrl+C), stopping after the current field...");
                eprintln!("\n⚠️  Shutdown signal received, stopping after the current field...");
                let _ = shutdown_tx.send(true);
            }
        }
    });

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    // Flush file logs before exiting
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Mask(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::Validate(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
        Commands::Keygen(args) => args.execute().await,
        Commands::Reveal(args) => args.execute().await,
        Commands::Sample(args) => args.execute(&cli.config).await,
    }
}
