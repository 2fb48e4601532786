//! MRBS command-line entry point.
//!
//! Loads configuration, initializes logging and dispatches to a
//! subcommand. Exit status is 0 on success, 2 when a booking is rejected,
//! 75 when the store is busy or unreachable (safe to retry), and 1 on any
//! other error.

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt};

use mrbs_core::config::AppConfig;
use mrbs_core::error::AppError;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            output::print_error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };

    init_logging(&config);

    debug!(command = ?cli.command, "Running command");
    if let Err(e) = cli.execute(&config).await {
        let code = exit_code(&e);
        warn!(kind = ?e.kind, exit_code = code, "Command failed");
        output::print_error(&e.to_string());
        std::process::exit(code);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn exit_code(err: &AppError) -> i32 {
    if err.is_rejection() {
        2
    } else if err.is_retryable() {
        75
    } else {
        1
    }
}
