//! shopadmin - a terminal admin console for the shop.
//!
//! Signs in as an administrator and manages users, products, orders and
//! customer messages through the shop's REST API.

mod args;
mod commands;
mod output;

use std::io;
use std::process::ExitCode;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shopadmin_core::Config;

use clap::Parser;

use args::Cli;

/// Log file prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "shopadmin.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr and to a daily rolling file in the cache directory.
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file = Config::cache_dir()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok())
        .map(|dir| tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX)));

    let (file_layer, guard) = match file {
        Some((writer, guard)) => (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _guard = init_tracing();

    info!("shopadmin starting");
    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
