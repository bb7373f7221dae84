//! Main entry point for the order management service.
//!
//! This binary loads configuration, wires the storage backend into the
//! order engine, and serves the HTTP API for order creation and queries.

use clap::Parser;
use oms_config::Config;
use oms_core::OrderEngine;
use oms_storage::{implementations::memory::MemoryStorage, StorageInterface, StorageService};
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

/// Command-line arguments for the order management service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the order engine over the configured storage backend
/// 5. Serves the HTTP API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started order management service");

	// Load configuration
	let config_path = args
		.config
		.to_str()
		.ok_or("Configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	if !config.api.enabled {
		tracing::warn!("API server disabled in configuration, nothing to serve");
		return Ok(());
	}

	let backend = build_storage_backend(&config)?;
	let storage = Arc::new(StorageService::new(backend));
	let engine = Arc::new(OrderEngine::new(&config, storage));

	server::start_server(config.api.clone(), engine).await?;

	tracing::info!("Stopped order management service");
	Ok(())
}

/// Instantiates the storage backend named by the configuration.
fn build_storage_backend(
	config: &Config,
) -> Result<Box<dyn StorageInterface>, Box<dyn std::error::Error>> {
	match config.storage.primary.as_str() {
		"memory" => Ok(Box::new(MemoryStorage::new())),
		other => Err(format!("Unknown storage backend '{}'", other).into()),
	}
}
