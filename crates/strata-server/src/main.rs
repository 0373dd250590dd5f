// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Strata server binary.

use clap::{Parser, Subcommand};
use strata_server::{bootstrap, create_app_state, create_router};

/// Strata residential-complex management server.
#[derive(Parser, Debug)]
#[command(name = "strata-server", about = "Strata management server", version)]
struct Args {
	/// Subcommands for strata-server (e.g., `version`)
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("strata-server {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	// Load configuration
	let config = strata_server_config::load_config()?;

	// Setup tracing; RUST_LOG wins over the configured level.
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.init();

	tracing::info!(
			addr = %config.socket_addr(),
			database = %config.database.url,
			"starting strata-server"
	);

	// Create database pool and bootstrap the schema
	let pool = strata_server_db::create_pool(&config.database.url).await?;
	strata_server_db::run_migrations(&pool).await?;

	let state = create_app_state(pool);
	bootstrap::ensure_bootstrap_admin(&state, &config).await?;

	let router = create_router(state);
	let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
	tracing::info!(addr = %listener.local_addr()?, "listening");
	axum::serve(listener, router).await?;

	Ok(())
}
