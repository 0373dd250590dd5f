// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the Strata server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`STRATA_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use strata_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use sections::{AuthConfig, DatabaseConfig, HttpConfig, LoggingConfig};
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, ServerConfigLayer, TomlSource,
};

use tracing::debug;

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub auth: AuthConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`STRATA_SERVER_*`)
/// 2. Config file (`/etc/strata/server.toml`, or `STRATA_SERVER_CONFIG`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	let mut sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];

	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	Ok(finalize(merged))
}

/// Load configuration from environment only (for testing or simple
/// deployments).
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut merged = ServerConfigLayer::default();
	merged.merge(EnvSource.load()?);
	Ok(finalize(merged))
}

fn finalize(layer: ServerConfigLayer) -> ServerConfig {
	ServerConfig {
		http: layer.http.finalize(),
		database: layer.database.finalize(),
		auth: layer.auth.finalize(),
		logging: layer.logging.finalize(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_resolves() {
		let config = finalize(ServerConfigLayer::default());
		assert_eq!(config.socket_addr(), "127.0.0.1:8080");
		assert_eq!(config.database.url, "sqlite:./strata.db");
		assert_eq!(config.auth.session_ttl_hours, 24 * 7);
	}
}
