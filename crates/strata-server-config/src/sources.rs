// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration sources and their precedence.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::sections::{
	AuthConfigLayer, DatabaseConfigLayer, HttpConfigLayer, LoggingConfigLayer,
};

/// Default config file location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/strata/server.toml";

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_ENV_VAR: &str = "STRATA_SERVER_CONFIG";

/// A partial configuration, mergeable across sources.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: HttpConfigLayer,
	#[serde(default)]
	pub database: DatabaseConfigLayer,
	#[serde(default)]
	pub auth: AuthConfigLayer,
	#[serde(default)]
	pub logging: LoggingConfigLayer,
}

impl ServerConfigLayer {
	/// Merge another layer on top of this one.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		self.http.merge(other.http);
		self.database.merge(other.database);
		self.auth.merge(other.auth);
		self.logging.merge(other.logging);
	}
}

/// Source precedence, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults,
	File,
	Environment,
}

/// A configuration source.
pub trait ConfigSource {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults (an empty layer; sections finalize their defaults).
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		Ok(ServerConfigLayer::default())
	}
}

/// A TOML config file. A missing file is an empty layer, not an error.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	/// The system config file, or the `STRATA_SERVER_CONFIG` override.
	pub fn system() -> Self {
		let path = std::env::var(CONFIG_PATH_ENV_VAR)
			.map(PathBuf::from)
			.unwrap_or_else(|_| PathBuf::from(SYSTEM_CONFIG_PATH));
		Self { path }
	}

	/// A specific file path.
	pub fn at(path: impl AsRef<Path>) -> Self {
		Self {
			path: path.as_ref().to_path_buf(),
		}
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml"
	}

	fn precedence(&self) -> Precedence {
		Precedence::File
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			return Ok(ServerConfigLayer::default());
		}
		let path = self.path.display().to_string();
		let contents = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
			path: path.clone(),
			source,
		})?;
		toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
	}
}

/// `STRATA_SERVER_*` environment variables.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"env"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		let mut layer = ServerConfigLayer::default();

		if let Ok(host) = std::env::var("STRATA_SERVER_HOST") {
			layer.http.host = Some(host);
		}
		if let Ok(port) = std::env::var("STRATA_SERVER_PORT") {
			layer.http.port = Some(port.parse().map_err(|_| ConfigError::Invalid {
				key: "STRATA_SERVER_PORT".to_string(),
				message: format!("not a port number: {port}"),
			})?);
		}
		if let Ok(url) = std::env::var("STRATA_SERVER_DATABASE_URL") {
			layer.database.url = Some(url);
		}
		if let Ok(ttl) = std::env::var("STRATA_SERVER_SESSION_TTL_HOURS") {
			layer.auth.session_ttl_hours =
				Some(ttl.parse().map_err(|_| ConfigError::Invalid {
					key: "STRATA_SERVER_SESSION_TTL_HOURS".to_string(),
					message: format!("not a number of hours: {ttl}"),
				})?);
		}
		if let Ok(email) = std::env::var("STRATA_SERVER_BOOTSTRAP_ADMIN_EMAIL") {
			layer.auth.bootstrap_admin_email = Some(email);
		}
		if let Ok(level) = std::env::var("STRATA_SERVER_LOG_LEVEL") {
			layer.logging.level = Some(level);
		}

		Ok(layer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn missing_file_is_an_empty_layer() {
		let source = TomlSource::at("/nonexistent/strata.toml");
		let layer = source.load().unwrap();
		assert!(layer.http.host.is_none());
	}

	#[test]
	fn toml_file_parses_sections() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
			[http]
			port = 9999

			[database]
			url = "sqlite::memory:"
			"#
		)
		.unwrap();

		let layer = TomlSource::at(file.path()).load().unwrap();
		assert_eq!(layer.http.port, Some(9999));
		assert_eq!(layer.database.url.as_deref(), Some("sqlite::memory:"));
	}
}
