// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration sections.
//!
//! Each section has a runtime struct (fully resolved) and a `*Layer`
//! partial (all-optional, deserializable) that merges across sources and
//! finalizes into the runtime form.

use serde::Deserialize;

// =============================================================================
// HTTP
// =============================================================================

/// HTTP listener configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct HttpConfig {
	pub host: String,
	pub port: u16,
}

impl Default for HttpConfig {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".to_string(),
			port: 8080,
		}
	}
}

/// HTTP configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfigLayer {
	#[serde(default)]
	pub host: Option<String>,
	#[serde(default)]
	pub port: Option<u16>,
}

impl HttpConfigLayer {
	pub fn merge(&mut self, other: HttpConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
	}

	pub fn finalize(self) -> HttpConfig {
		let defaults = HttpConfig::default();
		HttpConfig {
			host: self.host.unwrap_or(defaults.host),
			port: self.port.unwrap_or(defaults.port),
		}
	}
}

// =============================================================================
// Database
// =============================================================================

/// Database configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
	pub url: String,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			url: "sqlite:./strata.db".to_string(),
		}
	}
}

/// Database configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
	}

	pub fn finalize(self) -> DatabaseConfig {
		DatabaseConfig {
			url: self.url.unwrap_or_else(|| DatabaseConfig::default().url),
		}
	}
}

// =============================================================================
// Auth
// =============================================================================

/// Authentication configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Lifetime of minted sessions, in hours.
	pub session_ttl_hours: u64,
	/// When set and the account does not exist yet, an admin account is
	/// created at startup and a session token for it is logged once.
	pub bootstrap_admin_email: Option<String>,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			session_ttl_hours: 24 * 7,
			bootstrap_admin_email: None,
		}
	}
}

/// Auth configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub session_ttl_hours: Option<u64>,
	#[serde(default)]
	pub bootstrap_admin_email: Option<String>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.session_ttl_hours.is_some() {
			self.session_ttl_hours = other.session_ttl_hours;
		}
		if other.bootstrap_admin_email.is_some() {
			self.bootstrap_admin_email = other.bootstrap_admin_email;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		let defaults = AuthConfig::default();
		AuthConfig {
			session_ttl_hours: self.session_ttl_hours.unwrap_or(defaults.session_ttl_hours),
			bootstrap_admin_email: self.bootstrap_admin_email,
		}
	}
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct LoggingConfig {
	/// Default tracing filter; `RUST_LOG` overrides it.
	pub level: String,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
		}
	}
}

/// Logging configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfigLayer {
	#[serde(default)]
	pub level: Option<String>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: LoggingConfigLayer) {
		if other.level.is_some() {
			self.level = other.level;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			level: self.level.unwrap_or_else(|| LoggingConfig::default().level),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_finalize() {
		let http = HttpConfigLayer::default().finalize();
		assert_eq!(http.host, "127.0.0.1");
		assert_eq!(http.port, 8080);

		let db = DatabaseConfigLayer::default().finalize();
		assert_eq!(db.url, "sqlite:./strata.db");
	}

	#[test]
	fn merge_prefers_later_values() {
		let mut layer = HttpConfigLayer {
			host: Some("0.0.0.0".to_string()),
			port: None,
		};
		layer.merge(HttpConfigLayer {
			host: None,
			port: Some(9090),
		});
		let config = layer.finalize();
		assert_eq!(config.host, "0.0.0.0");
		assert_eq!(config.port, 9090);
	}
}
