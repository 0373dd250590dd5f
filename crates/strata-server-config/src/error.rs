// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Failed to read config file {path}: {source}")]
	Io {
		path: String,
		source: std::io::Error,
	},

	#[error("Failed to parse config file {path}: {source}")]
	Parse {
		path: String,
		source: toml::de::Error,
	},

	#[error("Invalid value for {key}: {message}")]
	Invalid { key: String, message: String },
}
