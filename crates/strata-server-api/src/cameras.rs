// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A camera in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CameraResponse {
	pub id: Uuid,
	pub name: String,
	pub location: String,
	pub ip_address: String,
	pub status: String,
	pub recording: bool,
	pub resolution: String,
	pub last_maintenance_at: Option<DateTime<Utc>>,
	pub storage_used_percent: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Request to add or edit a camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpsertCameraRequest {
	pub name: String,
	pub location: String,
	pub ip_address: String,
	#[serde(default = "default_status")]
	pub status: String,
	#[serde(default)]
	pub recording: bool,
	#[serde(default = "default_resolution")]
	pub resolution: String,
	pub last_maintenance_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub storage_used_percent: i64,
}

fn default_status() -> String {
	"active".to_string()
}

fn default_resolution() -> String {
	"1080p".to_string()
}

/// Count of cameras that are not faulty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ActiveCameraCountResponse {
	pub active: i64,
}
