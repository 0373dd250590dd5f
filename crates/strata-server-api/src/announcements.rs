// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// An announcement in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AnnouncementResponse {
	pub id: Uuid,
	pub title: String,
	pub content: String,
	pub category: String,
	pub is_important: bool,
	pub is_urgent: bool,
	pub author_id: Uuid,
	/// `None` means site-wide.
	pub scope_block: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Request to publish an announcement.
///
/// `scope_block` is required for caretakers and ignored for admins
/// (admin announcements are always site-wide).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateAnnouncementRequest {
	pub title: String,
	pub content: String,
	#[serde(default = "default_category")]
	pub category: String,
	#[serde(default)]
	pub is_important: bool,
	#[serde(default)]
	pub is_urgent: bool,
	pub scope_block: Option<String>,
}

fn default_category() -> String {
	"general".to_string()
}

/// Request to edit an announcement. The scope block only moves for
/// admins; caretaker edits keep it fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateAnnouncementRequest {
	pub title: String,
	pub content: String,
	#[serde(default = "default_category")]
	pub category: String,
	#[serde(default)]
	pub is_important: bool,
	#[serde(default)]
	pub is_urgent: bool,
	pub scope_block: Option<String>,
}

/// Aggregate counts for the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AnnouncementStatsResponse {
	pub total: i64,
	pub important: i64,
	pub urgent: i64,
	pub general: i64,
}
