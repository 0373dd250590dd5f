// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// One unread notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UnreadItemResponse {
	/// Resource kind: announcement | request | parcel_note | visitor | message.
	pub kind: String,
	pub id: Uuid,
	pub title: String,
	pub content: String,
	pub created_at: DateTime<Utc>,
}

/// The unread notification feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UnreadResponse {
	pub count: usize,
	pub items: Vec<UnreadItemResponse>,
}

/// One item of a mark-seen batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SeenItemRequest {
	pub kind: String,
	pub id: Uuid,
}

/// Request to mark notifications seen. The batch applies atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MarkSeenRequest {
	pub items: Vec<SeenItemRequest>,
}
