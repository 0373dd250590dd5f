// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A messaging contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ContactResponse {
	pub id: Uuid,
	pub name: String,
	pub role: String,
}

/// One conversation in the chat overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ChatResponse {
	pub peer_id: Uuid,
	pub peer_name: String,
	pub peer_role: String,
	pub last_message: String,
	pub last_message_at: DateTime<Utc>,
	pub unread: i64,
}

/// A direct message in a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MessageResponse {
	pub id: Uuid,
	pub sender_id: Uuid,
	pub receiver_id: Uuid,
	pub content: String,
	pub is_read: bool,
	pub read_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
}

/// Request to send a direct message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SendMessageRequest {
	pub receiver_id: Uuid,
	pub content: String,
}

/// Acknowledgement of a sent message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SendMessageResponse {
	pub id: Uuid,
	pub created_at: DateTime<Utc>,
}
