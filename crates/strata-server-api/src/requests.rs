// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A resident request in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RequestResponse {
	pub id: Uuid,
	pub title: String,
	pub content: String,
	pub requester_id: Uuid,
	/// `None` means the request is addressed to the site admin.
	pub target_caretaker_id: Option<Uuid>,
	pub status: String,
	pub response: Option<String>,
	pub responded_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Request to file a resident request. Omitting `target_caretaker_id`
/// addresses it to the site admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateRequestRequest {
	pub title: String,
	pub content: String,
	pub target_caretaker_id: Option<Uuid>,
}

/// Request to answer a resident request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RespondToRequestRequest {
	pub response: String,
}

/// Request to set a request's lifecycle status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateRequestStatusRequest {
	pub status: String,
}

/// Request to complete a request and bill its cost to the requester.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CompleteRequestRequest {
	pub amount_cents: i64,
}
