// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// The authenticated user's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserResponse {
	pub id: Uuid,
	pub name: String,
	pub email: String,
	pub role: String,
	pub phone: Option<String>,
	pub home_block: Option<String>,
	pub home_unit: Option<String>,
	pub created_at: DateTime<Utc>,
}
