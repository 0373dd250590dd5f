// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A due (billing item) in API responses. Amounts are integer cents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DueResponse {
	pub id: Uuid,
	pub amount_cents: i64,
	pub description: String,
	pub is_paid: bool,
	pub paid_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
}
