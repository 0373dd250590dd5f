// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A parcel in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ParcelResponse {
	pub id: Uuid,
	pub recipient_name: String,
	pub phone: String,
	pub company: String,
	pub tracking_number: String,
	pub status: String,
	pub block: Option<String>,
	pub unit: Option<String>,
	pub resident_id: Option<Uuid>,
	pub delivered_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Request to register a parcel at the gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateParcelRequest {
	pub recipient_name: String,
	pub phone: String,
	pub company: String,
	pub tracking_number: String,
	pub block: Option<String>,
	pub unit: Option<String>,
}

/// Request to change a parcel's delivery status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateParcelStatusRequest {
	pub status: String,
}

/// A resident note on a parcel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ParcelNoteResponse {
	pub id: Uuid,
	pub parcel_id: Uuid,
	pub author_id: Uuid,
	pub content: String,
	pub created_at: DateTime<Utc>,
}

/// Request to attach a note to a parcel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateParcelNoteRequest {
	pub content: String,
}

/// One day of parcel counts; days without parcels report zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DailyCountResponse {
	pub date: String,
	pub count: i64,
}
