// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A visitor record in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct VisitorResponse {
	pub id: Uuid,
	pub name: String,
	pub phone: String,
	pub purpose: String,
	pub resident_id: Uuid,
	pub kind: String,
	pub status: String,
	pub expected_at: DateTime<Utc>,
	pub has_vehicle: bool,
	pub vehicle_plate: Option<String>,
	pub entry_at: Option<DateTime<Utc>>,
	pub exit_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Request to create a visitor record.
///
/// Residents announce their own guests (`kind = "guest_notice"`,
/// `resident_id` ignored); security logs walk-ups (`kind =
/// "visitor_log"`) and must name the visited resident.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateVisitorRequest {
	pub name: String,
	pub phone: String,
	pub purpose: String,
	pub kind: String,
	pub resident_id: Option<Uuid>,
	pub expected_at: DateTime<Utc>,
	#[serde(default)]
	pub has_vehicle: bool,
	pub vehicle_plate: Option<String>,
}

/// Request to set the gate decision on a visitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateVisitorStatusRequest {
	pub status: String,
}

/// Guest parking usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ParkingResponse {
	pub capacity: i64,
	pub occupied: i64,
}

/// Gate-dashboard aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct VisitorStatsResponse {
	pub active_visitors: i64,
	pub pending_visitors: i64,
	pub parking: ParkingResponse,
}
