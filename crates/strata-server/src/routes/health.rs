// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Health and version endpoints.

use axum::{response::IntoResponse, Json};

pub async fn health() -> impl IntoResponse {
	Json(serde_json::json!({
		"status": "ok",
		"name": "strata-server",
		"version": env!("CARGO_PKG_VERSION"),
	}))
}
