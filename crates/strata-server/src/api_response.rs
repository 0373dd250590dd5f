// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Common response patterns for HTTP handlers.
//!
//! Authorization failures deliberately carry generic bodies; the
//! structured deny reason stays in the debug log.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use strata_server_api::ErrorResponse;
use strata_server_db::DbError;

/// Create a 400 Bad Request response.
pub fn bad_request(error: impl Into<String>, message: impl Into<String>) -> Response {
	(
		StatusCode::BAD_REQUEST,
		Json(ErrorResponse::new(error, message)),
	)
		.into_response()
}

/// Create a 401 Unauthorized response.
pub fn unauthorized() -> Response {
	(
		StatusCode::UNAUTHORIZED,
		Json(ErrorResponse::new("unauthenticated", "Authentication required")),
	)
		.into_response()
}

/// Create a 403 Forbidden response. The body never says why.
pub fn forbidden() -> Response {
	(
		StatusCode::FORBIDDEN,
		Json(ErrorResponse::new("forbidden", "Not permitted")),
	)
		.into_response()
}

/// Create a 404 Not Found response.
pub fn not_found() -> Response {
	(
		StatusCode::NOT_FOUND,
		Json(ErrorResponse::new("not_found", "Resource not found")),
	)
		.into_response()
}

/// Create a 500 Internal Server Error response.
pub fn internal_error() -> Response {
	(
		StatusCode::INTERNAL_SERVER_ERROR,
		Json(ErrorResponse::new("internal_error", "Internal error")),
	)
		.into_response()
}

/// Map a storage error to a response, logging the detail server-side.
pub fn db_error(error: DbError) -> Response {
	match error {
		DbError::NotFound(_) => not_found(),
		DbError::InvalidActor(message) => bad_request("invalid_actor", message),
		other => {
			tracing::error!(error = %other, "storage error");
			internal_error()
		}
	}
}
