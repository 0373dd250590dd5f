// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! User profile HTTP handlers.

use axum::{
	response::{IntoResponse, Response},
	routing::get,
	Json, Router,
};
use strata_server_api::users::UserResponse;

use crate::api::AppState;
use crate::auth_middleware::RequireActor;

pub fn router() -> Router<AppState> {
	Router::new().route("/users/me", get(me))
}

#[tracing::instrument(skip(actor))]
pub async fn me(RequireActor(actor): RequireActor) -> Response {
	let user = actor.user;
	Json(UserResponse {
		id: user.id.into_inner(),
		name: user.name,
		email: user.email,
		role: user.role.to_string(),
		phone: user.phone,
		home_block: user.home_block.map(|b| b.to_string()),
		home_unit: user.home_unit,
		created_at: user.created_at,
	})
	.into_response()
}
