// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Notification HTTP handlers.

use axum::{
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
	Json, Router,
};
use strata_server_api::notifications::MarkSeenRequest;

use crate::api::AppState;
use crate::auth_middleware::RequireActor;
use crate::gate::actor_attrs;
use crate::unread;

pub fn router() -> Router<AppState> {
	Router::new()
		.route("/notifications/unread", get(get_unread))
		.route("/notifications/mark-seen", post(mark_seen))
}

#[tracing::instrument(skip(state, actor))]
pub async fn get_unread(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	match unread::unread_feed(&state, &attrs).await {
		Ok(feed) => Json(feed).into_response(),
		Err(response) => response,
	}
}

#[tracing::instrument(skip(state, actor, payload))]
pub async fn mark_seen(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Json(payload): Json<MarkSeenRequest>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	match unread::mark_seen(&state, &attrs, &payload.items).await {
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(response) => response,
	}
}
