// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Caretaker assignment HTTP handlers.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
	Json, Router,
};
use strata_server_api::assignments::{AssignCaretakerRequest, BlockCaretakerResponse};
use strata_server_auth::{BlockId, Role, UserId};

use crate::api::AppState;
use crate::api_response::{bad_request, db_error, forbidden};
use crate::auth_middleware::RequireActor;

pub fn router() -> Router<AppState> {
	Router::new()
		.route("/assignments", post(assign_caretaker))
		.route("/blocks/{block}/caretakers", get(list_block_caretakers))
}

/// Admin assigns a caretaker to a block. Duplicate assignments are
/// accepted and have no further effect.
#[tracing::instrument(skip(state, actor, payload))]
pub async fn assign_caretaker(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Json(payload): Json<AssignCaretakerRequest>,
) -> Response {
	if actor.user.role != Role::Admin {
		return forbidden();
	}
	let Some(block) = BlockId::parse(&payload.block) else {
		return bad_request("invalid_block", "Block label is required");
	};

	let caretaker = UserId::new(payload.caretaker_id);
	match state.assignments.assign(&caretaker, &block).await {
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => db_error(error),
	}
}

/// List the caretakers servicing a block. Admins may ask about any
/// block; residents only about their own.
#[tracing::instrument(skip(state, actor), fields(block = %block))]
pub async fn list_block_caretakers(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(block): Path<String>,
) -> Response {
	let Some(block) = BlockId::parse(&block) else {
		return bad_request("invalid_block", "Block label is required");
	};

	match actor.user.role {
		Role::Admin => {}
		Role::Resident => {
			if actor.user.home_block.as_ref() != Some(&block) {
				return forbidden();
			}
		}
		_ => return forbidden(),
	}

	match state.assignments.list_block_caretakers(&block).await {
		Ok(caretakers) => Json(
			caretakers
				.into_iter()
				.map(|user| BlockCaretakerResponse {
					id: user.id.into_inner(),
					name: user.name,
					email: user.email,
				})
				.collect::<Vec<_>>(),
		)
		.into_response(),
		Err(error) => db_error(error),
	}
}
