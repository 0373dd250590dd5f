// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Due HTTP handlers.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, put},
	Json, Router,
};
use strata_server_api::dues::DueResponse;
use strata_server_auth::{evaluate, Action, DueId, ResourceKind};
use strata_server_db::Due;
use uuid::Uuid;

use crate::api::AppState;
use crate::api_response::{db_error, not_found};
use crate::auth_middleware::RequireActor;
use crate::gate::{actor_attrs, allow_or_not_found, list_scope};

pub fn router() -> Router<AppState> {
	Router::new()
		.route("/dues", get(list_dues))
		.route("/dues/{id}/pay", put(pay_due))
}

fn to_response(due: Due) -> DueResponse {
	DueResponse {
		id: due.id.into_inner(),
		amount_cents: due.amount_cents,
		description: due.description,
		is_paid: due.is_paid,
		paid_at: due.paid_at,
		created_at: due.created_at,
	}
}

#[tracing::instrument(skip(state, actor))]
pub async fn list_dues(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let scope = match list_scope(evaluate(&attrs, Action::List, ResourceKind::Due, None)) {
		Ok(scope) => scope,
		Err(response) => return response,
	};

	match state.dues.list(scope.as_ref()).await {
		Ok(list) => Json(list.into_iter().map(to_response).collect::<Vec<_>>()).into_response(),
		Err(error) => db_error(error),
	}
}

/// Settle a due. Re-paying an already-paid due is a no-op.
#[tracing::instrument(skip(state, actor), fields(id = %id))]
pub async fn pay_due(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let due = match state.dues.get(&DueId::new(id)).await {
		Ok(Some(due)) => due,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::ChangeStatus,
		ResourceKind::Due,
		Some(&due.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	match state.dues.mark_paid(&due.id).await {
		Ok(_) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => db_error(error),
	}
}
