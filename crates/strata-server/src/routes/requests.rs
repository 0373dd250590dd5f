// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Resident request HTTP handlers.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, put},
	Json, Router,
};
use chrono::Utc;
use strata_server_api::requests::{
	CompleteRequestRequest, CreateRequestRequest, RequestResponse, RespondToRequestRequest,
	UpdateRequestStatusRequest,
};
use strata_server_auth::{evaluate, Action, RequestId, ResourceAttrs, ResourceKind, Role, UserId};
use strata_server_db::{Request, RequestStatus};
use uuid::Uuid;

use crate::api::AppState;
use crate::api_response::{bad_request, db_error, forbidden, not_found};
use crate::auth_middleware::RequireActor;
use crate::gate::{actor_attrs, allow_or_forbidden, allow_or_not_found, list_scope};

pub fn router() -> Router<AppState> {
	Router::new()
		.route("/requests", get(list_requests).post(create_request))
		.route("/requests/{id}", get(get_request).delete(delete_request))
		.route("/requests/{id}/respond", put(respond_to_request))
		.route("/requests/{id}/status", put(update_request_status))
		.route("/requests/{id}/complete", put(complete_request))
}

fn to_response(request: Request) -> RequestResponse {
	RequestResponse {
		id: request.id.into_inner(),
		title: request.title,
		content: request.content,
		requester_id: request.requester_id.into_inner(),
		target_caretaker_id: request.target_caretaker_id.map(UserId::into_inner),
		status: request.status.to_string(),
		response: request.response,
		responded_at: request.responded_at,
		created_at: request.created_at,
		updated_at: request.updated_at,
	}
}

#[tracing::instrument(skip(state, actor))]
pub async fn list_requests(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let scope = match list_scope(evaluate(&attrs, Action::List, ResourceKind::Request, None)) {
		Ok(scope) => scope,
		Err(response) => return response,
	};

	match state.requests.list(scope.as_ref()).await {
		Ok(list) => Json(list.into_iter().map(to_response).collect::<Vec<_>>()).into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor), fields(id = %id))]
pub async fn get_request(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let request = match state.requests.get(&RequestId::new(id)).await {
		Ok(Some(request)) => request,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::Read,
		ResourceKind::Request,
		Some(&request.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	Json(to_response(request)).into_response()
}

#[tracing::instrument(skip(state, actor, payload))]
pub async fn create_request(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Json(payload): Json<CreateRequestRequest>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};

	if payload.title.trim().is_empty() || payload.content.trim().is_empty() {
		return bad_request("invalid_request", "Title and content are required");
	}

	let target = payload.target_caretaker_id.map(UserId::new);
	let mut descriptor = ResourceAttrs::request(attrs.user_id, target);

	// A caretaker target must be a real caretaker; their serviced blocks
	// are pre-loaded for the policy check.
	if let Some(target_id) = &target {
		match state.users.get_user_by_id(target_id).await {
			Ok(Some(user)) if user.role == Role::Caretaker => {}
			Ok(_) => {
				return bad_request("invalid_actor", "Target is not a caretaker");
			}
			Err(error) => return db_error(error),
		}
		let target_blocks = match state.assignments.blocks_for(target_id).await {
			Ok(blocks) => blocks,
			Err(error) => return db_error(error),
		};
		descriptor = descriptor.with_target_blocks(target_blocks);
	}

	let decision = evaluate(&attrs, Action::Create, ResourceKind::Request, Some(&descriptor));
	if let Err(response) = allow_or_forbidden(decision) {
		return response;
	}

	let now = Utc::now();
	let request = Request {
		id: RequestId::generate(),
		title: payload.title,
		content: payload.content,
		requester_id: attrs.user_id,
		target_caretaker_id: target,
		status: RequestStatus::Pending,
		response: None,
		responded_at: None,
		created_at: now,
		updated_at: now,
	};

	match state.requests.create(&request).await {
		Ok(()) => (StatusCode::CREATED, Json(to_response(request))).into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor, payload), fields(id = %id))]
pub async fn respond_to_request(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	Json(payload): Json<RespondToRequestRequest>,
) -> Response {
	if payload.response.trim().is_empty() {
		return bad_request("invalid_response", "Response text is required");
	}

	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let request = match state.requests.get(&RequestId::new(id)).await {
		Ok(Some(request)) => request,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::Respond,
		ResourceKind::Request,
		Some(&request.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	match state.requests.respond(&request.id, &payload.response).await {
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor, payload), fields(id = %id))]
pub async fn update_request_status(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	Json(payload): Json<UpdateRequestStatusRequest>,
) -> Response {
	let Some(status) = RequestStatus::parse(&payload.status) else {
		return bad_request("invalid_status", "Unknown request status");
	};

	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let request = match state.requests.get(&RequestId::new(id)).await {
		Ok(Some(request)) => request,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::ChangeStatus,
		ResourceKind::Request,
		Some(&request.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	match state.requests.set_status(&request.id, status).await {
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => db_error(error),
	}
}

/// Complete a request and bill the cost to the requester. Caretaker work
/// only; the due lands on the requester's account.
#[tracing::instrument(skip(state, actor, payload), fields(id = %id))]
pub async fn complete_request(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	Json(payload): Json<CompleteRequestRequest>,
) -> Response {
	if payload.amount_cents < 0 {
		return bad_request("invalid_amount", "Amount must not be negative");
	}
	if actor.user.role != Role::Caretaker {
		return forbidden();
	}

	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let request = match state.requests.get(&RequestId::new(id)).await {
		Ok(Some(request)) => request,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::ChangeStatus,
		ResourceKind::Request,
		Some(&request.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	match state.requests.complete_with_due(&request, payload.amount_cents).await {
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor), fields(id = %id))]
pub async fn delete_request(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let request = match state.requests.get(&RequestId::new(id)).await {
		Ok(Some(request)) => request,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::Delete,
		ResourceKind::Request,
		Some(&request.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	match state.requests.delete(&request.id).await {
		Ok(_) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => db_error(error),
	}
}
