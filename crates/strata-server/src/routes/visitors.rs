// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Visitor HTTP handlers.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, put},
	Json, Router,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use strata_server_api::visitors::{
	CreateVisitorRequest, ParkingResponse, UpdateVisitorStatusRequest, VisitorResponse,
	VisitorStatsResponse,
};
use strata_server_auth::{
	evaluate, Action, ResourceAttrs, ResourceKind, Role, UserId, VisitorId, VisitorKind,
};
use strata_server_db::{Visitor, VisitorStatus};
use uuid::Uuid;

use crate::api::AppState;
use crate::api_response::{bad_request, db_error, forbidden, not_found};
use crate::auth_middleware::RequireActor;
use crate::gate::{actor_attrs, allow_or_forbidden, allow_or_not_found, list_scope};
use crate::routes::zero_filled_daily;

/// Guest parking capacity of the complex.
const GUEST_PARKING_CAPACITY: i64 = 80;

pub fn router() -> Router<AppState> {
	Router::new()
		.route("/visitors", get(list_visitors).post(create_visitor))
		.route("/visitors/stats", get(visitor_stats))
		.route("/visitors/daily", get(visitor_daily))
		.route("/visitors/{id}", get(get_visitor).delete(delete_visitor))
		.route("/visitors/{id}/status", put(update_visitor_status))
		.route("/visitors/{id}/enter", put(mark_visitor_enter))
		.route("/visitors/{id}/exit", put(mark_visitor_exit))
}

#[derive(Debug, Deserialize)]
pub struct DailyParams {
	days: Option<i64>,
}

fn to_response(visitor: Visitor) -> VisitorResponse {
	VisitorResponse {
		id: visitor.id.into_inner(),
		name: visitor.name,
		phone: visitor.phone,
		purpose: visitor.purpose,
		resident_id: visitor.resident_id.into_inner(),
		kind: visitor.kind.to_string(),
		status: visitor.status.to_string(),
		expected_at: visitor.expected_at,
		has_vehicle: visitor.has_vehicle,
		vehicle_plate: visitor.vehicle_plate,
		entry_at: visitor.entry_at,
		exit_at: visitor.exit_at,
		created_at: visitor.created_at,
		updated_at: visitor.updated_at,
	}
}

#[tracing::instrument(skip(state, actor))]
pub async fn list_visitors(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let scope = match list_scope(evaluate(&attrs, Action::List, ResourceKind::Visitor, None)) {
		Ok(scope) => scope,
		Err(response) => return response,
	};

	match state.visitors.list(scope.as_ref()).await {
		Ok(list) => Json(list.into_iter().map(to_response).collect::<Vec<_>>()).into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor), fields(id = %id))]
pub async fn get_visitor(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let visitor = match state.visitors.get(&VisitorId::new(id)).await {
		Ok(Some(visitor)) => visitor,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::Read,
		ResourceKind::Visitor,
		Some(&visitor.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	Json(to_response(visitor)).into_response()
}

#[tracing::instrument(skip(state, actor, payload))]
pub async fn create_visitor(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Json(payload): Json<CreateVisitorRequest>,
) -> Response {
	let Some(kind) = VisitorKind::parse(&payload.kind) else {
		return bad_request("invalid_kind", "Unknown visitor kind");
	};

	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};

	// Guest notices announce the actor's own guest; visitor logs must
	// name the visited resident.
	let resident_id = match kind {
		VisitorKind::GuestNotice => attrs.user_id,
		VisitorKind::VisitorLog => match payload.resident_id {
			Some(id) => {
				let id = UserId::new(id);
				match state.users.get_user_by_id(&id).await {
					Ok(Some(_)) => id,
					Ok(None) => {
						return bad_request("invalid_actor", "Visited resident not found")
					}
					Err(error) => return db_error(error),
				}
			}
			None => return bad_request("invalid_actor", "Visited resident is required"),
		},
	};

	let descriptor = ResourceAttrs::visitor(kind, resident_id);
	let decision = evaluate(&attrs, Action::Create, ResourceKind::Visitor, Some(&descriptor));
	if let Err(response) = allow_or_forbidden(decision) {
		return response;
	}

	let now = Utc::now();
	// A vehicle logged at the gate is already inside.
	let entry_at = (attrs.role == Role::Security && payload.has_vehicle).then_some(now);
	let visitor = Visitor {
		id: VisitorId::generate(),
		name: payload.name,
		phone: payload.phone,
		purpose: payload.purpose,
		resident_id,
		kind,
		status: VisitorStatus::Pending,
		expected_at: payload.expected_at,
		has_vehicle: payload.has_vehicle,
		vehicle_plate: payload.vehicle_plate,
		entry_at,
		exit_at: None,
		created_at: now,
		updated_at: now,
	};

	match state.visitors.create(&visitor).await {
		Ok(()) => (StatusCode::CREATED, Json(to_response(visitor))).into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor, payload), fields(id = %id))]
pub async fn update_visitor_status(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	Json(payload): Json<UpdateVisitorStatusRequest>,
) -> Response {
	let Some(status) = VisitorStatus::parse(&payload.status) else {
		return bad_request("invalid_status", "Unknown visitor status");
	};

	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let visitor = match state.visitors.get(&VisitorId::new(id)).await {
		Ok(Some(visitor)) => visitor,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::ChangeStatus,
		ResourceKind::Visitor,
		Some(&visitor.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	match state.visitors.set_status(&visitor.id, status).await {
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor), fields(id = %id))]
pub async fn mark_visitor_enter(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Response {
	stamp_gate(state, actor, id, GateStamp::Enter).await
}

#[tracing::instrument(skip(state, actor), fields(id = %id))]
pub async fn mark_visitor_exit(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Response {
	stamp_gate(state, actor, id, GateStamp::Exit).await
}

enum GateStamp {
	Enter,
	Exit,
}

async fn stamp_gate(
	state: AppState,
	actor: strata_server_auth::middleware::CurrentActor,
	id: Uuid,
	stamp: GateStamp,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let visitor = match state.visitors.get(&VisitorId::new(id)).await {
		Ok(Some(visitor)) => visitor,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::ChangeStatus,
		ResourceKind::Visitor,
		Some(&visitor.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	let result = match stamp {
		GateStamp::Enter => state.visitors.mark_enter(&visitor.id).await,
		GateStamp::Exit => state.visitors.mark_exit(&visitor.id).await,
	};
	match result {
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor), fields(id = %id))]
pub async fn delete_visitor(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let visitor = match state.visitors.get(&VisitorId::new(id)).await {
		Ok(Some(visitor)) => visitor,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::Delete,
		ResourceKind::Visitor,
		Some(&visitor.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	match state.visitors.delete(&visitor.id).await {
		Ok(_) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor))]
pub async fn visitor_stats(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
) -> Response {
	// Gate dashboard: security only.
	if actor.user.role != Role::Security {
		return forbidden();
	}

	match state.visitors.stats().await {
		Ok(stats) => Json(VisitorStatsResponse {
			active_visitors: stats.active,
			pending_visitors: stats.pending,
			parking: ParkingResponse {
				capacity: GUEST_PARKING_CAPACITY,
				occupied: stats.vehicles_present,
			},
		})
		.into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor, params))]
pub async fn visitor_daily(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Query(params): Query<DailyParams>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let scope = match list_scope(evaluate(&attrs, Action::List, ResourceKind::Visitor, None)) {
		Ok(scope) => scope,
		Err(response) => return response,
	};

	let days = params.days.unwrap_or(7).clamp(1, 90);
	let since = Utc::now() - Duration::days(days - 1);
	match state.visitors.daily_counts(since, scope.as_ref()).await {
		Ok(counts) => Json(zero_filled_daily(counts, days)).into_response(),
		Err(error) => db_error(error),
	}
}
