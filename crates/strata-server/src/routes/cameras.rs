// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Camera HTTP handlers.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::get,
	Json, Router,
};
use chrono::Utc;
use strata_server_api::cameras::{
	ActiveCameraCountResponse, CameraResponse, UpsertCameraRequest,
};
use strata_server_auth::{evaluate, Action, CameraId, ResourceAttrs, ResourceKind, Role};
use strata_server_db::{Camera, CameraStatus};
use uuid::Uuid;

use crate::api::AppState;
use crate::api_response::{bad_request, db_error, forbidden, not_found};
use crate::auth_middleware::RequireActor;
use crate::gate::{actor_attrs, allow_or_forbidden, allow_or_not_found, list_scope};

pub fn router() -> Router<AppState> {
	Router::new()
		.route("/cameras", get(list_cameras).post(create_camera))
		.route("/cameras/active-count", get(active_camera_count))
		.route("/cameras/{id}", axum::routing::put(update_camera).delete(delete_camera))
}

fn to_response(camera: Camera) -> CameraResponse {
	CameraResponse {
		id: camera.id.into_inner(),
		name: camera.name,
		location: camera.location,
		ip_address: camera.ip_address,
		status: camera.status.to_string(),
		recording: camera.recording,
		resolution: camera.resolution,
		last_maintenance_at: camera.last_maintenance_at,
		storage_used_percent: camera.storage_used_percent,
		created_at: camera.created_at,
		updated_at: camera.updated_at,
	}
}

#[tracing::instrument(skip(state, actor))]
pub async fn list_cameras(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	if let Err(response) = list_scope(evaluate(&attrs, Action::List, ResourceKind::Camera, None)) {
		return response;
	}

	match state.cameras.list().await {
		Ok(list) => Json(list.into_iter().map(to_response).collect::<Vec<_>>()).into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor))]
pub async fn active_camera_count(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
) -> Response {
	// Admin dashboard aggregate.
	if actor.user.role != Role::Admin {
		return forbidden();
	}

	match state.cameras.active_count().await {
		Ok(active) => Json(ActiveCameraCountResponse { active }).into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor, payload))]
pub async fn create_camera(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Json(payload): Json<UpsertCameraRequest>,
) -> Response {
	let Some(status) = CameraStatus::parse(&payload.status) else {
		return bad_request("invalid_status", "Unknown camera status");
	};

	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let decision = evaluate(
		&attrs,
		Action::Create,
		ResourceKind::Camera,
		Some(&ResourceAttrs::camera()),
	);
	if let Err(response) = allow_or_forbidden(decision) {
		return response;
	}

	let now = Utc::now();
	let camera = Camera {
		id: CameraId::generate(),
		name: payload.name,
		location: payload.location,
		ip_address: payload.ip_address,
		status,
		recording: payload.recording,
		resolution: payload.resolution,
		last_maintenance_at: payload.last_maintenance_at,
		storage_used_percent: payload.storage_used_percent,
		created_at: now,
		updated_at: now,
	};

	match state.cameras.create(&camera).await {
		Ok(()) => (StatusCode::CREATED, Json(to_response(camera))).into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor, payload), fields(id = %id))]
pub async fn update_camera(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	Json(payload): Json<UpsertCameraRequest>,
) -> Response {
	let Some(status) = CameraStatus::parse(&payload.status) else {
		return bad_request("invalid_status", "Unknown camera status");
	};

	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let mut camera = match state.cameras.get(&CameraId::new(id)).await {
		Ok(Some(camera)) => camera,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::Update,
		ResourceKind::Camera,
		Some(&ResourceAttrs::camera()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	camera.name = payload.name;
	camera.location = payload.location;
	camera.ip_address = payload.ip_address;
	camera.status = status;
	camera.recording = payload.recording;
	camera.resolution = payload.resolution;
	camera.last_maintenance_at = payload.last_maintenance_at;
	camera.storage_used_percent = payload.storage_used_percent;

	match state.cameras.update(&camera).await {
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor), fields(id = %id))]
pub async fn delete_camera(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let camera = match state.cameras.get(&CameraId::new(id)).await {
		Ok(Some(camera)) => camera,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::Delete,
		ResourceKind::Camera,
		Some(&ResourceAttrs::camera()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	match state.cameras.delete(&camera.id).await {
		Ok(_) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => db_error(error),
	}
}
