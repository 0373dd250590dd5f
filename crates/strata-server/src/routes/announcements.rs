// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Announcement HTTP handlers.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::get,
	Json, Router,
};
use chrono::Utc;
use strata_server_api::announcements::{
	AnnouncementResponse, AnnouncementStatsResponse, CreateAnnouncementRequest,
	UpdateAnnouncementRequest,
};
use strata_server_auth::{
	evaluate, Action, AnnouncementId, BlockId, ResourceAttrs, ResourceKind, Role,
};
use strata_server_db::Announcement;
use uuid::Uuid;

use crate::api::AppState;
use crate::api_response::{bad_request, db_error, forbidden};
use crate::auth_middleware::RequireActor;
use crate::gate::{actor_attrs, allow_or_forbidden, allow_or_not_found, list_scope};

pub fn router() -> Router<AppState> {
	Router::new()
		.route("/announcements", get(list_announcements).post(create_announcement))
		.route("/announcements/stats", get(announcement_stats))
		.route(
			"/announcements/{id}",
			get(get_announcement)
				.put(update_announcement)
				.delete(delete_announcement),
		)
}

fn to_response(announcement: Announcement) -> AnnouncementResponse {
	AnnouncementResponse {
		id: announcement.id.into_inner(),
		title: announcement.title,
		content: announcement.content,
		category: announcement.category,
		is_important: announcement.is_important,
		is_urgent: announcement.is_urgent,
		author_id: announcement.author_id.into_inner(),
		scope_block: announcement.scope_block.map(|b| b.to_string()),
		created_at: announcement.created_at,
		updated_at: announcement.updated_at,
	}
}

#[tracing::instrument(skip(state, actor))]
pub async fn list_announcements(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let scope = match list_scope(evaluate(&attrs, Action::List, ResourceKind::Announcement, None)) {
		Ok(scope) => scope,
		Err(response) => return response,
	};

	match state.announcements.list(scope.as_ref()).await {
		Ok(list) => {
			Json(list.into_iter().map(to_response).collect::<Vec<_>>()).into_response()
		}
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor), fields(id = %id))]
pub async fn get_announcement(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let announcement = match state.announcements.get(&AnnouncementId::new(id)).await {
		Ok(Some(announcement)) => announcement,
		Ok(None) => return crate::api_response::not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::Read,
		ResourceKind::Announcement,
		Some(&announcement.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	Json(to_response(announcement)).into_response()
}

#[tracing::instrument(skip(state, actor, payload))]
pub async fn create_announcement(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Json(payload): Json<CreateAnnouncementRequest>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};

	if payload.title.trim().is_empty() || payload.content.trim().is_empty() {
		return bad_request("invalid_announcement", "Title and content are required");
	}

	// Admin announcements are always site-wide; caretakers must name one
	// of their assigned blocks.
	let scope_block = match attrs.role {
		Role::Admin => None,
		_ => match &payload.scope_block {
			Some(label) => match BlockId::parse(label) {
				Some(block) => Some(block),
				None => return bad_request("invalid_block", "Block label is required"),
			},
			None => None,
		},
	};

	let mut descriptor = ResourceAttrs::announcement(attrs.user_id);
	if let Some(block) = &scope_block {
		descriptor = descriptor.with_block(block.clone());
	}
	let decision = evaluate(&attrs, Action::Create, ResourceKind::Announcement, Some(&descriptor));
	if let Err(response) = allow_or_forbidden(decision) {
		return response;
	}

	let now = Utc::now();
	let announcement = Announcement {
		id: AnnouncementId::generate(),
		title: payload.title,
		content: payload.content,
		category: payload.category,
		is_important: payload.is_important,
		is_urgent: payload.is_urgent,
		author_id: attrs.user_id,
		scope_block,
		created_at: now,
		updated_at: now,
	};

	match state.announcements.create(&announcement).await {
		Ok(()) => (StatusCode::CREATED, Json(to_response(announcement))).into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor, payload), fields(id = %id))]
pub async fn update_announcement(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	Json(payload): Json<UpdateAnnouncementRequest>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let mut announcement = match state.announcements.get(&AnnouncementId::new(id)).await {
		Ok(Some(announcement)) => announcement,
		Ok(None) => return crate::api_response::not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::Update,
		ResourceKind::Announcement,
		Some(&announcement.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	announcement.title = payload.title;
	announcement.content = payload.content;
	announcement.category = payload.category;
	announcement.is_important = payload.is_important;
	announcement.is_urgent = payload.is_urgent;
	// Only the admin may retarget (or globalize) an announcement.
	if attrs.role == Role::Admin {
		announcement.scope_block = match &payload.scope_block {
			Some(label) => match BlockId::parse(label) {
				Some(block) => Some(block),
				None => return bad_request("invalid_block", "Block label is required"),
			},
			None => None,
		};
	}

	match state.announcements.update(&announcement).await {
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor), fields(id = %id))]
pub async fn delete_announcement(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let announcement = match state.announcements.get(&AnnouncementId::new(id)).await {
		Ok(Some(announcement)) => announcement,
		Ok(None) => return crate::api_response::not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::Delete,
		ResourceKind::Announcement,
		Some(&announcement.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	match state.announcements.delete(&announcement.id).await {
		Ok(_) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor))]
pub async fn announcement_stats(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
) -> Response {
	if actor.user.role != Role::Admin {
		return forbidden();
	}

	match state.announcements.stats().await {
		Ok(stats) => Json(AnnouncementStatsResponse {
			total: stats.total,
			important: stats.important,
			urgent: stats.urgent,
			general: stats.general,
		})
		.into_response(),
		Err(error) => db_error(error),
	}
}
