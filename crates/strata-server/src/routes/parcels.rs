// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Parcel HTTP handlers.
//!
//! Parcel registration matches the recipient by (block, unit) and fans a
//! message out to the matched resident and to every caretaker assigned
//! to the block. The fan-out is best-effort relative to the parcel
//! write: message or push failures are logged, never rolled back.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, put},
	Json, Router,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use strata_server_api::parcels::{
	CreateParcelNoteRequest, CreateParcelRequest, ParcelNoteResponse, ParcelResponse,
	UpdateParcelStatusRequest,
};
use strata_server_auth::{
	evaluate, Action, BlockId, MessageId, ParcelId, ResourceKind, UserId,
};
use strata_server_db::{Message, Parcel, ParcelNote, ParcelStatus};
use uuid::Uuid;

use crate::api::AppState;
use crate::api_response::{bad_request, db_error, not_found};
use crate::auth_middleware::RequireActor;
use crate::gate::{actor_attrs, allow_or_forbidden, allow_or_not_found, list_scope};
use crate::notify::PushEvent;
use crate::routes::zero_filled_daily;

pub fn router() -> Router<AppState> {
	Router::new()
		.route("/parcels", get(list_parcels).post(create_parcel))
		.route("/parcels/daily", get(parcel_daily))
		.route("/parcels/{id}", get(get_parcel).delete(delete_parcel))
		.route("/parcels/{id}/status", put(update_parcel_status))
		.route("/parcels/{id}/notes", get(list_parcel_notes).post(create_parcel_note))
}

#[derive(Debug, Deserialize)]
pub struct DailyParams {
	days: Option<i64>,
}

fn to_response(parcel: Parcel) -> ParcelResponse {
	ParcelResponse {
		id: parcel.id.into_inner(),
		recipient_name: parcel.recipient_name,
		phone: parcel.phone,
		company: parcel.company,
		tracking_number: parcel.tracking_number,
		status: parcel.status.to_string(),
		block: parcel.block.map(|b| b.to_string()),
		unit: parcel.unit,
		resident_id: parcel.resident_id.map(UserId::into_inner),
		delivered_at: parcel.delivered_at,
		created_at: parcel.created_at,
		updated_at: parcel.updated_at,
	}
}

fn note_to_response(note: ParcelNote) -> ParcelNoteResponse {
	ParcelNoteResponse {
		id: note.id,
		parcel_id: note.parcel_id.into_inner(),
		author_id: note.author_id.into_inner(),
		content: note.content,
		created_at: note.created_at,
	}
}

#[tracing::instrument(skip(state, actor))]
pub async fn list_parcels(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let scope = match list_scope(evaluate(&attrs, Action::List, ResourceKind::Parcel, None)) {
		Ok(scope) => scope,
		Err(response) => return response,
	};

	match state.parcels.list(scope.as_ref()).await {
		Ok(list) => Json(list.into_iter().map(to_response).collect::<Vec<_>>()).into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor), fields(id = %id))]
pub async fn get_parcel(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let parcel = match state.parcels.get(&ParcelId::new(id)).await {
		Ok(Some(parcel)) => parcel,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::Read,
		ResourceKind::Parcel,
		Some(&parcel.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	Json(to_response(parcel)).into_response()
}

#[tracing::instrument(skip(state, actor, payload))]
pub async fn create_parcel(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Json(payload): Json<CreateParcelRequest>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};

	let block = match &payload.block {
		Some(label) if !label.trim().is_empty() => match BlockId::parse(label) {
			Some(block) => Some(block),
			None => return bad_request("invalid_block", "Block label is required"),
		},
		_ => None,
	};
	let unit = payload.unit.as_deref().map(str::trim).filter(|u| !u.is_empty());

	let descriptor = strata_server_auth::ResourceAttrs::parcel(block.clone(), None);
	let decision = evaluate(&attrs, Action::Create, ResourceKind::Parcel, Some(&descriptor));
	if let Err(response) = allow_or_forbidden(decision) {
		return response;
	}

	let now = Utc::now();
	let mut parcel = Parcel {
		id: ParcelId::generate(),
		recipient_name: payload.recipient_name,
		phone: payload.phone,
		company: payload.company,
		tracking_number: payload.tracking_number,
		status: ParcelStatus::Pending,
		block: block.clone(),
		unit: unit.map(str::to_string),
		resident_id: None,
		delivered_at: None,
		created_at: now,
		updated_at: now,
	};

	if let Err(error) = state.parcels.create(&parcel).await {
		return db_error(error);
	}

	// Match the recipient by address and fan notifications out. The
	// parcel row is already committed; everything below is best-effort.
	if let (Some(block), Some(unit)) = (&parcel.block, parcel.unit.as_deref()) {
		match state.users.find_resident_by_address(block, unit).await {
			Ok(Some(resident)) => {
				if let Err(error) = state.parcels.set_resident(&parcel.id, &resident.id).await {
					tracing::warn!(error = %error, "failed to attach matched resident");
				} else {
					parcel.resident_id = Some(resident.id);
					fan_out_arrival(&state, &attrs.user_id, &parcel, &resident.id, block).await;
				}
			}
			Ok(None) => {}
			Err(error) => tracing::warn!(error = %error, "resident matching failed"),
		}
	}

	(StatusCode::CREATED, Json(to_response(parcel))).into_response()
}

/// Message the matched resident and the block's caretakers about an
/// arrived parcel.
async fn fan_out_arrival(
	state: &AppState,
	sender: &UserId,
	parcel: &Parcel,
	resident: &UserId,
	block: &BlockId,
) {
	let mut recipients = vec![(
		*resident,
		format!(
			"Your {} parcel has arrived. Tracking: {}",
			parcel.company, parcel.tracking_number
		),
	)];

	match state.assignments.caretakers_for_block(block).await {
		Ok(caretakers) => {
			for caretaker in caretakers {
				recipients.push((
					caretaker,
					format!(
						"New parcel for block {block} (tracking: {})",
						parcel.tracking_number
					),
				));
			}
		}
		Err(error) => tracing::warn!(error = %error, "caretaker lookup failed during fan-out"),
	}

	for (recipient, content) in recipients {
		let message = Message {
			id: MessageId::generate(),
			sender_id: *sender,
			receiver_id: recipient,
			content,
			is_read: false,
			read_at: None,
			created_at: Utc::now(),
		};
		if let Err(error) = state.messages.create(&message).await {
			tracing::warn!(error = %error, "failed to write parcel arrival message");
			continue;
		}
		state.push.push(
			&recipient,
			PushEvent::Notification {
				kind: "parcel".to_string(),
				resource_id: parcel.id.into_inner(),
				title: "Parcel arrived".to_string(),
			},
		);
	}
}

#[tracing::instrument(skip(state, actor, payload), fields(id = %id))]
pub async fn update_parcel_status(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	Json(payload): Json<UpdateParcelStatusRequest>,
) -> Response {
	let Some(status) = ParcelStatus::parse(&payload.status) else {
		return bad_request("invalid_status", "Unknown parcel status");
	};

	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let parcel = match state.parcels.get(&ParcelId::new(id)).await {
		Ok(Some(parcel)) => parcel,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::ChangeStatus,
		ResourceKind::Parcel,
		Some(&parcel.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	match state.parcels.set_status(&parcel.id, status).await {
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor), fields(id = %id))]
pub async fn list_parcel_notes(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let parcel = match state.parcels.get(&ParcelId::new(id)).await {
		Ok(Some(parcel)) => parcel,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::Read,
		ResourceKind::Parcel,
		Some(&parcel.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	match state.parcels.list_notes(&parcel.id).await {
		Ok(notes) => {
			Json(notes.into_iter().map(note_to_response).collect::<Vec<_>>()).into_response()
		}
		Err(error) => db_error(error),
	}
}

/// A resident leaves a note on their parcel; the block's caretakers get
/// a message about it. Closed once the parcel is delivered.
#[tracing::instrument(skip(state, actor, payload), fields(id = %id))]
pub async fn create_parcel_note(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
	Json(payload): Json<CreateParcelNoteRequest>,
) -> Response {
	if payload.content.trim().is_empty() {
		return bad_request("invalid_note", "Note text is required");
	}

	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let parcel = match state.parcels.get(&ParcelId::new(id)).await {
		Ok(Some(parcel)) => parcel,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::Update,
		ResourceKind::Parcel,
		Some(&parcel.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	let note = ParcelNote {
		id: Uuid::new_v4(),
		parcel_id: parcel.id,
		author_id: attrs.user_id,
		content: payload.content.trim().to_string(),
		created_at: Utc::now(),
	};
	if let Err(error) = state.parcels.add_note(&note).await {
		return db_error(error);
	}

	// Best-effort caretaker notification.
	if let Some(block) = &parcel.block {
		match state.assignments.caretakers_for_block(block).await {
			Ok(caretakers) => {
				for caretaker in caretakers {
					let message = Message {
						id: MessageId::generate(),
						sender_id: attrs.user_id,
						receiver_id: caretaker,
						content: format!("Parcel note: {}", note.content),
						is_read: false,
						read_at: None,
						created_at: Utc::now(),
					};
					if let Err(error) = state.messages.create(&message).await {
						tracing::warn!(error = %error, "failed to write parcel note message");
						continue;
					}
					state.push.push(
						&caretaker,
						PushEvent::Notification {
							kind: "parcel_note".to_string(),
							resource_id: note.id,
							title: "Parcel note".to_string(),
						},
					);
				}
			}
			Err(error) => tracing::warn!(error = %error, "caretaker lookup failed for note"),
		}
	}

	(StatusCode::CREATED, Json(note_to_response(note))).into_response()
}

#[tracing::instrument(skip(state, actor), fields(id = %id))]
pub async fn delete_parcel(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let parcel = match state.parcels.get(&ParcelId::new(id)).await {
		Ok(Some(parcel)) => parcel,
		Ok(None) => return not_found(),
		Err(error) => return db_error(error),
	};

	let decision = evaluate(
		&attrs,
		Action::Delete,
		ResourceKind::Parcel,
		Some(&parcel.resource_attrs()),
	);
	if let Err(response) = allow_or_not_found(decision) {
		return response;
	}

	match state.parcels.delete(&parcel.id).await {
		Ok(_) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor, params))]
pub async fn parcel_daily(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Query(params): Query<DailyParams>,
) -> Response {
	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	// The series is an aggregate; it still requires a parcel surface.
	if let Err(response) = list_scope(evaluate(&attrs, Action::List, ResourceKind::Parcel, None)) {
		return response;
	}

	let days = params.days.unwrap_or(7).clamp(1, 90);
	let since = Utc::now() - Duration::days(days - 1);
	match state.parcels.daily_counts(since).await {
		Ok(counts) => Json(zero_filled_daily(counts, days)).into_response(),
		Err(error) => db_error(error),
	}
}
