// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Direct messaging HTTP handlers.
//!
//! The realtime channel is fire-and-forget: a send returns once the row
//! is written, whether or not the push delivery succeeds.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
	Json, Router,
};
use chrono::Utc;
use strata_server_api::messages::{
	ChatResponse, ContactResponse, MessageResponse, SendMessageRequest, SendMessageResponse,
};
use strata_server_auth::{evaluate, Action, MessageId, ResourceAttrs, ResourceKind, UserId};
use strata_server_db::Message;
use uuid::Uuid;

use crate::api::AppState;
use crate::api_response::{bad_request, db_error};
use crate::auth_middleware::RequireActor;
use crate::gate::{actor_attrs, allow_or_forbidden};
use crate::notify::PushEvent;

pub fn router() -> Router<AppState> {
	Router::new()
		.route("/messages", post(send_message))
		.route("/messages/contacts", get(list_contacts))
		.route("/messages/chats", get(list_chats))
		.route("/messages/thread/{peer}", get(get_thread))
		.route("/messages/thread/{peer}/read", post(mark_thread_read))
}

fn to_response(message: Message) -> MessageResponse {
	MessageResponse {
		id: message.id.into_inner(),
		sender_id: message.sender_id.into_inner(),
		receiver_id: message.receiver_id.into_inner(),
		content: message.content,
		is_read: message.is_read,
		read_at: message.read_at,
		created_at: message.created_at,
	}
}

#[tracing::instrument(skip(state, actor))]
pub async fn list_contacts(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
) -> Response {
	match state.users.list_contacts(&actor.user.id).await {
		Ok(users) => Json(
			users
				.into_iter()
				.map(|user| ContactResponse {
					id: user.id.into_inner(),
					name: user.name,
					role: user.role.to_string(),
				})
				.collect::<Vec<_>>(),
		)
		.into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor))]
pub async fn list_chats(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
) -> Response {
	match state.messages.list_chats(&actor.user.id).await {
		Ok(chats) => Json(
			chats
				.into_iter()
				.map(|chat| ChatResponse {
					peer_id: chat.peer_id.into_inner(),
					peer_name: chat.peer_name,
					peer_role: chat.peer_role.to_string(),
					last_message: chat.last_message,
					last_message_at: chat.last_message_at,
					unread: chat.unread,
				})
				.collect::<Vec<_>>(),
		)
		.into_response(),
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor), fields(peer = %peer))]
pub async fn get_thread(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(peer): Path<Uuid>,
) -> Response {
	// The thread query is participant-scoped by construction; it only
	// returns rows with the actor on one end.
	let peer = UserId::new(peer);
	match state.messages.list_thread(&actor.user.id, &peer).await {
		Ok(messages) => {
			Json(messages.into_iter().map(to_response).collect::<Vec<_>>()).into_response()
		}
		Err(error) => db_error(error),
	}
}

#[tracing::instrument(skip(state, actor, payload))]
pub async fn send_message(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Json(payload): Json<SendMessageRequest>,
) -> Response {
	let content = payload.content.trim();
	if content.is_empty() {
		return bad_request("invalid_message", "Message text is required");
	}

	let receiver = UserId::new(payload.receiver_id);
	match state.users.get_user_by_id(&receiver).await {
		Ok(Some(_)) => {}
		Ok(None) => return bad_request("invalid_actor", "Receiver not found"),
		Err(error) => return db_error(error),
	}

	let attrs = match actor_attrs(&state, &actor).await {
		Ok(attrs) => attrs,
		Err(response) => return response,
	};
	let descriptor = ResourceAttrs::message(attrs.user_id, receiver);
	let decision = evaluate(&attrs, Action::Create, ResourceKind::Message, Some(&descriptor));
	if let Err(response) = allow_or_forbidden(decision) {
		return response;
	}

	let message = Message {
		id: MessageId::generate(),
		sender_id: attrs.user_id,
		receiver_id: receiver,
		content: content.to_string(),
		is_read: false,
		read_at: None,
		created_at: Utc::now(),
	};
	if let Err(error) = state.messages.create(&message).await {
		return db_error(error);
	}

	state.push.push(
		&receiver,
		PushEvent::Message {
			message_id: message.id.into_inner(),
			sender_id: message.sender_id,
			preview: message.content.clone(),
		},
	);

	(
		StatusCode::CREATED,
		Json(SendMessageResponse {
			id: message.id.into_inner(),
			created_at: message.created_at,
		}),
	)
		.into_response()
}

/// Mark every unread message from the peer as read.
#[tracing::instrument(skip(state, actor), fields(peer = %peer))]
pub async fn mark_thread_read(
	RequireActor(actor): RequireActor,
	State(state): State<AppState>,
	Path(peer): Path<Uuid>,
) -> Response {
	let peer = UserId::new(peer);
	match state.messages.mark_thread_read(&actor.user.id, &peer).await {
		Ok(_) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => db_error(error),
	}
}
