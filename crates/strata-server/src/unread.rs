// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Unread-notification aggregation and read tracking.
//!
//! The feed reuses the policy engine's List predicates verbatim: what an
//! actor cannot list can never appear in their notifications, and the
//! counts can never drift from the listings. Mark-seen batches apply
//! atomically; a failure anywhere fails the whole batch.

use axum::response::Response;
use chrono::{Duration, Utc};
use strata_server_api::notifications::{SeenItemRequest, UnreadItemResponse, UnreadResponse};
use strata_server_auth::{
	evaluate, Action, ActorAttrs, AnnouncementId, Decision, MessageId, RequestId, ResourceKind,
	Role, ScopePredicate, VisitorId,
};
use strata_server_db::SeenItem;

use crate::api::AppState;
use crate::api_response::{bad_request, db_error, not_found};
use crate::gate::allow_or_not_found;

/// Only items this recent appear in the feed.
pub const UNREAD_WINDOW_DAYS: i64 = 14;

/// The feed reports at most this many items, newest first.
pub const UNREAD_CAP: usize = 20;

/// The actor's listing scope for a kind: `Err` when the role has no
/// surface at all, `Ok(None)` for unrestricted, `Ok(Some)` for scoped.
fn feed_scope(attrs: &ActorAttrs, kind: ResourceKind) -> Result<Option<ScopePredicate>, ()> {
	match evaluate(attrs, Action::List, kind, None) {
		Decision::AllowAll => Ok(None),
		Decision::AllowScoped(predicate) => Ok(Some(predicate)),
		_ => Err(()),
	}
}

/// Compute the unread feed for an actor.
#[tracing::instrument(skip(state, attrs), fields(user_id = %attrs.user_id))]
pub async fn unread_feed(state: &AppState, attrs: &ActorAttrs) -> Result<UnreadResponse, Response> {
	let since = Utc::now() - Duration::days(UNREAD_WINDOW_DAYS);
	let mut items: Vec<UnreadItemResponse> = Vec::new();

	if let Ok(scope) = feed_scope(attrs, ResourceKind::Announcement) {
		let announcements = state
			.announcements
			.list_unread_since(&attrs.user_id, since, scope.as_ref())
			.await
			.map_err(db_error)?;
		items.extend(announcements.into_iter().map(|a| UnreadItemResponse {
			kind: "announcement".to_string(),
			id: a.id.into_inner(),
			title: a.title.clone(),
			content: format!("New announcement: {}", a.title),
			created_at: a.created_at,
		}));
	}

	if let Ok(scope) = feed_scope(attrs, ResourceKind::Request) {
		let requests = state
			.requests
			.list_unread_since(&attrs.user_id, since, scope.as_ref())
			.await
			.map_err(db_error)?;
		items.extend(requests.into_iter().map(|(r, requester_name)| {
			let content = if r.requester_id == attrs.user_id {
				"Your request was filed.".to_string()
			} else {
				format!("New request from {requester_name}.")
			};
			UnreadItemResponse {
				kind: "request".to_string(),
				id: r.id.into_inner(),
				title: r.title,
				content,
				created_at: r.created_at,
			}
		}));
	}

	if let Ok(scope) = feed_scope(attrs, ResourceKind::Visitor) {
		let visitors = state
			.visitors
			.list_unread_since(&attrs.user_id, since, scope.as_ref())
			.await
			.map_err(db_error)?;
		items.extend(visitors.into_iter().map(|v| {
			let content = match &v.vehicle_plate {
				Some(plate) if v.has_vehicle => {
					format!("New guest notice: {} (vehicle {plate})", v.name)
				}
				_ => format!("New guest notice: {}", v.name),
			};
			UnreadItemResponse {
				kind: "visitor".to_string(),
				id: v.id.into_inner(),
				title: "Guest notice".to_string(),
				content,
				created_at: v.created_at,
			}
		}));
	}

	// Parcel notes feed the caretakers servicing the parcel's block.
	// No read marker exists for notes yet, matching the predecessor.
	if attrs.role == Role::Caretaker {
		if let Ok(Some(scope)) = feed_scope(attrs, ResourceKind::Parcel) {
			let notes = state
				.parcels
				.list_notes_since(since, &scope)
				.await
				.map_err(db_error)?;
			items.extend(notes.into_iter().map(|(note, author_name)| UnreadItemResponse {
				kind: "parcel_note".to_string(),
				id: note.id,
				title: "Parcel note".to_string(),
				content: format!("{author_name} left a parcel note."),
				created_at: note.created_at,
			}));
		}
	}

	let messages = state
		.messages
		.list_unread_since(&attrs.user_id, since)
		.await
		.map_err(db_error)?;
	items.extend(messages.into_iter().map(|(m, sender_name)| UnreadItemResponse {
		kind: "message".to_string(),
		id: m.id.into_inner(),
		title: "New message".to_string(),
		content: format!("New message from {sender_name}."),
		created_at: m.created_at,
	}));

	items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
	items.truncate(UNREAD_CAP);

	Ok(UnreadResponse {
		count: items.len(),
		items,
	})
}

/// Apply a mark-seen batch: every item is policy-checked, then the whole
/// batch commits in one transaction.
#[tracing::instrument(skip(state, attrs, items), fields(user_id = %attrs.user_id, items = items.len()))]
pub async fn mark_seen(
	state: &AppState,
	attrs: &ActorAttrs,
	items: &[SeenItemRequest],
) -> Result<(), Response> {
	if items.is_empty() {
		return Err(bad_request("empty_batch", "No items to mark"));
	}

	let mut batch = Vec::with_capacity(items.len());
	for item in items {
		let kind = match ResourceKind::parse(&item.kind) {
			Some(
				kind @ (ResourceKind::Announcement
				| ResourceKind::Request
				| ResourceKind::Visitor
				| ResourceKind::Message),
			) => kind,
			_ => return Err(bad_request("invalid_kind", "Unknown notification kind")),
		};

		// The descriptor of the referenced row, fetched so the policy
		// check runs against real scope data.
		let descriptor = match kind {
			ResourceKind::Announcement => state
				.announcements
				.get(&AnnouncementId::new(item.id))
				.await
				.map_err(db_error)?
				.map(|a| a.resource_attrs()),
			ResourceKind::Request => state
				.requests
				.get(&RequestId::new(item.id))
				.await
				.map_err(db_error)?
				.map(|r| r.resource_attrs()),
			ResourceKind::Visitor => state
				.visitors
				.get(&VisitorId::new(item.id))
				.await
				.map_err(db_error)?
				.map(|v| v.resource_attrs()),
			ResourceKind::Message => state
				.messages
				.get(&MessageId::new(item.id))
				.await
				.map_err(db_error)?
				.map(|m| m.resource_attrs()),
			_ => None,
		};
		let Some(descriptor) = descriptor else {
			return Err(not_found());
		};

		allow_or_not_found(evaluate(attrs, Action::MarkRead, kind, Some(&descriptor)))?;
		batch.push(SeenItem { kind, id: item.id });
	}

	state
		.read_markers
		.mark_seen_batch(&attrs.user_id, &batch)
		.await
		.map_err(db_error)
}
