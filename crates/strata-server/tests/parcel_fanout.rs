// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Parcel registration fan-out, driven through the real handler.

use axum::extract::{Json, State};
use std::sync::{Arc, Mutex};
use strata_server::api::create_app_state_with_push;
use strata_server::notify::{PushChannel, PushEvent};
use strata_server::routes::parcels::create_parcel;
use strata_server::RequireActor;
use strata_server_api::parcels::CreateParcelRequest;
use strata_server_auth::middleware::CurrentActor;
use strata_server_auth::{BlockId, SessionId, UserId};
use strata_server_db::testing::{create_test_pool, seed_caretaker, seed_resident, seed_user};
use strata_server_db::AssignmentRepository;

#[derive(Default)]
struct RecordingPushChannel {
	events: Mutex<Vec<(UserId, PushEvent)>>,
}

impl PushChannel for RecordingPushChannel {
	fn push(&self, recipient: &UserId, event: PushEvent) {
		self.events.lock().unwrap().push((*recipient, event));
	}
}

#[tokio::test]
async fn registering_a_parcel_notifies_resident_and_block_caretakers() {
	let pool = create_test_pool().await;
	let push = Arc::new(RecordingPushChannel::default());
	let state = create_app_state_with_push(pool.clone(), push.clone());

	let security = seed_user(&pool, strata_server_auth::Role::Security, None, None).await;
	let resident = seed_resident(&pool, "H", "5").await;
	let caretaker = seed_caretaker(&pool).await;
	let other_caretaker = seed_caretaker(&pool).await;

	let assignments = AssignmentRepository::new(pool.clone());
	let block = BlockId::parse("H").unwrap();
	assignments.assign(&caretaker.id, &block).await.unwrap();
	assignments
		.assign(&other_caretaker.id, &BlockId::parse("I").unwrap())
		.await
		.unwrap();

	let actor = CurrentActor {
		user: security.clone(),
		session_id: SessionId::generate(),
	};
	let response = create_parcel(
		RequireActor(actor),
		State(state.clone()),
		Json(CreateParcelRequest {
			recipient_name: resident.name.clone(),
			phone: "555-0100".to_string(),
			company: "FastShip".to_string(),
			tracking_number: "FS99".to_string(),
			block: Some("H".to_string()),
			unit: Some("5".to_string()),
		}),
	)
	.await;
	assert_eq!(response.status(), axum::http::StatusCode::CREATED);

	// The matched resident and the block-H caretaker each got a message;
	// the block-I caretaker got nothing.
	let resident_unread = state
		.messages
		.list_unread_since(&resident.id, chrono::Utc::now() - chrono::Duration::days(1))
		.await
		.unwrap();
	assert_eq!(resident_unread.len(), 1);
	assert!(resident_unread[0].0.content.contains("FS99"));

	let caretaker_unread = state
		.messages
		.list_unread_since(&caretaker.id, chrono::Utc::now() - chrono::Duration::days(1))
		.await
		.unwrap();
	assert_eq!(caretaker_unread.len(), 1);

	let other_unread = state
		.messages
		.list_unread_since(&other_caretaker.id, chrono::Utc::now() - chrono::Duration::days(1))
		.await
		.unwrap();
	assert!(other_unread.is_empty());

	// Push events are fire-and-forget companions to the message writes.
	let events = push.events.lock().unwrap();
	assert_eq!(events.len(), 2);
	assert!(events.iter().any(|(recipient, _)| *recipient == resident.id));
	assert!(events.iter().any(|(recipient, _)| *recipient == caretaker.id));
}
