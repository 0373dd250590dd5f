// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! End-to-end visibility scenarios: the policy engine's predicates pushed
//! down through the repositories against real SQLite.

use chrono::Utc;
use strata_server_auth::{
	evaluate, Action, ActorAttrs, BlockId, Decision, RequestId, ResourceAttrs, ResourceKind,
	Role, User,
};
use strata_server_db::testing::{create_test_pool, seed_caretaker, seed_resident, seed_user};
use strata_server_db::{
	AssignmentRepository, ParcelRepository, Request, RequestRepository, RequestStatus,
};

fn block(label: &str) -> BlockId {
	BlockId::parse(label).unwrap()
}

async fn attrs_for(assignments: &AssignmentRepository, user: &User) -> ActorAttrs {
	let mut attrs = ActorAttrs::new(user.id, user.role);
	if let Some(home) = &user.home_block {
		attrs = attrs.with_home_block(home.clone());
	}
	if user.role == Role::Caretaker {
		attrs = attrs.with_assigned_blocks(assignments.blocks_for(&user.id).await.unwrap());
	}
	attrs
}

fn list_scope(attrs: &ActorAttrs, kind: ResourceKind) -> Option<strata_server_auth::ScopePredicate> {
	match evaluate(attrs, Action::List, kind, None) {
		Decision::AllowAll => None,
		Decision::AllowScoped(predicate) => Some(predicate),
		other => panic!("expected a listing scope, got {other:?}"),
	}
}

// Resident R1 (block A, unit 5) files a request targeting caretaker C1,
// who services block A. C1 sees it; C2 (block B) and the admin do not;
// neither does another resident of block A.
#[tokio::test]
async fn request_round_trip_visibility() {
	let pool = create_test_pool().await;
	let assignments = AssignmentRepository::new(pool.clone());
	let requests = RequestRepository::new(pool.clone());

	let r1 = seed_resident(&pool, "A", "5").await;
	let r2 = seed_resident(&pool, "A", "6").await;
	let c1 = seed_caretaker(&pool).await;
	let c2 = seed_caretaker(&pool).await;
	let admin = seed_user(&pool, Role::Admin, None, None).await;

	assignments.assign(&c1.id, &block("A")).await.unwrap();
	assignments.assign(&c2.id, &block("B")).await.unwrap();

	// Creation passes the policy gate with the target's blocks pre-loaded.
	let r1_attrs = attrs_for(&assignments, &r1).await;
	let descriptor = ResourceAttrs::request(r1.id, Some(c1.id))
		.with_target_blocks(assignments.blocks_for(&c1.id).await.unwrap());
	assert_eq!(
		evaluate(&r1_attrs, Action::Create, ResourceKind::Request, Some(&descriptor)),
		Decision::AllowInstance
	);

	let now = Utc::now();
	let request = Request {
		id: RequestId::generate(),
		title: "Broken stair light".to_string(),
		content: "Third floor landing.".to_string(),
		requester_id: r1.id,
		target_caretaker_id: Some(c1.id),
		status: RequestStatus::Pending,
		response: None,
		responded_at: None,
		created_at: now,
		updated_at: now,
	};
	requests.create(&request).await.unwrap();

	let visible_to = |listed: Vec<Request>| listed.iter().any(|r| r.id == request.id);

	let scope = list_scope(&r1_attrs, ResourceKind::Request);
	assert!(visible_to(requests.list(scope.as_ref()).await.unwrap()));

	let c1_attrs = attrs_for(&assignments, &c1).await;
	let scope = list_scope(&c1_attrs, ResourceKind::Request);
	assert!(visible_to(requests.list(scope.as_ref()).await.unwrap()));

	let c2_attrs = attrs_for(&assignments, &c2).await;
	let scope = list_scope(&c2_attrs, ResourceKind::Request);
	assert!(!visible_to(requests.list(scope.as_ref()).await.unwrap()));

	let admin_attrs = attrs_for(&assignments, &admin).await;
	let scope = list_scope(&admin_attrs, ResourceKind::Request);
	assert!(!visible_to(requests.list(scope.as_ref()).await.unwrap()));

	let r2_attrs = attrs_for(&assignments, &r2).await;
	let scope = list_scope(&r2_attrs, ResourceKind::Request);
	assert!(!visible_to(requests.list(scope.as_ref()).await.unwrap()));
}

// An unassigned caretaker must not be a valid request target for a
// resident of block A.
#[tokio::test]
async fn request_creation_rejects_non_serving_caretaker() {
	let pool = create_test_pool().await;
	let assignments = AssignmentRepository::new(pool.clone());

	let r1 = seed_resident(&pool, "A", "5").await;
	let c2 = seed_caretaker(&pool).await;
	assignments.assign(&c2.id, &block("B")).await.unwrap();

	let r1_attrs = attrs_for(&assignments, &r1).await;
	let descriptor = ResourceAttrs::request(r1.id, Some(c2.id))
		.with_target_blocks(assignments.blocks_for(&c2.id).await.unwrap());
	assert!(!evaluate(&r1_attrs, Action::Create, ResourceKind::Request, Some(&descriptor))
		.is_allowed());
}

// Parcel for block H, unmatched: the block-H caretaker may re-status it,
// the block-I caretaker may not. After matching to R3, the resident may
// note the parcel until it is delivered.
#[tokio::test]
async fn parcel_block_scope_and_delivery_close_notes() {
	let pool = create_test_pool().await;
	let assignments = AssignmentRepository::new(pool.clone());
	let parcels = ParcelRepository::new(pool.clone());

	let ch = seed_caretaker(&pool).await;
	let ci = seed_caretaker(&pool).await;
	let r3 = seed_resident(&pool, "H", "5").await;
	assignments.assign(&ch.id, &block("H")).await.unwrap();
	assignments.assign(&ci.id, &block("I")).await.unwrap();

	let now = Utc::now();
	let parcel = strata_server_db::Parcel {
		id: strata_server_auth::ParcelId::generate(),
		recipient_name: r3.name.clone(),
		phone: "555-0100".to_string(),
		company: "FastShip".to_string(),
		tracking_number: "FS42".to_string(),
		status: strata_server_db::ParcelStatus::Pending,
		block: Some(block("H")),
		unit: Some("5".to_string()),
		resident_id: None,
		delivered_at: None,
		created_at: now,
		updated_at: now,
	};
	parcels.create(&parcel).await.unwrap();

	let ch_attrs = attrs_for(&assignments, &ch).await;
	let ci_attrs = attrs_for(&assignments, &ci).await;
	let stored = parcels.get(&parcel.id).await.unwrap().unwrap();

	assert!(evaluate(
		&ch_attrs,
		Action::ChangeStatus,
		ResourceKind::Parcel,
		Some(&stored.resource_attrs())
	)
	.is_allowed());
	assert!(!evaluate(
		&ci_attrs,
		Action::ChangeStatus,
		ResourceKind::Parcel,
		Some(&stored.resource_attrs())
	)
	.is_allowed());

	// The block-H caretaker's listing contains it; block-I's does not.
	let scope = list_scope(&ch_attrs, ResourceKind::Parcel).unwrap();
	assert_eq!(parcels.list(Some(&scope)).await.unwrap().len(), 1);
	let scope = list_scope(&ci_attrs, ResourceKind::Parcel).unwrap();
	assert!(parcels.list(Some(&scope)).await.unwrap().is_empty());

	// Match the resident, then exercise the note rule around delivery.
	parcels.set_resident(&parcel.id, &r3.id).await.unwrap();
	let r3_attrs = ActorAttrs::new(r3.id, Role::Resident).with_home_block(block("H"));

	let matched = parcels.get(&parcel.id).await.unwrap().unwrap();
	assert!(evaluate(
		&r3_attrs,
		Action::Update,
		ResourceKind::Parcel,
		Some(&matched.resource_attrs())
	)
	.is_allowed());

	parcels
		.set_status(&parcel.id, strata_server_db::ParcelStatus::Delivered)
		.await
		.unwrap();
	let delivered = parcels.get(&parcel.id).await.unwrap().unwrap();
	assert!(!evaluate(
		&r3_attrs,
		Action::Update,
		ResourceKind::Parcel,
		Some(&delivered.resource_attrs())
	)
	.is_allowed());
}

// Revoked-or-absent assignments degrade a caretaker's announcement scope
// to site-wide announcements only; listings stay well-defined.
#[tokio::test]
async fn unassigned_caretaker_sees_only_site_wide_announcements() {
	let pool = create_test_pool().await;
	let assignments = AssignmentRepository::new(pool.clone());
	let announcements = strata_server_db::AnnouncementRepository::new(pool.clone());

	let caretaker = seed_caretaker(&pool).await;
	let admin = seed_user(&pool, Role::Admin, None, None).await;

	let now = Utc::now();
	let site_wide = strata_server_db::Announcement {
		id: strata_server_auth::AnnouncementId::generate(),
		title: "Elevator maintenance".to_string(),
		content: "Sunday morning.".to_string(),
		category: "general".to_string(),
		is_important: false,
		is_urgent: false,
		author_id: admin.id,
		scope_block: None,
		created_at: now,
		updated_at: now,
	};
	let mut block_scoped = site_wide.clone();
	block_scoped.id = strata_server_auth::AnnouncementId::generate();
	block_scoped.scope_block = Some(block("C"));
	announcements.create(&site_wide).await.unwrap();
	announcements.create(&block_scoped).await.unwrap();

	let attrs = attrs_for(&assignments, &caretaker).await;
	let scope = list_scope(&attrs, ResourceKind::Announcement).unwrap();
	let listed = announcements.list(Some(&scope)).await.unwrap();
	assert_eq!(listed.len(), 1);
	assert_eq!(listed[0].id, site_wide.id);
}
