// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared application state and router construction.

use axum::{routing::get, Router};
use sqlx::SqlitePool;
use std::sync::Arc;
use strata_server_db::{
	AnnouncementRepository, AssignmentRepository, CameraRepository, DueRepository,
	MessageRepository, ParcelRepository, ReadMarkerRepository, RequestRepository,
	SessionRepository, UserRepository, VisitorRepository,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::notify::{PushChannel, TracingPushChannel};
use crate::routes;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub users: Arc<UserRepository>,
	pub sessions: Arc<SessionRepository>,
	pub assignments: Arc<AssignmentRepository>,
	pub announcements: Arc<AnnouncementRepository>,
	pub requests: Arc<RequestRepository>,
	pub parcels: Arc<ParcelRepository>,
	pub visitors: Arc<VisitorRepository>,
	pub dues: Arc<DueRepository>,
	pub cameras: Arc<CameraRepository>,
	pub messages: Arc<MessageRepository>,
	pub read_markers: Arc<ReadMarkerRepository>,
	pub push: Arc<dyn PushChannel>,
}

/// Build the application state over a pool, with the default push channel.
pub fn create_app_state(pool: SqlitePool) -> AppState {
	create_app_state_with_push(pool, Arc::new(TracingPushChannel))
}

/// Build the application state with an explicit push channel.
pub fn create_app_state_with_push(pool: SqlitePool, push: Arc<dyn PushChannel>) -> AppState {
	AppState {
		users: Arc::new(UserRepository::new(pool.clone())),
		sessions: Arc::new(SessionRepository::new(pool.clone())),
		assignments: Arc::new(AssignmentRepository::new(pool.clone())),
		announcements: Arc::new(AnnouncementRepository::new(pool.clone())),
		requests: Arc::new(RequestRepository::new(pool.clone())),
		parcels: Arc::new(ParcelRepository::new(pool.clone())),
		visitors: Arc::new(VisitorRepository::new(pool.clone())),
		dues: Arc::new(DueRepository::new(pool.clone())),
		cameras: Arc::new(CameraRepository::new(pool.clone())),
		messages: Arc::new(MessageRepository::new(pool.clone())),
		read_markers: Arc::new(ReadMarkerRepository::new(pool.clone())),
		push,
		pool,
	}
}

/// Build the complete router.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health))
		.nest("/api/v1", api_routes())
		.with_state(state)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

fn api_routes() -> Router<AppState> {
	Router::new()
		.merge(routes::announcements::router())
		.merge(routes::requests::router())
		.merge(routes::parcels::router())
		.merge(routes::visitors::router())
		.merge(routes::dues::router())
		.merge(routes::cameras::router())
		.merge(routes::messages::router())
		.merge(routes::notifications::router())
		.merge(routes::assignments::router())
		.merge(routes::users::router())
}
