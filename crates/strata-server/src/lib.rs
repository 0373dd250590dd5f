// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Strata residential-complex management server.
//!
//! This crate wires the HTTP surface: shared state, the bearer-token
//! extractor, policy-to-HTTP translation, per-resource route modules,
//! and the unread-notification aggregation.

pub mod api;
pub mod api_response;
pub mod auth_middleware;
pub mod bootstrap;
pub mod gate;
pub mod notify;
pub mod routes;
pub mod unread;

pub use api::{create_app_state, create_router, AppState};
pub use auth_middleware::RequireActor;
pub use notify::{PushChannel, PushEvent, TracingPushChannel};
