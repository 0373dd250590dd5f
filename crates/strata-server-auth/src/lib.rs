// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Identity and authorization for the Strata residential-complex server.
//!
//! This crate provides:
//! - Type-safe ID newtypes and the closed [`Role`] enum
//! - The [`User`] snapshot and bearer-credential helpers ([`middleware`])
//! - The access policy engine ([`policy`]) consulted by every resource
//!   service before reading or mutating data

pub mod middleware;
pub mod policy;
pub mod types;
pub mod user;

pub use middleware::{extract_bearer_token, hash_token, AuthError, CurrentActor};
pub use policy::{
	evaluate, Action, ActorAttrs, Decision, DenyReason, ResourceAttrs, ResourceKind,
	ScopePredicate,
};
pub use types::{
	AnnouncementId, BlockId, CameraId, DueId, MessageId, ParcelId, RequestId, Role, SessionId,
	UserId, VisitorId, VisitorKind,
};
pub use user::User;
