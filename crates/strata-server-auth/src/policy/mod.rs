// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The access policy engine.
//!
//! Every resource service consults [`evaluate`] before returning or
//! mutating data. The same rules drive list filtering (as push-down
//! [`ScopePredicate`]s), single-instance checks, and the unread
//! notification aggregation, so visibility can never diverge between
//! surfaces.
//!
//! The predecessor system re-derived these rules inside every controller;
//! this module is the single place they live now.

pub mod engine;
pub mod rules;
pub mod types;

pub use engine::evaluate;
pub use types::{
	Action, ActorAttrs, Decision, DenyReason, ResourceAttrs, ResourceKind, ScopePredicate,
};
