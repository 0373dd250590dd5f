// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Per-resource policy rules.
//!
//! One module per resource kind; each exposes `list_scope` (the visibility
//! predicate for listings) and `evaluate` (instance-level actions). The
//! engine dispatches here.

pub mod announcement;
pub mod camera;
pub mod due;
pub mod message;
pub mod parcel;
pub mod request;
pub mod visitor;

use super::types::{Decision, DenyReason, ResourceAttrs};

/// Collapse a listing scope into a single-instance verdict.
///
/// An instance is allowed exactly when the actor's listing scope would
/// have included it, so read/mark-read checks can never drift from list
/// visibility.
pub(super) fn instance_from_scope(scope: Decision, resource: &ResourceAttrs) -> Decision {
	match scope {
		Decision::AllowAll => Decision::AllowInstance,
		Decision::AllowScoped(predicate) => {
			if predicate.matches(resource) {
				Decision::AllowInstance
			} else {
				Decision::Deny(DenyReason::OutOfScope)
			}
		}
		other => other,
	}
}
