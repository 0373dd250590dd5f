// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Direct message access rules.
//!
//! Messaging is open between any two accounts; visibility is strictly
//! participant-based and only the receiver marks a message read.
//! Messages are immutable once sent.

use super::instance_from_scope;
use crate::policy::types::{Action, ActorAttrs, Decision, DenyReason, ResourceAttrs, ScopePredicate};

/// The visibility predicate for message listings.
pub fn list_scope(actor: &ActorAttrs) -> Decision {
	Decision::AllowScoped(ScopePredicate::ParticipantOf(actor.user_id))
}

/// Instance-level message actions.
pub fn evaluate(actor: &ActorAttrs, action: Action, resource: &ResourceAttrs) -> Decision {
	match action {
		Action::List => list_scope(actor),
		Action::Read => instance_from_scope(list_scope(actor), resource),
		// The service stamps the sender; any authenticated role may send.
		Action::Create => Decision::AllowInstance,
		Action::MarkRead => {
			if resource.scope_target == Some(actor.user_id) {
				Decision::AllowInstance
			} else {
				Decision::Deny(DenyReason::NotTarget)
			}
		}
		Action::Update | Action::Delete | Action::Respond | Action::ChangeStatus => {
			Decision::Deny(DenyReason::UnsupportedAction)
		}
	}
}
