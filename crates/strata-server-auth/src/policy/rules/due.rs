// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Due (billing item) access rules.
//!
//! Dues are billed by the system (request completion), never created
//! through the API. Every role sees and pays only its own dues.

use super::instance_from_scope;
use crate::policy::types::{Action, ActorAttrs, Decision, DenyReason, ResourceAttrs, ScopePredicate};

/// The visibility predicate for due listings: own dues, regardless of role.
pub fn list_scope(actor: &ActorAttrs) -> Decision {
	Decision::AllowScoped(ScopePredicate::OwnedBy(actor.user_id))
}

/// Instance-level due actions.
pub fn evaluate(actor: &ActorAttrs, action: Action, resource: &ResourceAttrs) -> Decision {
	match action {
		Action::List => list_scope(actor),
		Action::Read => instance_from_scope(list_scope(actor), resource),
		// Paying marks the due settled; owners only.
		Action::ChangeStatus => {
			if resource.owner_id == Some(actor.user_id) {
				Decision::AllowInstance
			} else {
				Decision::Deny(DenyReason::NotOwner)
			}
		}
		Action::Create
		| Action::Update
		| Action::Delete
		| Action::Respond
		| Action::MarkRead => Decision::Deny(DenyReason::UnsupportedAction),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{Role, UserId};

	#[test]
	fn everyone_sees_only_own_dues() {
		for role in Role::all() {
			let actor = ActorAttrs::new(UserId::generate(), *role);
			let Decision::AllowScoped(pred) = list_scope(&actor) else {
				panic!("expected scoped decision");
			};
			assert!(pred.matches(&ResourceAttrs::due(actor.user_id)));
			assert!(!pred.matches(&ResourceAttrs::due(UserId::generate())));
		}
	}

	#[test]
	fn only_the_owner_pays() {
		let actor = ActorAttrs::new(UserId::generate(), Role::Resident);
		let own = ResourceAttrs::due(actor.user_id);
		assert_eq!(
			evaluate(&actor, Action::ChangeStatus, &own),
			Decision::AllowInstance
		);

		let foreign = ResourceAttrs::due(UserId::generate());
		assert_eq!(
			evaluate(&actor, Action::ChangeStatus, &foreign),
			Decision::Deny(DenyReason::NotOwner)
		);
	}

	#[test]
	fn dues_cannot_be_created_via_api() {
		let actor = ActorAttrs::new(UserId::generate(), Role::Admin);
		let res = ResourceAttrs::due(actor.user_id);
		assert_eq!(
			evaluate(&actor, Action::Create, &res),
			Decision::Deny(DenyReason::UnsupportedAction)
		);
		assert_eq!(
			evaluate(&actor, Action::Delete, &res),
			Decision::Deny(DenyReason::UnsupportedAction)
		);
	}
}
