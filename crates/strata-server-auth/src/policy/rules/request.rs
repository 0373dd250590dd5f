// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Resident request access rules.
//!
//! Requests flow from residents to either the site admin or a specific
//! caretaker. A caretaker target must service the requester's home block
//! at creation time. Admin-targeted requests carry no target actor;
//! "untargeted" is how they are addressed to whoever holds the admin role.

use super::instance_from_scope;
use crate::policy::types::{Action, ActorAttrs, Decision, DenyReason, ResourceAttrs, ScopePredicate};
use crate::types::Role;

/// The visibility predicate for request listings.
pub fn list_scope(actor: &ActorAttrs) -> Decision {
	match actor.role {
		Role::Resident => Decision::AllowScoped(ScopePredicate::OwnedBy(actor.user_id)),
		Role::Caretaker => Decision::AllowScoped(ScopePredicate::TargetedAt(actor.user_id)),
		Role::Admin => Decision::AllowScoped(ScopePredicate::Untargeted),
		Role::Security => Decision::Deny(DenyReason::UnsupportedRole),
	}
}

/// Instance-level request actions.
pub fn evaluate(actor: &ActorAttrs, action: Action, resource: &ResourceAttrs) -> Decision {
	match action {
		Action::List => list_scope(actor),
		Action::Read | Action::MarkRead => instance_from_scope(list_scope(actor), resource),
		Action::Create => create(actor, resource),
		Action::Respond | Action::ChangeStatus => respond(actor, resource),
		Action::Delete => delete(actor, resource),
		Action::Update => Decision::Deny(DenyReason::UnsupportedAction),
	}
}

fn create(actor: &ActorAttrs, resource: &ResourceAttrs) -> Decision {
	if actor.role != Role::Resident {
		return Decision::Deny(DenyReason::UnsupportedRole);
	}
	match &resource.scope_target {
		// Admin-targeted: any resident may file one.
		None => Decision::AllowInstance,
		// Caretaker-targeted: the caretaker must service the home block.
		Some(_) => {
			let Some(home) = &actor.home_block else {
				return Decision::Deny(DenyReason::MissingHomeBlock);
			};
			let serves_home = resource
				.target_blocks
				.as_ref()
				.is_some_and(|blocks| blocks.contains(home));
			if serves_home {
				Decision::AllowInstance
			} else {
				Decision::Deny(DenyReason::CaretakerNotServingBlock)
			}
		}
	}
}

fn respond(actor: &ActorAttrs, resource: &ResourceAttrs) -> Decision {
	match actor.role {
		Role::Caretaker => {
			if resource.scope_target == Some(actor.user_id) {
				Decision::AllowInstance
			} else {
				Decision::Deny(DenyReason::NotTarget)
			}
		}
		Role::Admin => {
			if resource.scope_target.is_none() {
				Decision::AllowInstance
			} else {
				Decision::Deny(DenyReason::NotTarget)
			}
		}
		_ => Decision::Deny(DenyReason::UnsupportedRole),
	}
}

fn delete(actor: &ActorAttrs, resource: &ResourceAttrs) -> Decision {
	match actor.role {
		Role::Resident => {
			if resource.owner_id == Some(actor.user_id) {
				Decision::AllowInstance
			} else {
				Decision::Deny(DenyReason::NotOwner)
			}
		}
		_ => Decision::Deny(DenyReason::UnsupportedRole),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{BlockId, UserId};

	fn block(label: &str) -> BlockId {
		BlockId::parse(label).unwrap()
	}

	fn resident(home: &str) -> ActorAttrs {
		ActorAttrs::new(UserId::generate(), Role::Resident).with_home_block(block(home))
	}

	fn caretaker() -> ActorAttrs {
		ActorAttrs::new(UserId::generate(), Role::Caretaker)
	}

	#[test]
	fn resident_lists_own_requests() {
		let actor = resident("A");
		let Decision::AllowScoped(pred) = list_scope(&actor) else {
			panic!("expected scoped decision");
		};
		assert!(pred.matches(&ResourceAttrs::request(actor.user_id, None)));
		assert!(!pred.matches(&ResourceAttrs::request(UserId::generate(), None)));
	}

	#[test]
	fn caretaker_lists_requests_targeting_them() {
		let actor = caretaker();
		let Decision::AllowScoped(pred) = list_scope(&actor) else {
			panic!("expected scoped decision");
		};
		assert!(pred.matches(&ResourceAttrs::request(
			UserId::generate(),
			Some(actor.user_id)
		)));
		assert!(!pred.matches(&ResourceAttrs::request(
			UserId::generate(),
			Some(UserId::generate())
		)));
		// Admin-targeted requests are invisible to caretakers.
		assert!(!pred.matches(&ResourceAttrs::request(UserId::generate(), None)));
	}

	#[test]
	fn admin_lists_only_admin_targeted_requests() {
		let actor = ActorAttrs::new(UserId::generate(), Role::Admin);
		let Decision::AllowScoped(pred) = list_scope(&actor) else {
			panic!("expected scoped decision");
		};
		assert!(pred.matches(&ResourceAttrs::request(UserId::generate(), None)));
		assert!(!pred.matches(&ResourceAttrs::request(
			UserId::generate(),
			Some(UserId::generate())
		)));
	}

	#[test]
	fn resident_creates_admin_targeted_request() {
		let actor = resident("A");
		let res = ResourceAttrs::request(actor.user_id, None);
		assert_eq!(evaluate(&actor, Action::Create, &res), Decision::AllowInstance);
	}

	#[test]
	fn caretaker_target_must_serve_home_block() {
		let actor = resident("A");
		let target = UserId::generate();

		let serving = ResourceAttrs::request(actor.user_id, Some(target))
			.with_target_blocks([block("A"), block("B")].into());
		assert_eq!(
			evaluate(&actor, Action::Create, &serving),
			Decision::AllowInstance
		);

		let elsewhere = ResourceAttrs::request(actor.user_id, Some(target))
			.with_target_blocks([block("B")].into());
		assert_eq!(
			evaluate(&actor, Action::Create, &elsewhere),
			Decision::Deny(DenyReason::CaretakerNotServingBlock)
		);
	}

	#[test]
	fn create_without_home_block_is_denied() {
		let actor = ActorAttrs::new(UserId::generate(), Role::Resident);
		let res = ResourceAttrs::request(actor.user_id, Some(UserId::generate()))
			.with_target_blocks([block("A")].into());
		assert_eq!(
			evaluate(&actor, Action::Create, &res),
			Decision::Deny(DenyReason::MissingHomeBlock)
		);
	}

	#[test]
	fn only_residents_create_requests() {
		let actor = caretaker();
		let res = ResourceAttrs::request(actor.user_id, None);
		assert_eq!(
			evaluate(&actor, Action::Create, &res),
			Decision::Deny(DenyReason::UnsupportedRole)
		);
	}

	#[test]
	fn only_the_targeted_caretaker_responds() {
		let actor = caretaker();
		let mine = ResourceAttrs::request(UserId::generate(), Some(actor.user_id));
		assert_eq!(
			evaluate(&actor, Action::Respond, &mine),
			Decision::AllowInstance
		);

		let someone_elses = ResourceAttrs::request(UserId::generate(), Some(UserId::generate()));
		assert_eq!(
			evaluate(&actor, Action::Respond, &someone_elses),
			Decision::Deny(DenyReason::NotTarget)
		);
	}

	#[test]
	fn admin_responds_only_to_admin_targeted() {
		let actor = ActorAttrs::new(UserId::generate(), Role::Admin);
		let admin_targeted = ResourceAttrs::request(UserId::generate(), None);
		assert_eq!(
			evaluate(&actor, Action::Respond, &admin_targeted),
			Decision::AllowInstance
		);

		let caretaker_targeted =
			ResourceAttrs::request(UserId::generate(), Some(UserId::generate()));
		assert_eq!(
			evaluate(&actor, Action::Respond, &caretaker_targeted),
			Decision::Deny(DenyReason::NotTarget)
		);
	}

	#[test]
	fn status_change_follows_respond_rules() {
		let actor = caretaker();
		let mine = ResourceAttrs::request(UserId::generate(), Some(actor.user_id));
		assert_eq!(
			evaluate(&actor, Action::ChangeStatus, &mine),
			Decision::AllowInstance
		);
	}

	#[test]
	fn only_the_owner_deletes() {
		let actor = resident("A");
		let own = ResourceAttrs::request(actor.user_id, None);
		assert_eq!(evaluate(&actor, Action::Delete, &own), Decision::AllowInstance);

		let foreign = ResourceAttrs::request(UserId::generate(), None);
		assert_eq!(
			evaluate(&actor, Action::Delete, &foreign),
			Decision::Deny(DenyReason::NotOwner)
		);
	}
}
