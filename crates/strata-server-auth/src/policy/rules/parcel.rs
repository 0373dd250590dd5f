// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Parcel access rules.
//!
//! Security owns the parcel desk: they register, re-status, and delete
//! parcels. Caretakers handle parcels addressed to their assigned blocks.
//! Residents see parcels matched to them and may attach a note until the
//! parcel is delivered; they never change status.

use super::instance_from_scope;
use crate::policy::types::{Action, ActorAttrs, Decision, DenyReason, ResourceAttrs, ScopePredicate};
use crate::types::Role;

/// The visibility predicate for parcel listings.
pub fn list_scope(actor: &ActorAttrs) -> Decision {
	match actor.role {
		Role::Security => Decision::AllowAll,
		Role::Caretaker => Decision::AllowScoped(ScopePredicate::in_blocks(
			actor.assigned_blocks.clone(),
			false,
		)),
		Role::Resident => Decision::AllowScoped(ScopePredicate::TargetedAt(actor.user_id)),
		Role::Admin => Decision::Deny(DenyReason::UnsupportedRole),
	}
}

/// Instance-level parcel actions.
pub fn evaluate(actor: &ActorAttrs, action: Action, resource: &ResourceAttrs) -> Decision {
	match action {
		Action::List => list_scope(actor),
		Action::Read => instance_from_scope(list_scope(actor), resource),
		Action::Create => match actor.role {
			Role::Security => Decision::AllowInstance,
			_ => Decision::Deny(DenyReason::UnsupportedRole),
		},
		Action::ChangeStatus => change_status(actor, resource),
		Action::Update => update(actor, resource),
		Action::Delete => match actor.role {
			Role::Security => Decision::AllowInstance,
			_ => Decision::Deny(DenyReason::UnsupportedRole),
		},
		Action::Respond | Action::MarkRead => Decision::Deny(DenyReason::UnsupportedAction),
	}
}

fn change_status(actor: &ActorAttrs, resource: &ResourceAttrs) -> Decision {
	match actor.role {
		Role::Security => Decision::AllowInstance,
		Role::Caretaker => match &resource.scope_block {
			None => Decision::Deny(DenyReason::MissingScopeBlock),
			Some(block) if actor.is_assigned(block) => Decision::AllowInstance,
			Some(_) => Decision::Deny(DenyReason::OutsideAssignedBlocks),
		},
		_ => Decision::Deny(DenyReason::UnsupportedRole),
	}
}

/// Update covers parcel edits: note-attachment for residents, field
/// corrections for security, status-adjacent edits for caretakers.
fn update(actor: &ActorAttrs, resource: &ResourceAttrs) -> Decision {
	match actor.role {
		Role::Security => Decision::AllowInstance,
		Role::Caretaker => change_status(actor, resource),
		Role::Resident => {
			if resource.scope_target != Some(actor.user_id) {
				return Decision::Deny(DenyReason::NotTarget);
			}
			if resource.is_delivered {
				return Decision::Deny(DenyReason::ParcelDelivered);
			}
			Decision::AllowInstance
		}
		Role::Admin => Decision::Deny(DenyReason::UnsupportedRole),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{BlockId, UserId};

	fn block(label: &str) -> BlockId {
		BlockId::parse(label).unwrap()
	}

	fn security() -> ActorAttrs {
		ActorAttrs::new(UserId::generate(), Role::Security)
	}

	fn caretaker(blocks: &[&str]) -> ActorAttrs {
		ActorAttrs::new(UserId::generate(), Role::Caretaker)
			.with_assigned_blocks(blocks.iter().map(|b| block(b)).collect())
	}

	#[test]
	fn security_sees_and_manages_everything() {
		let actor = security();
		assert_eq!(list_scope(&actor), Decision::AllowAll);
		let res = ResourceAttrs::parcel(Some(block("H")), None);
		assert_eq!(evaluate(&actor, Action::Create, &res), Decision::AllowInstance);
		assert_eq!(
			evaluate(&actor, Action::ChangeStatus, &res),
			Decision::AllowInstance
		);
		assert_eq!(evaluate(&actor, Action::Delete, &res), Decision::AllowInstance);
	}

	#[test]
	fn caretaker_scope_excludes_unaddressed_parcels() {
		let actor = caretaker(&["H"]);
		let Decision::AllowScoped(pred) = list_scope(&actor) else {
			panic!("expected scoped decision");
		};
		assert!(pred.matches(&ResourceAttrs::parcel(Some(block("H")), None)));
		assert!(!pred.matches(&ResourceAttrs::parcel(Some(block("I")), None)));
		assert!(!pred.matches(&ResourceAttrs::parcel(None, None)));
	}

	#[test]
	fn caretaker_changes_status_only_in_assigned_blocks() {
		let actor = caretaker(&["H"]);
		let in_block = ResourceAttrs::parcel(Some(block("H")), None);
		assert_eq!(
			evaluate(&actor, Action::ChangeStatus, &in_block),
			Decision::AllowInstance
		);

		let elsewhere = ResourceAttrs::parcel(Some(block("I")), None);
		assert_eq!(
			evaluate(&actor, Action::ChangeStatus, &elsewhere),
			Decision::Deny(DenyReason::OutsideAssignedBlocks)
		);
	}

	#[test]
	fn admin_has_no_parcel_surface() {
		let actor = ActorAttrs::new(UserId::generate(), Role::Admin);
		assert_eq!(
			list_scope(&actor),
			Decision::Deny(DenyReason::UnsupportedRole)
		);
	}

	#[test]
	fn resident_notes_own_parcel_until_delivered() {
		let actor = ActorAttrs::new(UserId::generate(), Role::Resident);
		let own = ResourceAttrs::parcel(Some(block("H")), Some(actor.user_id));
		assert_eq!(evaluate(&actor, Action::Update, &own), Decision::AllowInstance);

		let delivered = own.clone().delivered(true);
		assert_eq!(
			evaluate(&actor, Action::Update, &delivered),
			Decision::Deny(DenyReason::ParcelDelivered)
		);

		let someone_elses = ResourceAttrs::parcel(Some(block("H")), Some(UserId::generate()));
		assert_eq!(
			evaluate(&actor, Action::Update, &someone_elses),
			Decision::Deny(DenyReason::NotTarget)
		);
	}

	#[test]
	fn resident_never_changes_status() {
		let actor = ActorAttrs::new(UserId::generate(), Role::Resident);
		let own = ResourceAttrs::parcel(Some(block("H")), Some(actor.user_id));
		assert_eq!(
			evaluate(&actor, Action::ChangeStatus, &own),
			Decision::Deny(DenyReason::UnsupportedRole)
		);
	}

	#[test]
	fn only_security_creates_and_deletes() {
		let actor = caretaker(&["H"]);
		let res = ResourceAttrs::parcel(Some(block("H")), None);
		assert_eq!(
			evaluate(&actor, Action::Create, &res),
			Decision::Deny(DenyReason::UnsupportedRole)
		);
		assert_eq!(
			evaluate(&actor, Action::Delete, &res),
			Decision::Deny(DenyReason::UnsupportedRole)
		);
	}
}
