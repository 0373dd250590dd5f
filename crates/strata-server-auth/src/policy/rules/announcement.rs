// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Announcement access rules.
//!
//! - Admin: full access; admin announcements are always site-wide.
//! - Caretaker: sees site-wide announcements plus those in assigned
//!   blocks; publishes only into assigned blocks; updates own block
//!   announcements (scope block stays fixed); deletes announcements in
//!   assigned blocks.
//! - Resident: sees site-wide announcements plus those for their home
//!   block; read-only.
//! - Security: no announcement surface.

use super::instance_from_scope;
use crate::policy::types::{Action, ActorAttrs, Decision, DenyReason, ResourceAttrs, ScopePredicate};
use crate::types::Role;

/// The visibility predicate for announcement listings.
pub fn list_scope(actor: &ActorAttrs) -> Decision {
	match actor.role {
		Role::Admin => Decision::AllowAll,
		Role::Caretaker => Decision::AllowScoped(ScopePredicate::in_blocks(
			actor.assigned_blocks.clone(),
			true,
		)),
		Role::Resident => match &actor.home_block {
			Some(block) => Decision::AllowScoped(ScopePredicate::in_blocks(
				[block.clone()].into(),
				true,
			)),
			// Missing scope data excludes rather than errors.
			None => Decision::AllowScoped(ScopePredicate::Nothing),
		},
		Role::Security => Decision::Deny(DenyReason::UnsupportedRole),
	}
}

/// Instance-level announcement actions.
pub fn evaluate(actor: &ActorAttrs, action: Action, resource: &ResourceAttrs) -> Decision {
	match action {
		Action::List => list_scope(actor),
		Action::Read | Action::MarkRead => instance_from_scope(list_scope(actor), resource),
		Action::Create => create(actor, resource),
		Action::Update => update(actor, resource),
		Action::Delete => delete(actor, resource),
		Action::Respond | Action::ChangeStatus => Decision::Deny(DenyReason::UnsupportedAction),
	}
}

fn create(actor: &ActorAttrs, resource: &ResourceAttrs) -> Decision {
	match actor.role {
		// The service forces admin announcements site-wide.
		Role::Admin => Decision::AllowInstance,
		Role::Caretaker => match &resource.scope_block {
			None => Decision::Deny(DenyReason::MissingScopeBlock),
			Some(block) if actor.is_assigned(block) => Decision::AllowInstance,
			Some(_) => Decision::Deny(DenyReason::OutsideAssignedBlocks),
		},
		_ => Decision::Deny(DenyReason::UnsupportedRole),
	}
}

fn update(actor: &ActorAttrs, resource: &ResourceAttrs) -> Decision {
	match actor.role {
		Role::Admin => Decision::AllowInstance,
		Role::Caretaker => {
			if resource.scope_block.is_none() {
				// Site-wide announcements belong to the admin.
				return Decision::Deny(DenyReason::MissingScopeBlock);
			}
			if resource.owner_id != Some(actor.user_id) {
				return Decision::Deny(DenyReason::NotOwner);
			}
			Decision::AllowInstance
		}
		_ => Decision::Deny(DenyReason::UnsupportedRole),
	}
}

fn delete(actor: &ActorAttrs, resource: &ResourceAttrs) -> Decision {
	match actor.role {
		Role::Admin => Decision::AllowInstance,
		Role::Caretaker => match &resource.scope_block {
			None => Decision::Deny(DenyReason::MissingScopeBlock),
			Some(block) if actor.is_assigned(block) => Decision::AllowInstance,
			Some(_) => Decision::Deny(DenyReason::OutsideAssignedBlocks),
		},
		_ => Decision::Deny(DenyReason::UnsupportedRole),
	}
}
