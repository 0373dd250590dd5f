// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Visitor access rules.
//!
//! Two entry paths exist: residents pre-announce guests (guest notices)
//! and security logs walk-ups at the gate (visitor logs). Security runs
//! the gate, so status changes, entry/exit stamps, and deletions are
//! theirs alone. Residents see only records that visit them.

use super::instance_from_scope;
use crate::policy::types::{Action, ActorAttrs, Decision, DenyReason, ResourceAttrs, ScopePredicate};
use crate::types::{Role, VisitorKind};

/// The visibility predicate for visitor listings.
pub fn list_scope(actor: &ActorAttrs) -> Decision {
	match actor.role {
		Role::Security => Decision::AllowAll,
		Role::Resident => Decision::AllowScoped(ScopePredicate::TargetedAt(actor.user_id)),
		Role::Admin | Role::Caretaker => Decision::Deny(DenyReason::UnsupportedRole),
	}
}

/// Instance-level visitor actions.
pub fn evaluate(actor: &ActorAttrs, action: Action, resource: &ResourceAttrs) -> Decision {
	match action {
		Action::List => list_scope(actor),
		Action::Read | Action::MarkRead => instance_from_scope(list_scope(actor), resource),
		Action::Create => create(actor, resource),
		Action::Update | Action::ChangeStatus => match actor.role {
			Role::Security => Decision::AllowInstance,
			_ => Decision::Deny(DenyReason::UnsupportedRole),
		},
		Action::Delete => match actor.role {
			Role::Security => Decision::AllowInstance,
			_ => Decision::Deny(DenyReason::UnsupportedRole),
		},
		Action::Respond => Decision::Deny(DenyReason::UnsupportedAction),
	}
}

fn create(actor: &ActorAttrs, resource: &ResourceAttrs) -> Decision {
	match (actor.role, resource.visitor_kind) {
		(Role::Resident, Some(VisitorKind::GuestNotice)) => Decision::AllowInstance,
		(Role::Security, Some(VisitorKind::VisitorLog)) => Decision::AllowInstance,
		(Role::Resident | Role::Security, _) => Decision::Deny(DenyReason::VisitorKindNotAllowed),
		_ => Decision::Deny(DenyReason::UnsupportedRole),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::UserId;

	fn security() -> ActorAttrs {
		ActorAttrs::new(UserId::generate(), Role::Security)
	}

	fn resident() -> ActorAttrs {
		ActorAttrs::new(UserId::generate(), Role::Resident)
	}

	#[test]
	fn security_sees_all_visitors() {
		assert_eq!(list_scope(&security()), Decision::AllowAll);
	}

	#[test]
	fn resident_sees_only_their_visitors() {
		let actor = resident();
		let Decision::AllowScoped(pred) = list_scope(&actor) else {
			panic!("expected scoped decision");
		};
		assert!(pred.matches(&ResourceAttrs::visitor(
			VisitorKind::GuestNotice,
			actor.user_id
		)));
		assert!(!pred.matches(&ResourceAttrs::visitor(
			VisitorKind::GuestNotice,
			UserId::generate()
		)));
	}

	#[test]
	fn resident_creates_guest_notices_only() {
		let actor = resident();
		let notice = ResourceAttrs::visitor(VisitorKind::GuestNotice, actor.user_id);
		assert_eq!(
			evaluate(&actor, Action::Create, &notice),
			Decision::AllowInstance
		);

		let log = ResourceAttrs::visitor(VisitorKind::VisitorLog, actor.user_id);
		assert_eq!(
			evaluate(&actor, Action::Create, &log),
			Decision::Deny(DenyReason::VisitorKindNotAllowed)
		);
	}

	#[test]
	fn security_creates_visitor_logs_only() {
		let actor = security();
		let log = ResourceAttrs::visitor(VisitorKind::VisitorLog, UserId::generate());
		assert_eq!(evaluate(&actor, Action::Create, &log), Decision::AllowInstance);

		let notice = ResourceAttrs::visitor(VisitorKind::GuestNotice, UserId::generate());
		assert_eq!(
			evaluate(&actor, Action::Create, &notice),
			Decision::Deny(DenyReason::VisitorKindNotAllowed)
		);
	}

	#[test]
	fn only_security_changes_status_or_deletes() {
		let res = ResourceAttrs::visitor(VisitorKind::GuestNotice, UserId::generate());
		assert_eq!(
			evaluate(&security(), Action::ChangeStatus, &res),
			Decision::AllowInstance
		);
		assert_eq!(
			evaluate(&resident(), Action::ChangeStatus, &res),
			Decision::Deny(DenyReason::UnsupportedRole)
		);
		assert_eq!(
			evaluate(&security(), Action::Delete, &res),
			Decision::AllowInstance
		);
		assert_eq!(
			evaluate(&resident(), Action::Delete, &res),
			Decision::Deny(DenyReason::UnsupportedRole)
		);
	}

	#[test]
	fn caretakers_have_no_visitor_surface() {
		let actor = ActorAttrs::new(UserId::generate(), Role::Caretaker);
		assert_eq!(
			list_scope(&actor),
			Decision::Deny(DenyReason::UnsupportedRole)
		);
	}
}
