// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Camera access rules.
//!
//! Security maintains the camera inventory; the admin has a read-only
//! oversight view. Cameras carry no per-instance scope.

use crate::policy::types::{Action, ActorAttrs, Decision, DenyReason, ResourceAttrs};
use crate::types::Role;

/// The visibility predicate for camera listings.
pub fn list_scope(actor: &ActorAttrs) -> Decision {
	match actor.role {
		Role::Security | Role::Admin => Decision::AllowAll,
		_ => Decision::Deny(DenyReason::UnsupportedRole),
	}
}

/// Instance-level camera actions.
pub fn evaluate(actor: &ActorAttrs, action: Action, _resource: &ResourceAttrs) -> Decision {
	match action {
		Action::List => list_scope(actor),
		Action::Read => match actor.role {
			Role::Security | Role::Admin => Decision::AllowInstance,
			_ => Decision::Deny(DenyReason::UnsupportedRole),
		},
		Action::Create | Action::Update | Action::Delete => match actor.role {
			Role::Security => Decision::AllowInstance,
			_ => Decision::Deny(DenyReason::UnsupportedRole),
		},
		Action::Respond | Action::ChangeStatus | Action::MarkRead => {
			Decision::Deny(DenyReason::UnsupportedAction)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::UserId;

	#[test]
	fn security_and_admin_list_cameras() {
		for role in [Role::Security, Role::Admin] {
			let actor = ActorAttrs::new(UserId::generate(), role);
			assert_eq!(list_scope(&actor), Decision::AllowAll);
		}
		for role in [Role::Caretaker, Role::Resident] {
			let actor = ActorAttrs::new(UserId::generate(), role);
			assert_eq!(
				list_scope(&actor),
				Decision::Deny(DenyReason::UnsupportedRole)
			);
		}
	}

	#[test]
	fn only_security_mutates_cameras() {
		let res = ResourceAttrs::camera();
		let security = ActorAttrs::new(UserId::generate(), Role::Security);
		let admin = ActorAttrs::new(UserId::generate(), Role::Admin);

		for action in [Action::Create, Action::Update, Action::Delete] {
			assert_eq!(evaluate(&security, action, &res), Decision::AllowInstance);
			assert_eq!(
				evaluate(&admin, action, &res),
				Decision::Deny(DenyReason::UnsupportedRole)
			);
		}
	}
}
