// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Policy evaluation entry point.
//!
//! [`evaluate`] is a pure function of the pre-loaded actor and resource
//! attributes; it performs no I/O. Callers build [`ActorAttrs`] once per
//! request (loading assigned blocks for caretakers) and reuse the result
//! for every check in that request.

use super::rules::{announcement, camera, due, message, parcel, request, visitor};
use super::types::{Action, ActorAttrs, Decision, DenyReason, ResourceAttrs, ResourceKind};
use tracing::instrument;

/// Evaluates whether an actor may perform an action on a resource kind.
///
/// For [`Action::List`] no descriptor is needed and the result is
/// `AllowAll`, `AllowScoped`, or `Deny`. Every other action requires a
/// descriptor and yields `AllowInstance` or `Deny`.
///
/// # Tracing
///
/// Decisions are logged at debug level with the actor, action, and
/// resource kind; descriptors and deny reasons never reach clients.
#[instrument(
    level = "debug",
    skip(actor, resource),
    fields(
        user_id = %actor.user_id,
        role = %actor.role,
        action = ?action,
        kind = %kind,
    )
)]
pub fn evaluate(
	actor: &ActorAttrs,
	action: Action,
	kind: ResourceKind,
	resource: Option<&ResourceAttrs>,
) -> Decision {
	let decision = match action {
		Action::List => list_scope(actor, kind),
		_ => match resource {
			None => Decision::Deny(DenyReason::MissingDescriptor),
			Some(resource) => match kind {
				ResourceKind::Announcement => announcement::evaluate(actor, action, resource),
				ResourceKind::Request => request::evaluate(actor, action, resource),
				ResourceKind::Parcel => parcel::evaluate(actor, action, resource),
				ResourceKind::Visitor => visitor::evaluate(actor, action, resource),
				ResourceKind::Due => due::evaluate(actor, action, resource),
				ResourceKind::Camera => camera::evaluate(actor, action, resource),
				ResourceKind::Message => message::evaluate(actor, action, resource),
			},
		},
	};

	if let Decision::Deny(reason) = &decision {
		tracing::debug!(reason = %reason, "policy denied");
	}
	decision
}

fn list_scope(actor: &ActorAttrs, kind: ResourceKind) -> Decision {
	match kind {
		ResourceKind::Announcement => announcement::list_scope(actor),
		ResourceKind::Request => request::list_scope(actor),
		ResourceKind::Parcel => parcel::list_scope(actor),
		ResourceKind::Visitor => visitor::list_scope(actor),
		ResourceKind::Due => due::list_scope(actor),
		ResourceKind::Camera => camera::list_scope(actor),
		ResourceKind::Message => message::list_scope(actor),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::policy::types::ScopePredicate;
	use crate::types::{BlockId, Role, UserId, VisitorKind};

	fn block(label: &str) -> BlockId {
		BlockId::parse(label).unwrap()
	}

	fn admin() -> ActorAttrs {
		ActorAttrs::new(UserId::generate(), Role::Admin)
	}

	fn caretaker(blocks: &[&str]) -> ActorAttrs {
		ActorAttrs::new(UserId::generate(), Role::Caretaker)
			.with_assigned_blocks(blocks.iter().map(|b| block(b)).collect())
	}

	fn resident(home: &str) -> ActorAttrs {
		ActorAttrs::new(UserId::generate(), Role::Resident).with_home_block(block(home))
	}

	#[test]
	fn instance_actions_require_a_descriptor() {
		let decision = evaluate(&admin(), Action::Read, ResourceKind::Announcement, None);
		assert_eq!(decision, Decision::Deny(DenyReason::MissingDescriptor));
	}

	#[test]
	fn admin_announcement_listing_is_unscoped() {
		let decision = evaluate(&admin(), Action::List, ResourceKind::Announcement, None);
		assert_eq!(decision, Decision::AllowAll);
	}

	#[test]
	fn caretaker_not_assigned_cannot_create_into_block() {
		let actor = caretaker(&["A"]);
		let res = ResourceAttrs::announcement(actor.user_id).with_block(block("B"));
		let decision = evaluate(&actor, Action::Create, ResourceKind::Announcement, Some(&res));
		assert!(!decision.is_allowed());
	}

	// Spec scenario: R1 (block A, unit 5) files a request targeting C1,
	// who services block A. C2 services block B; the admin sees only
	// admin-targeted requests.
	#[test]
	fn request_visibility_round_trip() {
		let r1 = resident("A");
		let c1 = caretaker(&["A"]);
		let c2 = caretaker(&["B"]);

		let created = ResourceAttrs::request(r1.user_id, Some(c1.user_id))
			.with_target_blocks(c1.assigned_blocks.clone());
		assert_eq!(
			evaluate(&r1, Action::Create, ResourceKind::Request, Some(&created)),
			Decision::AllowInstance
		);

		// The stored row, as the descriptor later requests see it.
		let row = ResourceAttrs::request(r1.user_id, Some(c1.user_id));

		let scope_of = |actor: &ActorAttrs| match evaluate(actor, Action::List, ResourceKind::Request, None) {
			Decision::AllowScoped(pred) => pred,
			other => panic!("expected scoped decision, got {other:?}"),
		};

		assert!(scope_of(&r1).matches(&row));
		assert!(scope_of(&c1).matches(&row));
		assert!(!scope_of(&c2).matches(&row));
		assert!(!scope_of(&admin()).matches(&row));

		// Another resident in the same block sees nothing either.
		let r2 = resident("A");
		assert!(!scope_of(&r2).matches(&row));
	}

	// Spec scenario: parcel addressed to block H, unmatched. The block-H
	// caretaker may re-status it, the block-I caretaker may not; once
	// matched to R3 the resident may note it until delivery.
	#[test]
	fn parcel_block_and_delivery_scenario() {
		let ch = caretaker(&["H"]);
		let ci = caretaker(&["I"]);
		let unmatched = ResourceAttrs::parcel(Some(block("H")), None);

		assert_eq!(
			evaluate(&ch, Action::ChangeStatus, ResourceKind::Parcel, Some(&unmatched)),
			Decision::AllowInstance
		);
		assert_eq!(
			evaluate(&ci, Action::ChangeStatus, ResourceKind::Parcel, Some(&unmatched)),
			Decision::Deny(DenyReason::OutsideAssignedBlocks)
		);

		let r3 = ActorAttrs::new(UserId::generate(), Role::Resident);
		let matched = ResourceAttrs::parcel(Some(block("H")), Some(r3.user_id));
		assert_eq!(
			evaluate(&r3, Action::Update, ResourceKind::Parcel, Some(&matched)),
			Decision::AllowInstance
		);

		let delivered = matched.delivered(true);
		assert_eq!(
			evaluate(&r3, Action::Update, ResourceKind::Parcel, Some(&delivered)),
			Decision::Deny(DenyReason::ParcelDelivered)
		);
	}

	#[test]
	fn guest_notice_and_visitor_log_kinds_are_role_bound() {
		let r = resident("A");
		let s = ActorAttrs::new(UserId::generate(), Role::Security);

		let notice = ResourceAttrs::visitor(VisitorKind::GuestNotice, r.user_id);
		assert_eq!(
			evaluate(&r, Action::Create, ResourceKind::Visitor, Some(&notice)),
			Decision::AllowInstance
		);
		assert_eq!(
			evaluate(&s, Action::Create, ResourceKind::Visitor, Some(&notice)),
			Decision::Deny(DenyReason::VisitorKindNotAllowed)
		);
	}

	mod property_tests {
		use super::*;
		use proptest::prelude::*;
		use uuid::Uuid;

		fn arb_role() -> impl Strategy<Value = Role> {
			prop_oneof![
				Just(Role::Admin),
				Just(Role::Security),
				Just(Role::Caretaker),
				Just(Role::Resident),
			]
		}

		fn arb_action() -> impl Strategy<Value = Action> {
			prop_oneof![
				Just(Action::List),
				Just(Action::Read),
				Just(Action::Create),
				Just(Action::Update),
				Just(Action::Delete),
				Just(Action::Respond),
				Just(Action::ChangeStatus),
				Just(Action::MarkRead),
			]
		}

		fn arb_kind() -> impl Strategy<Value = ResourceKind> {
			prop_oneof![
				Just(ResourceKind::Announcement),
				Just(ResourceKind::Request),
				Just(ResourceKind::Parcel),
				Just(ResourceKind::Visitor),
				Just(ResourceKind::Due),
				Just(ResourceKind::Camera),
				Just(ResourceKind::Message),
			]
		}

		proptest! {
				#[test]
				fn evaluation_is_total_and_never_panics(
						actor_uuid in any::<u128>(),
						role in arb_role(),
						action in arb_action(),
						kind in arb_kind(),
						with_descriptor in any::<bool>(),
				) {
						let actor = ActorAttrs::new(UserId::new(Uuid::from_u128(actor_uuid)), role);
						let descriptor = ResourceAttrs::default();
						let resource = with_descriptor.then_some(&descriptor);
						let _ = evaluate(&actor, action, kind, resource);
				}

				#[test]
				fn admin_always_lists_all_announcements(
						actor_uuid in any::<u128>(),
				) {
						let actor = ActorAttrs::new(UserId::new(Uuid::from_u128(actor_uuid)), Role::Admin);
						prop_assert_eq!(
								evaluate(&actor, Action::List, ResourceKind::Announcement, None),
								Decision::AllowAll
						);
				}

				#[test]
				fn resident_announcement_scope_is_exactly_home_or_global(
						actor_uuid in any::<u128>(),
						author_uuid in any::<u128>(),
						home in "[A-F]",
						other in "[G-M]",
				) {
						let actor = ActorAttrs::new(UserId::new(Uuid::from_u128(actor_uuid)), Role::Resident)
								.with_home_block(BlockId::parse(&home).unwrap());
						let author = UserId::new(Uuid::from_u128(author_uuid));

						let Decision::AllowScoped(pred) =
								evaluate(&actor, Action::List, ResourceKind::Announcement, None)
						else {
								panic!("expected scoped decision");
						};

						prop_assert!(pred.matches(&ResourceAttrs::announcement(author)));
						prop_assert!(pred.matches(
								&ResourceAttrs::announcement(author).with_block(BlockId::parse(&home).unwrap())
						));
						prop_assert!(!pred.matches(
								&ResourceAttrs::announcement(author).with_block(BlockId::parse(&other).unwrap())
						));
				}

				#[test]
				fn unassigned_caretaker_never_creates_block_announcements(
						actor_uuid in any::<u128>(),
						target in "[A-Z]",
				) {
						let actor =
								ActorAttrs::new(UserId::new(Uuid::from_u128(actor_uuid)), Role::Caretaker);
						let res = ResourceAttrs::announcement(actor.user_id)
								.with_block(BlockId::parse(&target).unwrap());
						let decision =
								evaluate(&actor, Action::Create, ResourceKind::Announcement, Some(&res));
						prop_assert_eq!(decision, Decision::Deny(DenyReason::OutsideAssignedBlocks));
				}

				#[test]
				fn actors_missing_scope_data_degrade_to_empty_listings(
						actor_uuid in any::<u128>(),
				) {
						// A resident with no home block gets an empty announcement
						// listing, not an error.
						let actor =
								ActorAttrs::new(UserId::new(Uuid::from_u128(actor_uuid)), Role::Resident);
						let decision = evaluate(&actor, Action::List, ResourceKind::Announcement, None);
						prop_assert_eq!(decision, Decision::AllowScoped(ScopePredicate::Nothing));
				}
		}
	}
}
