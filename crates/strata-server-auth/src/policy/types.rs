// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Type definitions for policy evaluation.
//!
//! This module defines the data structures the engine evaluates over:
//!
//! - [`ActorAttrs`]: the requesting principal (role, home block, assigned blocks)
//! - [`ResourceAttrs`]: the resource being accessed (owner, scope fields)
//! - [`Action`]: the operation being performed
//! - [`Decision`]: the engine's verdict
//! - [`ScopePredicate`]: a declarative row filter that storage can push down
//!
//! # Design Principles
//!
//! 1. **Immutable evaluation**: all attributes are computed before policy
//!    evaluation
//! 2. **No database access**: policy functions are pure; assignment data is
//!    pre-loaded into the attribute structs
//! 3. **Structured denials**: a denial carries a [`DenyReason`] variant,
//!    never free text, so rules stay testable and responses stay generic

use crate::types::{BlockId, Role, UserId, VisitorKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Attributes describing the actor requesting access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorAttrs {
	pub user_id: UserId,
	pub role: Role,
	/// The actor's home block, when they have one (residents).
	pub home_block: Option<BlockId>,
	/// Blocks the actor services. Pre-loaded from the assignment
	/// directory; only ever populated for caretakers.
	pub assigned_blocks: BTreeSet<BlockId>,
}

impl ActorAttrs {
	/// Creates actor attributes with no scope data.
	pub fn new(user_id: UserId, role: Role) -> Self {
		Self {
			user_id,
			role,
			home_block: None,
			assigned_blocks: BTreeSet::new(),
		}
	}

	/// Builder: set the home block.
	pub fn with_home_block(mut self, block: BlockId) -> Self {
		self.home_block = Some(block);
		self
	}

	/// Builder: set the assigned block set.
	pub fn with_assigned_blocks(mut self, blocks: BTreeSet<BlockId>) -> Self {
		self.assigned_blocks = blocks;
		self
	}

	/// Returns true if the actor services the given block.
	pub fn is_assigned(&self, block: &BlockId) -> bool {
		self.assigned_blocks.contains(block)
	}
}

/// Attributes describing the resource being accessed.
///
/// One flat struct covers every resource kind; each kind populates the
/// fields that exist for it and leaves the rest at their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceAttrs {
	/// The creator/subject of the resource.
	pub owner_id: Option<UserId>,
	/// The block a block-scoped resource targets (`None` ⇒ site-wide for
	/// announcements, unaddressed for parcels).
	pub scope_block: Option<BlockId>,
	/// The specific actor a resource targets (matched parcel resident,
	/// request's target caretaker, visited resident, message receiver).
	pub scope_target: Option<UserId>,
	/// How a visitor record entered the system. Visitor kind only.
	pub visitor_kind: Option<VisitorKind>,
	/// Blocks serviced by the resource's target caretaker, pre-loaded for
	/// request creation so the engine stays free of directory lookups.
	pub target_blocks: Option<BTreeSet<BlockId>>,
	/// Whether a parcel has reached its terminal Delivered status.
	pub is_delivered: bool,
}

impl ResourceAttrs {
	/// Attributes for an announcement.
	pub fn announcement(author: UserId) -> Self {
		Self {
			owner_id: Some(author),
			..Self::default()
		}
	}

	/// Attributes for a resident request. `target_caretaker` is `None`
	/// when the request targets the site admin.
	pub fn request(requester: UserId, target_caretaker: Option<UserId>) -> Self {
		Self {
			owner_id: Some(requester),
			scope_target: target_caretaker,
			..Self::default()
		}
	}

	/// Attributes for a parcel. `resident` is `None` until the parcel has
	/// been matched to a resident by address.
	pub fn parcel(block: Option<BlockId>, resident: Option<UserId>) -> Self {
		Self {
			scope_block: block,
			scope_target: resident,
			..Self::default()
		}
	}

	/// Attributes for a visitor record targeting a resident.
	pub fn visitor(kind: VisitorKind, resident: UserId) -> Self {
		Self {
			scope_target: Some(resident),
			visitor_kind: Some(kind),
			..Self::default()
		}
	}

	/// Attributes for a due billed to a user.
	pub fn due(owner: UserId) -> Self {
		Self {
			owner_id: Some(owner),
			..Self::default()
		}
	}

	/// Attributes for a camera (no per-instance scope).
	pub fn camera() -> Self {
		Self::default()
	}

	/// Attributes for a direct message.
	pub fn message(sender: UserId, receiver: UserId) -> Self {
		Self {
			owner_id: Some(sender),
			scope_target: Some(receiver),
			..Self::default()
		}
	}

	/// Builder: set the scope block.
	pub fn with_block(mut self, block: BlockId) -> Self {
		self.scope_block = Some(block);
		self
	}

	/// Builder: set the target caretaker's serviced blocks.
	pub fn with_target_blocks(mut self, blocks: BTreeSet<BlockId>) -> Self {
		self.target_blocks = Some(blocks);
		self
	}

	/// Builder: set the delivered flag.
	pub fn delivered(mut self, delivered: bool) -> Self {
		self.is_delivered = delivered;
		self
	}
}

/// Resource kinds protected by the policy engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
	Announcement,
	Request,
	Parcel,
	Visitor,
	Due,
	Camera,
	Message,
}

impl fmt::Display for ResourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ResourceKind::Announcement => write!(f, "announcement"),
			ResourceKind::Request => write!(f, "request"),
			ResourceKind::Parcel => write!(f, "parcel"),
			ResourceKind::Visitor => write!(f, "visitor"),
			ResourceKind::Due => write!(f, "due"),
			ResourceKind::Camera => write!(f, "camera"),
			ResourceKind::Message => write!(f, "message"),
		}
	}
}

impl ResourceKind {
	/// Parse a kind from its snake_case wire form.
	pub fn parse(s: &str) -> Option<ResourceKind> {
		match s {
			"announcement" => Some(ResourceKind::Announcement),
			"request" => Some(ResourceKind::Request),
			"parcel" => Some(ResourceKind::Parcel),
			"visitor" => Some(ResourceKind::Visitor),
			"due" => Some(ResourceKind::Due),
			"camera" => Some(ResourceKind::Camera),
			"message" => Some(ResourceKind::Message),
			_ => None,
		}
	}
}

/// Actions that can be performed on resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	List,
	Read,
	Create,
	Update,
	Delete,
	Respond,
	ChangeStatus,
	MarkRead,
}

/// Why an action was denied.
///
/// Reasons are internal: clients receive a generic "not permitted"
/// response while the reason is logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
	/// No rule grants this role anything for this resource/action pair.
	UnsupportedRole,
	/// The action does not exist for this resource kind.
	UnsupportedAction,
	/// An instance action was evaluated without a resource descriptor.
	MissingDescriptor,
	/// The actor is not the resource's owner.
	NotOwner,
	/// The actor is not the resource's target.
	NotTarget,
	/// The instance falls outside the actor's visibility scope.
	OutOfScope,
	/// The block is not among the actor's assigned blocks.
	OutsideAssignedBlocks,
	/// A block-scoped rule needs a scope block the resource lacks.
	MissingScopeBlock,
	/// A block-scoped rule needs a home block the actor lacks.
	MissingHomeBlock,
	/// The request's target caretaker does not service the actor's block.
	CaretakerNotServingBlock,
	/// The parcel is already delivered; notes are closed.
	ParcelDelivered,
	/// The visitor kind is not one this role may create.
	VisitorKindNotAllowed,
}

impl fmt::Display for DenyReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			DenyReason::UnsupportedRole => "unsupported_role",
			DenyReason::UnsupportedAction => "unsupported_action",
			DenyReason::MissingDescriptor => "missing_descriptor",
			DenyReason::NotOwner => "not_owner",
			DenyReason::NotTarget => "not_target",
			DenyReason::OutOfScope => "out_of_scope",
			DenyReason::OutsideAssignedBlocks => "outside_assigned_blocks",
			DenyReason::MissingScopeBlock => "missing_scope_block",
			DenyReason::MissingHomeBlock => "missing_home_block",
			DenyReason::CaretakerNotServingBlock => "caretaker_not_serving_block",
			DenyReason::ParcelDelivered => "parcel_delivered",
			DenyReason::VisitorKindNotAllowed => "visitor_kind_not_allowed",
		};
		write!(f, "{s}")
	}
}

/// A declarative row filter over the scope columns of a resource table.
///
/// Predicates are data, not code, so the storage layer can translate them
/// into SQL conditions instead of filtering rows in memory. The in-memory
/// [`matches`](ScopePredicate::matches) form exists for single-instance
/// checks and for tests asserting push-down equivalence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopePredicate {
	/// Matches no rows. The degenerate scope an actor with missing scope
	/// data degrades to.
	Nothing,
	/// Rows owned (created) by the given user.
	OwnedBy(UserId),
	/// Rows targeting the given user.
	TargetedAt(UserId),
	/// Rows with no target actor (requests addressed to the site admin).
	Untargeted,
	/// Rows where the user is sender or receiver.
	ParticipantOf(UserId),
	/// Rows whose scope block is in the given set; `include_global`
	/// additionally matches rows with no scope block.
	InBlocks {
		blocks: BTreeSet<BlockId>,
		include_global: bool,
	},
}

impl ScopePredicate {
	/// Block-set predicate, collapsing to [`Nothing`](Self::Nothing) when
	/// it could never match a row.
	pub fn in_blocks(blocks: BTreeSet<BlockId>, include_global: bool) -> Self {
		if blocks.is_empty() && !include_global {
			ScopePredicate::Nothing
		} else {
			ScopePredicate::InBlocks {
				blocks,
				include_global,
			}
		}
	}

	/// Evaluate this predicate against a resource's attributes.
	pub fn matches(&self, resource: &ResourceAttrs) -> bool {
		match self {
			ScopePredicate::Nothing => false,
			ScopePredicate::OwnedBy(user) => resource.owner_id.as_ref() == Some(user),
			ScopePredicate::TargetedAt(user) => resource.scope_target.as_ref() == Some(user),
			ScopePredicate::Untargeted => resource.scope_target.is_none(),
			ScopePredicate::ParticipantOf(user) => {
				resource.owner_id.as_ref() == Some(user)
					|| resource.scope_target.as_ref() == Some(user)
			}
			ScopePredicate::InBlocks {
				blocks,
				include_global,
			} => match &resource.scope_block {
				None => *include_global,
				Some(block) => blocks.contains(block),
			},
		}
	}
}

/// The policy engine's verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
	/// The action is forbidden for this actor.
	Deny(DenyReason),
	/// The actor may act on every instance of the resource kind.
	AllowAll,
	/// The actor may act on the instances matching the predicate.
	AllowScoped(ScopePredicate),
	/// The specific instance described by the descriptor is allowed.
	AllowInstance,
}

impl Decision {
	/// Returns true unless the decision is a denial. An `AllowScoped`
	/// carrying [`ScopePredicate::Nothing`] still counts as allowed: it
	/// yields an empty listing, not a refusal.
	pub fn is_allowed(&self) -> bool {
		!matches!(self, Decision::Deny(_))
	}

	/// The denial reason, if denied.
	pub fn deny_reason(&self) -> Option<DenyReason> {
		match self {
			Decision::Deny(reason) => Some(*reason),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn user() -> UserId {
		UserId::generate()
	}

	fn block(label: &str) -> BlockId {
		BlockId::parse(label).unwrap()
	}

	#[test]
	fn owned_by_matches_owner_only() {
		let owner = user();
		let pred = ScopePredicate::OwnedBy(owner);
		assert!(pred.matches(&ResourceAttrs::announcement(owner)));
		assert!(!pred.matches(&ResourceAttrs::announcement(user())));
	}

	#[test]
	fn targeted_at_matches_target_only() {
		let resident = user();
		let pred = ScopePredicate::TargetedAt(resident);
		assert!(pred.matches(&ResourceAttrs::parcel(None, Some(resident))));
		assert!(!pred.matches(&ResourceAttrs::parcel(None, Some(user()))));
		assert!(!pred.matches(&ResourceAttrs::parcel(None, None)));
	}

	#[test]
	fn untargeted_matches_admin_requests() {
		let pred = ScopePredicate::Untargeted;
		assert!(pred.matches(&ResourceAttrs::request(user(), None)));
		assert!(!pred.matches(&ResourceAttrs::request(user(), Some(user()))));
	}

	#[test]
	fn participant_matches_either_end() {
		let sender = user();
		let receiver = user();
		let pred = ScopePredicate::ParticipantOf(sender);
		assert!(pred.matches(&ResourceAttrs::message(sender, receiver)));
		let pred = ScopePredicate::ParticipantOf(receiver);
		assert!(pred.matches(&ResourceAttrs::message(sender, receiver)));
		let pred = ScopePredicate::ParticipantOf(user());
		assert!(!pred.matches(&ResourceAttrs::message(sender, receiver)));
	}

	#[test]
	fn in_blocks_respects_global_flag() {
		let pred = ScopePredicate::in_blocks([block("A")].into(), true);
		assert!(pred.matches(&ResourceAttrs::announcement(user()).with_block(block("A"))));
		assert!(pred.matches(&ResourceAttrs::announcement(user())));
		assert!(!pred.matches(&ResourceAttrs::announcement(user()).with_block(block("B"))));

		let pred = ScopePredicate::in_blocks([block("A")].into(), false);
		assert!(!pred.matches(&ResourceAttrs::announcement(user())));
	}

	#[test]
	fn empty_block_set_without_global_collapses_to_nothing() {
		let pred = ScopePredicate::in_blocks(BTreeSet::new(), false);
		assert_eq!(pred, ScopePredicate::Nothing);
		assert!(!pred.matches(&ResourceAttrs::announcement(user())));
	}

	#[test]
	fn nothing_matches_nothing() {
		let pred = ScopePredicate::Nothing;
		assert!(!pred.matches(&ResourceAttrs::default()));
		assert!(!pred.matches(&ResourceAttrs::announcement(user()).with_block(block("A"))));
	}

	#[test]
	fn scoped_nothing_is_still_allowed() {
		assert!(Decision::AllowScoped(ScopePredicate::Nothing).is_allowed());
		assert!(!Decision::Deny(DenyReason::UnsupportedRole).is_allowed());
	}

	#[test]
	fn actor_attrs_assignment_lookup() {
		let attrs = ActorAttrs::new(user(), Role::Caretaker)
			.with_assigned_blocks([block("A"), block("C")].into());
		assert!(attrs.is_assigned(&block("A")));
		assert!(!attrs.is_assigned(&block("B")));
	}
}
