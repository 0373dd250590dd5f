// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Core type definitions for identity and authorization.
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs for each entity type
//!   ([`UserId`], [`AnnouncementId`], etc.) preventing accidental mixing
//! - **[`Role`]**: the closed role enumeration. The system this replaces
//!   compared free-text role strings at every call site; a typo'd string
//!   silently denied everything, so roles are compile-time variants here
//! - **[`BlockId`]**: normalized block label ("A", "B2", ...)
//! - **[`VisitorKind`]**: guest pre-notice vs. gate log entry
//!
//! All ID types serialize transparently as UUID strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(SessionId, "Unique identifier for a session.");
define_id_type!(AnnouncementId, "Unique identifier for an announcement.");
define_id_type!(RequestId, "Unique identifier for a resident request.");
define_id_type!(ParcelId, "Unique identifier for a parcel.");
define_id_type!(VisitorId, "Unique identifier for a visitor record.");
define_id_type!(DueId, "Unique identifier for a due (billing item).");
define_id_type!(CameraId, "Unique identifier for a camera.");
define_id_type!(MessageId, "Unique identifier for a direct message.");

// =============================================================================
// Roles
// =============================================================================

/// The closed set of roles in a residential complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Site manager: site-wide announcements, assignments, oversight.
	Admin,
	/// Gate security: parcels, visitor logs, cameras.
	Security,
	/// Block caretaker: scoped to blocks they hold an assignment for.
	Caretaker,
	/// Resident of a block/unit.
	Resident,
}

impl Role {
	/// Returns all roles.
	pub fn all() -> &'static [Role] {
		&[Role::Admin, Role::Security, Role::Caretaker, Role::Resident]
	}

	/// Parse a role from its snake_case wire form.
	pub fn parse(s: &str) -> Option<Role> {
		match s {
			"admin" => Some(Role::Admin),
			"security" => Some(Role::Security),
			"caretaker" => Some(Role::Caretaker),
			"resident" => Some(Role::Resident),
			_ => None,
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Admin => write!(f, "admin"),
			Role::Security => write!(f, "security"),
			Role::Caretaker => write!(f, "caretaker"),
			Role::Resident => write!(f, "resident"),
		}
	}
}

// =============================================================================
// Blocks
// =============================================================================

/// A block label within the complex ("A", "B2", ...).
///
/// Labels are normalized to trimmed uppercase so that lookups and
/// assignment comparisons never depend on caller formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
	/// Normalize and wrap a block label. Returns `None` for blank input.
	pub fn parse(label: &str) -> Option<BlockId> {
		let normalized = label.trim().to_uppercase();
		if normalized.is_empty() {
			None
		} else {
			Some(BlockId(normalized))
		}
	}

	/// The normalized label.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for BlockId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

// =============================================================================
// Visitor kinds
// =============================================================================

/// How a visitor record entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitorKind {
	/// A resident pre-announcing an expected guest.
	GuestNotice,
	/// Security logging a visitor at the gate.
	VisitorLog,
}

impl VisitorKind {
	/// Parse a kind from its snake_case wire form.
	pub fn parse(s: &str) -> Option<VisitorKind> {
		match s {
			"guest_notice" => Some(VisitorKind::GuestNotice),
			"visitor_log" => Some(VisitorKind::VisitorLog),
			_ => None,
		}
	}
}

impl fmt::Display for VisitorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			VisitorKind::GuestNotice => write!(f, "guest_notice"),
			VisitorKind::VisitorLog => write!(f, "visitor_log"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	mod id_types {
		use super::*;

		#[test]
		fn user_id_roundtrips() {
			let uuid = Uuid::new_v4();
			let user_id = UserId::new(uuid);
			assert_eq!(user_id.into_inner(), uuid);
		}

		#[test]
		fn user_id_generates_unique() {
			let id1 = UserId::generate();
			let id2 = UserId::generate();
			assert_ne!(id1, id2);
		}

		#[test]
		fn user_id_serializes_as_uuid() {
			let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
			let user_id = UserId::new(uuid);
			let json = serde_json::to_string(&user_id).unwrap();
			assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");
		}

		proptest! {
				#[test]
				fn user_id_roundtrip_any_uuid(
						a: u128
				) {
						let uuid = Uuid::from_u128(a);
						let user_id = UserId::new(uuid);
						prop_assert_eq!(user_id.into_inner(), uuid);
						prop_assert_eq!(Uuid::from(user_id), uuid);
				}

				#[test]
				fn user_id_display_matches_uuid(
						a: u128
				) {
						let uuid = Uuid::from_u128(a);
						let user_id = UserId::new(uuid);
						prop_assert_eq!(user_id.to_string(), uuid.to_string());
				}
		}
	}

	mod roles {
		use super::*;

		#[test]
		fn role_serializes_snake_case() {
			let json = serde_json::to_string(&Role::Admin).unwrap();
			assert_eq!(json, "\"admin\"");
		}

		#[test]
		fn role_display_parse_roundtrip() {
			for role in Role::all() {
				assert_eq!(Role::parse(&role.to_string()), Some(*role));
			}
		}

		#[test]
		fn unknown_role_does_not_parse() {
			assert_eq!(Role::parse("Site Yöneticisi"), None);
			assert_eq!(Role::parse(""), None);
		}
	}

	mod blocks {
		use super::*;

		#[test]
		fn block_normalizes_case_and_whitespace() {
			assert_eq!(BlockId::parse(" a ").unwrap().as_str(), "A");
			assert_eq!(BlockId::parse("b2").unwrap(), BlockId::parse("B2").unwrap());
		}

		#[test]
		fn blank_block_is_rejected() {
			assert_eq!(BlockId::parse(""), None);
			assert_eq!(BlockId::parse("   "), None);
		}
	}

	mod visitor_kinds {
		use super::*;

		#[test]
		fn kind_display_parse_roundtrip() {
			for kind in [VisitorKind::GuestNotice, VisitorKind::VisitorLog] {
				assert_eq!(VisitorKind::parse(&kind.to_string()), Some(kind));
			}
		}
	}
}
