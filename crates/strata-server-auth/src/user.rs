// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The per-request user snapshot.

use crate::types::{BlockId, Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account as resolved for one request.
///
/// The role is fixed for the lifetime of a session; changing a user's role
/// requires re-issuing credentials, so handlers may treat this snapshot as
/// immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: UserId,
	pub name: String,
	pub email: String,
	pub role: Role,
	pub phone: Option<String>,
	/// The block this user lives in. Only meaningful for residents.
	pub home_block: Option<BlockId>,
	/// The unit/apartment number within the home block.
	pub home_unit: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl User {
	/// Returns true if this user lives at the given block/unit address.
	pub fn lives_at(&self, block: &BlockId, unit: &str) -> bool {
		self.home_block.as_ref() == Some(block)
			&& self.home_unit.as_deref().is_some_and(|u| u.eq_ignore_ascii_case(unit))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn resident(block: &str, unit: &str) -> User {
		User {
			id: UserId::generate(),
			name: "Test Resident".to_string(),
			email: "resident@example.com".to_string(),
			role: Role::Resident,
			phone: None,
			home_block: BlockId::parse(block),
			home_unit: Some(unit.to_string()),
			created_at: Utc::now(),
			updated_at: Utc::now(),
		}
	}

	#[test]
	fn lives_at_matches_own_address() {
		let user = resident("A", "5");
		assert!(user.lives_at(&BlockId::parse("a").unwrap(), "5"));
		assert!(!user.lives_at(&BlockId::parse("B").unwrap(), "5"));
		assert!(!user.lives_at(&BlockId::parse("A").unwrap(), "6"));
	}

	#[test]
	fn lives_at_is_false_without_address() {
		let mut user = resident("A", "5");
		user.home_block = None;
		assert!(!user.lives_at(&BlockId::parse("A").unwrap(), "5"));
	}
}
