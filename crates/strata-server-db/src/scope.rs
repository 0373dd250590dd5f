// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Scope-predicate push-down.
//!
//! Translates a policy [`ScopePredicate`] into a SQL condition plus bind
//! values, so visibility filtering happens in the database rather than in
//! memory. Each repository declares which columns play the owner / block /
//! target roles for its table; a predicate referencing a column the table
//! does not have matches nothing (the rules never produce one, this is a
//! backstop).

use strata_server_auth::ScopePredicate;

/// Column names for the scope fields of one table.
#[derive(Debug, Clone, Copy)]
pub struct ScopeColumns {
	pub owner: Option<&'static str>,
	pub block: Option<&'static str>,
	pub target: Option<&'static str>,
}

/// A condition that can never match.
const MATCH_NOTHING: &str = "0 = 1";

/// Render a predicate into a SQL condition and its bind values.
///
/// The condition is parenthesized and safe to append after `WHERE` or
/// `AND`; bind values must be bound in order.
pub fn render_scope(predicate: &ScopePredicate, columns: &ScopeColumns) -> (String, Vec<String>) {
	match predicate {
		ScopePredicate::Nothing => (MATCH_NOTHING.to_string(), Vec::new()),
		ScopePredicate::OwnedBy(user) => match columns.owner {
			Some(col) => (format!("{col} = ?"), vec![user.to_string()]),
			None => (MATCH_NOTHING.to_string(), Vec::new()),
		},
		ScopePredicate::TargetedAt(user) => match columns.target {
			Some(col) => (format!("{col} = ?"), vec![user.to_string()]),
			None => (MATCH_NOTHING.to_string(), Vec::new()),
		},
		ScopePredicate::Untargeted => match columns.target {
			Some(col) => (format!("{col} IS NULL"), Vec::new()),
			None => (MATCH_NOTHING.to_string(), Vec::new()),
		},
		ScopePredicate::ParticipantOf(user) => match (columns.owner, columns.target) {
			(Some(owner), Some(target)) => (
				format!("({owner} = ? OR {target} = ?)"),
				vec![user.to_string(), user.to_string()],
			),
			_ => (MATCH_NOTHING.to_string(), Vec::new()),
		},
		ScopePredicate::InBlocks {
			blocks,
			include_global,
		} => {
			let Some(col) = columns.block else {
				return (MATCH_NOTHING.to_string(), Vec::new());
			};
			if blocks.is_empty() {
				return if *include_global {
					(format!("{col} IS NULL"), Vec::new())
				} else {
					(MATCH_NOTHING.to_string(), Vec::new())
				};
			}
			let placeholders = vec!["?"; blocks.len()].join(", ");
			let binds: Vec<String> = blocks.iter().map(|b| b.to_string()).collect();
			let condition = if *include_global {
				format!("({col} IS NULL OR {col} IN ({placeholders}))")
			} else {
				format!("{col} IN ({placeholders})")
			};
			(condition, binds)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use strata_server_auth::{BlockId, UserId};

	const COLS: ScopeColumns = ScopeColumns {
		owner: Some("author_id"),
		block: Some("scope_block"),
		target: Some("resident_id"),
	};

	fn block(label: &str) -> BlockId {
		BlockId::parse(label).unwrap()
	}

	#[test]
	fn owned_by_renders_equality() {
		let user = UserId::generate();
		let (sql, binds) = render_scope(&ScopePredicate::OwnedBy(user), &COLS);
		assert_eq!(sql, "author_id = ?");
		assert_eq!(binds, vec![user.to_string()]);
	}

	#[test]
	fn untargeted_renders_is_null() {
		let (sql, binds) = render_scope(&ScopePredicate::Untargeted, &COLS);
		assert_eq!(sql, "resident_id IS NULL");
		assert!(binds.is_empty());
	}

	#[test]
	fn participant_renders_either_column() {
		let user = UserId::generate();
		let (sql, binds) = render_scope(&ScopePredicate::ParticipantOf(user), &COLS);
		assert_eq!(sql, "(author_id = ? OR resident_id = ?)");
		assert_eq!(binds.len(), 2);
	}

	#[test]
	fn blocks_with_global_renders_null_or_in() {
		let pred = ScopePredicate::in_blocks([block("A"), block("B")].into(), true);
		let (sql, binds) = render_scope(&pred, &COLS);
		assert_eq!(sql, "(scope_block IS NULL OR scope_block IN (?, ?))");
		assert_eq!(binds, vec!["A".to_string(), "B".to_string()]);
	}

	#[test]
	fn blocks_without_global_renders_plain_in() {
		let pred = ScopePredicate::in_blocks([block("A")].into(), false);
		let (sql, binds) = render_scope(&pred, &COLS);
		assert_eq!(sql, "scope_block IN (?)");
		assert_eq!(binds, vec!["A".to_string()]);
	}

	#[test]
	fn empty_blocks_with_global_matches_only_global() {
		let pred = ScopePredicate::InBlocks {
			blocks: Default::default(),
			include_global: true,
		};
		let (sql, binds) = render_scope(&pred, &COLS);
		assert_eq!(sql, "scope_block IS NULL");
		assert!(binds.is_empty());
	}

	mod property_tests {
		use super::*;
		use proptest::prelude::*;
		use std::collections::BTreeSet;

		proptest! {
				// Placeholder count always equals bind count, whatever the
				// predicate shape; a mismatch would corrupt every pushed-down
				// query downstream.
				#[test]
				fn placeholders_match_binds(
						labels in proptest::collection::btree_set("[A-Z][0-9]?", 0..6),
						include_global in any::<bool>(),
				) {
						let blocks: BTreeSet<BlockId> =
								labels.iter().filter_map(|l| BlockId::parse(l)).collect();
						let pred = ScopePredicate::in_blocks(blocks, include_global);
						let (sql, binds) = render_scope(&pred, &COLS);
						prop_assert_eq!(sql.matches('?').count(), binds.len());
				}
		}
	}

	#[test]
	fn nothing_and_missing_columns_never_match() {
		let (sql, _) = render_scope(&ScopePredicate::Nothing, &COLS);
		assert_eq!(sql, "0 = 1");

		let no_target = ScopeColumns {
			owner: Some("author_id"),
			block: None,
			target: None,
		};
		let (sql, _) = render_scope(&ScopePredicate::TargetedAt(UserId::generate()), &no_target);
		assert_eq!(sql, "0 = 1");
	}
}
