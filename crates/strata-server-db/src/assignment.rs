// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Caretaker assignment directory.
//!
//! Assignment rows are the sole source of truth for which blocks a
//! caretaker services; no resource caches this relationship. Duplicate
//! (caretaker, block) pairs are tolerated and behave as one assignment.

use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use std::collections::BTreeSet;
use strata_server_auth::{BlockId, Role, User, UserId};
use uuid::Uuid;

use crate::error::DbError;
use crate::user::row_to_user;

/// Repository for caretaker-to-block assignments.
#[derive(Clone)]
pub struct AssignmentRepository {
	pool: SqlitePool,
}

impl AssignmentRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Assign a caretaker to a block.
	///
	/// # Errors
	/// Returns `DbError::InvalidActor` when the target user does not exist
	/// or is not a caretaker. Assigning an already-assigned pair succeeds
	/// and has no observable effect beyond the duplicate row.
	#[tracing::instrument(skip(self), fields(caretaker_id = %caretaker, block = %block))]
	pub async fn assign(&self, caretaker: &UserId, block: &BlockId) -> Result<(), DbError> {
		let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = ?")
			.bind(caretaker.to_string())
			.fetch_optional(&self.pool)
			.await?;

		match role.as_deref().and_then(Role::parse) {
			Some(Role::Caretaker) => {}
			_ => {
				return Err(DbError::InvalidActor(format!(
					"user {caretaker} is not a caretaker"
				)))
			}
		}

		sqlx::query(
			r#"
			INSERT INTO caretaker_assignments (id, caretaker_id, block, created_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(Uuid::new_v4().to_string())
		.bind(caretaker.to_string())
		.bind(block.to_string())
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(caretaker_id = %caretaker, block = %block, "caretaker assigned");
		Ok(())
	}

	/// Does this caretaker service the given block?
	#[tracing::instrument(skip(self), fields(caretaker_id = %caretaker, block = %block))]
	pub async fn is_assigned(&self, caretaker: &UserId, block: &BlockId) -> Result<bool, DbError> {
		let count: i64 = sqlx::query_scalar(
			"SELECT COUNT(*) FROM caretaker_assignments WHERE caretaker_id = ? AND block = ?",
		)
		.bind(caretaker.to_string())
		.bind(block.to_string())
		.fetch_one(&self.pool)
		.await?;
		Ok(count > 0)
	}

	/// All blocks the caretaker services.
	#[tracing::instrument(skip(self), fields(caretaker_id = %caretaker))]
	pub async fn blocks_for(&self, caretaker: &UserId) -> Result<BTreeSet<BlockId>, DbError> {
		let rows: Vec<String> = sqlx::query_scalar(
			"SELECT DISTINCT block FROM caretaker_assignments WHERE caretaker_id = ?",
		)
		.bind(caretaker.to_string())
		.fetch_all(&self.pool)
		.await?;

		Ok(rows.iter().filter_map(|b| BlockId::parse(b)).collect())
	}

	/// IDs of all caretakers assigned to a block (deduplicated).
	#[tracing::instrument(skip(self), fields(block = %block))]
	pub async fn caretakers_for_block(&self, block: &BlockId) -> Result<Vec<UserId>, DbError> {
		let rows: Vec<String> = sqlx::query_scalar(
			"SELECT DISTINCT caretaker_id FROM caretaker_assignments WHERE block = ?",
		)
		.bind(block.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter()
			.map(|id| crate::types::parse_uuid(id).map(UserId::new))
			.collect()
	}

	/// Full caretaker user rows for a block, for the listing endpoint.
	#[tracing::instrument(skip(self), fields(block = %block))]
	pub async fn list_block_caretakers(&self, block: &BlockId) -> Result<Vec<User>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT DISTINCT u.id, u.name, u.email, u.role, u.phone, u.home_block, u.home_unit,
			       u.created_at, u.updated_at
			FROM caretaker_assignments a
			JOIN users u ON u.id = a.caretaker_id
			WHERE a.block = ? AND u.role = 'caretaker'
			ORDER BY u.name
			"#,
		)
		.bind(block.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_user).collect()
	}
}
