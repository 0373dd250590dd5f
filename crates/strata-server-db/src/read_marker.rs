// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Read-marker repository.
//!
//! One generalized table records per-actor "seen" state for every
//! resource kind. Markers are insert-if-absent: re-marking is a no-op and
//! markers are never deleted.

use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use strata_server_auth::{ResourceKind, UserId};
use uuid::Uuid;

use crate::error::DbError;

/// One item of a mark-seen batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeenItem {
	pub kind: ResourceKind,
	pub id: Uuid,
}

/// Repository for read markers.
#[derive(Clone)]
pub struct ReadMarkerRepository {
	pool: SqlitePool,
}

impl ReadMarkerRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Record that the user has seen a resource. Returns true when this
	/// call created the marker, false when it already existed.
	#[tracing::instrument(skip(self), fields(user_id = %user, kind = %kind))]
	pub async fn mark_seen(
		&self,
		user: &UserId,
		kind: ResourceKind,
		resource_id: Uuid,
	) -> Result<bool, DbError> {
		let result = sqlx::query(
			r#"
			INSERT OR IGNORE INTO read_markers (user_id, resource_type, resource_id, seen_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(user.to_string())
		.bind(kind.to_string())
		.bind(resource_id.to_string())
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Has the user seen this resource?
	#[tracing::instrument(skip(self), fields(user_id = %user, kind = %kind))]
	pub async fn has_seen(
		&self,
		user: &UserId,
		kind: ResourceKind,
		resource_id: Uuid,
	) -> Result<bool, DbError> {
		let count: i64 = sqlx::query_scalar(
			"SELECT COUNT(*) FROM read_markers \
			 WHERE user_id = ? AND resource_type = ? AND resource_id = ?",
		)
		.bind(user.to_string())
		.bind(kind.to_string())
		.bind(resource_id.to_string())
		.fetch_one(&self.pool)
		.await?;
		Ok(count > 0)
	}

	/// Apply a mark-seen batch atomically: marker inserts for
	/// announcement/request/visitor items and read flips for message
	/// items commit in one transaction, so a failure anywhere leaves no
	/// partial batch behind.
	#[tracing::instrument(skip(self, items), fields(user_id = %user, items = items.len()))]
	pub async fn mark_seen_batch(&self, user: &UserId, items: &[SeenItem]) -> Result<(), DbError> {
		let now = Utc::now().to_rfc3339();
		let mut tx = self.pool.begin().await?;

		for item in items {
			match item.kind {
				ResourceKind::Message => {
					sqlx::query(
						r#"
						UPDATE messages
						SET is_read = 1, read_at = ?
						WHERE id = ? AND receiver_id = ? AND is_read = 0
						"#,
					)
					.bind(&now)
					.bind(item.id.to_string())
					.bind(user.to_string())
					.execute(&mut *tx)
					.await?;
				}
				kind => {
					sqlx::query(
						r#"
						INSERT OR IGNORE INTO read_markers
							(user_id, resource_type, resource_id, seen_at)
						VALUES (?, ?, ?, ?)
						"#,
					)
					.bind(user.to_string())
					.bind(kind.to_string())
					.bind(item.id.to_string())
					.bind(&now)
					.execute(&mut *tx)
					.await?;
				}
			}
		}

		tx.commit().await?;
		Ok(())
	}

	/// Marker count for a user; test and diagnostics helper.
	#[tracing::instrument(skip(self), fields(user_id = %user))]
	pub async fn count_for_user(&self, user: &UserId) -> Result<i64, DbError> {
		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM read_markers WHERE user_id = ?")
			.bind(user.to_string())
			.fetch_one(&self.pool)
			.await?;
		Ok(count)
	}
}
