// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Due (billing item) repository.
//!
//! Dues are written by the system (request completion), listed by their
//! owner, and settled with an idempotent pay action.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use strata_server_auth::{DueId, ResourceAttrs, ScopePredicate, UserId};

use crate::error::DbError;
use crate::scope::{render_scope, ScopeColumns};
use crate::types::{parse_opt_ts, parse_ts, parse_uuid};

const SCOPE_COLUMNS: ScopeColumns = ScopeColumns {
	owner: Some("user_id"),
	block: None,
	target: None,
};

const SELECT: &str = r#"
	SELECT id, user_id, amount_cents, description, is_paid, paid_at, created_at
	FROM dues
"#;

/// A stored due. Amounts are integer cents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Due {
	pub id: DueId,
	pub user_id: UserId,
	pub amount_cents: i64,
	pub description: String,
	pub is_paid: bool,
	pub paid_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
}

impl Due {
	/// The policy descriptor for this row.
	pub fn resource_attrs(&self) -> ResourceAttrs {
		ResourceAttrs::due(self.user_id)
	}
}

/// Repository for dues.
#[derive(Clone)]
pub struct DueRepository {
	pool: SqlitePool,
}

impl DueRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a due.
	#[tracing::instrument(skip(self, due), fields(id = %due.id, user_id = %due.user_id))]
	pub async fn create(&self, due: &Due) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO dues (id, user_id, amount_cents, description, is_paid, paid_at, created_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(due.id.to_string())
		.bind(due.user_id.to_string())
		.bind(due.amount_cents)
		.bind(&due.description)
		.bind(due.is_paid as i32)
		.bind(due.paid_at.map(|t| t.to_rfc3339()))
		.bind(due.created_at.to_rfc3339())
		.execute(&self.pool)
		.await?;
		Ok(())
	}

	/// Get a due by ID.
	#[tracing::instrument(skip(self), fields(id = %id))]
	pub async fn get(&self, id: &DueId) -> Result<Option<Due>, DbError> {
		let row = sqlx::query(&format!("{SELECT} WHERE id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;
		row.map(|r| row_to_due(&r)).transpose()
	}

	/// List dues, newest first, optionally scope-filtered.
	#[tracing::instrument(skip(self, scope))]
	pub async fn list(&self, scope: Option<&ScopePredicate>) -> Result<Vec<Due>, DbError> {
		let (sql, binds) = match scope {
			None => (format!("{SELECT} ORDER BY created_at DESC"), Vec::new()),
			Some(predicate) => {
				let (condition, binds) = render_scope(predicate, &SCOPE_COLUMNS);
				(
					format!("{SELECT} WHERE {condition} ORDER BY created_at DESC"),
					binds,
				)
			}
		};

		let mut query = sqlx::query(&sql);
		for bind in &binds {
			query = query.bind(bind);
		}
		let rows = query.fetch_all(&self.pool).await?;
		rows.iter().map(row_to_due).collect()
	}

	/// Mark a due paid. A no-op on an already-paid due; returns whether
	/// this call settled it.
	#[tracing::instrument(skip(self), fields(id = %id))]
	pub async fn mark_paid(&self, id: &DueId) -> Result<bool, DbError> {
		let result = sqlx::query("UPDATE dues SET is_paid = 1, paid_at = ? WHERE id = ? AND is_paid = 0")
			.bind(Utc::now().to_rfc3339())
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}
}

fn row_to_due(row: &sqlx::sqlite::SqliteRow) -> Result<Due, DbError> {
	let id: String = row.try_get("id")?;
	let user_id: String = row.try_get("user_id")?;
	let is_paid: i64 = row.try_get("is_paid")?;
	let paid_at: Option<String> = row.try_get("paid_at")?;
	let created_at: String = row.try_get("created_at")?;

	Ok(Due {
		id: DueId::new(parse_uuid(&id)?),
		user_id: UserId::new(parse_uuid(&user_id)?),
		amount_cents: row.try_get("amount_cents")?,
		description: row.try_get("description")?,
		is_paid: is_paid != 0,
		paid_at: parse_opt_ts(paid_at)?,
		created_at: parse_ts(&created_at)?,
	})
}
