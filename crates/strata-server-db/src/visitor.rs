// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Visitor repository.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use std::fmt;
use strata_server_auth::{ResourceAttrs, ScopePredicate, UserId, VisitorId, VisitorKind};

use crate::error::DbError;
use crate::scope::{render_scope, ScopeColumns};
use crate::types::{parse_opt_ts, parse_ts, parse_uuid};

const SCOPE_COLUMNS: ScopeColumns = ScopeColumns {
	owner: None,
	block: None,
	target: Some("resident_id"),
};

const SELECT: &str = r#"
	SELECT id, name, phone, purpose, resident_id, kind, status, expected_at, has_vehicle,
	       vehicle_plate, entry_at, exit_at, created_at, updated_at
	FROM visitors
"#;

/// Visitor lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorStatus {
	Pending,
	Approved,
	Rejected,
	Completed,
}

impl VisitorStatus {
	pub fn parse(s: &str) -> Option<VisitorStatus> {
		match s {
			"pending" => Some(VisitorStatus::Pending),
			"approved" => Some(VisitorStatus::Approved),
			"rejected" => Some(VisitorStatus::Rejected),
			"completed" => Some(VisitorStatus::Completed),
			_ => None,
		}
	}
}

impl fmt::Display for VisitorStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			VisitorStatus::Pending => write!(f, "pending"),
			VisitorStatus::Approved => write!(f, "approved"),
			VisitorStatus::Rejected => write!(f, "rejected"),
			VisitorStatus::Completed => write!(f, "completed"),
		}
	}
}

/// A stored visitor record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visitor {
	pub id: VisitorId,
	pub name: String,
	pub phone: String,
	pub purpose: String,
	pub resident_id: UserId,
	pub kind: VisitorKind,
	pub status: VisitorStatus,
	pub expected_at: DateTime<Utc>,
	pub has_vehicle: bool,
	pub vehicle_plate: Option<String>,
	pub entry_at: Option<DateTime<Utc>>,
	pub exit_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Visitor {
	/// The policy descriptor for this row.
	pub fn resource_attrs(&self) -> ResourceAttrs {
		ResourceAttrs::visitor(self.kind, self.resident_id)
	}
}

/// Gate-dashboard aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitorStats {
	/// Approved visitors that have not exited.
	pub active: i64,
	/// Records awaiting a gate decision.
	pub pending: i64,
	/// Approved vehicle visitors still on site (guest parking usage).
	pub vehicles_present: i64,
}

/// Repository for visitor records.
#[derive(Clone)]
pub struct VisitorRepository {
	pool: SqlitePool,
}

impl VisitorRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a visitor record.
	#[tracing::instrument(skip(self, visitor), fields(id = %visitor.id))]
	pub async fn create(&self, visitor: &Visitor) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO visitors
				(id, name, phone, purpose, resident_id, kind, status, expected_at, has_vehicle,
				 vehicle_plate, entry_at, exit_at, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(visitor.id.to_string())
		.bind(&visitor.name)
		.bind(&visitor.phone)
		.bind(&visitor.purpose)
		.bind(visitor.resident_id.to_string())
		.bind(visitor.kind.to_string())
		.bind(visitor.status.to_string())
		.bind(visitor.expected_at.to_rfc3339())
		.bind(visitor.has_vehicle as i32)
		.bind(visitor.vehicle_plate.as_deref())
		.bind(visitor.entry_at.map(|t| t.to_rfc3339()))
		.bind(visitor.exit_at.map(|t| t.to_rfc3339()))
		.bind(visitor.created_at.to_rfc3339())
		.bind(visitor.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(id = %visitor.id, "visitor record created");
		Ok(())
	}

	/// Get a visitor record by ID.
	#[tracing::instrument(skip(self), fields(id = %id))]
	pub async fn get(&self, id: &VisitorId) -> Result<Option<Visitor>, DbError> {
		let row = sqlx::query(&format!("{SELECT} WHERE id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;
		row.map(|r| row_to_visitor(&r)).transpose()
	}

	/// List visitor records, newest first, optionally scope-filtered.
	#[tracing::instrument(skip(self, scope))]
	pub async fn list(&self, scope: Option<&ScopePredicate>) -> Result<Vec<Visitor>, DbError> {
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
		rows.iter().map(row_to_visitor).collect()
	}

	/// Set the gate decision. Approving a vehicle visitor with no entry
	/// stamp records their entry at the same moment.
	#[tracing::instrument(skip(self), fields(id = %id, status = %status))]
	pub async fn set_status(&self, id: &VisitorId, status: VisitorStatus) -> Result<(), DbError> {
		let now = Utc::now().to_rfc3339();
		sqlx::query(
			r#"
			UPDATE visitors
			SET status = ?,
			    entry_at = CASE
			        WHEN ? = 'approved' AND has_vehicle = 1 AND entry_at IS NULL THEN ?
			        ELSE entry_at
			    END,
			    updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(status.to_string())
		.bind(status.to_string())
		.bind(&now)
		.bind(&now)
		.bind(id.to_string())
		.execute(&self.pool)
		.await?;
		Ok(())
	}

	/// Stamp the gate entry time.
	#[tracing::instrument(skip(self), fields(id = %id))]
	pub async fn mark_enter(&self, id: &VisitorId) -> Result<(), DbError> {
		let now = Utc::now().to_rfc3339();
		sqlx::query("UPDATE visitors SET entry_at = ?, updated_at = ? WHERE id = ?")
			.bind(&now)
			.bind(&now)
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	/// Stamp the gate exit time.
	#[tracing::instrument(skip(self), fields(id = %id))]
	pub async fn mark_exit(&self, id: &VisitorId) -> Result<(), DbError> {
		let now = Utc::now().to_rfc3339();
		sqlx::query("UPDATE visitors SET exit_at = ?, updated_at = ? WHERE id = ?")
			.bind(&now)
			.bind(&now)
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	/// Delete a visitor record; returns false when the row did not exist.
	#[tracing::instrument(skip(self), fields(id = %id))]
	pub async fn delete(&self, id: &VisitorId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM visitors WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Gate-dashboard aggregates.
	#[tracing::instrument(skip(self))]
	pub async fn stats(&self) -> Result<VisitorStats, DbError> {
		let row = sqlx::query(
			r#"
			SELECT
				COALESCE(SUM(CASE WHEN status = 'approved' AND exit_at IS NULL THEN 1 ELSE 0 END), 0)
					AS active,
				COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending,
				COALESCE(SUM(CASE WHEN status = 'approved' AND exit_at IS NULL AND has_vehicle = 1
					THEN 1 ELSE 0 END), 0) AS vehicles_present
			FROM visitors
			"#,
		)
		.fetch_one(&self.pool)
		.await?;

		Ok(VisitorStats {
			active: row.try_get("active")?,
			pending: row.try_get("pending")?,
			vehicles_present: row.try_get("vehicles_present")?,
		})
	}

	/// Per-day visitor counts since the given instant, optionally
	/// scope-filtered, as (yyyy-mm-dd, count) pairs.
	#[tracing::instrument(skip(self, scope))]
	pub async fn daily_counts(
		&self,
		since: DateTime<Utc>,
		scope: Option<&ScopePredicate>,
	) -> Result<Vec<(String, i64)>, DbError> {
		let mut conditions = vec!["created_at >= ?".to_string()];
		let mut binds = vec![since.to_rfc3339()];
		if let Some(predicate) = scope {
			let (condition, scope_binds) = render_scope(predicate, &SCOPE_COLUMNS);
			conditions.push(condition);
			binds.extend(scope_binds);
		}

		let sql = format!(
			r#"
			SELECT date(created_at) AS day, COUNT(*) AS count
			FROM visitors
			WHERE {}
			GROUP BY date(created_at)
			ORDER BY day
			"#,
			conditions.join(" AND ")
		);

		let mut query = sqlx::query(&sql);
		for bind in &binds {
			query = query.bind(bind);
		}
		let rows = query.fetch_all(&self.pool).await?;
		rows.iter()
			.map(|row| {
				let day: String = row.try_get("day")?;
				let count: i64 = row.try_get("count")?;
				Ok((day, count))
			})
			.collect()
	}

	/// Visitor records within the window the actor has not yet marked
	/// seen, scope-filtered.
	#[tracing::instrument(skip(self, scope), fields(user_id = %user))]
	pub async fn list_unread_since(
		&self,
		user: &UserId,
		since: DateTime<Utc>,
		scope: Option<&ScopePredicate>,
	) -> Result<Vec<Visitor>, DbError> {
		let mut conditions = vec![
			"created_at >= ?".to_string(),
			"id NOT IN (SELECT resource_id FROM read_markers \
			 WHERE user_id = ? AND resource_type = 'visitor')"
				.to_string(),
		];
		let mut binds = vec![since.to_rfc3339(), user.to_string()];

		if let Some(predicate) = scope {
			let (condition, scope_binds) = render_scope(predicate, &SCOPE_COLUMNS);
			conditions.push(condition);
			binds.extend(scope_binds);
		}

		let sql = format!(
			"{SELECT} WHERE {} ORDER BY created_at DESC",
			conditions.join(" AND ")
		);
		let mut query = sqlx::query(&sql);
		for bind in &binds {
			query = query.bind(bind);
		}
		let rows = query.fetch_all(&self.pool).await?;
		rows.iter().map(row_to_visitor).collect()
	}
}

fn row_to_visitor(row: &sqlx::sqlite::SqliteRow) -> Result<Visitor, DbError> {
	let id: String = row.try_get("id")?;
	let resident_id: String = row.try_get("resident_id")?;
	let kind: String = row.try_get("kind")?;
	let status: String = row.try_get("status")?;
	let expected_at: String = row.try_get("expected_at")?;
	let has_vehicle: i64 = row.try_get("has_vehicle")?;
	let entry_at: Option<String> = row.try_get("entry_at")?;
	let exit_at: Option<String> = row.try_get("exit_at")?;
	let created_at: String = row.try_get("created_at")?;
	let updated_at: String = row.try_get("updated_at")?;

	Ok(Visitor {
		id: VisitorId::new(parse_uuid(&id)?),
		name: row.try_get("name")?,
		phone: row.try_get("phone")?,
		purpose: row.try_get("purpose")?,
		resident_id: UserId::new(parse_uuid(&resident_id)?),
		kind: VisitorKind::parse(&kind)
			.ok_or_else(|| DbError::Internal(format!("Unknown visitor kind: {kind}")))?,
		status: VisitorStatus::parse(&status)
			.ok_or_else(|| DbError::Internal(format!("Unknown visitor status: {status}")))?,
		expected_at: parse_ts(&expected_at)?,
		has_vehicle: has_vehicle != 0,
		vehicle_plate: row.try_get("vehicle_plate")?,
		entry_at: parse_opt_ts(entry_at)?,
		exit_at: parse_opt_ts(exit_at)?,
		created_at: parse_ts(&created_at)?,
		updated_at: parse_ts(&updated_at)?,
	})
}
