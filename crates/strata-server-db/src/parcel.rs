// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Parcel repository (parcels and resident notes).

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use std::fmt;
use strata_server_auth::{BlockId, ParcelId, ResourceAttrs, ScopePredicate, UserId};
use uuid::Uuid;

use crate::error::DbError;
use crate::scope::{render_scope, ScopeColumns};
use crate::types::{parse_opt_ts, parse_ts, parse_uuid};

const SCOPE_COLUMNS: ScopeColumns = ScopeColumns {
	owner: None,
	block: Some("block"),
	target: Some("resident_id"),
};

const SELECT: &str = r#"
	SELECT id, recipient_name, phone, company, tracking_number, status, block, unit,
	       resident_id, delivered_at, created_at, updated_at
	FROM parcels
"#;

/// Parcel delivery status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParcelStatus {
	Pending,
	Delivered,
}

impl ParcelStatus {
	pub fn parse(s: &str) -> Option<ParcelStatus> {
		match s {
			"pending" => Some(ParcelStatus::Pending),
			"delivered" => Some(ParcelStatus::Delivered),
			_ => None,
		}
	}
}

impl fmt::Display for ParcelStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ParcelStatus::Pending => write!(f, "pending"),
			ParcelStatus::Delivered => write!(f, "delivered"),
		}
	}
}

/// A stored parcel. `resident_id` stays `None` until address matching
/// finds the recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parcel {
	pub id: ParcelId,
	pub recipient_name: String,
	pub phone: String,
	pub company: String,
	pub tracking_number: String,
	pub status: ParcelStatus,
	pub block: Option<BlockId>,
	pub unit: Option<String>,
	pub resident_id: Option<UserId>,
	pub delivered_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Parcel {
	/// The policy descriptor for this row.
	pub fn resource_attrs(&self) -> ResourceAttrs {
		ResourceAttrs::parcel(self.block.clone(), self.resident_id)
			.delivered(self.status == ParcelStatus::Delivered)
	}
}

/// A note a resident left on their parcel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParcelNote {
	pub id: Uuid,
	pub parcel_id: ParcelId,
	pub author_id: UserId,
	pub content: String,
	pub created_at: DateTime<Utc>,
}

/// Repository for parcels.
#[derive(Clone)]
pub struct ParcelRepository {
	pool: SqlitePool,
}

impl ParcelRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a parcel.
	#[tracing::instrument(skip(self, parcel), fields(id = %parcel.id))]
	pub async fn create(&self, parcel: &Parcel) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO parcels
				(id, recipient_name, phone, company, tracking_number, status, block, unit,
				 resident_id, delivered_at, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(parcel.id.to_string())
		.bind(&parcel.recipient_name)
		.bind(&parcel.phone)
		.bind(&parcel.company)
		.bind(&parcel.tracking_number)
		.bind(parcel.status.to_string())
		.bind(parcel.block.as_ref().map(|b| b.to_string()))
		.bind(parcel.unit.as_deref())
		.bind(parcel.resident_id.map(|id| id.to_string()))
		.bind(parcel.delivered_at.map(|t| t.to_rfc3339()))
		.bind(parcel.created_at.to_rfc3339())
		.bind(parcel.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(id = %parcel.id, "parcel created");
		Ok(())
	}

	/// Get a parcel by ID.
	#[tracing::instrument(skip(self), fields(id = %id))]
	pub async fn get(&self, id: &ParcelId) -> Result<Option<Parcel>, DbError> {
		let row = sqlx::query(&format!("{SELECT} WHERE id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;
		row.map(|r| row_to_parcel(&r)).transpose()
	}

	/// List parcels, newest first, optionally scope-filtered.
	#[tracing::instrument(skip(self, scope))]
	pub async fn list(&self, scope: Option<&ScopePredicate>) -> Result<Vec<Parcel>, DbError> {
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
		rows.iter().map(row_to_parcel).collect()
	}

	/// Set the delivery status, stamping `delivered_at` on delivery.
	#[tracing::instrument(skip(self), fields(id = %id, status = %status))]
	pub async fn set_status(&self, id: &ParcelId, status: ParcelStatus) -> Result<(), DbError> {
		let now = Utc::now().to_rfc3339();
		let delivered_at = match status {
			ParcelStatus::Delivered => Some(now.clone()),
			ParcelStatus::Pending => None,
		};
		sqlx::query("UPDATE parcels SET status = ?, delivered_at = ?, updated_at = ? WHERE id = ?")
			.bind(status.to_string())
			.bind(delivered_at)
			.bind(&now)
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	/// Attach the matched resident.
	#[tracing::instrument(skip(self), fields(id = %id, resident_id = %resident))]
	pub async fn set_resident(&self, id: &ParcelId, resident: &UserId) -> Result<(), DbError> {
		sqlx::query("UPDATE parcels SET resident_id = ?, updated_at = ? WHERE id = ?")
			.bind(resident.to_string())
			.bind(Utc::now().to_rfc3339())
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	/// Delete a parcel; returns false when the row did not exist.
	#[tracing::instrument(skip(self), fields(id = %id))]
	pub async fn delete(&self, id: &ParcelId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM parcels WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Insert a resident note.
	#[tracing::instrument(skip(self, note), fields(parcel_id = %note.parcel_id))]
	pub async fn add_note(&self, note: &ParcelNote) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO parcel_notes (id, parcel_id, author_id, content, created_at)
			VALUES (?, ?, ?, ?, ?)
			"#,
		)
		.bind(note.id.to_string())
		.bind(note.parcel_id.to_string())
		.bind(note.author_id.to_string())
		.bind(&note.content)
		.bind(note.created_at.to_rfc3339())
		.execute(&self.pool)
		.await?;
		Ok(())
	}

	/// Notes on one parcel, newest first.
	#[tracing::instrument(skip(self), fields(parcel_id = %parcel))]
	pub async fn list_notes(&self, parcel: &ParcelId) -> Result<Vec<ParcelNote>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, parcel_id, author_id, content, created_at
			FROM parcel_notes
			WHERE parcel_id = ?
			ORDER BY created_at DESC
			"#,
		)
		.bind(parcel.to_string())
		.fetch_all(&self.pool)
		.await?;
		rows.iter().map(row_to_note).collect()
	}

	/// Notes within the window on parcels matching the scope, joined with
	/// the author's display name. Feeds caretaker notifications.
	#[tracing::instrument(skip(self, scope))]
	pub async fn list_notes_since(
		&self,
		since: DateTime<Utc>,
		scope: &ScopePredicate,
	) -> Result<Vec<(ParcelNote, String)>, DbError> {
		let columns = ScopeColumns {
			owner: None,
			block: Some("p.block"),
			target: Some("p.resident_id"),
		};
		let (condition, scope_binds) = render_scope(scope, &columns);

		let sql = format!(
			r#"
			SELECT n.id, n.parcel_id, n.author_id, n.content, n.created_at, u.name AS author_name
			FROM parcel_notes n
			JOIN parcels p ON p.id = n.parcel_id
			JOIN users u ON u.id = n.author_id
			WHERE n.created_at >= ? AND {condition}
			ORDER BY n.created_at DESC
			"#
		);

		let mut query = sqlx::query(&sql).bind(since.to_rfc3339());
		for bind in &scope_binds {
			query = query.bind(bind);
		}
		let rows = query.fetch_all(&self.pool).await?;
		rows.iter()
			.map(|row| {
				let note = row_to_note(row)?;
				let name: String = row.try_get("author_name")?;
				Ok((note, name))
			})
			.collect()
	}

	/// Per-day parcel counts since the given instant, as (yyyy-mm-dd,
	/// count) pairs. Missing days are absent; callers zero-fill.
	#[tracing::instrument(skip(self))]
	pub async fn daily_counts(&self, since: DateTime<Utc>) -> Result<Vec<(String, i64)>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT date(created_at) AS day, COUNT(*) AS count
			FROM parcels
			WHERE created_at >= ?
			GROUP BY date(created_at)
			ORDER BY day
			"#,
		)
		.bind(since.to_rfc3339())
		.fetch_all(&self.pool)
		.await?;

		rows.iter()
			.map(|row| {
				let day: String = row.try_get("day")?;
				let count: i64 = row.try_get("count")?;
				Ok((day, count))
			})
			.collect()
	}
}

fn row_to_parcel(row: &sqlx::sqlite::SqliteRow) -> Result<Parcel, DbError> {
	let id: String = row.try_get("id")?;
	let status: String = row.try_get("status")?;
	let block: Option<String> = row.try_get("block")?;
	let resident_id: Option<String> = row.try_get("resident_id")?;
	let delivered_at: Option<String> = row.try_get("delivered_at")?;
	let created_at: String = row.try_get("created_at")?;
	let updated_at: String = row.try_get("updated_at")?;

	Ok(Parcel {
		id: ParcelId::new(parse_uuid(&id)?),
		recipient_name: row.try_get("recipient_name")?,
		phone: row.try_get("phone")?,
		company: row.try_get("company")?,
		tracking_number: row.try_get("tracking_number")?,
		status: ParcelStatus::parse(&status)
			.ok_or_else(|| DbError::Internal(format!("Unknown parcel status: {status}")))?,
		block: block.as_deref().and_then(BlockId::parse),
		unit: row.try_get("unit")?,
		resident_id: resident_id
			.as_deref()
			.map(parse_uuid)
			.transpose()?
			.map(UserId::new),
		delivered_at: parse_opt_ts(delivered_at)?,
		created_at: parse_ts(&created_at)?,
		updated_at: parse_ts(&updated_at)?,
	})
}

fn row_to_note(row: &sqlx::sqlite::SqliteRow) -> Result<ParcelNote, DbError> {
	let id: String = row.try_get("id")?;
	let parcel_id: String = row.try_get("parcel_id")?;
	let author_id: String = row.try_get("author_id")?;
	let created_at: String = row.try_get("created_at")?;

	Ok(ParcelNote {
		id: parse_uuid(&id)?,
		parcel_id: ParcelId::new(parse_uuid(&parcel_id)?),
		author_id: UserId::new(parse_uuid(&author_id)?),
		content: row.try_get("content")?,
		created_at: parse_ts(&created_at)?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{create_test_pool, seed_resident};

	fn block(label: &str) -> BlockId {
		BlockId::parse(label).unwrap()
	}

	fn parcel(block_label: Option<&str>, resident: Option<UserId>) -> Parcel {
		let now = Utc::now();
		Parcel {
			id: ParcelId::generate(),
			recipient_name: "Jane Doe".to_string(),
			phone: "555-0100".to_string(),
			company: "FastShip".to_string(),
			tracking_number: "FS123456".to_string(),
			status: ParcelStatus::Pending,
			block: block_label.and_then(BlockId::parse),
			unit: Some("5".to_string()),
			resident_id: resident,
			delivered_at: None,
			created_at: now,
			updated_at: now,
		}
	}

	#[tokio::test]
	async fn block_scope_excludes_other_blocks_and_unaddressed() {
		let pool = create_test_pool().await;
		let repo = ParcelRepository::new(pool);

		let in_h = parcel(Some("H"), None);
		let in_i = parcel(Some("I"), None);
		let unaddressed = parcel(None, None);
		for p in [&in_h, &in_i, &unaddressed] {
			repo.create(p).await.unwrap();
		}

		let predicate = ScopePredicate::in_blocks([block("H")].into(), false);
		let listed = repo.list(Some(&predicate)).await.unwrap();
		assert_eq!(listed.len(), 1);
		assert_eq!(listed[0].id, in_h.id);
	}

	#[tokio::test]
	async fn delivery_stamps_timestamp() {
		let pool = create_test_pool().await;
		let repo = ParcelRepository::new(pool);

		let p = parcel(Some("H"), None);
		repo.create(&p).await.unwrap();
		repo.set_status(&p.id, ParcelStatus::Delivered).await.unwrap();

		let updated = repo.get(&p.id).await.unwrap().unwrap();
		assert_eq!(updated.status, ParcelStatus::Delivered);
		assert!(updated.delivered_at.is_some());
		assert!(updated.resource_attrs().is_delivered);
	}

	#[tokio::test]
	async fn resident_matching_updates_scope_target() {
		let pool = create_test_pool().await;
		let resident = seed_resident(&pool, "H", "5").await;
		let repo = ParcelRepository::new(pool);

		let p = parcel(Some("H"), None);
		repo.create(&p).await.unwrap();
		repo.set_resident(&p.id, &resident.id).await.unwrap();

		let updated = repo.get(&p.id).await.unwrap().unwrap();
		assert_eq!(updated.resident_id, Some(resident.id));
		assert!(ScopePredicate::TargetedAt(resident.id).matches(&updated.resource_attrs()));
	}

	#[tokio::test]
	async fn notes_roundtrip_and_scope_filtered_feed() {
		let pool = create_test_pool().await;
		let resident = seed_resident(&pool, "H", "5").await;
		let repo = ParcelRepository::new(pool);

		let p = parcel(Some("H"), Some(resident.id));
		repo.create(&p).await.unwrap();

		let note = ParcelNote {
			id: Uuid::new_v4(),
			parcel_id: p.id,
			author_id: resident.id,
			content: "Please leave with the doorman.".to_string(),
			created_at: Utc::now(),
		};
		repo.add_note(&note).await.unwrap();

		assert_eq!(repo.list_notes(&p.id).await.unwrap().len(), 1);

		let since = Utc::now() - chrono::Duration::days(14);
		let in_h = ScopePredicate::in_blocks([block("H")].into(), false);
		let feed = repo.list_notes_since(since, &in_h).await.unwrap();
		assert_eq!(feed.len(), 1);
		assert_eq!(feed[0].0.id, note.id);
		assert_eq!(feed[0].1, resident.name);

		let in_i = ScopePredicate::in_blocks([block("I")].into(), false);
		assert!(repo.list_notes_since(since, &in_i).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn daily_counts_group_by_day() {
		let pool = create_test_pool().await;
		let repo = ParcelRepository::new(pool);

		repo.create(&parcel(Some("H"), None)).await.unwrap();
		repo.create(&parcel(Some("H"), None)).await.unwrap();

		let since = Utc::now() - chrono::Duration::days(7);
		let counts = repo.daily_counts(since).await.unwrap();
		assert_eq!(counts.len(), 1);
		assert_eq!(counts[0].1, 2);
	}
}
