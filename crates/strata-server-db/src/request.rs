// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Resident request repository.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use std::fmt;
use strata_server_auth::{DueId, RequestId, ResourceAttrs, ScopePredicate, UserId};

use crate::error::DbError;
use crate::scope::{render_scope, ScopeColumns};
use crate::types::{parse_opt_ts, parse_ts, parse_uuid};

const SCOPE_COLUMNS: ScopeColumns = ScopeColumns {
	owner: Some("requester_id"),
	block: None,
	target: Some("target_caretaker_id"),
};

const SELECT: &str = r#"
	SELECT id, title, content, requester_id, target_caretaker_id, status, response,
	       responded_at, created_at, updated_at
	FROM requests
"#;

/// Request lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
	Pending,
	Answered,
	Completed,
}

impl RequestStatus {
	pub fn parse(s: &str) -> Option<RequestStatus> {
		match s {
			"pending" => Some(RequestStatus::Pending),
			"answered" => Some(RequestStatus::Answered),
			"completed" => Some(RequestStatus::Completed),
			_ => None,
		}
	}
}

impl fmt::Display for RequestStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RequestStatus::Pending => write!(f, "pending"),
			RequestStatus::Answered => write!(f, "answered"),
			RequestStatus::Completed => write!(f, "completed"),
		}
	}
}

/// A stored request. `target_caretaker_id = None` means the request is
/// addressed to the site admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
	pub id: RequestId,
	pub title: String,
	pub content: String,
	pub requester_id: UserId,
	pub target_caretaker_id: Option<UserId>,
	pub status: RequestStatus,
	pub response: Option<String>,
	pub responded_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Request {
	/// The policy descriptor for this row.
	pub fn resource_attrs(&self) -> ResourceAttrs {
		ResourceAttrs::request(self.requester_id, self.target_caretaker_id)
	}
}

/// Repository for resident requests.
#[derive(Clone)]
pub struct RequestRepository {
	pool: SqlitePool,
}

impl RequestRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a request.
	#[tracing::instrument(skip(self, request), fields(id = %request.id))]
	pub async fn create(&self, request: &Request) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO requests
				(id, title, content, requester_id, target_caretaker_id, status, response,
				 responded_at, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(request.id.to_string())
		.bind(&request.title)
		.bind(&request.content)
		.bind(request.requester_id.to_string())
		.bind(request.target_caretaker_id.map(|id| id.to_string()))
		.bind(request.status.to_string())
		.bind(request.response.as_deref())
		.bind(request.responded_at.map(|t| t.to_rfc3339()))
		.bind(request.created_at.to_rfc3339())
		.bind(request.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(id = %request.id, "request created");
		Ok(())
	}

	/// Get a request by ID.
	#[tracing::instrument(skip(self), fields(id = %id))]
	pub async fn get(&self, id: &RequestId) -> Result<Option<Request>, DbError> {
		let row = sqlx::query(&format!("{SELECT} WHERE id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;
		row.map(|r| row_to_request(&r)).transpose()
	}

	/// List requests, newest first, optionally scope-filtered.
	#[tracing::instrument(skip(self, scope))]
	pub async fn list(&self, scope: Option<&ScopePredicate>) -> Result<Vec<Request>, DbError> {
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
		rows.iter().map(row_to_request).collect()
	}

	/// Record a response and flip the status to answered.
	#[tracing::instrument(skip(self, response), fields(id = %id))]
	pub async fn respond(&self, id: &RequestId, response: &str) -> Result<(), DbError> {
		let now = Utc::now().to_rfc3339();
		sqlx::query(
			r#"
			UPDATE requests
			SET response = ?, status = 'answered', responded_at = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(response)
		.bind(&now)
		.bind(&now)
		.bind(id.to_string())
		.execute(&self.pool)
		.await?;
		Ok(())
	}

	/// Set the lifecycle status.
	#[tracing::instrument(skip(self), fields(id = %id, status = %status))]
	pub async fn set_status(&self, id: &RequestId, status: RequestStatus) -> Result<(), DbError> {
		sqlx::query("UPDATE requests SET status = ?, updated_at = ? WHERE id = ?")
			.bind(status.to_string())
			.bind(Utc::now().to_rfc3339())
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	/// Complete a request and bill its cost to the requester as a due.
	/// Both writes commit in one transaction.
	#[tracing::instrument(skip(self), fields(id = %request.id, amount_cents))]
	pub async fn complete_with_due(
		&self,
		request: &Request,
		amount_cents: i64,
	) -> Result<(), DbError> {
		let now = Utc::now().to_rfc3339();
		let mut tx = self.pool.begin().await?;

		sqlx::query("UPDATE requests SET status = 'completed', updated_at = ? WHERE id = ?")
			.bind(&now)
			.bind(request.id.to_string())
			.execute(&mut *tx)
			.await?;

		sqlx::query(
			r#"
			INSERT INTO dues (id, user_id, amount_cents, description, is_paid, paid_at, created_at)
			VALUES (?, ?, ?, ?, 0, NULL, ?)
			"#,
		)
		.bind(DueId::generate().to_string())
		.bind(request.requester_id.to_string())
		.bind(amount_cents)
		.bind(format!("Service charge: {}", request.title))
		.bind(&now)
		.execute(&mut *tx)
		.await?;

		tx.commit().await?;
		tracing::debug!(id = %request.id, "request completed and billed");
		Ok(())
	}

	/// Delete a request; returns false when the row did not exist.
	#[tracing::instrument(skip(self), fields(id = %id))]
	pub async fn delete(&self, id: &RequestId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM requests WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Requests within the window the actor has not yet marked seen,
	/// joined with the requester's display name.
	#[tracing::instrument(skip(self, scope), fields(user_id = %user))]
	pub async fn list_unread_since(
		&self,
		user: &UserId,
		since: DateTime<Utc>,
		scope: Option<&ScopePredicate>,
	) -> Result<Vec<(Request, String)>, DbError> {
		let mut conditions = vec![
			"r.created_at >= ?".to_string(),
			"r.id NOT IN (SELECT resource_id FROM read_markers \
			 WHERE user_id = ? AND resource_type = 'request')"
				.to_string(),
		];
		let mut binds = vec![since.to_rfc3339(), user.to_string()];

		if let Some(predicate) = scope {
			let columns = ScopeColumns {
				owner: Some("r.requester_id"),
				block: None,
				target: Some("r.target_caretaker_id"),
			};
			let (condition, scope_binds) = render_scope(predicate, &columns);
			conditions.push(condition);
			binds.extend(scope_binds);
		}

		let sql = format!(
			r#"
			SELECT r.id, r.title, r.content, r.requester_id, r.target_caretaker_id, r.status,
			       r.response, r.responded_at, r.created_at, r.updated_at, u.name AS requester_name
			FROM requests r
			JOIN users u ON u.id = r.requester_id
			WHERE {}
			ORDER BY r.created_at DESC
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
				let request = row_to_request(row)?;
				let name: String = row.try_get("requester_name")?;
				Ok((request, name))
			})
			.collect()
	}
}

fn row_to_request(row: &sqlx::sqlite::SqliteRow) -> Result<Request, DbError> {
	let id: String = row.try_get("id")?;
	let requester_id: String = row.try_get("requester_id")?;
	let target: Option<String> = row.try_get("target_caretaker_id")?;
	let status: String = row.try_get("status")?;
	let responded_at: Option<String> = row.try_get("responded_at")?;
	let created_at: String = row.try_get("created_at")?;
	let updated_at: String = row.try_get("updated_at")?;

	Ok(Request {
		id: RequestId::new(parse_uuid(&id)?),
		title: row.try_get("title")?,
		content: row.try_get("content")?,
		requester_id: UserId::new(parse_uuid(&requester_id)?),
		target_caretaker_id: target
			.as_deref()
			.map(parse_uuid)
			.transpose()?
			.map(UserId::new),
		status: RequestStatus::parse(&status)
			.ok_or_else(|| DbError::Internal(format!("Unknown request status: {status}")))?,
		response: row.try_get("response")?,
		responded_at: parse_opt_ts(responded_at)?,
		created_at: parse_ts(&created_at)?,
		updated_at: parse_ts(&updated_at)?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::due::DueRepository;
	use crate::testing::{create_test_pool, seed_caretaker, seed_resident};

	fn request(requester: UserId, target: Option<UserId>) -> Request {
		let now = Utc::now();
		Request {
			id: RequestId::generate(),
			title: "Leaking tap".to_string(),
			content: "Kitchen tap drips constantly.".to_string(),
			requester_id: requester,
			target_caretaker_id: target,
			status: RequestStatus::Pending,
			response: None,
			responded_at: None,
			created_at: now,
			updated_at: now,
		}
	}

	#[tokio::test]
	async fn owner_scope_lists_only_own_requests() {
		let pool = create_test_pool().await;
		let r1 = seed_resident(&pool, "A", "1").await;
		let r2 = seed_resident(&pool, "A", "2").await;
		let repo = RequestRepository::new(pool);

		let mine = request(r1.id, None);
		let theirs = request(r2.id, None);
		repo.create(&mine).await.unwrap();
		repo.create(&theirs).await.unwrap();

		let listed = repo
			.list(Some(&ScopePredicate::OwnedBy(r1.id)))
			.await
			.unwrap();
		assert_eq!(listed.len(), 1);
		assert_eq!(listed[0].id, mine.id);
	}

	#[tokio::test]
	async fn untargeted_scope_lists_admin_requests() {
		let pool = create_test_pool().await;
		let resident = seed_resident(&pool, "A", "1").await;
		let caretaker = seed_caretaker(&pool).await;
		let repo = RequestRepository::new(pool);

		let to_admin = request(resident.id, None);
		let to_caretaker = request(resident.id, Some(caretaker.id));
		repo.create(&to_admin).await.unwrap();
		repo.create(&to_caretaker).await.unwrap();

		let listed = repo.list(Some(&ScopePredicate::Untargeted)).await.unwrap();
		assert_eq!(listed.len(), 1);
		assert_eq!(listed[0].id, to_admin.id);

		let listed = repo
			.list(Some(&ScopePredicate::TargetedAt(caretaker.id)))
			.await
			.unwrap();
		assert_eq!(listed.len(), 1);
		assert_eq!(listed[0].id, to_caretaker.id);
	}

	#[tokio::test]
	async fn respond_records_answer() {
		let pool = create_test_pool().await;
		let resident = seed_resident(&pool, "A", "1").await;
		let repo = RequestRepository::new(pool);

		let req = request(resident.id, None);
		repo.create(&req).await.unwrap();
		repo.respond(&req.id, "Fixed tomorrow morning.").await.unwrap();

		let updated = repo.get(&req.id).await.unwrap().unwrap();
		assert_eq!(updated.status, RequestStatus::Answered);
		assert_eq!(updated.response.as_deref(), Some("Fixed tomorrow morning."));
		assert!(updated.responded_at.is_some());
	}

	#[tokio::test]
	async fn completion_bills_the_requester() {
		let pool = create_test_pool().await;
		let resident = seed_resident(&pool, "A", "1").await;
		let caretaker = seed_caretaker(&pool).await;
		let repo = RequestRepository::new(pool.clone());
		let dues = DueRepository::new(pool);

		let req = request(resident.id, Some(caretaker.id));
		repo.create(&req).await.unwrap();
		repo.complete_with_due(&req, 2_500).await.unwrap();

		let updated = repo.get(&req.id).await.unwrap().unwrap();
		assert_eq!(updated.status, RequestStatus::Completed);

		let billed = dues
			.list(Some(&ScopePredicate::OwnedBy(resident.id)))
			.await
			.unwrap();
		assert_eq!(billed.len(), 1);
		assert_eq!(billed[0].amount_cents, 2_500);
		assert!(!billed[0].is_paid);
	}
}
