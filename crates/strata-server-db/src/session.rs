// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Session repository.
//!
//! Sessions hold only a sha256 hash of the bearer token; the raw token is
//! returned exactly once, at mint time.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sqlx::{sqlite::SqlitePool, Row};
use strata_server_auth::middleware::{hash_token, SESSION_TOKEN_PREFIX};
use strata_server_auth::{SessionId, UserId};

use crate::error::DbError;
use crate::types::{parse_ts, parse_uuid};

/// A stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
	pub id: SessionId,
	pub user_id: UserId,
	pub token_hash: String,
	pub created_at: DateTime<Utc>,
	pub last_used_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
}

/// Repository for bearer sessions.
#[derive(Clone)]
pub struct SessionRepository {
	pool: SqlitePool,
}

impl SessionRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Mint a session for a user, returning the stored row and the raw
	/// bearer token. The token is not recoverable afterwards.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn create_session(
		&self,
		user_id: &UserId,
		ttl: Duration,
	) -> Result<(Session, String), DbError> {
		let mut bytes = [0u8; 32];
		rand::thread_rng().fill_bytes(&mut bytes);
		let token = format!("{SESSION_TOKEN_PREFIX}{}", hex::encode(bytes));

		let now = Utc::now();
		let session = Session {
			id: SessionId::generate(),
			user_id: *user_id,
			token_hash: hash_token(&token),
			created_at: now,
			last_used_at: now,
			expires_at: now + ttl,
		};

		sqlx::query(
			r#"
			INSERT INTO sessions (id, user_id, token_hash, created_at, last_used_at, expires_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(session.id.to_string())
		.bind(session.user_id.to_string())
		.bind(&session.token_hash)
		.bind(session.created_at.to_rfc3339())
		.bind(session.last_used_at.to_rfc3339())
		.bind(session.expires_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(session_id = %session.id, "session created");
		Ok((session, token))
	}

	/// Resolve an unexpired session by token hash.
	#[tracing::instrument(skip(self, token_hash))]
	pub async fn get_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, user_id, token_hash, created_at, last_used_at, expires_at
			FROM sessions
			WHERE token_hash = ? AND expires_at > ?
			"#,
		)
		.bind(token_hash)
		.bind(Utc::now().to_rfc3339())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_session(&r)).transpose()
	}

	/// Stamp a session as used.
	#[tracing::instrument(skip(self), fields(session_id = %id))]
	pub async fn touch(&self, id: &SessionId) -> Result<(), DbError> {
		sqlx::query("UPDATE sessions SET last_used_at = ? WHERE id = ?")
			.bind(Utc::now().to_rfc3339())
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	/// Delete expired sessions; returns how many were removed.
	#[tracing::instrument(skip(self))]
	pub async fn delete_expired(&self) -> Result<u64, DbError> {
		let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
			.bind(Utc::now().to_rfc3339())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected())
	}
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<Session, DbError> {
	let id: String = row.try_get("id")?;
	let user_id: String = row.try_get("user_id")?;
	let created_at: String = row.try_get("created_at")?;
	let last_used_at: String = row.try_get("last_used_at")?;
	let expires_at: String = row.try_get("expires_at")?;

	Ok(Session {
		id: SessionId::new(parse_uuid(&id)?),
		user_id: UserId::new(parse_uuid(&user_id)?),
		token_hash: row.try_get("token_hash")?,
		created_at: parse_ts(&created_at)?,
		last_used_at: parse_ts(&last_used_at)?,
		expires_at: parse_ts(&expires_at)?,
	})
}
