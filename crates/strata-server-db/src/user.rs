// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! User repository.

use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use strata_server_auth::{BlockId, Role, User, UserId};

use crate::error::DbError;
use crate::types::{parse_ts, parse_uuid};

/// Repository for user accounts.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a user.
	///
	/// # Errors
	/// Returns `DbError::Sqlx` if the insert fails (e.g., duplicate email).
	#[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
	pub async fn create_user(&self, user: &User) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO users (id, name, email, role, phone, home_block, home_unit, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(user.id.to_string())
		.bind(&user.name)
		.bind(&user.email)
		.bind(user.role.to_string())
		.bind(user.phone.as_deref())
		.bind(user.home_block.as_ref().map(|b| b.to_string()))
		.bind(user.home_unit.as_deref())
		.bind(user.created_at.to_rfc3339())
		.bind(user.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(user_id = %user.id, "user created");
		Ok(())
	}

	/// Get a user by ID.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, email, role, phone, home_block, home_unit, created_at, updated_at
			FROM users
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}

	/// Get a user by email.
	#[tracing::instrument(skip(self, email))]
	pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, email, role, phone, home_block, home_unit, created_at, updated_at
			FROM users
			WHERE email = ?
			"#,
		)
		.bind(email)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}

	/// Find the resident living at the given block/unit address.
	///
	/// Used by parcel matching. Returns the first match; addresses are
	/// expected to be unique but that is not enforced by the schema.
	#[tracing::instrument(skip(self), fields(block = %block, unit = %unit))]
	pub async fn find_resident_by_address(
		&self,
		block: &BlockId,
		unit: &str,
	) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, email, role, phone, home_block, home_unit, created_at, updated_at
			FROM users
			WHERE role = 'resident' AND home_block = ? AND home_unit = ?
			"#,
		)
		.bind(block.to_string())
		.bind(unit)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}

	/// All users except the given one, for the messaging contact list.
	#[tracing::instrument(skip(self), fields(user_id = %excluding))]
	pub async fn list_contacts(&self, excluding: &UserId) -> Result<Vec<User>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, email, role, phone, home_block, home_unit, created_at, updated_at
			FROM users
			WHERE id != ?
			ORDER BY name
			"#,
		)
		.bind(excluding.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_user).collect()
	}

	/// Update a user's mutable profile fields.
	#[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
	pub async fn update_user(&self, user: &User) -> Result<(), DbError> {
		let now = Utc::now().to_rfc3339();
		sqlx::query(
			r#"
			UPDATE users
			SET name = ?, phone = ?, home_block = ?, home_unit = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&user.name)
		.bind(user.phone.as_deref())
		.bind(user.home_block.as_ref().map(|b| b.to_string()))
		.bind(user.home_unit.as_deref())
		.bind(now)
		.bind(user.id.to_string())
		.execute(&self.pool)
		.await?;
		Ok(())
	}
}

pub(crate) fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, DbError> {
	let id: String = row.try_get("id")?;
	let role: String = row.try_get("role")?;
	let home_block: Option<String> = row.try_get("home_block")?;
	let created_at: String = row.try_get("created_at")?;
	let updated_at: String = row.try_get("updated_at")?;

	Ok(User {
		id: UserId::new(parse_uuid(&id)?),
		name: row.try_get("name")?,
		email: row.try_get("email")?,
		role: Role::parse(&role)
			.ok_or_else(|| DbError::Internal(format!("Unknown role in row: {role}")))?,
		phone: row.try_get("phone")?,
		home_block: home_block.as_deref().and_then(BlockId::parse),
		home_unit: row.try_get("home_unit")?,
		created_at: parse_ts(&created_at)?,
		updated_at: parse_ts(&updated_at)?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{create_test_pool, seed_resident, seed_user};

	#[tokio::test]
	async fn create_and_fetch_roundtrip() {
		let pool = create_test_pool().await;
		let user = seed_resident(&pool, "A", "5").await;

		let repo = UserRepository::new(pool);
		let fetched = repo.get_user_by_id(&user.id).await.unwrap().unwrap();
		assert_eq!(fetched.id, user.id);
		assert_eq!(fetched.role, Role::Resident);
		assert_eq!(fetched.home_block, BlockId::parse("A"));

		let by_email = repo.get_user_by_email(&user.email).await.unwrap().unwrap();
		assert_eq!(by_email.id, user.id);
	}

	#[tokio::test]
	async fn address_lookup_finds_resident_only() {
		let pool = create_test_pool().await;
		let resident = seed_resident(&pool, "H", "12").await;
		// A caretaker living at the same address must not match.
		seed_user(&pool, Role::Caretaker, Some("H"), Some("12")).await;

		let repo = UserRepository::new(pool);
		let block = BlockId::parse("H").unwrap();
		let found = repo
			.find_resident_by_address(&block, "12")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(found.id, resident.id);

		assert!(repo
			.find_resident_by_address(&block, "13")
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn contacts_exclude_self() {
		let pool = create_test_pool().await;
		let me = seed_resident(&pool, "A", "1").await;
		let other = seed_resident(&pool, "A", "2").await;

		let repo = UserRepository::new(pool);
		let contacts = repo.list_contacts(&me.id).await.unwrap();
		assert_eq!(contacts.len(), 1);
		assert_eq!(contacts[0].id, other.id);
	}
}
