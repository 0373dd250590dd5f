// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared test helpers: in-memory pools and seed data.

use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use strata_server_auth::{BlockId, Role, User, UserId};

use crate::schema::run_migrations;
use crate::user::UserRepository;

/// An in-memory pool with the full schema applied.
pub async fn create_test_pool() -> SqlitePool {
	let pool = SqlitePool::connect(":memory:").await.unwrap();
	run_migrations(&pool).await.unwrap();
	pool
}

/// Insert and return a user with the given role and optional address.
pub async fn seed_user(
	pool: &SqlitePool,
	role: Role,
	home_block: Option<&str>,
	home_unit: Option<&str>,
) -> User {
	let id = UserId::generate();
	let now = Utc::now();
	let user = User {
		id,
		name: format!("{role} {id}"),
		email: format!("{id}@example.com"),
		role,
		phone: None,
		home_block: home_block.and_then(BlockId::parse),
		home_unit: home_unit.map(str::to_string),
		created_at: now,
		updated_at: now,
	};
	UserRepository::new(pool.clone())
		.create_user(&user)
		.await
		.unwrap();
	user
}

/// Insert a resident living at the given address.
pub async fn seed_resident(pool: &SqlitePool, block: &str, unit: &str) -> User {
	seed_user(pool, Role::Resident, Some(block), Some(unit)).await
}

/// Insert a caretaker (assignments are seeded separately).
pub async fn seed_caretaker(pool: &SqlitePool) -> User {
	seed_user(pool, Role::Caretaker, None, None).await
}
