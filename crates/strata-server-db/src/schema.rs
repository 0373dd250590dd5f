// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Schema bootstrap.
//!
//! Tables are created idempotently at startup. All IDs are UUIDs stored
//! as TEXT, timestamps are RFC 3339 TEXT, booleans are INTEGER 0/1.

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

const TABLES: &[&str] = &[
	r#"
	CREATE TABLE IF NOT EXISTS users (
		id TEXT PRIMARY KEY,
		name TEXT NOT NULL,
		email TEXT NOT NULL UNIQUE,
		role TEXT NOT NULL CHECK (role IN ('admin', 'security', 'caretaker', 'resident')),
		phone TEXT,
		home_block TEXT,
		home_unit TEXT,
		created_at TEXT NOT NULL,
		updated_at TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS sessions (
		id TEXT PRIMARY KEY,
		user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
		token_hash TEXT NOT NULL,
		created_at TEXT NOT NULL,
		last_used_at TEXT NOT NULL,
		expires_at TEXT NOT NULL
	)
	"#,
	// Duplicate (caretaker, block) pairs are tolerated by design; the
	// directory treats them as one assignment.
	r#"
	CREATE TABLE IF NOT EXISTS caretaker_assignments (
		id TEXT PRIMARY KEY,
		caretaker_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
		block TEXT NOT NULL,
		created_at TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS announcements (
		id TEXT PRIMARY KEY,
		title TEXT NOT NULL,
		content TEXT NOT NULL,
		category TEXT NOT NULL,
		is_important INTEGER NOT NULL DEFAULT 0,
		is_urgent INTEGER NOT NULL DEFAULT 0,
		author_id TEXT NOT NULL REFERENCES users(id),
		scope_block TEXT,
		created_at TEXT NOT NULL,
		updated_at TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS requests (
		id TEXT PRIMARY KEY,
		title TEXT NOT NULL,
		content TEXT NOT NULL,
		requester_id TEXT NOT NULL REFERENCES users(id),
		target_caretaker_id TEXT REFERENCES users(id),
		status TEXT NOT NULL CHECK (status IN ('pending', 'answered', 'completed')),
		response TEXT,
		responded_at TEXT,
		created_at TEXT NOT NULL,
		updated_at TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS parcels (
		id TEXT PRIMARY KEY,
		recipient_name TEXT NOT NULL,
		phone TEXT NOT NULL,
		company TEXT NOT NULL,
		tracking_number TEXT NOT NULL,
		status TEXT NOT NULL CHECK (status IN ('pending', 'delivered')),
		block TEXT,
		unit TEXT,
		resident_id TEXT REFERENCES users(id),
		delivered_at TEXT,
		created_at TEXT NOT NULL,
		updated_at TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS parcel_notes (
		id TEXT PRIMARY KEY,
		parcel_id TEXT NOT NULL REFERENCES parcels(id) ON DELETE CASCADE,
		author_id TEXT NOT NULL REFERENCES users(id),
		content TEXT NOT NULL,
		created_at TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS visitors (
		id TEXT PRIMARY KEY,
		name TEXT NOT NULL,
		phone TEXT NOT NULL,
		purpose TEXT NOT NULL,
		resident_id TEXT NOT NULL REFERENCES users(id),
		kind TEXT NOT NULL CHECK (kind IN ('guest_notice', 'visitor_log')),
		status TEXT NOT NULL CHECK (status IN ('pending', 'approved', 'rejected', 'completed')),
		expected_at TEXT NOT NULL,
		has_vehicle INTEGER NOT NULL DEFAULT 0,
		vehicle_plate TEXT,
		entry_at TEXT,
		exit_at TEXT,
		created_at TEXT NOT NULL,
		updated_at TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS dues (
		id TEXT PRIMARY KEY,
		user_id TEXT NOT NULL REFERENCES users(id),
		amount_cents INTEGER NOT NULL,
		description TEXT NOT NULL,
		is_paid INTEGER NOT NULL DEFAULT 0,
		paid_at TEXT,
		created_at TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS cameras (
		id TEXT PRIMARY KEY,
		name TEXT NOT NULL,
		location TEXT NOT NULL,
		ip_address TEXT NOT NULL,
		status TEXT NOT NULL CHECK (status IN ('active', 'maintenance', 'faulty')),
		recording INTEGER NOT NULL DEFAULT 0,
		resolution TEXT NOT NULL,
		last_maintenance_at TEXT,
		storage_used_percent INTEGER NOT NULL DEFAULT 0,
		created_at TEXT NOT NULL,
		updated_at TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS messages (
		id TEXT PRIMARY KEY,
		sender_id TEXT NOT NULL REFERENCES users(id),
		receiver_id TEXT NOT NULL REFERENCES users(id),
		content TEXT NOT NULL,
		is_read INTEGER NOT NULL DEFAULT 0,
		read_at TEXT,
		created_at TEXT NOT NULL
	)
	"#,
	// One marker per (user, kind, resource); re-marking is a no-op.
	r#"
	CREATE TABLE IF NOT EXISTS read_markers (
		user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
		resource_type TEXT NOT NULL,
		resource_id TEXT NOT NULL,
		seen_at TEXT NOT NULL,
		PRIMARY KEY (user_id, resource_type, resource_id)
	)
	"#,
];

const INDEXES: &[&str] = &[
	"CREATE INDEX IF NOT EXISTS idx_sessions_token_hash ON sessions(token_hash)",
	"CREATE INDEX IF NOT EXISTS idx_assignments_caretaker ON caretaker_assignments(caretaker_id)",
	"CREATE INDEX IF NOT EXISTS idx_assignments_block ON caretaker_assignments(block)",
	"CREATE INDEX IF NOT EXISTS idx_announcements_block ON announcements(scope_block)",
	"CREATE INDEX IF NOT EXISTS idx_requests_requester ON requests(requester_id)",
	"CREATE INDEX IF NOT EXISTS idx_requests_target ON requests(target_caretaker_id)",
	"CREATE INDEX IF NOT EXISTS idx_parcels_resident ON parcels(resident_id)",
	"CREATE INDEX IF NOT EXISTS idx_parcels_block ON parcels(block)",
	"CREATE INDEX IF NOT EXISTS idx_parcel_notes_parcel ON parcel_notes(parcel_id)",
	"CREATE INDEX IF NOT EXISTS idx_visitors_resident ON visitors(resident_id)",
	"CREATE INDEX IF NOT EXISTS idx_dues_user ON dues(user_id)",
	"CREATE INDEX IF NOT EXISTS idx_messages_receiver ON messages(receiver_id)",
	"CREATE INDEX IF NOT EXISTS idx_messages_sender ON messages(sender_id)",
];

/// Create all tables and indexes if they do not exist.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	for statement in TABLES.iter().chain(INDEXES) {
		sqlx::query(statement).execute(pool).await?;
	}
	tracing::debug!("schema bootstrap complete");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn bootstrap_is_idempotent() {
		let pool = SqlitePool::connect(":memory:").await.unwrap();
		run_migrations(&pool).await.unwrap();
		run_migrations(&pool).await.unwrap();
	}
}
