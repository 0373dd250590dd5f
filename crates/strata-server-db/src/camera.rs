// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Camera inventory repository.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use std::fmt;
use strata_server_auth::CameraId;

use crate::error::DbError;
use crate::types::{parse_opt_ts, parse_ts, parse_uuid};

const SELECT: &str = r#"
	SELECT id, name, location, ip_address, status, recording, resolution,
	       last_maintenance_at, storage_used_percent, created_at, updated_at
	FROM cameras
"#;

/// Camera operational status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraStatus {
	Active,
	Maintenance,
	Faulty,
}

impl CameraStatus {
	pub fn parse(s: &str) -> Option<CameraStatus> {
		match s {
			"active" => Some(CameraStatus::Active),
			"maintenance" => Some(CameraStatus::Maintenance),
			"faulty" => Some(CameraStatus::Faulty),
			_ => None,
		}
	}
}

impl fmt::Display for CameraStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CameraStatus::Active => write!(f, "active"),
			CameraStatus::Maintenance => write!(f, "maintenance"),
			CameraStatus::Faulty => write!(f, "faulty"),
		}
	}
}

/// A stored camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Camera {
	pub id: CameraId,
	pub name: String,
	pub location: String,
	pub ip_address: String,
	pub status: CameraStatus,
	pub recording: bool,
	pub resolution: String,
	pub last_maintenance_at: Option<DateTime<Utc>>,
	pub storage_used_percent: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Repository for the camera inventory.
#[derive(Clone)]
pub struct CameraRepository {
	pool: SqlitePool,
}

impl CameraRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a camera.
	#[tracing::instrument(skip(self, camera), fields(id = %camera.id))]
	pub async fn create(&self, camera: &Camera) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO cameras
				(id, name, location, ip_address, status, recording, resolution,
				 last_maintenance_at, storage_used_percent, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(camera.id.to_string())
		.bind(&camera.name)
		.bind(&camera.location)
		.bind(&camera.ip_address)
		.bind(camera.status.to_string())
		.bind(camera.recording as i32)
		.bind(&camera.resolution)
		.bind(camera.last_maintenance_at.map(|t| t.to_rfc3339()))
		.bind(camera.storage_used_percent)
		.bind(camera.created_at.to_rfc3339())
		.bind(camera.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await?;
		Ok(())
	}

	/// Get a camera by ID.
	#[tracing::instrument(skip(self), fields(id = %id))]
	pub async fn get(&self, id: &CameraId) -> Result<Option<Camera>, DbError> {
		let row = sqlx::query(&format!("{SELECT} WHERE id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;
		row.map(|r| row_to_camera(&r)).transpose()
	}

	/// List cameras, newest first.
	#[tracing::instrument(skip(self))]
	pub async fn list(&self) -> Result<Vec<Camera>, DbError> {
		let rows = sqlx::query(&format!("{SELECT} ORDER BY created_at DESC"))
			.fetch_all(&self.pool)
			.await?;
		rows.iter().map(row_to_camera).collect()
	}

	/// Replace a camera's mutable fields.
	#[tracing::instrument(skip(self, camera), fields(id = %camera.id))]
	pub async fn update(&self, camera: &Camera) -> Result<(), DbError> {
		sqlx::query(
			r#"
			UPDATE cameras
			SET name = ?, location = ?, ip_address = ?, status = ?, recording = ?,
			    resolution = ?, last_maintenance_at = ?, storage_used_percent = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&camera.name)
		.bind(&camera.location)
		.bind(&camera.ip_address)
		.bind(camera.status.to_string())
		.bind(camera.recording as i32)
		.bind(&camera.resolution)
		.bind(camera.last_maintenance_at.map(|t| t.to_rfc3339()))
		.bind(camera.storage_used_percent)
		.bind(Utc::now().to_rfc3339())
		.bind(camera.id.to_string())
		.execute(&self.pool)
		.await?;
		Ok(())
	}

	/// Delete a camera; returns false when the row did not exist.
	#[tracing::instrument(skip(self), fields(id = %id))]
	pub async fn delete(&self, id: &CameraId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM cameras WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Cameras that are not faulty.
	#[tracing::instrument(skip(self))]
	pub async fn active_count(&self) -> Result<i64, DbError> {
		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cameras WHERE status != 'faulty'")
			.fetch_one(&self.pool)
			.await?;
		Ok(count)
	}
}

fn row_to_camera(row: &sqlx::sqlite::SqliteRow) -> Result<Camera, DbError> {
	let id: String = row.try_get("id")?;
	let status: String = row.try_get("status")?;
	let recording: i64 = row.try_get("recording")?;
	let last_maintenance_at: Option<String> = row.try_get("last_maintenance_at")?;
	let created_at: String = row.try_get("created_at")?;
	let updated_at: String = row.try_get("updated_at")?;

	Ok(Camera {
		id: CameraId::new(parse_uuid(&id)?),
		name: row.try_get("name")?,
		location: row.try_get("location")?,
		ip_address: row.try_get("ip_address")?,
		status: CameraStatus::parse(&status)
			.ok_or_else(|| DbError::Internal(format!("Unknown camera status: {status}")))?,
		recording: recording != 0,
		resolution: row.try_get("resolution")?,
		last_maintenance_at: parse_opt_ts(last_maintenance_at)?,
		storage_used_percent: row.try_get("storage_used_percent")?,
		created_at: parse_ts(&created_at)?,
		updated_at: parse_ts(&updated_at)?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_test_pool;

	fn camera(status: CameraStatus) -> Camera {
		let now = Utc::now();
		Camera {
			id: CameraId::generate(),
			name: "Gate 1".to_string(),
			location: "Main entrance".to_string(),
			ip_address: "10.0.0.20".to_string(),
			status,
			recording: true,
			resolution: "1080p".to_string(),
			last_maintenance_at: None,
			storage_used_percent: 40,
			created_at: now,
			updated_at: now,
		}
	}

	#[tokio::test]
	async fn crud_roundtrip() {
		let pool = create_test_pool().await;
		let repo = CameraRepository::new(pool);

		let cam = camera(CameraStatus::Active);
		repo.create(&cam).await.unwrap();

		let mut fetched = repo.get(&cam.id).await.unwrap().unwrap();
		assert_eq!(fetched.name, "Gate 1");

		fetched.status = CameraStatus::Faulty;
		repo.update(&fetched).await.unwrap();
		assert_eq!(
			repo.get(&cam.id).await.unwrap().unwrap().status,
			CameraStatus::Faulty
		);

		assert!(repo.delete(&cam.id).await.unwrap());
		assert!(repo.get(&cam.id).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn active_count_excludes_faulty() {
		let pool = create_test_pool().await;
		let repo = CameraRepository::new(pool);

		repo.create(&camera(CameraStatus::Active)).await.unwrap();
		repo.create(&camera(CameraStatus::Maintenance)).await.unwrap();
		repo.create(&camera(CameraStatus::Faulty)).await.unwrap();

		assert_eq!(repo.active_count().await.unwrap(), 2);
	}
}
