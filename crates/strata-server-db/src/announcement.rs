// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Announcement repository.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use strata_server_auth::{AnnouncementId, BlockId, ResourceAttrs, ScopePredicate, UserId};

use crate::error::DbError;
use crate::scope::{render_scope, ScopeColumns};
use crate::types::{parse_ts, parse_uuid};

const SCOPE_COLUMNS: ScopeColumns = ScopeColumns {
	owner: Some("author_id"),
	block: Some("scope_block"),
	target: None,
};

const SELECT: &str = r#"
	SELECT id, title, content, category, is_important, is_urgent, author_id, scope_block,
	       created_at, updated_at
	FROM announcements
"#;

/// A stored announcement. `scope_block = None` means site-wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
	pub id: AnnouncementId,
	pub title: String,
	pub content: String,
	pub category: String,
	pub is_important: bool,
	pub is_urgent: bool,
	pub author_id: UserId,
	pub scope_block: Option<BlockId>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Announcement {
	/// The policy descriptor for this row.
	pub fn resource_attrs(&self) -> ResourceAttrs {
		let attrs = ResourceAttrs::announcement(self.author_id);
		match &self.scope_block {
			Some(block) => attrs.with_block(block.clone()),
			None => attrs,
		}
	}
}

/// Aggregate counts for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnouncementStats {
	pub total: i64,
	pub important: i64,
	pub urgent: i64,
	pub general: i64,
}

/// Repository for announcements.
#[derive(Clone)]
pub struct AnnouncementRepository {
	pool: SqlitePool,
}

impl AnnouncementRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert an announcement.
	#[tracing::instrument(skip(self, announcement), fields(id = %announcement.id))]
	pub async fn create(&self, announcement: &Announcement) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO announcements
				(id, title, content, category, is_important, is_urgent, author_id, scope_block,
				 created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(announcement.id.to_string())
		.bind(&announcement.title)
		.bind(&announcement.content)
		.bind(&announcement.category)
		.bind(announcement.is_important as i32)
		.bind(announcement.is_urgent as i32)
		.bind(announcement.author_id.to_string())
		.bind(announcement.scope_block.as_ref().map(|b| b.to_string()))
		.bind(announcement.created_at.to_rfc3339())
		.bind(announcement.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(id = %announcement.id, "announcement created");
		Ok(())
	}

	/// Get an announcement by ID.
	#[tracing::instrument(skip(self), fields(id = %id))]
	pub async fn get(&self, id: &AnnouncementId) -> Result<Option<Announcement>, DbError> {
		let row = sqlx::query(&format!("{SELECT} WHERE id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;
		row.map(|r| row_to_announcement(&r)).transpose()
	}

	/// List announcements, newest first, optionally scope-filtered.
	///
	/// `None` lists everything (an `AllowAll` decision); a predicate is
	/// pushed down into the WHERE clause.
	#[tracing::instrument(skip(self, scope))]
	pub async fn list(&self, scope: Option<&ScopePredicate>) -> Result<Vec<Announcement>, DbError> {
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
		rows.iter().map(row_to_announcement).collect()
	}

	/// Announcements within the window the actor has not yet marked seen.
	#[tracing::instrument(skip(self, scope), fields(user_id = %user))]
	pub async fn list_unread_since(
		&self,
		user: &UserId,
		since: DateTime<Utc>,
		scope: Option<&ScopePredicate>,
	) -> Result<Vec<Announcement>, DbError> {
		let mut conditions = vec![
			"created_at >= ?".to_string(),
			"id NOT IN (SELECT resource_id FROM read_markers \
			 WHERE user_id = ? AND resource_type = 'announcement')"
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
		rows.iter().map(row_to_announcement).collect()
	}

	/// Update title/content/category/flags; the scope block moves only
	/// when the caller passes the (service-authorized) new value.
	#[tracing::instrument(skip(self, announcement), fields(id = %announcement.id))]
	pub async fn update(&self, announcement: &Announcement) -> Result<(), DbError> {
		let now = Utc::now().to_rfc3339();
		sqlx::query(
			r#"
			UPDATE announcements
			SET title = ?, content = ?, category = ?, is_important = ?, is_urgent = ?,
			    scope_block = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&announcement.title)
		.bind(&announcement.content)
		.bind(&announcement.category)
		.bind(announcement.is_important as i32)
		.bind(announcement.is_urgent as i32)
		.bind(announcement.scope_block.as_ref().map(|b| b.to_string()))
		.bind(now)
		.bind(announcement.id.to_string())
		.execute(&self.pool)
		.await?;
		Ok(())
	}

	/// Delete an announcement; returns false when the row did not exist.
	#[tracing::instrument(skip(self), fields(id = %id))]
	pub async fn delete(&self, id: &AnnouncementId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM announcements WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Aggregate counts for the admin dashboard.
	#[tracing::instrument(skip(self))]
	pub async fn stats(&self) -> Result<AnnouncementStats, DbError> {
		let row = sqlx::query(
			r#"
			SELECT
				COUNT(*) AS total,
				COALESCE(SUM(is_important), 0) AS important,
				COALESCE(SUM(is_urgent), 0) AS urgent,
				COALESCE(SUM(CASE WHEN is_important = 0 AND is_urgent = 0 THEN 1 ELSE 0 END), 0) AS general
			FROM announcements
			"#,
		)
		.fetch_one(&self.pool)
		.await?;

		Ok(AnnouncementStats {
			total: row.try_get("total")?,
			important: row.try_get("important")?,
			urgent: row.try_get("urgent")?,
			general: row.try_get("general")?,
		})
	}
}

fn row_to_announcement(row: &sqlx::sqlite::SqliteRow) -> Result<Announcement, DbError> {
	let id: String = row.try_get("id")?;
	let author_id: String = row.try_get("author_id")?;
	let scope_block: Option<String> = row.try_get("scope_block")?;
	let is_important: i64 = row.try_get("is_important")?;
	let is_urgent: i64 = row.try_get("is_urgent")?;
	let created_at: String = row.try_get("created_at")?;
	let updated_at: String = row.try_get("updated_at")?;

	Ok(Announcement {
		id: AnnouncementId::new(parse_uuid(&id)?),
		title: row.try_get("title")?,
		content: row.try_get("content")?,
		category: row.try_get("category")?,
		is_important: is_important != 0,
		is_urgent: is_urgent != 0,
		author_id: UserId::new(parse_uuid(&author_id)?),
		scope_block: scope_block.as_deref().and_then(BlockId::parse),
		created_at: parse_ts(&created_at)?,
		updated_at: parse_ts(&updated_at)?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::read_marker::ReadMarkerRepository;
	use crate::testing::{create_test_pool, seed_resident, seed_user};
	use strata_server_auth::{ResourceKind, Role};

	fn block(label: &str) -> BlockId {
		BlockId::parse(label).unwrap()
	}

	fn announcement(author: UserId, scope_block: Option<&str>) -> Announcement {
		let now = Utc::now();
		Announcement {
			id: AnnouncementId::generate(),
			title: "Water outage".to_string(),
			content: "Maintenance on the main line.".to_string(),
			category: "general".to_string(),
			is_important: false,
			is_urgent: false,
			author_id: author,
			scope_block: scope_block.and_then(BlockId::parse),
			created_at: now,
			updated_at: now,
		}
	}

	#[tokio::test]
	async fn pushed_down_scope_matches_in_memory_predicate() {
		let pool = create_test_pool().await;
		let admin = seed_user(&pool, Role::Admin, None, None).await;
		let repo = AnnouncementRepository::new(pool);

		let global = announcement(admin.id, None);
		let block_a = announcement(admin.id, Some("A"));
		let block_b = announcement(admin.id, Some("B"));
		for a in [&global, &block_a, &block_b] {
			repo.create(a).await.unwrap();
		}

		let predicate = ScopePredicate::in_blocks([block("A")].into(), true);
		let listed = repo.list(Some(&predicate)).await.unwrap();

		let listed_ids: Vec<_> = listed.iter().map(|a| a.id).collect();
		assert!(listed_ids.contains(&global.id));
		assert!(listed_ids.contains(&block_a.id));
		assert!(!listed_ids.contains(&block_b.id));

		// Every returned row satisfies the predicate in memory too.
		for a in &listed {
			assert!(predicate.matches(&a.resource_attrs()));
		}
	}

	#[tokio::test]
	async fn unread_excludes_marked_rows() {
		let pool = create_test_pool().await;
		let admin = seed_user(&pool, Role::Admin, None, None).await;
		let resident = seed_resident(&pool, "A", "1").await;
		let repo = AnnouncementRepository::new(pool.clone());
		let markers = ReadMarkerRepository::new(pool);

		let a1 = announcement(admin.id, None);
		let a2 = announcement(admin.id, None);
		repo.create(&a1).await.unwrap();
		repo.create(&a2).await.unwrap();

		let since = Utc::now() - chrono::Duration::days(14);
		let unread = repo
			.list_unread_since(&resident.id, since, None)
			.await
			.unwrap();
		assert_eq!(unread.len(), 2);

		markers
			.mark_seen(&resident.id, ResourceKind::Announcement, a1.id.into_inner())
			.await
			.unwrap();
		let unread = repo
			.list_unread_since(&resident.id, since, None)
			.await
			.unwrap();
		assert_eq!(unread.len(), 1);
		assert_eq!(unread[0].id, a2.id);
	}

	#[tokio::test]
	async fn stats_count_flags() {
		let pool = create_test_pool().await;
		let admin = seed_user(&pool, Role::Admin, None, None).await;
		let repo = AnnouncementRepository::new(pool);

		let mut important = announcement(admin.id, None);
		important.is_important = true;
		let plain = announcement(admin.id, None);
		repo.create(&important).await.unwrap();
		repo.create(&plain).await.unwrap();

		let stats = repo.stats().await.unwrap();
		assert_eq!(stats.total, 2);
		assert_eq!(stats.important, 1);
		assert_eq!(stats.general, 1);
	}

	#[tokio::test]
	async fn delete_reports_existence() {
		let pool = create_test_pool().await;
		let admin = seed_user(&pool, Role::Admin, None, None).await;
		let repo = AnnouncementRepository::new(pool);

		let a = announcement(admin.id, None);
		repo.create(&a).await.unwrap();
		assert!(repo.delete(&a.id).await.unwrap());
		assert!(!repo.delete(&a.id).await.unwrap());
		assert!(repo.get(&a.id).await.unwrap().is_none());
	}
}
