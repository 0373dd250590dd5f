// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Direct message repository.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use strata_server_auth::{MessageId, ResourceAttrs, Role, UserId};

use crate::error::DbError;
use crate::types::{parse_opt_ts, parse_ts, parse_uuid};

const SELECT: &str = r#"
	SELECT id, sender_id, receiver_id, content, is_read, read_at, created_at
	FROM messages
"#;

/// A stored direct message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
	pub id: MessageId,
	pub sender_id: UserId,
	pub receiver_id: UserId,
	pub content: String,
	pub is_read: bool,
	pub read_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
}

impl Message {
	/// The policy descriptor for this row.
	pub fn resource_attrs(&self) -> ResourceAttrs {
		ResourceAttrs::message(self.sender_id, self.receiver_id)
	}
}

/// One conversation in the chat overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
	pub peer_id: UserId,
	pub peer_name: String,
	pub peer_role: Role,
	pub last_message: String,
	pub last_message_at: DateTime<Utc>,
	pub unread: i64,
}

/// Repository for direct messages.
#[derive(Clone)]
pub struct MessageRepository {
	pool: SqlitePool,
}

impl MessageRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a message.
	#[tracing::instrument(skip(self, message), fields(id = %message.id))]
	pub async fn create(&self, message: &Message) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO messages (id, sender_id, receiver_id, content, is_read, read_at, created_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(message.id.to_string())
		.bind(message.sender_id.to_string())
		.bind(message.receiver_id.to_string())
		.bind(&message.content)
		.bind(message.is_read as i32)
		.bind(message.read_at.map(|t| t.to_rfc3339()))
		.bind(message.created_at.to_rfc3339())
		.execute(&self.pool)
		.await?;
		Ok(())
	}

	/// Get a message by ID.
	#[tracing::instrument(skip(self), fields(id = %id))]
	pub async fn get(&self, id: &MessageId) -> Result<Option<Message>, DbError> {
		let row = sqlx::query(&format!("{SELECT} WHERE id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;
		row.map(|r| row_to_message(&r)).transpose()
	}

	/// The two-party conversation history, oldest first.
	#[tracing::instrument(skip(self), fields(user_id = %user, peer_id = %peer))]
	pub async fn list_thread(&self, user: &UserId, peer: &UserId) -> Result<Vec<Message>, DbError> {
		let rows = sqlx::query(&format!(
			r#"
			{SELECT}
			WHERE (sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?)
			ORDER BY created_at
			"#
		))
		.bind(user.to_string())
		.bind(peer.to_string())
		.bind(peer.to_string())
		.bind(user.to_string())
		.fetch_all(&self.pool)
		.await?;
		rows.iter().map(row_to_message).collect()
	}

	/// Conversation overview for a user: one entry per peer with the last
	/// message and the count of unread messages from that peer.
	#[tracing::instrument(skip(self), fields(user_id = %user))]
	pub async fn list_chats(&self, user: &UserId) -> Result<Vec<ChatSummary>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT m.id, m.sender_id, m.receiver_id, m.content, m.is_read, m.read_at, m.created_at,
			       u.name AS peer_name, u.role AS peer_role
			FROM messages m
			JOIN users u ON u.id = CASE WHEN m.sender_id = ? THEN m.receiver_id ELSE m.sender_id END
			WHERE m.sender_id = ? OR m.receiver_id = ?
			ORDER BY m.created_at DESC
			"#,
		)
		.bind(user.to_string())
		.bind(user.to_string())
		.bind(user.to_string())
		.fetch_all(&self.pool)
		.await?;

		// Newest-first fold: the first row seen per peer is the last
		// message of that conversation.
		let mut chats: Vec<ChatSummary> = Vec::new();
		for row in &rows {
			let message = row_to_message(row)?;
			let peer_id = if message.sender_id == *user {
				message.receiver_id
			} else {
				message.sender_id
			};

			let unread_increment =
				(message.receiver_id == *user && !message.is_read) as i64;
			match chats.iter_mut().find(|c| c.peer_id == peer_id) {
				Some(chat) => chat.unread += unread_increment,
				None => {
					let peer_name: String = row.try_get("peer_name")?;
					let peer_role: String = row.try_get("peer_role")?;
					chats.push(ChatSummary {
						peer_id,
						peer_name,
						peer_role: Role::parse(&peer_role).ok_or_else(|| {
							DbError::Internal(format!("Unknown role in row: {peer_role}"))
						})?,
						last_message: message.content.clone(),
						last_message_at: message.created_at,
						unread: unread_increment,
					});
				}
			}
		}
		Ok(chats)
	}

	/// Mark every unread message from `peer` to `user` read; returns how
	/// many were flipped.
	#[tracing::instrument(skip(self), fields(user_id = %user, peer_id = %peer))]
	pub async fn mark_thread_read(&self, user: &UserId, peer: &UserId) -> Result<u64, DbError> {
		let result = sqlx::query(
			r#"
			UPDATE messages
			SET is_read = 1, read_at = ?
			WHERE sender_id = ? AND receiver_id = ? AND is_read = 0
			"#,
		)
		.bind(Utc::now().to_rfc3339())
		.bind(peer.to_string())
		.bind(user.to_string())
		.execute(&self.pool)
		.await?;
		Ok(result.rows_affected())
	}

	/// Unread messages addressed to the user within the window, joined
	/// with the sender's display name.
	#[tracing::instrument(skip(self), fields(user_id = %user))]
	pub async fn list_unread_since(
		&self,
		user: &UserId,
		since: DateTime<Utc>,
	) -> Result<Vec<(Message, String)>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT m.id, m.sender_id, m.receiver_id, m.content, m.is_read, m.read_at, m.created_at,
			       u.name AS sender_name
			FROM messages m
			JOIN users u ON u.id = m.sender_id
			WHERE m.receiver_id = ? AND m.is_read = 0 AND m.created_at >= ?
			ORDER BY m.created_at DESC
			"#,
		)
		.bind(user.to_string())
		.bind(since.to_rfc3339())
		.fetch_all(&self.pool)
		.await?;

		rows.iter()
			.map(|row| {
				let message = row_to_message(row)?;
				let name: String = row.try_get("sender_name")?;
				Ok((message, name))
			})
			.collect()
	}
}

pub(crate) fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Result<Message, DbError> {
	let id: String = row.try_get("id")?;
	let sender_id: String = row.try_get("sender_id")?;
	let receiver_id: String = row.try_get("receiver_id")?;
	let is_read: i64 = row.try_get("is_read")?;
	let read_at: Option<String> = row.try_get("read_at")?;
	let created_at: String = row.try_get("created_at")?;

	Ok(Message {
		id: MessageId::new(parse_uuid(&id)?),
		sender_id: UserId::new(parse_uuid(&sender_id)?),
		receiver_id: UserId::new(parse_uuid(&receiver_id)?),
		content: row.try_get("content")?,
		is_read: is_read != 0,
		read_at: parse_opt_ts(read_at)?,
		created_at: parse_ts(&created_at)?,
	})
}
