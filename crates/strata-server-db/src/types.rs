// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Row-conversion helpers shared by the repositories.
//!
//! SQLite stores UUIDs and timestamps as TEXT; these helpers centralize
//! the parse-and-wrap noise so `row_to_*` functions stay readable.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbError;

/// Parse a TEXT column holding a UUID.
pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, DbError> {
	Uuid::parse_str(value).map_err(|e| DbError::Internal(format!("Invalid UUID in row: {e}")))
}

/// Parse a TEXT column holding an RFC 3339 timestamp.
pub(crate) fn parse_ts(value: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid timestamp in row: {e}")))
}

/// Parse a nullable TEXT timestamp column.
pub(crate) fn parse_opt_ts(value: Option<String>) -> Result<Option<DateTime<Utc>>, DbError> {
	value.as_deref().map(parse_ts).transpose()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn uuid_roundtrip() {
		let id = Uuid::new_v4();
		assert_eq!(parse_uuid(&id.to_string()).unwrap(), id);
		assert!(parse_uuid("not-a-uuid").is_err());
	}

	#[test]
	fn timestamp_roundtrip() {
		let now = Utc::now();
		assert_eq!(parse_ts(&now.to_rfc3339()).unwrap(), now);
		assert!(parse_ts("yesterday").is_err());
	}

	#[test]
	fn optional_timestamp() {
		assert_eq!(parse_opt_ts(None).unwrap(), None);
		let now = Utc::now();
		assert_eq!(parse_opt_ts(Some(now.to_rfc3339())).unwrap(), Some(now));
	}
}
