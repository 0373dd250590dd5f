// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Bearer-credential handling for request authentication.
//!
//! This module provides:
//! - [`CurrentActor`] - the authenticated principal for one request
//! - [`AuthError`] - the identity-resolution failure taxonomy
//! - Helpers for extracting and hashing bearer tokens
//!
//! # Authentication Flow
//!
//! ```text
//! Request → Authorization header → sha256(token) → session lookup → CurrentActor
//! ```
//!
//! Credential *issuance* (login, password verification) is an external
//! identity concern; this server only resolves already-issued session
//! tokens. Nothing is cached across requests.
//!
//! # Security Notes
//!
//! - Tokens are hashed before any storage lookup; raw token values are
//!   never persisted or logged
//! - A valid token whose user row no longer exists resolves to
//!   [`AuthError::ActorNotFound`], surfaced to clients exactly like
//!   [`AuthError::Unauthenticated`]

use crate::types::SessionId;
use crate::user::User;
use http::header::AUTHORIZATION;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Prefix carried by Strata session tokens.
pub const SESSION_TOKEN_PREFIX: &str = "st_";

/// The currently authenticated actor, extracted from request context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentActor {
	/// The authenticated user snapshot.
	pub user: User,
	/// The session this request authenticated with.
	pub session_id: SessionId,
}

/// Identity-resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
	/// No credential, or the credential did not resolve to a session.
	#[error("authentication required")]
	Unauthenticated,

	/// The credential resolved but the account no longer exists.
	#[error("account no longer exists")]
	ActorNotFound,
}

/// Extract a bearer token from the `Authorization` header.
///
/// Returns `None` when the header is missing, malformed, or empty.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
	let token = value.strip_prefix("Bearer ")?.trim();
	if token.is_empty() {
		None
	} else {
		Some(token)
	}
}

/// Hash a session token for storage lookup.
///
/// Sessions store only this hash; a database leak does not leak usable
/// credentials.
pub fn hash_token(token: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(token.as_bytes());
	hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::HeaderValue;

	fn headers_with_auth(value: &str) -> HeaderMap {
		let mut headers = HeaderMap::new();
		headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
		headers
	}

	#[test]
	fn extracts_bearer_token() {
		let headers = headers_with_auth("Bearer st_abc123");
		assert_eq!(extract_bearer_token(&headers), Some("st_abc123"));
	}

	#[test]
	fn rejects_missing_header() {
		assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
	}

	#[test]
	fn rejects_non_bearer_scheme() {
		let headers = headers_with_auth("Basic dXNlcjpwYXNz");
		assert_eq!(extract_bearer_token(&headers), None);
	}

	#[test]
	fn rejects_empty_token() {
		let headers = headers_with_auth("Bearer    ");
		assert_eq!(extract_bearer_token(&headers), None);
	}

	#[test]
	fn hash_is_stable_and_hex() {
		let a = hash_token("st_token");
		let b = hash_token("st_token");
		assert_eq!(a, b);
		assert_eq!(a.len(), 64);
		assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
	}

	#[test]
	fn hash_differs_per_token() {
		assert_ne!(hash_token("st_a"), hash_token("st_b"));
	}
}
