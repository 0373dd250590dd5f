// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! First-run bootstrap.
//!
//! Credential issuance is an external identity concern, so a fresh
//! deployment would otherwise have no way in. When
//! `auth.bootstrap_admin_email` is configured and that account does not
//! exist yet, an admin user is created and a session token for it is
//! logged exactly once.

use chrono::{Duration, Utc};
use strata_server_auth::{Role, User, UserId};
use strata_server_config::ServerConfig;

use crate::api::AppState;

/// Ensure the configured bootstrap admin exists, minting a session for a
/// newly created account.
#[tracing::instrument(skip(state, config))]
pub async fn ensure_bootstrap_admin(state: &AppState, config: &ServerConfig) -> anyhow::Result<()> {
	let Some(email) = &config.auth.bootstrap_admin_email else {
		return Ok(());
	};

	if state.users.get_user_by_email(email).await?.is_some() {
		return Ok(());
	}

	let now = Utc::now();
	let admin = User {
		id: UserId::generate(),
		name: "Site Admin".to_string(),
		email: email.clone(),
		role: Role::Admin,
		phone: None,
		home_block: None,
		home_unit: None,
		created_at: now,
		updated_at: now,
	};
	state.users.create_user(&admin).await?;

	let ttl = Duration::hours(config.auth.session_ttl_hours as i64);
	let (_, token) = state.sessions.create_session(&admin.id, ttl).await?;

	// The only time a raw token is ever logged; it cannot be recovered
	// later.
	tracing::info!(email = %email, token = %token, "bootstrap admin created");
	Ok(())
}
