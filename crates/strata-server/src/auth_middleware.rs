// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Request authentication.
//!
//! [`RequireActor`] resolves `Authorization: Bearer <token>` into a
//! [`CurrentActor`] per request: hash the token, look up the session,
//! load the user. Nothing is cached across requests.
//!
//! A valid session whose user row has been deleted resolves to
//! [`AuthError::ActorNotFound`]; clients see the same 401 as for a
//! missing credential, so deleted accounts are indistinguishable from
//! unauthenticated ones.

use axum::{extract::FromRequestParts, http::request::Parts, response::Response};
use strata_server_auth::middleware::{extract_bearer_token, hash_token, AuthError, CurrentActor};

use crate::api::AppState;
use crate::api_response::{internal_error, unauthorized};

/// Extractor for the authenticated actor.
pub struct RequireActor(pub CurrentActor);

impl FromRequestParts<AppState> for RequireActor {
	type Rejection = Response;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let actor = resolve_actor(&parts.headers, state).await.map_err(|e| match e {
			ResolveError::Auth(reason) => {
				tracing::debug!(reason = %reason, "authentication rejected");
				unauthorized()
			}
			ResolveError::Storage(error) => {
				tracing::error!(error = %error, "identity resolution failed");
				internal_error()
			}
		})?;
		Ok(RequireActor(actor))
	}
}

enum ResolveError {
	Auth(AuthError),
	Storage(strata_server_db::DbError),
}

impl From<strata_server_db::DbError> for ResolveError {
	fn from(error: strata_server_db::DbError) -> Self {
		ResolveError::Storage(error)
	}
}

async fn resolve_actor(
	headers: &axum::http::HeaderMap,
	state: &AppState,
) -> Result<CurrentActor, ResolveError> {
	let token =
		extract_bearer_token(headers).ok_or(ResolveError::Auth(AuthError::Unauthenticated))?;

	let session = state
		.sessions
		.get_by_token_hash(&hash_token(token))
		.await?
		.ok_or(ResolveError::Auth(AuthError::Unauthenticated))?;

	// A still-valid credential for a deleted account.
	let user = state
		.users
		.get_user_by_id(&session.user_id)
		.await?
		.ok_or(ResolveError::Auth(AuthError::ActorNotFound))?;

	if let Err(error) = state.sessions.touch(&session.id).await {
		tracing::warn!(error = %error, "failed to stamp session use");
	}

	Ok(CurrentActor {
		user,
		session_id: session.id,
	})
}
