// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Policy-to-HTTP translation.
//!
//! One place decides how a [`Decision`] becomes a status code:
//!
//! - categorical denials (list, create) → 403 with a generic body
//! - instance denials (get/update/delete on a known row) → 404,
//!   indistinguishable from a missing row, so forbidden resources never
//!   reveal their existence
//!
//! The predecessor system mixed 400/403/404 per controller; every
//! handler goes through these helpers instead.

use axum::response::Response;
use strata_server_auth::middleware::CurrentActor;
use strata_server_auth::{ActorAttrs, Decision, Role, ScopePredicate};

use crate::api::AppState;
use crate::api_response::{db_error, forbidden, not_found};

/// Build the pre-loaded policy attributes for this request's actor.
///
/// Caretakers get their assigned blocks loaded from the assignment
/// directory; the engine itself never touches storage.
pub async fn actor_attrs(state: &AppState, actor: &CurrentActor) -> Result<ActorAttrs, Response> {
	let user = &actor.user;
	let mut attrs = ActorAttrs::new(user.id, user.role);
	if let Some(block) = &user.home_block {
		attrs = attrs.with_home_block(block.clone());
	}
	if user.role == Role::Caretaker {
		let blocks = state
			.assignments
			.blocks_for(&user.id)
			.await
			.map_err(db_error)?;
		attrs = attrs.with_assigned_blocks(blocks);
	}
	Ok(attrs)
}

/// Translate a listing decision into an optional push-down predicate.
///
/// `None` means unrestricted (`AllowAll`); a denial is a 403.
pub fn list_scope(decision: Decision) -> Result<Option<ScopePredicate>, Response> {
	match decision {
		Decision::AllowAll | Decision::AllowInstance => Ok(None),
		Decision::AllowScoped(predicate) => Ok(Some(predicate)),
		Decision::Deny(_) => Err(forbidden()),
	}
}

/// Gate a categorical action (create): a denial is a 403.
pub fn allow_or_forbidden(decision: Decision) -> Result<(), Response> {
	if decision.is_allowed() {
		Ok(())
	} else {
		Err(forbidden())
	}
}

/// Gate an instance action on a fetched row: a denial is a 404.
pub fn allow_or_not_found(decision: Decision) -> Result<(), Response> {
	if decision.is_allowed() {
		Ok(())
	} else {
		Err(not_found())
	}
}
