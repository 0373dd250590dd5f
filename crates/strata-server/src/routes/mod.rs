// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP route modules, one per resource.
//!
//! Handlers are thin orchestrators: resolve the actor, build policy
//! attributes, consult the engine, push the resulting scope down to the
//! repository, map rows to DTOs. No handler re-derives visibility rules.

pub mod announcements;
pub mod assignments;
pub mod cameras;
pub mod dues;
pub mod health;
pub mod messages;
pub mod notifications;
pub mod parcels;
pub mod requests;
pub mod users;
pub mod visitors;

use chrono::{Duration, Utc};
use std::collections::HashMap;
use strata_server_api::parcels::DailyCountResponse;

/// Expand sparse per-day counts into a dense series of the last `days`
/// days, zero-filling the gaps.
pub(crate) fn zero_filled_daily(counts: Vec<(String, i64)>, days: i64) -> Vec<DailyCountResponse> {
	let by_day: HashMap<String, i64> = counts.into_iter().collect();
	let start = Utc::now().date_naive() - Duration::days(days - 1);
	(0..days)
		.map(|offset| {
			let day = (start + Duration::days(offset)).format("%Y-%m-%d").to_string();
			let count = by_day.get(&day).copied().unwrap_or(0);
			DailyCountResponse { date: day, count }
		})
		.collect()
}
