// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Request/response types for the Strata HTTP API.
//!
//! Wire-facing types only: IDs are plain UUIDs, enums travel as
//! snake_case strings and are validated at the handler boundary.
//! `ToSchema` derives are available behind the `openapi` feature.

pub mod announcements;
pub mod assignments;
pub mod cameras;
pub mod dues;
pub mod error;
pub mod messages;
pub mod notifications;
pub mod parcels;
pub mod requests;
pub mod users;
pub mod visitors;

pub use error::ErrorResponse;
