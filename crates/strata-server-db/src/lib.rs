// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! SQLite persistence layer for the Strata server.
//!
//! One repository per aggregate, each a thin wrapper over a shared
//! [`sqlx::SqlitePool`]. Visibility filtering pushes policy
//! [`ScopePredicate`](strata_server_auth::ScopePredicate)s down into SQL
//! (see [`scope`]) instead of filtering rows in memory.

pub mod announcement;
pub mod assignment;
pub mod camera;
pub mod due;
pub mod error;
pub mod message;
pub mod parcel;
pub mod pool;
pub mod read_marker;
pub mod request;
pub mod schema;
pub mod scope;
pub mod session;
pub mod testing;
pub mod types;
pub mod user;
pub mod visitor;

pub use announcement::{Announcement, AnnouncementRepository, AnnouncementStats};
pub use assignment::AssignmentRepository;
pub use camera::{Camera, CameraRepository, CameraStatus};
pub use due::{Due, DueRepository};
pub use error::DbError;
pub use message::{ChatSummary, Message, MessageRepository};
pub use parcel::{Parcel, ParcelNote, ParcelRepository, ParcelStatus};
pub use pool::create_pool;
pub use read_marker::{ReadMarkerRepository, SeenItem};
pub use request::{Request, RequestRepository, RequestStatus};
pub use schema::run_migrations;
pub use scope::{render_scope, ScopeColumns};
pub use session::{Session, SessionRepository};
pub use user::UserRepository;
pub use visitor::{Visitor, VisitorRepository, VisitorStats, VisitorStatus};
