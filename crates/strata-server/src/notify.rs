// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Push-channel seam.
//!
//! The realtime transport (websocket hub, mobile push, ...) is an
//! external collaborator. Handlers emit events through [`PushChannel`]
//! fire-and-forget: a delivery failure is logged and never rolls back
//! the storage write that triggered it.

use strata_server_auth::UserId;
use uuid::Uuid;

/// An event pushed to a connected client.
#[derive(Debug, Clone)]
pub enum PushEvent {
	/// A direct message arrived.
	Message {
		message_id: Uuid,
		sender_id: UserId,
		preview: String,
	},
	/// Something appeared in the recipient's notification feed.
	Notification {
		kind: String,
		resource_id: Uuid,
		title: String,
	},
}

/// Fire-and-forget delivery to a connected client.
pub trait PushChannel: Send + Sync {
	/// Deliver an event to a recipient. Must not block and must not fail
	/// the caller; implementations swallow and log their own errors.
	fn push(&self, recipient: &UserId, event: PushEvent);
}

/// Default channel: records deliveries in the trace log only.
#[derive(Debug, Clone, Default)]
pub struct TracingPushChannel;

impl PushChannel for TracingPushChannel {
	fn push(&self, recipient: &UserId, event: PushEvent) {
		tracing::debug!(recipient = %recipient, event = ?event, "push event");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Mutex;

	#[derive(Default)]
	struct RecordingPushChannel {
		events: Mutex<Vec<(UserId, PushEvent)>>,
	}

	impl PushChannel for RecordingPushChannel {
		fn push(&self, recipient: &UserId, event: PushEvent) {
			self.events.lock().unwrap().push((*recipient, event));
		}
	}

	#[test]
	fn channel_receives_events_per_recipient() {
		let channel = RecordingPushChannel::default();
		let alice = UserId::generate();
		let bob = UserId::generate();

		channel.push(
			&alice,
			PushEvent::Notification {
				kind: "announcement".to_string(),
				resource_id: Uuid::new_v4(),
				title: "Water outage".to_string(),
			},
		);
		channel.push(
			&bob,
			PushEvent::Message {
				message_id: Uuid::new_v4(),
				sender_id: alice,
				preview: "hi".to_string(),
			},
		);

		let events = channel.events.lock().unwrap();
		assert_eq!(events.len(), 2);
		assert_eq!(events[0].0, alice);
		assert_eq!(events[1].0, bob);
	}
}
