//! Session event types and broadcast bus
//!
//! Handlers emit a [`SessionEvent`] after each successful write so that
//! connected clients (see [`crate::sse`]) can refresh live results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::SessionStatus;

/// Something that changed within one session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A player submitted or replaced their allocation
    VoteSubmitted {
        session_id: String,
        player_id: String,
        points_allocated: u64,
        timestamp: DateTime<Utc>,
    },

    /// Host moved the session to a new status
    SessionStatusChanged {
        session_id: String,
        old_status: SessionStatus,
        new_status: SessionStatus,
        timestamp: DateTime<Utc>,
    },

    PlayerJoined {
        session_id: String,
        player_id: String,
        name: String,
        role: Option<String>,
        timestamp: DateTime<Utc>,
    },

    FeatureAdded {
        session_id: String,
        feature_id: String,
        title: String,
        timestamp: DateTime<Utc>,
    },

    FeatureRemoved {
        session_id: String,
        feature_id: String,
        timestamp: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::VoteSubmitted { .. } => "VoteSubmitted",
            SessionEvent::SessionStatusChanged { .. } => "SessionStatusChanged",
            SessionEvent::PlayerJoined { .. } => "PlayerJoined",
            SessionEvent::FeatureAdded { .. } => "FeatureAdded",
            SessionEvent::FeatureRemoved { .. } => "FeatureRemoved",
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            SessionEvent::VoteSubmitted { session_id, .. }
            | SessionEvent::SessionStatusChanged { session_id, .. }
            | SessionEvent::PlayerJoined { session_id, .. }
            | SessionEvent::FeatureAdded { session_id, .. }
            | SessionEvent::FeatureRemoved { session_id, .. } => session_id,
        }
    }
}

/// Fan-out channel for session events
///
/// Cheap to clone; all clones share one broadcast channel. Slow subscribers
/// lose the oldest events once `capacity` is exceeded.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
    capacity: usize,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote_event(session_id: &str) -> SessionEvent {
        SessionEvent::VoteSubmitted {
            session_id: session_id.to_string(),
            player_id: "p1".to_string(),
            points_allocated: 100,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.emit_lossy(vote_event("s1"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type(), "VoteSubmitted");
        assert_eq!(event.session_id(), "s1");
    }

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let bus = EventBus::new(4);
        bus.emit_lossy(vote_event("s1"));
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.capacity(), 4);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = SessionEvent::SessionStatusChanged {
            session_id: "s1".to_string(),
            old_status: SessionStatus::Draft,
            new_status: SessionStatus::Active,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SessionStatusChanged");
        assert_eq!(json["new_status"], "active");
    }
}
