//! Inbound interaction events from the live-stream source
//!
//! Defines the `LiveEvent` enum representing everything the aggregation
//! engine consumes from a broadcast room: chat comments (which double as
//! team-join requests), like bursts, gift streaks, and source connection
//! status changes.
//!
//! Gift streaks deserve care: the platform delivers a rapid sequence of
//! repeat-count updates for one continuous gift action, and only the final
//! update carries `streak_complete = true`. Scoring must key off that flag,
//! never off intermediate updates.

use serde::{Deserialize, Serialize};

use crate::ids::ContributorId;

/// Profile data accompanying a comment event.
///
/// Everything the registry needs to create a contributor record on first
/// team join. Carried whole on each comment because the platform sends it
/// whole; the registry only uses it once per contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorIdentity {
    /// Platform-assigned unique id
    pub id: ContributorId,
    /// Public handle (unique per platform)
    pub handle: String,
    /// Display nickname
    pub nickname: String,
    /// Avatar image reference
    pub avatar_ref: String,
}

/// A single interaction event from the live-stream source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "camelCase")]
pub enum LiveEvent {
    /// A chat comment. The text is a candidate team alias; the engine
    /// attempts registration and otherwise ignores it.
    Comment {
        contributor: ContributorIdentity,
        text: String,
    },

    /// A batch of rapid "like" taps. `count` is atomic per event — the
    /// platform has already coalesced the taps, so no deduplication applies.
    Burst {
        contributor_id: ContributorId,
        count: u64,
    },

    /// One update within a gift streak. Only the terminal update
    /// (`streak_complete = true`) may produce points.
    Gift {
        contributor_id: ContributorId,
        gift_name: String,
        /// Intrinsic unit cost of the gift, supplied by the platform.
        gift_unit_value: u64,
        /// Cumulative repeat count for the streak so far.
        total_repeats: u64,
        /// True only on the final update of the streak.
        streak_complete: bool,
    },

    /// Connection status change of the source, passed through to observers.
    #[serde(rename_all = "camelCase")]
    SourceStatus {
        connected: bool,
        room_id: Option<String>,
        error: Option<String>,
    },
}

impl LiveEvent {
    /// Get the event type as a string label for logging.
    pub fn event_type_label(&self) -> &'static str {
        match self {
            LiveEvent::Comment { .. } => "Comment",
            LiveEvent::Burst { .. } => "Burst",
            LiveEvent::Gift { .. } => "Gift",
            LiveEvent::SourceStatus { .. } => "SourceStatus",
        }
    }

    /// Extract the contributor id from the event if present.
    pub fn contributor_id(&self) -> Option<&ContributorId> {
        match self {
            LiveEvent::Comment { contributor, .. } => Some(&contributor.id),
            LiveEvent::Burst { contributor_id, .. } => Some(contributor_id),
            LiveEvent::Gift { contributor_id, .. } => Some(contributor_id),
            LiveEvent::SourceStatus { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_identity() -> ContributorIdentity {
        ContributorIdentity {
            id: ContributorId::new("user_1"),
            handle: "@viewer".to_string(),
            nickname: "Viewer".to_string(),
            avatar_ref: "https://cdn.example/avatar/1.png".to_string(),
        }
    }

    #[test]
    fn test_event_type_label() {
        let e = LiveEvent::Comment {
            contributor: sample_identity(),
            text: "usa".to_string(),
        };
        assert_eq!(e.event_type_label(), "Comment");

        let e = LiveEvent::Burst {
            contributor_id: ContributorId::new("user_1"),
            count: 7,
        };
        assert_eq!(e.event_type_label(), "Burst");
    }

    #[test]
    fn test_contributor_id_extraction() {
        let e = LiveEvent::Gift {
            contributor_id: ContributorId::new("user_9"),
            gift_name: "Rose".to_string(),
            gift_unit_value: 1,
            total_repeats: 3,
            streak_complete: true,
        };
        assert_eq!(e.contributor_id().unwrap().as_str(), "user_9");

        let status = LiveEvent::SourceStatus {
            connected: true,
            room_id: Some("room_42".to_string()),
            error: None,
        };
        assert!(status.contributor_id().is_none());
    }

    #[test]
    fn test_event_serialization_roundtrip() {
        let e = LiveEvent::Gift {
            contributor_id: ContributorId::new("user_9"),
            gift_name: "Rose".to_string(),
            gift_unit_value: 1,
            total_repeats: 5,
            streak_complete: false,
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"event_type\":\"gift\""));

        let deserialized: LiveEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(e, deserialized);
    }
}
