//! Observer-facing message types
//!
//! Everything published to presentation clients flows through the
//! `OutboundMessage` enum: coalesced state snapshots, unthrottled visual
//! events, source status passthrough, and the one-time session summary.
//!
//! Snapshots are rate-limited by the broadcaster cadence; visual events are
//! fire-and-forget and may be dropped for lagging observers without
//! affecting score correctness.

use serde::{Deserialize, Serialize};

use crate::ids::{ContributorId, TeamId};

/// One team's standing inside a state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    pub id: TeamId,
    pub score: u64,
    pub member_count: usize,
}

/// A team's final score in the session summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScore {
    pub id: TeamId,
    pub score: u64,
}

/// A top contributor in the session summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorStanding {
    pub contributor_id: ContributorId,
    pub handle: String,
    pub team_id: TeamId,
    pub points: u64,
}

/// Kind tag for ephemeral visual events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualKind {
    Burst,
    Gift,
}

/// Messages published to all observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// Source connection status, passed through unchanged.
    #[serde(rename_all = "camelCase")]
    SessionStatus {
        connected: bool,
        room_id: Option<String>,
        error: Option<String>,
    },

    /// Coalesced point-in-time view of the score board. Teams are ordered
    /// by descending score; ties break by team creation order.
    #[serde(rename_all = "camelCase")]
    StateSnapshot {
        teams: Vec<TeamStanding>,
        countdown_seconds: u64,
        active: bool,
    },

    /// Ephemeral feedback for a single burst or gift, decoupled from the
    /// snapshot cadence.
    #[serde(rename_all = "camelCase")]
    VisualEvent {
        kind: VisualKind,
        contributor_handle: String,
        team_id: TeamId,
        #[serde(skip_serializing_if = "Option::is_none")]
        gift_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        points: Option<u64>,
    },

    /// Published exactly once when the countdown reaches zero.
    #[serde(rename_all = "camelCase")]
    SessionComplete {
        ranked_teams: Vec<TeamScore>,
        top_contributors: Vec<ContributorStanding>,
    },

    /// Gateway greeting carrying the currently configured room.
    #[serde(rename_all = "camelCase")]
    Config { room_id: Option<String> },
}

impl OutboundMessage {
    /// Get the message type as a string label for logging.
    pub fn type_label(&self) -> &'static str {
        match self {
            OutboundMessage::SessionStatus { .. } => "SessionStatus",
            OutboundMessage::StateSnapshot { .. } => "StateSnapshot",
            OutboundMessage::VisualEvent { .. } => "VisualEvent",
            OutboundMessage::SessionComplete { .. } => "SessionComplete",
            OutboundMessage::Config { .. } => "Config",
        }
    }
}
