//! Unique identifier types for game entities
//!
//! Contributor and team identifiers originate outside this system (the
//! live-stream platform assigns contributor ids; team ids come from the
//! alias catalog), so both wrap strings. Session ids are generated locally
//! and use UUID v7 for time-sortable ordering.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an audience contributor
///
/// Wraps the opaque user id supplied by the live-stream platform. The id is
/// stable for the lifetime of a broadcast and is the key under which all
/// contribution points accumulate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributorId(String);

impl ContributorId {
    /// Create a ContributorId from a platform-supplied user id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContributorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical identifier for a competing team
///
/// Produced only by the team resolver; free-text audience input never
/// becomes a TeamId without passing through the alias catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    /// Create a TeamId from a canonical catalog entry
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the canonical id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one timed game session
///
/// Uses UUID v7 for time-based sorting so completed sessions can be
/// ordered chronologically by id alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new SessionId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contributor_id_roundtrip() {
        let id = ContributorId::new("user_7421");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"user_7421\"");

        let deserialized: ContributorId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_team_id_display() {
        let team = TeamId::new("USA");
        assert_eq!(team.as_str(), "USA");
        assert_eq!(team.to_string(), "USA");
    }

    #[test]
    fn test_session_id_uniqueness() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2, "SessionIds should be unique");
    }

    #[test]
    fn test_session_id_serialization() {
        let id = SessionId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
