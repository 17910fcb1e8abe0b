//! Session registry
//!
//! In-memory owner of contributors, teams, and the session lifecycle state
//! for the current round. `add_points` is the sole score-mutation path: it
//! bumps the contributor's points and the team's running score in lockstep,
//! which makes the score-sum invariant hold by construction instead of by
//! rescanning members.
//!
//! The registry itself is not synchronized — the engine task owns it
//! exclusively and serializes every mutation (see `engine`).

use std::collections::{HashMap, HashSet};

use tracing::debug;
use types::events::ContributorIdentity;
use types::ids::{ContributorId, SessionId, TeamId};
use types::outbound::{ContributorStanding, TeamScore, TeamStanding};

use crate::lifecycle::SessionPhase;
use crate::teams::TeamResolver;

/// One audience participant who has joined a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
    pub id: ContributorId,
    pub handle: String,
    pub nickname: String,
    pub avatar_ref: String,
    /// Immutable for the session: first valid classification wins.
    pub team_id: TeamId,
    /// Cumulative contribution points, monotonic while the session runs.
    pub points: u64,
    /// Registration order, used as the tie-break for top-contributor ranking.
    registered_seq: u64,
}

/// One competing team. Score is a running accumulator, never recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Team {
    score: u64,
    members: HashSet<ContributorId>,
    /// Creation order, used as the tie-break for team ranking.
    created_seq: u64,
}

/// Outcome of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// New contributor created and added to the team.
    Registered,
    /// Contributor already known; first classification is sticky.
    AlreadyRegistered,
    /// Alias resolved to no team; input ignored.
    UnknownAlias,
    /// Session not active; input ignored.
    Inactive,
}

/// A point-in-time, immutable read of the score board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    /// Teams in descending score order; ties break by creation order.
    pub teams: Vec<TeamStanding>,
    pub countdown_seconds: u64,
    pub active: bool,
}

/// Owner of all mutable game state for the current session.
#[derive(Debug)]
pub struct SessionRegistry {
    contributors: HashMap<ContributorId, Contributor>,
    teams: HashMap<TeamId, Team>,
    resolver: TeamResolver,
    /// Identifies the current session; regenerated on every reset.
    session_id: SessionId,
    phase: SessionPhase,
    countdown_seconds: u64,
    /// Configured session length, restored on every reset.
    session_length: u64,
    /// Whether state changed since the last broadcast flush.
    dirty: bool,
    /// Monotonic counter stamping registration and team-creation order.
    next_seq: u64,
}

impl SessionRegistry {
    /// Create a registry in the `Idle` phase.
    pub fn new(resolver: TeamResolver, session_length: u64) -> Self {
        Self {
            contributors: HashMap::new(),
            teams: HashMap::new(),
            resolver,
            session_id: SessionId::new(),
            phase: SessionPhase::Idle,
            countdown_seconds: session_length,
            session_length,
            dirty: false,
            next_seq: 0,
        }
    }

    /// Register a contributor under the team named by `team_alias`.
    ///
    /// No-op when the alias is unknown, the session is not active, or the
    /// contributor is already registered (first classification is sticky).
    pub fn register_contributor(
        &mut self,
        identity: &ContributorIdentity,
        team_alias: &str,
    ) -> RegisterOutcome {
        if self.phase != SessionPhase::Active {
            return RegisterOutcome::Inactive;
        }

        let Some(team_id) = self.resolver.resolve(team_alias) else {
            return RegisterOutcome::UnknownAlias;
        };

        if self.contributors.contains_key(&identity.id) {
            debug!(contributor = %identity.id, "contributor already registered, alias ignored");
            return RegisterOutcome::AlreadyRegistered;
        }

        let seq = self.bump_seq();
        self.contributors.insert(
            identity.id.clone(),
            Contributor {
                id: identity.id.clone(),
                handle: identity.handle.clone(),
                nickname: identity.nickname.clone(),
                avatar_ref: identity.avatar_ref.clone(),
                team_id: team_id.clone(),
                points: 0,
                registered_seq: seq,
            },
        );

        if !self.teams.contains_key(&team_id) {
            let created_seq = self.bump_seq();
            self.teams.insert(
                team_id.clone(),
                Team {
                    score: 0,
                    members: HashSet::new(),
                    created_seq,
                },
            );
            debug!(team = %team_id, "team created");
        }
        if let Some(team) = self.teams.get_mut(&team_id) {
            team.members.insert(identity.id.clone());
        }

        debug!(contributor = %identity.id, team = %team_id, "contributor registered");
        RegisterOutcome::Registered
    }

    /// Add points to a contributor and, in lockstep, to their team.
    ///
    /// No-op when the contributor is unknown, `points` is zero, or the
    /// session is not active. Returns true when a mutation happened.
    pub fn add_points(&mut self, contributor_id: &ContributorId, points: u64) -> bool {
        if self.phase != SessionPhase::Active || points == 0 {
            return false;
        }

        let Some(contributor) = self.contributors.get_mut(contributor_id) else {
            return false;
        };

        contributor.points = contributor.points.saturating_add(points);
        let team_id = contributor.team_id.clone();

        // Membership is immutable, so the team must exist.
        if let Some(team) = self.teams.get_mut(&team_id) {
            team.score = team.score.saturating_add(points);
        }
        self.dirty = true;
        true
    }

    /// Produce an immutable read of the board. Does not clear the dirty flag.
    pub fn snapshot(&self) -> BoardSnapshot {
        let mut entries: Vec<(&TeamId, &Team)> = self.teams.iter().collect();
        entries.sort_by(|(_, a), (_, b)| {
            b.score.cmp(&a.score).then(a.created_seq.cmp(&b.created_seq))
        });

        BoardSnapshot {
            teams: entries
                .into_iter()
                .map(|(id, team)| TeamStanding {
                    id: id.clone(),
                    score: team.score,
                    member_count: team.members.len(),
                })
                .collect(),
            countdown_seconds: self.countdown_seconds,
            active: self.phase == SessionPhase::Active,
        }
    }

    /// Final team ranking: descending score, creation-order tie-break.
    pub fn ranked_teams(&self) -> Vec<TeamScore> {
        let mut entries: Vec<(&TeamId, &Team)> = self.teams.iter().collect();
        entries.sort_by(|(_, a), (_, b)| {
            b.score.cmp(&a.score).then(a.created_seq.cmp(&b.created_seq))
        });
        entries
            .into_iter()
            .map(|(id, team)| TeamScore {
                id: id.clone(),
                score: team.score,
            })
            .collect()
    }

    /// Top `n` contributors globally: descending points, earliest
    /// registration wins ties.
    pub fn top_contributors(&self, n: usize) -> Vec<ContributorStanding> {
        let mut entries: Vec<&Contributor> = self.contributors.values().collect();
        entries.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then(a.registered_seq.cmp(&b.registered_seq))
        });
        entries
            .into_iter()
            .take(n)
            .map(|c| ContributorStanding {
                contributor_id: c.id.clone(),
                handle: c.handle.clone(),
                team_id: c.team_id.clone(),
                points: c.points,
            })
            .collect()
    }

    /// Discard all contributors and teams and begin a fresh active session.
    pub fn reset(&mut self) {
        self.contributors.clear();
        self.teams.clear();
        self.session_id = SessionId::new();
        self.countdown_seconds = self.session_length;
        self.phase = SessionPhase::Active;
        self.dirty = true;
        self.next_seq = 0;
    }

    /// Identifier of the current session.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Look up a contributor by id.
    pub fn contributor(&self, id: &ContributorId) -> Option<&Contributor> {
        self.contributors.get(id)
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
    }

    /// Remaining countdown in seconds.
    pub fn countdown_seconds(&self) -> u64 {
        self.countdown_seconds
    }

    pub(crate) fn set_countdown(&mut self, seconds: u64) {
        self.countdown_seconds = seconds;
    }

    /// Whether state changed since the last broadcast flush.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark state as changed since the last broadcast flush.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear the dirty flag after a flush.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Number of registered contributors.
    pub fn contributor_count(&self) -> usize {
        self.contributors.len()
    }

    /// Number of teams created so far this session.
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Sum of member points for a team, recomputed by scanning. Test-only
    /// cross-check against the running accumulator.
    #[cfg(test)]
    fn recomputed_team_score(&self, team_id: &TeamId) -> u64 {
        self.contributors
            .values()
            .filter(|c| &c.team_id == team_id)
            .map(|c| c.points)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn identity(id: &str) -> ContributorIdentity {
        ContributorIdentity {
            id: ContributorId::new(id),
            handle: format!("@{id}"),
            nickname: id.to_string(),
            avatar_ref: format!("https://cdn.example/{id}.png"),
        }
    }

    fn active_registry() -> SessionRegistry {
        let mut registry = SessionRegistry::new(TeamResolver::with_default_catalog(), 3600);
        registry.reset();
        registry
    }

    #[test]
    fn test_registration_creates_contributor_and_team() {
        let mut registry = active_registry();
        assert_eq!(
            registry.register_contributor(&identity("a"), "usa"),
            RegisterOutcome::Registered
        );

        assert_eq!(registry.contributor_count(), 1);
        assert_eq!(registry.team_count(), 1);

        let c = registry.contributor(&ContributorId::new("a")).unwrap();
        assert_eq!(c.team_id.as_str(), "USA");
        assert_eq!(c.points, 0);
    }

    #[test]
    fn test_registration_is_idempotent() {
        let mut registry = active_registry();
        assert_eq!(
            registry.register_contributor(&identity("a"), "usa"),
            RegisterOutcome::Registered
        );
        // Second attempt with a different alias leaves the assignment alone.
        assert_eq!(
            registry.register_contributor(&identity("a"), "mexico"),
            RegisterOutcome::AlreadyRegistered
        );

        let c = registry.contributor(&ContributorId::new("a")).unwrap();
        assert_eq!(c.team_id.as_str(), "USA");
        assert_eq!(registry.team_count(), 1);
    }

    #[test]
    fn test_registration_unknown_alias_is_noop() {
        let mut registry = active_registry();
        assert_eq!(
            registry.register_contributor(&identity("a"), "atlantis"),
            RegisterOutcome::UnknownAlias
        );
        assert_eq!(registry.contributor_count(), 0);
        assert_eq!(registry.team_count(), 0);
    }

    #[test]
    fn test_registration_inactive_is_noop() {
        let mut registry = SessionRegistry::new(TeamResolver::with_default_catalog(), 3600);
        assert_eq!(
            registry.register_contributor(&identity("a"), "usa"),
            RegisterOutcome::Inactive
        );
        assert_eq!(registry.contributor_count(), 0);
    }

    #[test]
    fn test_add_points_updates_contributor_and_team() {
        let mut registry = active_registry();
        registry.register_contributor(&identity("a"), "usa");
        registry.clear_dirty();

        assert!(registry.add_points(&ContributorId::new("a"), 7));
        assert!(registry.is_dirty());

        let c = registry.contributor(&ContributorId::new("a")).unwrap();
        assert_eq!(c.points, 7);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.teams[0].score, 7);
    }

    #[test]
    fn test_add_points_unknown_contributor_is_noop() {
        let mut registry = active_registry();
        registry.clear_dirty();
        assert!(!registry.add_points(&ContributorId::new("ghost"), 5));
        assert!(!registry.is_dirty());
    }

    #[test]
    fn test_add_points_zero_is_noop() {
        let mut registry = active_registry();
        registry.register_contributor(&identity("a"), "usa");
        registry.clear_dirty();
        assert!(!registry.add_points(&ContributorId::new("a"), 0));
        assert!(!registry.is_dirty());
    }

    #[test]
    fn test_points_saturate_instead_of_overflowing() {
        let mut registry = active_registry();
        registry.register_contributor(&identity("a"), "usa");
        registry.add_points(&ContributorId::new("a"), u64::MAX);
        registry.add_points(&ContributorId::new("a"), 10);

        let c = registry.contributor(&ContributorId::new("a")).unwrap();
        assert_eq!(c.points, u64::MAX);
        assert_eq!(registry.snapshot().teams[0].score, u64::MAX);
    }

    #[test]
    fn test_add_points_inactive_is_noop() {
        let mut registry = active_registry();
        registry.register_contributor(&identity("a"), "usa");
        registry.set_phase(SessionPhase::Finished);
        registry.clear_dirty();

        assert!(!registry.add_points(&ContributorId::new("a"), 5));
        assert!(!registry.is_dirty());
        assert_eq!(registry.contributor(&ContributorId::new("a")).unwrap().points, 0);
    }

    #[test]
    fn test_snapshot_orders_by_score_then_creation() {
        let mut registry = active_registry();
        registry.register_contributor(&identity("a"), "usa");
        registry.register_contributor(&identity("b"), "mexico");
        registry.register_contributor(&identity("c"), "chile");

        registry.add_points(&ContributorId::new("b"), 10);
        registry.add_points(&ContributorId::new("c"), 10);

        let snapshot = registry.snapshot();
        // Mexico and Chile tie at 10; Mexico was created second, Chile third,
        // but USA (created first) sits last with 0.
        assert_eq!(snapshot.teams[0].id.as_str(), "Mexico");
        assert_eq!(snapshot.teams[1].id.as_str(), "Chile");
        assert_eq!(snapshot.teams[2].id.as_str(), "USA");
    }

    #[test]
    fn test_snapshot_does_not_clear_dirty() {
        let mut registry = active_registry();
        registry.register_contributor(&identity("a"), "usa");
        registry.add_points(&ContributorId::new("a"), 1);
        assert!(registry.is_dirty());
        let _ = registry.snapshot();
        assert!(registry.is_dirty());
    }

    #[test]
    fn test_reset_discards_everything() {
        let mut registry = active_registry();
        registry.register_contributor(&identity("a"), "usa");
        registry.add_points(&ContributorId::new("a"), 5);
        let previous_session = registry.session_id();

        registry.reset();

        assert_ne!(registry.session_id(), previous_session);
        assert_eq!(registry.contributor_count(), 0);
        assert_eq!(registry.team_count(), 0);
        assert_eq!(registry.countdown_seconds(), 3600);
        assert_eq!(registry.phase(), SessionPhase::Active);
        assert!(registry.is_dirty());
    }

    #[test]
    fn test_top_contributors_ties_break_by_registration_order() {
        let mut registry = active_registry();
        registry.register_contributor(&identity("a"), "usa");
        registry.register_contributor(&identity("b"), "mexico");
        registry.register_contributor(&identity("c"), "usa");

        registry.add_points(&ContributorId::new("b"), 20);
        registry.add_points(&ContributorId::new("a"), 10);
        registry.add_points(&ContributorId::new("c"), 10);

        let top = registry.top_contributors(3);
        assert_eq!(top[0].contributor_id.as_str(), "b");
        // a and c tie at 10; a registered first.
        assert_eq!(top[1].contributor_id.as_str(), "a");
        assert_eq!(top[2].contributor_id.as_str(), "c");
    }

    #[test]
    fn test_top_contributors_truncates() {
        let mut registry = active_registry();
        for (i, alias) in ["usa", "mexico", "chile", "peru"].iter().enumerate() {
            let id = format!("u{i}");
            registry.register_contributor(&identity(&id), alias);
            registry.add_points(&ContributorId::new(&id), (i as u64 + 1) * 10);
        }
        assert_eq!(registry.top_contributors(3).len(), 3);
    }

    proptest! {
        /// The running team accumulator always equals the sum of member
        /// points, across arbitrary interleavings of registrations (valid
        /// and invalid aliases) and point awards.
        #[test]
        fn prop_team_score_equals_member_sum(
            ops in proptest::collection::vec(
                (0u8..8, 0u64..100),
                1..200,
            )
        ) {
            let aliases = ["usa", "mexico", "chile", "atlantis"];
            let mut registry = active_registry();

            for (selector, amount) in ops {
                let user = format!("user_{}", selector % 4);
                if amount % 3 == 0 {
                    let alias = aliases[(selector % 4) as usize];
                    registry.register_contributor(&identity(&user), alias);
                } else {
                    registry.add_points(&ContributorId::new(&user), amount);
                }
            }

            for standing in registry.snapshot().teams {
                prop_assert_eq!(
                    standing.score,
                    registry.recomputed_team_score(&standing.id)
                );
            }
        }
    }
}
