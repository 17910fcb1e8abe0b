//! Session lifecycle controller
//!
//! Drives the Idle → Active → Finished state machine on a per-second tick
//! that is independent of event arrival rate. Finalization ranks teams and
//! top contributors and produces the one-time session summary.
//!
//! The controller is pure over the registry; the engine task owns the clock
//! that calls `tick` once per second.

use serde::{Deserialize, Serialize};
use tracing::info;
use types::outbound::{ContributorStanding, TeamScore};

use crate::registry::SessionRegistry;

/// Lifecycle phase of the single session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// No session has been started yet.
    Idle,
    /// Countdown running; events mutate state.
    Active,
    /// Countdown hit zero; state frozen until the next start.
    Finished,
}

/// Final results computed once at session end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub ranked_teams: Vec<TeamScore>,
    pub top_contributors: Vec<ContributorStanding>,
}

/// Outcome of one per-second tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Session not active; nothing happened.
    Idle,
    /// Countdown decremented, session still running.
    Ticked { countdown_seconds: u64 },
    /// Countdown reached zero on this tick; summary computed exactly once.
    Finished(SessionSummary),
}

/// Start (or restart) the session: valid from any phase. Discards all prior
/// state and begins a fresh countdown.
pub fn start(registry: &mut SessionRegistry) {
    let previous_phase = registry.phase();
    registry.reset();
    info!(
        session_id = %registry.session_id(),
        countdown_seconds = registry.countdown_seconds(),
        ?previous_phase,
        "session started"
    );
}

/// Advance the countdown by one second.
///
/// While active: decrement and mark dirty so the next broadcast carries the
/// new clock. On reaching zero: freeze the phase at `Finished` and compute
/// the final rankings.
pub fn tick(registry: &mut SessionRegistry, top_n: usize) -> TickOutcome {
    if registry.phase() != SessionPhase::Active {
        return TickOutcome::Idle;
    }

    let remaining = registry.countdown_seconds().saturating_sub(1);
    registry.set_countdown(remaining);
    registry.mark_dirty();

    if remaining == 0 {
        registry.set_phase(SessionPhase::Finished);
        let summary = SessionSummary {
            ranked_teams: registry.ranked_teams(),
            top_contributors: registry.top_contributors(top_n),
        };
        info!(
            teams = summary.ranked_teams.len(),
            contributors = summary.top_contributors.len(),
            "session finished"
        );
        TickOutcome::Finished(summary)
    } else {
        TickOutcome::Ticked {
            countdown_seconds: remaining,
        }
    }
}
