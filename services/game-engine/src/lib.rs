//! Live Event Aggregation & Game Session Engine
//!
//! Consumes audience interaction events from a live-broadcast room and
//! produces a competitive, team-based score board for a timed session:
//! - Team classification from free-text chat via a static alias catalog
//! - Gift-streak de-duplicated scoring with configurable tier policy
//! - Per-team and per-contributor totals kept consistent under concurrent
//!   arrival (single-writer actor)
//! - Countdown-driven session lifecycle with a one-time results summary
//! - Rate-limited, coalesced state snapshots for observers
//!
//! # Architecture
//!
//! ```text
//! Event Source ──┐
//!                ├──► mpsc ──► Engine task ──► Registry (owned)
//! Gateway cmds ──┘               │  ▲
//!                                │  │ 1s lifecycle tick
//!                                │  │ broadcast cadence tick
//!                                ▼
//!                     tokio::sync::broadcast ──► observers
//! ```
//!
//! All registry mutation happens inside one owning task, so snapshots can
//! never observe a team score out of step with its members' points.

pub mod config;
pub mod engine;
pub mod lifecycle;
pub mod metrics;
pub mod registry;
pub mod scoring;
pub mod source;
pub mod teams;

pub use config::SessionConfig;
pub use engine::{Engine, EngineCommand, EngineError, EngineHandle};
pub use lifecycle::SessionPhase;
pub use registry::{RegisterOutcome, SessionRegistry};
pub use scoring::GiftTierPolicy;
pub use source::{EventSource, SourceConnection, SourceError, SourceManager};
pub use teams::TeamResolver;

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
