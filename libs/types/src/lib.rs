//! Types library for the live event aggregation engine
//!
//! This library provides the core type definitions shared between the
//! game engine and the gateway: identifiers, inbound interaction events
//! from the live-stream source, and outbound messages for observers.
//!
//! # Modules
//! - `ids`: Unique identifiers (ContributorId, TeamId, SessionId)
//! - `events`: Inbound interaction events (comments, bursts, gifts)
//! - `outbound`: Observer-facing messages (snapshots, visual events, summary)

// Public modules
pub mod events;
pub mod ids;
pub mod outbound;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::events::*;
    pub use crate::ids::*;
    pub use crate::outbound::*;
}
