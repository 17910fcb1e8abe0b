//! Engine configuration
//!
//! Session length, broadcast cadence, and channel capacities. Everything
//! that was an implicit constant in earlier iterations of this system is
//! explicit here so the binary (or a test) can override it.

use std::time::Duration;

/// Configuration for one engine instance.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Countdown length of a session in seconds.
    pub countdown_seconds: u64,
    /// Wall-clock cadence of the snapshot broadcaster.
    pub broadcast_interval: Duration,
    /// How many contributors the final summary ranks.
    pub top_contributors: usize,
    /// Capacity of the inbound command channel.
    pub command_buffer: usize,
    /// Capacity of the observer broadcast channel. Lagging observers skip
    /// messages once they fall this far behind.
    pub observer_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown_seconds: 3600,
            broadcast_interval: Duration::from_millis(500),
            top_contributors: 3,
            command_buffer: 1024,
            observer_buffer: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.countdown_seconds, 3600);
        assert_eq!(config.broadcast_interval, Duration::from_millis(500));
        assert_eq!(config.top_contributors, 3);
    }
}
