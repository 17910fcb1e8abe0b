//! Scoring rules
//!
//! Pure mapping from a classified interaction event to a point value.
//! Comments score nothing (they only register). Bursts score their batch
//! count as-is. Gifts are the subtle case: a streak arrives as repeated
//! cumulative updates for one continuous user action, and only the terminal
//! update may score — awarding intermediates would multiply one gift
//! several times over.

use serde::{Deserialize, Serialize};

/// Configurable gift tier policy.
///
/// Gift names are matched case-insensitively against substring patterns,
/// evaluated low-tier first, then premium, then the unit-value fallback.
/// The catalog of platform gift identifiers is not authoritative, so this
/// is runtime data rather than hardcoded constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftTierPolicy {
    /// Substring patterns for low-tier gifts.
    pub low_tier_patterns: Vec<String>,
    /// Points per repeat for a low-tier gift.
    pub low_tier_value: u64,
    /// Substring patterns for premium gifts.
    pub premium_patterns: Vec<String>,
    /// Points per repeat for a premium gift.
    pub premium_value: u64,
}

impl Default for GiftTierPolicy {
    fn default() -> Self {
        Self {
            low_tier_patterns: vec!["rose".to_string()],
            low_tier_value: 10,
            premium_patterns: vec!["cap".to_string(), "tiktok".to_string()],
            premium_value: 100,
        }
    }
}

impl GiftTierPolicy {
    /// Points for one completed gift streak.
    ///
    /// `unit_value` is the gift's intrinsic cost from the event; it only
    /// matters for gifts outside both tier pattern sets. A zero result means
    /// the gift produces no score mutation and no visual event.
    pub fn streak_points(&self, gift_name: &str, unit_value: u64, total_repeats: u64) -> u64 {
        let name = gift_name.to_lowercase();

        let per_repeat = if self.low_tier_patterns.iter().any(|p| name.contains(p.as_str())) {
            self.low_tier_value
        } else if self.premium_patterns.iter().any(|p| name.contains(p.as_str())) {
            self.premium_value
        } else {
            unit_value
        };

        // Both factors are platform-supplied; saturate rather than trust them.
        per_repeat.saturating_mul(total_repeats)
    }
}

/// Points for a burst of likes. Counts are already atomic per event, so the
/// batch count maps straight to points.
pub fn burst_points(count: u64) -> u64 {
    count
}

/// Points for a gift update.
///
/// Returns `None` for intermediate streak updates — only the terminal
/// update carries the authoritative repeat total. `Some(0)` is possible for
/// recognized-but-worthless gifts and callers must treat it as no score.
pub fn gift_points(
    policy: &GiftTierPolicy,
    gift_name: &str,
    unit_value: u64,
    total_repeats: u64,
    streak_complete: bool,
) -> Option<u64> {
    if !streak_complete {
        return None;
    }
    Some(policy.streak_points(gift_name, unit_value, total_repeats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_tier_gift() {
        let policy = GiftTierPolicy::default();
        assert_eq!(policy.streak_points("Rose", 1, 5), 50);
        assert_eq!(policy.streak_points("rose garland", 3, 2), 20);
    }

    #[test]
    fn test_premium_gift() {
        let policy = GiftTierPolicy::default();
        assert_eq!(policy.streak_points("TikTok Cap", 99, 1), 100);
        assert_eq!(policy.streak_points("tiktok universe", 500, 2), 200);
    }

    #[test]
    fn test_fallback_uses_unit_value() {
        let policy = GiftTierPolicy::default();
        assert_eq!(policy.streak_points("Galaxy", 25, 3), 75);
    }

    #[test]
    fn test_low_tier_checked_before_premium() {
        // A name matching both tiers resolves to low tier by evaluation order.
        let policy = GiftTierPolicy {
            low_tier_patterns: vec!["star".to_string()],
            premium_patterns: vec!["star".to_string()],
            ..GiftTierPolicy::default()
        };
        assert_eq!(policy.streak_points("star", 1, 1), policy.low_tier_value);
    }

    #[test]
    fn test_oversized_streak_saturates() {
        let policy = GiftTierPolicy::default();
        assert_eq!(policy.streak_points("Galaxy", u64::MAX, 3), u64::MAX);
        assert_eq!(policy.streak_points("Rose", 1, u64::MAX), u64::MAX);
    }

    #[test]
    fn test_zero_value_fallback_gift() {
        let policy = GiftTierPolicy::default();
        assert_eq!(policy.streak_points("Mystery Box", 0, 4), 0);
    }

    #[test]
    fn test_intermediate_streak_update_scores_nothing() {
        let policy = GiftTierPolicy::default();
        assert_eq!(gift_points(&policy, "Rose", 1, 3, false), None);
    }

    #[test]
    fn test_terminal_streak_update_scores_once() {
        let policy = GiftTierPolicy::default();
        assert_eq!(gift_points(&policy, "Rose", 1, 5, true), Some(50));
    }

    #[test]
    fn test_burst_points_identity() {
        assert_eq!(burst_points(7), 7);
        assert_eq!(burst_points(0), 0);
    }
}
