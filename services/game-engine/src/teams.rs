//! Team resolver
//!
//! Pure lookup turning free-text audience input into a canonical team id.
//! Matching is case-insensitive and whitespace-trimmed; each team accepts
//! several aliases (full name, ISO-style short code, numeric shortcut).
//! Unknown input resolves to `None` and callers must ignore it — open
//! audience chat is mostly noise, not errors.

use std::collections::HashMap;

use types::ids::TeamId;

/// Resolves free-text aliases to canonical team identifiers.
///
/// The catalog is immutable after construction; resolution has no side
/// effects and never fails.
#[derive(Debug, Clone)]
pub struct TeamResolver {
    aliases: HashMap<String, TeamId>,
}

/// Default team catalog: (canonical id, aliases).
///
/// Numeric shortcuts let viewers join by typing a single digit pair, which
/// matters on mobile chat. The catalog is data; swapping it out does not
/// touch resolution logic.
const DEFAULT_CATALOG: &[(&str, &[&str])] = &[
    ("Mexico", &["mx", "mex", "mexico", "1"]),
    ("Argentina", &["ar", "argentina", "2"]),
    ("Colombia", &["co", "colombia", "3"]),
    ("España", &["es", "espana", "españa", "spain", "4"]),
    ("USA", &["us", "usa", "united states", "5"]),
    ("Peru", &["pe", "peru", "6"]),
    ("Chile", &["cl", "chile", "7"]),
    ("Ecuador", &["ec", "ecuador", "8"]),
    ("Venezuela", &["ve", "venezuela", "9"]),
    ("Bolivia", &["bo", "bolivia", "10"]),
    ("Paraguay", &["py", "paraguay", "11"]),
    ("Uruguay", &["uy", "uruguay", "12"]),
    ("El Salvador", &["sv", "elsalvador", "el salvador", "13"]),
    ("Japon", &["jp", "japon", "14"]),
    ("Brasil", &["br", "brasil", "15"]),
    ("Portugal", &["pt", "portugal", "16"]),
    ("Italia", &["it", "italia", "17"]),
    ("Alemania", &["de", "alemania", "18"]),
    ("Francia", &["fr", "francia", "19"]),
    ("Reino Unido", &["gb", "reino unido", "20"]),
    ("Grecia", &["gr", "grecia", "21"]),
];

impl TeamResolver {
    /// Build a resolver from a custom catalog of (canonical id, aliases).
    ///
    /// The canonical id itself is always accepted as an alias.
    pub fn from_catalog<'a, I>(catalog: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [&'a str])>,
    {
        let mut aliases = HashMap::new();
        for (canonical, names) in catalog {
            let team = TeamId::new(canonical);
            aliases.insert(canonical.to_lowercase(), team.clone());
            for name in names {
                aliases.insert(name.to_lowercase(), team.clone());
            }
        }
        Self { aliases }
    }

    /// Build a resolver with the default country catalog.
    pub fn with_default_catalog() -> Self {
        Self::from_catalog(DEFAULT_CATALOG.iter().map(|(c, a)| (*c, *a)))
    }

    /// Resolve raw audience text to a canonical team id.
    ///
    /// Trims surrounding whitespace and ignores case. Returns `None` for
    /// anything outside the catalog.
    pub fn resolve(&self, input: &str) -> Option<TeamId> {
        let normalized = input.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        self.aliases.get(&normalized).cloned()
    }

    /// Number of distinct aliases in the catalog.
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}

impl Default for TeamResolver {
    fn default() -> Self {
        Self::with_default_catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_full_name() {
        let resolver = TeamResolver::with_default_catalog();
        assert_eq!(resolver.resolve("usa").unwrap().as_str(), "USA");
        assert_eq!(resolver.resolve("argentina").unwrap().as_str(), "Argentina");
    }

    #[test]
    fn test_resolve_short_code() {
        let resolver = TeamResolver::with_default_catalog();
        assert_eq!(resolver.resolve("mx").unwrap().as_str(), "Mexico");
        assert_eq!(resolver.resolve("gb").unwrap().as_str(), "Reino Unido");
    }

    #[test]
    fn test_resolve_numeric_shortcut() {
        let resolver = TeamResolver::with_default_catalog();
        assert_eq!(resolver.resolve("5").unwrap().as_str(), "USA");
        assert_eq!(resolver.resolve("21").unwrap().as_str(), "Grecia");
    }

    #[test]
    fn test_resolve_case_and_whitespace() {
        let resolver = TeamResolver::with_default_catalog();
        assert_eq!(resolver.resolve("  USA  ").unwrap().as_str(), "USA");
        assert_eq!(resolver.resolve("SPAIN").unwrap().as_str(), "España");
        assert_eq!(resolver.resolve("El Salvador").unwrap().as_str(), "El Salvador");
    }

    #[test]
    fn test_resolve_unknown_is_none() {
        let resolver = TeamResolver::with_default_catalog();
        assert!(resolver.resolve("atlantis").is_none());
        assert!(resolver.resolve("").is_none());
        assert!(resolver.resolve("   ").is_none());
        assert!(resolver.resolve("99").is_none());
    }

    #[test]
    fn test_custom_catalog() {
        let catalog: &[(&str, &[&str])] = &[("Red", &["r", "1"]), ("Blue", &["b", "2"])];
        let resolver = TeamResolver::from_catalog(catalog.iter().map(|(c, a)| (*c, *a)));
        assert_eq!(resolver.resolve("r").unwrap().as_str(), "Red");
        assert_eq!(resolver.resolve("blue").unwrap().as_str(), "Blue");
        assert!(resolver.resolve("usa").is_none());
    }
}
