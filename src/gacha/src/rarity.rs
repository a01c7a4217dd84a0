//! Rarity tier definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discrete rarity tier, ordered from least to most rare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RarityTier {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// Presentation data for a tier
struct TierInfo {
    tier: RarityTier,
    name: &'static str,
    color: &'static str,
    /// Inclusive lower bound of the rarity score range
    min_score: f64,
}

/// Tier table, evaluated top-down (first match wins)
const TIER_TABLE: &[TierInfo] = &[
    TierInfo {
        tier: RarityTier::Legendary,
        name: "Legendary",
        color: "#EAB308",
        min_score: 0.98,
    },
    TierInfo {
        tier: RarityTier::Epic,
        name: "Epic",
        color: "#A855F7",
        min_score: 0.90,
    },
    TierInfo {
        tier: RarityTier::Rare,
        name: "Rare",
        color: "#3B82F6",
        min_score: 0.80,
    },
    TierInfo {
        tier: RarityTier::Uncommon,
        name: "Uncommon",
        color: "#22C55E",
        min_score: 0.50,
    },
    TierInfo {
        tier: RarityTier::Common,
        name: "Common",
        color: "#6B7280",
        min_score: 0.0,
    },
];

/// Map a rarity score to its tier.
///
/// Boundaries are inclusive on the lower end, so a score of exactly `0.98`
/// is Legendary. Scores above 1 behave like 1, scores below 0 (and NaN)
/// behave like 0.
pub fn classify(score: f64) -> RarityTier {
    TIER_TABLE
        .iter()
        .find(|t| score >= t.min_score)
        .map_or(RarityTier::Common, |t| t.tier)
}

impl RarityTier {
    /// All tiers, least rare first
    pub const ALL: [RarityTier; 5] = [
        RarityTier::Common,
        RarityTier::Uncommon,
        RarityTier::Rare,
        RarityTier::Epic,
        RarityTier::Legendary,
    ];

    fn info(self) -> &'static TierInfo {
        // Every variant has exactly one row
        let idx = TIER_TABLE.len() - 1 - self as usize;
        &TIER_TABLE[idx]
    }

    /// Display label
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Display color as a hex string
    pub fn color(self) -> &'static str {
        self.info().color
    }

    /// Lowest score that classifies into this tier
    pub fn min_score(self) -> f64 {
        self.info().min_score
    }
}

impl fmt::Display for RarityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown tier name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown rarity tier: {0}")]
pub struct UnknownTier(pub String);

impl FromStr for RarityTier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RarityTier::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTier(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_inclusive() {
        assert_eq!(classify(0.98), RarityTier::Legendary);
        assert_eq!(classify(0.979999), RarityTier::Epic);
        assert_eq!(classify(0.90), RarityTier::Epic);
        assert_eq!(classify(0.899999), RarityTier::Rare);
        assert_eq!(classify(0.80), RarityTier::Rare);
        assert_eq!(classify(0.799999), RarityTier::Uncommon);
        assert_eq!(classify(0.5), RarityTier::Uncommon);
        assert_eq!(classify(0.499999), RarityTier::Common);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(classify(0.0), RarityTier::Common);
        assert_eq!(classify(1.0), RarityTier::Legendary);
        assert_eq!(classify(1.7), RarityTier::Legendary);
        assert_eq!(classify(-0.3), RarityTier::Common);
        assert_eq!(classify(f64::NAN), RarityTier::Common);
    }

    #[test]
    fn test_tier_order() {
        assert!(RarityTier::Common < RarityTier::Uncommon);
        assert!(RarityTier::Epic < RarityTier::Legendary);
        let mut sorted = RarityTier::ALL;
        sorted.sort();
        assert_eq!(sorted, RarityTier::ALL);
    }

    #[test]
    fn test_info_lookup_matches_variant() {
        for tier in RarityTier::ALL {
            assert_eq!(classify(tier.min_score()), tier);
        }
        assert_eq!(RarityTier::Rare.name(), "Rare");
        assert_eq!(RarityTier::Legendary.color(), "#EAB308");
    }

    #[test]
    fn test_parse_tier() {
        assert_eq!("epic".parse::<RarityTier>(), Ok(RarityTier::Epic));
        assert_eq!(" Legendary ".parse::<RarityTier>(), Ok(RarityTier::Legendary));
        assert!("mythic".parse::<RarityTier>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&RarityTier::Uncommon).unwrap();
        assert_eq!(json, "\"uncommon\"");
        let tier: RarityTier = serde_json::from_str("\"rare\"").unwrap();
        assert_eq!(tier, RarityTier::Rare);
    }
}
