//! Market-cap tier classification and advisory position sizing
//!
//! Tier is a function of market cap alone. Each tier carries its own
//! liquidity floor, safety floor and position scaling; the UNKNOWN tier is
//! always disabled and short-circuits the pipeline.

use serde::{Deserialize, Serialize};

use crate::config::TierOverrides;

/// Market-cap band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketCapTier {
    Micro,
    Rising,
    Emerging,
    Graduated,
    Established,
    Unknown,
}

impl MarketCapTier {
    /// Classify by market cap: [50k, 500k) MICRO, [500k, 8M) RISING,
    /// [8M, 20M) EMERGING, [20M, 50M) GRADUATED, [50M, 150M) ESTABLISHED,
    /// everything else UNKNOWN.
    pub fn classify(market_cap: f64) -> Self {
        match market_cap {
            m if (50_000.0..500_000.0).contains(&m) => MarketCapTier::Micro,
            m if (500_000.0..8_000_000.0).contains(&m) => MarketCapTier::Rising,
            m if (8_000_000.0..20_000_000.0).contains(&m) => MarketCapTier::Emerging,
            m if (20_000_000.0..50_000_000.0).contains(&m) => MarketCapTier::Graduated,
            m if (50_000_000.0..150_000_000.0).contains(&m) => MarketCapTier::Established,
            _ => MarketCapTier::Unknown,
        }
    }
}

impl std::fmt::Display for MarketCapTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MarketCapTier::Micro => "MICRO",
            MarketCapTier::Rising => "RISING",
            MarketCapTier::Emerging => "EMERGING",
            MarketCapTier::Graduated => "GRADUATED",
            MarketCapTier::Established => "ESTABLISHED",
            MarketCapTier::Unknown => "UNKNOWN",
        };
        write!(f, "{}", label)
    }
}

/// Per-tier gates and scaling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierSettings {
    pub enabled: bool,
    pub min_liquidity: f64,
    pub min_safety_score: u8,
    pub position_multiplier: f64,
    /// Hard cap on the suggested size for this tier
    pub max_position: f64,
}

/// The full tier table, built-in defaults merged with config overrides
#[derive(Debug, Clone)]
pub struct TierTable {
    micro: TierSettings,
    rising: TierSettings,
    emerging: TierSettings,
    graduated: TierSettings,
    established: TierSettings,
    unknown: TierSettings,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            micro: TierSettings {
                enabled: true,
                min_liquidity: 3_000.0,
                min_safety_score: 40,
                position_multiplier: 0.5,
                max_position: 0.5,
            },
            rising: TierSettings {
                enabled: true,
                min_liquidity: 5_000.0,
                min_safety_score: 35,
                position_multiplier: 1.0,
                max_position: 1.0,
            },
            emerging: TierSettings {
                enabled: true,
                min_liquidity: 25_000.0,
                min_safety_score: 30,
                position_multiplier: 1.2,
                max_position: 1.5,
            },
            graduated: TierSettings {
                enabled: true,
                min_liquidity: 50_000.0,
                min_safety_score: 30,
                position_multiplier: 1.0,
                max_position: 1.5,
            },
            established: TierSettings {
                enabled: true,
                min_liquidity: 100_000.0,
                min_safety_score: 25,
                position_multiplier: 0.8,
                max_position: 2.0,
            },
            unknown: TierSettings {
                enabled: false,
                min_liquidity: f64::MAX,
                min_safety_score: 100,
                position_multiplier: 0.0,
                max_position: 0.0,
            },
        }
    }
}

impl TierTable {
    /// Apply partial config overrides onto the built-in table
    pub fn with_overrides(overrides: &TierOverrides) -> Self {
        let mut table = Self::default();
        let apply = |settings: &mut TierSettings, o: &Option<crate::config::TierOverride>| {
            if let Some(o) = o {
                if let Some(enabled) = o.enabled {
                    settings.enabled = enabled;
                }
                if let Some(min_liquidity) = o.min_liquidity {
                    settings.min_liquidity = min_liquidity;
                }
                if let Some(min_safety) = o.min_safety_score {
                    settings.min_safety_score = min_safety;
                }
                if let Some(mult) = o.position_multiplier {
                    settings.position_multiplier = mult;
                }
                if let Some(max) = o.max_position {
                    settings.max_position = max;
                }
            }
        };
        apply(&mut table.micro, &overrides.micro);
        apply(&mut table.rising, &overrides.rising);
        apply(&mut table.emerging, &overrides.emerging);
        apply(&mut table.graduated, &overrides.graduated);
        apply(&mut table.established, &overrides.established);
        table
    }

    pub fn settings(&self, tier: MarketCapTier) -> &TierSettings {
        match tier {
            MarketCapTier::Micro => &self.micro,
            MarketCapTier::Rising => &self.rising,
            MarketCapTier::Emerging => &self.emerging,
            MarketCapTier::Graduated => &self.graduated,
            MarketCapTier::Established => &self.established,
            MarketCapTier::Unknown => &self.unknown,
        }
    }
}

/// Advisory position sizer; no trade is placed
pub struct PositionSizer {
    base_position_size: f64,
}

impl PositionSizer {
    pub fn new(base_position_size: f64) -> Self {
        Self { base_position_size }
    }

    /// `base x tier multiplier x quality multiplier`, capped per tier
    pub fn suggest(&self, tier: &TierSettings, signal_strength: f64) -> f64 {
        let size =
            self.base_position_size * tier.position_multiplier * Self::quality_multiplier(signal_strength);
        size.min(tier.max_position)
    }

    /// Scale with conviction: strong signals size up, marginal ones down
    fn quality_multiplier(signal_strength: f64) -> f64 {
        match signal_strength {
            s if s >= 75.0 => 1.5,
            s if s >= 60.0 => 1.2,
            s if s >= 45.0 => 1.0,
            _ => 0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TierOverride;

    #[test]
    fn test_classification_boundaries() {
        let cases: &[(f64, MarketCapTier)] = &[
            (49_999.0, MarketCapTier::Unknown),
            (50_000.0, MarketCapTier::Micro),
            (499_999.0, MarketCapTier::Micro),
            (500_000.0, MarketCapTier::Rising),
            (7_999_999.0, MarketCapTier::Rising),
            (8_000_000.0, MarketCapTier::Emerging),
            (19_999_999.0, MarketCapTier::Emerging),
            (20_000_000.0, MarketCapTier::Graduated),
            (49_999_999.0, MarketCapTier::Graduated),
            (50_000_000.0, MarketCapTier::Established),
            (149_999_999.0, MarketCapTier::Established),
            (150_000_000.0, MarketCapTier::Unknown),
        ];
        for (mcap, expected) in cases {
            assert_eq!(
                MarketCapTier::classify(*mcap),
                *expected,
                "market cap {}",
                mcap
            );
        }
    }

    #[test]
    fn test_unknown_tier_is_disabled() {
        let table = TierTable::default();
        assert!(!table.settings(MarketCapTier::Unknown).enabled);
    }

    #[test]
    fn test_overrides_merge_partially() {
        let overrides = TierOverrides {
            emerging: Some(TierOverride {
                enabled: Some(false),
                ..Default::default()
            }),
            micro: Some(TierOverride {
                min_liquidity: Some(8_000.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let table = TierTable::with_overrides(&overrides);
        assert!(!table.settings(MarketCapTier::Emerging).enabled);
        // Unset fields keep built-ins
        assert_eq!(table.settings(MarketCapTier::Emerging).min_liquidity, 25_000.0);
        assert_eq!(table.settings(MarketCapTier::Micro).min_liquidity, 8_000.0);
        assert!(table.settings(MarketCapTier::Micro).enabled);
    }

    #[test]
    fn test_sizing_scales_and_caps() {
        let table = TierTable::default();
        let sizer = PositionSizer::new(0.5);

        let rising = table.settings(MarketCapTier::Rising);
        // Strong signal: 0.5 * 1.0 * 1.5 = 0.75, under the 1.0 cap
        assert!((sizer.suggest(rising, 80.0) - 0.75).abs() < 1e-9);
        // Marginal signal sizes down
        assert!((sizer.suggest(rising, 40.0) - 0.4).abs() < 1e-9);

        let micro = table.settings(MarketCapTier::Micro);
        // 0.5 * 0.5 * 1.5 = 0.375, under the 0.5 cap
        assert!((sizer.suggest(micro, 90.0) - 0.375).abs() < 1e-9);

        // A big base gets capped per tier
        let big = PositionSizer::new(5.0);
        assert!((big.suggest(rising, 80.0) - 1.0).abs() < 1e-9);
    }
}
