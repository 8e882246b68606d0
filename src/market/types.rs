//! Fused data model shared across the acquisition layer and the pipeline
//!
//! Raw provider JSON never leaks past the clients; everything downstream of
//! the facade works on these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot of a token at a point in time, composed from whichever providers
/// answered. Absent entirely when no provider returned data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenMetrics {
    pub address: String,
    pub ticker: String,
    pub name: String,
    pub price: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub liquidity: f64,
    /// Derived: volume_24h / market_cap (0 when market cap is unknown)
    pub volume_market_cap_ratio: f64,
    /// May be a pagination-capped floor when only the RPC source answered
    pub holder_count: u64,
    /// Signed percent derived from the holder snapshot history
    pub holder_change_1h: f64,
    /// Percent 0..100
    pub top10_concentration: f64,
    pub token_age_minutes: f64,
    /// Tri-state: Some(true)/Some(false) when known, None otherwise
    pub lp_locked: Option<bool>,
}

impl TokenMetrics {
    pub fn volume_mcap_ratio(volume_24h: f64, market_cap: f64) -> f64 {
        if market_cap > 0.0 {
            volume_24h / market_cap
        } else {
            0.0
        }
    }
}

/// Contract-level and distribution-level safety assessment.
///
/// On missing upstream data the report carries permissive defaults plus an
/// explicit `data_missing` flag so downstream knows the score is
/// low-confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyReport {
    pub mint_authority_revoked: bool,
    pub freeze_authority_revoked: bool,
    pub metadata_mutable: bool,
    /// 0..=100
    pub safety_score: u8,
    /// Percent 0..100
    pub deployer_holding_percent: f64,
    /// Percent 0..100
    pub top10_holder_concentration: f64,
    /// 0..=100
    pub insider_risk_score: u8,
    pub same_block_buyers: u32,
    pub deployer_funded_buyers: u32,
    pub flags: Vec<String>,
}

pub const FLAG_DATA_MISSING: &str = "data_missing";

impl SafetyReport {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    pub fn is_data_missing(&self) -> bool {
        self.has_flag(FLAG_DATA_MISSING)
    }
}

/// Early-block clustering / insider risk assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleReport {
    pub risk_level: RiskLevel,
    /// 0..=100
    pub risk_score: u8,
    pub clustered_wallet_count: u32,
    pub has_rug_history: bool,
    pub flags: Vec<String>,
}

impl BundleReport {
    /// Neutral report used when the chain source is unavailable
    pub fn unknown() -> Self {
        Self {
            risk_level: RiskLevel::Medium,
            risk_score: 50,
            clustered_wallet_count: 0,
            has_rug_history: false,
            flags: vec![FLAG_DATA_MISSING.to_string()],
        }
    }
}

/// Per-component momentum scores, each 0..=25
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MomentumComponents {
    pub buy_pressure: f64,
    pub volume_velocity: f64,
    pub trade_quality: f64,
    pub holder_growth: f64,
}

/// Market-activity snapshot feeding the composite scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumSnapshot {
    pub buy_sell_ratio: f64,
    pub unique_buyers_5m: u32,
    pub net_buy_pressure_usd: f64,
    /// Holders per minute
    pub holder_growth_rate: f64,
    pub components: MomentumComponents,
    /// 0..=100, the sum of the four components scaled
    pub total_score: f64,
}

/// Severity ladder shared by the bundle detector and the composite scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Watch,
    Avoid,
    StrongAvoid,
}

impl Recommendation {
    /// Map a composite total to its band
    pub fn from_total(total: f64) -> Self {
        if total >= 75.0 {
            Recommendation::StrongBuy
        } else if total >= 60.0 {
            Recommendation::Buy
        } else if total >= 40.0 {
            Recommendation::Watch
        } else if total >= 25.0 {
            Recommendation::Avoid
        } else {
            Recommendation::StrongAvoid
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Per-component contributions to the composite, already scaled into their
/// budgets (momentum /30, safety /25, bundle /20, structure /15, timing /10)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub momentum: f64,
    pub safety: f64,
    pub bundle_safety: f64,
    pub market_structure: f64,
    pub timing: f64,
}

/// The weighted composite used as the primary gating value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnChainScore {
    /// 0..=100
    pub total: f64,
    pub components: ScoreComponents,
    pub recommendation: Recommendation,
    pub risk_level: RiskLevel,
    pub bullish_signals: Vec<String>,
    pub bearish_signals: Vec<String>,
    pub warnings: Vec<String>,
    pub confidence: Confidence,
}

/// Routing label assigning a candidate to the gate set appropriate for its
/// age-based trust basis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Track {
    ProvenRunner,
    EarlyQuality,
}

/// The emitted structured record of a pass through the pipeline.
///
/// Created at emission, never mutated; ownership transfers to the signal
/// store which later attaches an outcome independently of the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// Unique and time-ordered (UTC timestamp prefix + random suffix)
    pub id: String,
    pub track: Track,
    pub token_metrics: TokenMetrics,
    pub safety: SafetyReport,
    pub bundle: BundleReport,
    pub momentum: MomentumSnapshot,
    pub on_chain_score: OnChainScore,
    /// Social-bonus-adjusted composite, capped at 100
    pub adjusted_total: f64,
    /// Advisory size in the chain's base unit; no trade is placed
    pub suggested_position_size: f64,
    pub risk_warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl Signal {
    /// Time-ordered unique id: sortable timestamp prefix, random suffix
    pub fn new_id(now: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-{}", now.format("%Y%m%d%H%M%S%3f"), &suffix[..8])
    }
}

/// Social-link and promotion state reported by the market aggregator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenSocialInfo {
    pub has_paid_profile: bool,
    pub boost_count: u32,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub discord: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_bands() {
        assert_eq!(Recommendation::from_total(75.0), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_total(74.9), Recommendation::Buy);
        assert_eq!(Recommendation::from_total(60.0), Recommendation::Buy);
        assert_eq!(Recommendation::from_total(59.9), Recommendation::Watch);
        assert_eq!(Recommendation::from_total(40.0), Recommendation::Watch);
        assert_eq!(Recommendation::from_total(25.0), Recommendation::Avoid);
        assert_eq!(Recommendation::from_total(24.9), Recommendation::StrongAvoid);
    }

    #[test]
    fn test_signal_ids_are_time_ordered() {
        let early = Signal::new_id(Utc::now());
        std::thread::sleep(std::time::Duration::from_millis(5));
        let late = Signal::new_id(Utc::now());
        assert!(late > early);
    }

    #[test]
    fn test_volume_mcap_ratio_guards_zero() {
        assert_eq!(TokenMetrics::volume_mcap_ratio(1000.0, 0.0), 0.0);
        assert!((TokenMetrics::volume_mcap_ratio(1000.0, 50_000.0) - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn test_track_serializes_screaming_snake() {
        let json = serde_json::to_string(&Track::ProvenRunner).unwrap();
        assert_eq!(json, "\"PROVEN_RUNNER\"");
        let json = serde_json::to_string(&Track::EarlyQuality).unwrap();
        assert_eq!(json, "\"EARLY_QUALITY\"");
    }
}
