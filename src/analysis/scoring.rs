//! Weighted composite scoring
//!
//! Five components, each evaluated on a 0..100 scale and then scaled into
//! its budget: momentum /30, safety /25, bundle safety /20, market
//! structure /15, timing /10. The component table is data: adding a
//! component is a row edit, not a new code branch.

use std::sync::RwLock;

use crate::market::types::{
    BundleReport, Confidence, MomentumSnapshot, OnChainScore, Recommendation, RiskLevel,
    SafetyReport, ScoreComponents, TokenMetrics, TokenSocialInfo,
};

use super::safety::FLAG_HONEYPOT_SUSPECTED;

/// Warning entries excluded from the serious-warning count gate
pub const WARNING_NO_KOL_ACTIVITY: &str = "no KOL activity detected";
pub const WARNING_NO_KOL_VALIDATION: &str = "no KOL validation available";

/// Everything the scorer reads
pub struct ScoreInputs<'a> {
    pub metrics: &'a TokenMetrics,
    pub safety: &'a SafetyReport,
    pub bundle: &'a BundleReport,
    pub momentum: &'a MomentumSnapshot,
    /// 0..100 from the volume-authenticity analysis, when computed
    pub volume_authenticity: Option<u8>,
}

/// One row of the component table: budget plus a 0..100 evaluator
struct Component {
    name: &'static str,
    max: f64,
    eval: fn(&ScoreInputs) -> f64,
}

const COMPONENTS: &[Component] = &[
    Component {
        name: "momentum",
        max: 30.0,
        eval: momentum_component,
    },
    Component {
        name: "safety",
        max: 25.0,
        eval: safety_component,
    },
    Component {
        name: "bundle_safety",
        max: 20.0,
        eval: bundle_safety_component,
    },
    Component {
        name: "market_structure",
        max: 15.0,
        eval: market_structure,
    },
    Component {
        name: "timing",
        max: 10.0,
        eval: timing_component,
    },
];

fn momentum_component(inputs: &ScoreInputs) -> f64 {
    inputs.momentum.total_score
}

fn safety_component(inputs: &ScoreInputs) -> f64 {
    inputs.safety.safety_score as f64
}

fn bundle_safety_component(inputs: &ScoreInputs) -> f64 {
    100.0 - inputs.bundle.risk_score as f64
}

fn timing_component(inputs: &ScoreInputs) -> f64 {
    timing(inputs.metrics.token_age_minutes)
}

/// Liquidity depth band plus holder concentration, each half the scale
fn market_structure(inputs: &ScoreInputs) -> f64 {
    let liquidity_part = match inputs.metrics.liquidity {
        l if l >= 250_000.0 => 50.0,
        l if l >= 100_000.0 => 45.0,
        l if l >= 50_000.0 => 38.0,
        l if l >= 20_000.0 => 30.0,
        l if l >= 5_000.0 => 18.0,
        _ => 5.0,
    };
    let concentration_part = ((100.0 - inputs.metrics.top10_concentration) / 100.0 * 50.0).max(0.0);
    liquidity_part + concentration_part
}

/// Tokens in the 2..120 minute range get the boost; brand-new and stale
/// entries get less.
fn timing(age_minutes: f64) -> f64 {
    match age_minutes {
        a if a < 2.0 => 20.0,
        a if a < 15.0 => 70.0,
        a if a < 60.0 => 100.0,
        a if a < 120.0 => 80.0,
        a if a < 360.0 => 50.0,
        _ => 25.0,
    }
}

/// Comparison constants the threshold store may override at runtime. They
/// affect warning generation only, never the composite weights.
#[derive(Debug, Clone, Copy)]
struct DynamicComparisons {
    min_safety: f64,
    max_bundle_risk: f64,
}

/// The composite scorer
pub struct OnChainScorer {
    dynamic: RwLock<DynamicComparisons>,
}

impl OnChainScorer {
    pub fn new() -> Self {
        Self {
            dynamic: RwLock::new(DynamicComparisons {
                min_safety: 25.0,
                max_bundle_risk: 60.0,
            }),
        }
    }

    /// Update the comparison constants used for warning generation
    pub fn set_dynamic_thresholds(&self, min_safety: f64, max_bundle_risk: f64) {
        let mut dynamic = self.dynamic.write().expect("dynamic comparisons poisoned");
        dynamic.min_safety = min_safety;
        dynamic.max_bundle_risk = max_bundle_risk;
    }

    pub fn score(&self, inputs: &ScoreInputs) -> OnChainScore {
        let mut components = ScoreComponents::default();
        let mut total = 0.0;

        for component in COMPONENTS {
            let raw = (component.eval)(inputs).clamp(0.0, 100.0);
            let scaled = raw / 100.0 * component.max;
            total += scaled;
            match component.name {
                "momentum" => components.momentum = scaled,
                "safety" => components.safety = scaled,
                "bundle_safety" => components.bundle_safety = scaled,
                "market_structure" => components.market_structure = scaled,
                "timing" => components.timing = scaled,
                _ => {}
            }
        }

        let risk_level = Self::risk_level(inputs);
        let (bullish, bearish) = Self::signal_lists(inputs);
        let warnings = self.warnings(inputs);
        let confidence = Self::confidence(inputs);

        OnChainScore {
            total,
            components,
            recommendation: Recommendation::from_total(total),
            risk_level,
            bullish_signals: bullish,
            bearish_signals: bearish,
            warnings,
            confidence,
        }
    }

    /// Social-verification bonus, capped at 25 points
    pub fn social_bonus(info: Option<&TokenSocialInfo>) -> f64 {
        let info = match info {
            Some(i) => i,
            None => return 0.0,
        };
        let mut bonus = 0.0;
        if info.twitter.is_some() {
            bonus += 7.0;
        }
        if info.telegram.is_some() {
            bonus += 4.0;
        }
        if info.website.is_some() {
            bonus += 3.0;
        }
        if info.discord.is_some() {
            bonus += 1.0;
        }
        if info.has_paid_profile {
            bonus += 5.0;
        }
        bonus += (info.boost_count as f64).min(3.0);
        if info.description.as_ref().map_or(0, |d| d.trim().len()) >= 40 {
            bonus += 2.0;
        }
        bonus.min(25.0)
    }

    fn risk_level(inputs: &ScoreInputs) -> RiskLevel {
        let safety = inputs.safety.safety_score;
        let bundle_risk = inputs.bundle.risk_score;
        let top10 = inputs.metrics.top10_concentration;
        let honeypot = inputs.safety.has_flag(FLAG_HONEYPOT_SUSPECTED);

        if safety < 20 || bundle_risk > 80 || honeypot {
            RiskLevel::Critical
        } else if safety < 40 || bundle_risk > 60 || top10 > 85.0 {
            RiskLevel::High
        } else if safety < 60 || bundle_risk > 40 || top10 > 70.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    fn signal_lists(inputs: &ScoreInputs) -> (Vec<String>, Vec<String>) {
        let mut bullish = Vec::new();
        let mut bearish = Vec::new();

        if inputs.momentum.total_score >= 60.0 {
            bullish.push("strong market momentum".to_string());
        } else if inputs.momentum.total_score < 25.0 {
            bearish.push("weak market momentum".to_string());
        }

        if inputs.safety.safety_score >= 80 {
            bullish.push("clean contract and distribution".to_string());
        }

        if inputs.bundle.risk_score <= 20 {
            bullish.push("no bundling detected".to_string());
        } else if inputs.bundle.risk_score >= 60 {
            bearish.push("coordinated early buying".to_string());
        }

        if inputs.metrics.holder_change_1h >= 10.0 {
            bullish.push("fast holder growth".to_string());
        } else if inputs.metrics.holder_change_1h < 0.0 {
            bearish.push("shrinking holder base".to_string());
        }

        if inputs.metrics.liquidity >= 50_000.0 {
            bullish.push("deep liquidity".to_string());
        }

        (bullish, bearish)
    }

    fn warnings(&self, inputs: &ScoreInputs) -> Vec<String> {
        let dynamic = *self.dynamic.read().expect("dynamic comparisons poisoned");
        let mut warnings = Vec::new();

        if (inputs.safety.safety_score as f64) < dynamic.min_safety {
            warnings.push(format!(
                "safety score {} below minimum {:.0}",
                inputs.safety.safety_score, dynamic.min_safety
            ));
        }
        if (inputs.bundle.risk_score as f64) > dynamic.max_bundle_risk {
            warnings.push(format!(
                "bundle risk {} above maximum {:.0}",
                inputs.bundle.risk_score, dynamic.max_bundle_risk
            ));
        }
        if !inputs.safety.mint_authority_revoked {
            warnings.push("mint authority still active".to_string());
        }
        if !inputs.safety.freeze_authority_revoked {
            warnings.push("freeze authority still active".to_string());
        }
        if inputs.metrics.top10_concentration > 70.0 {
            warnings.push(format!(
                "top 10 holders control {:.0}%",
                inputs.metrics.top10_concentration
            ));
        }
        if inputs.safety.is_data_missing() {
            warnings.push("contract data unavailable".to_string());
        }
        if let Some(authenticity) = inputs.volume_authenticity {
            if authenticity < 30 {
                warnings.push("wash trading suspected".to_string());
            }
        }

        // The KOL feed lives outside the core; its absence is recorded but
        // never counts as a serious warning.
        warnings.push(WARNING_NO_KOL_ACTIVITY.to_string());

        warnings
    }

    /// Confidence is a function of how many sources returned non-default
    /// values.
    fn confidence(inputs: &ScoreInputs) -> Confidence {
        let mut sources = 1u32; // metrics exist or we would not be scoring
        if !inputs.safety.is_data_missing() {
            sources += 1;
        }
        if !inputs.bundle.flags.iter().any(|f| f == crate::market::types::FLAG_DATA_MISSING) {
            sources += 1;
        }
        if inputs.momentum.total_score > 0.0 {
            sources += 1;
        }
        if inputs.metrics.holder_change_1h != 0.0 {
            sources += 1;
        }

        match sources {
            s if s >= 4 => Confidence::High,
            s if s >= 2 => Confidence::Medium,
            _ => Confidence::Low,
        }
    }
}

impl Default for OnChainScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::types::MomentumComponents;

    fn metrics() -> TokenMetrics {
        TokenMetrics {
            address: "mint".to_string(),
            ticker: "TEST".to_string(),
            name: "Test".to_string(),
            price: 0.001,
            market_cap: 2_000_000.0,
            volume_24h: 80_000.0,
            liquidity: 30_000.0,
            volume_market_cap_ratio: 0.04,
            holder_count: 120,
            holder_change_1h: 15.0,
            top10_concentration: 40.0,
            token_age_minutes: 20.0,
            lp_locked: None,
        }
    }

    fn safety(score: u8) -> SafetyReport {
        SafetyReport {
            mint_authority_revoked: true,
            freeze_authority_revoked: true,
            metadata_mutable: false,
            safety_score: score,
            deployer_holding_percent: 2.0,
            top10_holder_concentration: 40.0,
            insider_risk_score: 0,
            same_block_buyers: 0,
            deployer_funded_buyers: 0,
            flags: Vec::new(),
        }
    }

    fn bundle(risk: u8) -> BundleReport {
        BundleReport {
            risk_level: RiskLevel::Low,
            risk_score: risk,
            clustered_wallet_count: 0,
            has_rug_history: false,
            flags: Vec::new(),
        }
    }

    fn momentum(total: f64) -> MomentumSnapshot {
        MomentumSnapshot {
            buy_sell_ratio: 1.8,
            unique_buyers_5m: 25,
            net_buy_pressure_usd: 4_000.0,
            holder_growth_rate: 0.3,
            components: MomentumComponents::default(),
            total_score: total,
        }
    }

    #[test]
    fn test_component_budgets_respected() {
        let m = metrics();
        let s = safety(100);
        let b = bundle(0);
        let mo = momentum(100.0);
        let score = OnChainScorer::new().score(&ScoreInputs {
            metrics: &m,
            safety: &s,
            bundle: &b,
            momentum: &mo,
            volume_authenticity: None,
        });

        assert!(score.components.momentum <= 30.0);
        assert!(score.components.safety <= 25.0);
        assert!(score.components.bundle_safety <= 20.0);
        assert!(score.components.market_structure <= 15.0);
        assert!(score.components.timing <= 10.0);
        assert!(score.total <= 100.0);
        // Perfect inputs score near the top
        assert!(score.total >= 85.0, "total {}", score.total);
        assert_eq!(score.recommendation, Recommendation::StrongBuy);
    }

    #[test]
    fn test_good_early_token_scores_mid_high() {
        let m = metrics();
        let s = safety(72);
        let b = bundle(30);
        let mo = momentum(70.0);
        let score = OnChainScorer::new().score(&ScoreInputs {
            metrics: &m,
            safety: &s,
            bundle: &b,
            momentum: &mo,
            volume_authenticity: Some(80),
        });

        assert!(score.total >= 60.0, "total {}", score.total);
        assert!(score.risk_level <= RiskLevel::Medium);
    }

    #[test]
    fn test_risk_level_ladder() {
        let m = metrics();
        let mo = momentum(50.0);

        let critical = OnChainScorer::new().score(&ScoreInputs {
            metrics: &m,
            safety: &safety(15),
            bundle: &bundle(30),
            momentum: &mo,
            volume_authenticity: None,
        });
        assert_eq!(critical.risk_level, RiskLevel::Critical);

        let critical_bundle = OnChainScorer::new().score(&ScoreInputs {
            metrics: &m,
            safety: &safety(72),
            bundle: &bundle(82),
            momentum: &mo,
            volume_authenticity: None,
        });
        assert_eq!(critical_bundle.risk_level, RiskLevel::Critical);

        let high = OnChainScorer::new().score(&ScoreInputs {
            metrics: &m,
            safety: &safety(35),
            bundle: &bundle(30),
            momentum: &mo,
            volume_authenticity: None,
        });
        assert_eq!(high.risk_level, RiskLevel::High);

        let low = OnChainScorer::new().score(&ScoreInputs {
            metrics: &m,
            safety: &safety(80),
            bundle: &bundle(20),
            momentum: &mo,
            volume_authenticity: None,
        });
        assert_eq!(low.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_social_bonus_caps_at_25() {
        let info = TokenSocialInfo {
            has_paid_profile: true,
            boost_count: 10,
            twitter: Some("x".to_string()),
            telegram: Some("t".to_string()),
            discord: Some("d".to_string()),
            website: Some("w".to_string()),
            description: Some("a genuinely long token description for the bonus".to_string()),
        };
        // 7+4+3+1+5+3+2 = 25
        assert_eq!(OnChainScorer::social_bonus(Some(&info)), 25.0);
        assert_eq!(OnChainScorer::social_bonus(None), 0.0);

        let sparse = TokenSocialInfo {
            twitter: Some("x".to_string()),
            ..Default::default()
        };
        assert_eq!(OnChainScorer::social_bonus(Some(&sparse)), 7.0);
    }

    #[test]
    fn test_dynamic_thresholds_change_warnings_only() {
        let scorer = OnChainScorer::new();
        let m = metrics();
        let s = safety(40);
        let b = bundle(30);
        let mo = momentum(50.0);
        let inputs = ScoreInputs {
            metrics: &m,
            safety: &s,
            bundle: &b,
            momentum: &mo,
            volume_authenticity: None,
        };

        let before = scorer.score(&inputs);
        assert!(!before.warnings.iter().any(|w| w.contains("safety score")));

        scorer.set_dynamic_thresholds(50.0, 60.0);
        let after = scorer.score(&inputs);
        assert!(after.warnings.iter().any(|w| w.contains("safety score")));
        // The composite itself is untouched
        assert_eq!(before.total, after.total);
    }

    #[test]
    fn test_wash_trading_warning() {
        let m = metrics();
        let s = safety(70);
        let b = bundle(30);
        let mo = momentum(50.0);
        let score = OnChainScorer::new().score(&ScoreInputs {
            metrics: &m,
            safety: &s,
            bundle: &b,
            momentum: &mo,
            volume_authenticity: Some(20),
        });
        assert!(score.warnings.iter().any(|w| w.contains("wash trading")));
    }

    #[test]
    fn test_no_kol_warning_always_present() {
        let m = metrics();
        let s = safety(90);
        let b = bundle(10);
        let mo = momentum(80.0);
        let score = OnChainScorer::new().score(&ScoreInputs {
            metrics: &m,
            safety: &s,
            bundle: &b,
            momentum: &mo,
            volume_authenticity: None,
        });
        assert!(score.warnings.contains(&WARNING_NO_KOL_ACTIVITY.to_string()));
    }

    #[test]
    fn test_timing_curve() {
        assert_eq!(timing(1.0), 20.0);
        assert_eq!(timing(5.0), 70.0);
        assert_eq!(timing(30.0), 100.0);
        assert_eq!(timing(90.0), 80.0);
        assert_eq!(timing(200.0), 50.0);
        assert_eq!(timing(1_000.0), 25.0);
    }
}
