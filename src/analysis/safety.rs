//! Contract and distribution safety checks
//!
//! Fixed weights over measurable properties produce a 0..100 score plus a
//! block recommendation that only fires on hard red-flag combinations.
//! Missing upstream data never blocks: the report degrades to permissive
//! defaults with an explicit `data_missing` flag.

use crate::market::types::{SafetyReport, TokenMetrics, FLAG_DATA_MISSING};

pub const FLAG_MINT_AUTHORITY_ACTIVE: &str = "mint_authority_active";
pub const FLAG_FREEZE_AUTHORITY_ACTIVE: &str = "freeze_authority_active";
pub const FLAG_DEPLOYER_CONCENTRATION: &str = "deployer_concentration";
pub const FLAG_TOP10_EXTREME: &str = "top10_concentration_extreme";
pub const FLAG_HONEYPOT_SUSPECTED: &str = "honeypot_suspected";

/// Neutral score used when upstream data is missing
const NEUTRAL_SCORE: u8 = 50;

/// Everything the checker can measure about a token. `None` means the
/// upstream source did not answer.
#[derive(Debug, Clone, Default)]
pub struct SafetyContext {
    pub mint_authority_revoked: Option<bool>,
    pub freeze_authority_revoked: Option<bool>,
    pub deployer_holding_percent: Option<f64>,
    pub top10_concentration: Option<f64>,
    pub holder_count: Option<u64>,
    /// 24h trade counts from the market aggregator, when known
    pub buys_24h: u32,
    pub sells_24h: u32,
}

/// Verdict of the scam filter layered on top of the safety report
#[derive(Debug, Clone, PartialEq)]
pub enum ScamVerdict {
    Pass,
    Reject(String),
}

/// Safety checker with fixed component weights
pub struct SafetyChecker;

impl SafetyChecker {
    /// Evaluate measurable properties into a report
    pub fn evaluate(ctx: &SafetyContext) -> SafetyReport {
        let authorities_known =
            ctx.mint_authority_revoked.is_some() || ctx.freeze_authority_revoked.is_some();
        if !authorities_known && ctx.deployer_holding_percent.is_none() {
            return Self::permissive_default();
        }

        let mint_revoked = ctx.mint_authority_revoked.unwrap_or(true);
        let freeze_revoked = ctx.freeze_authority_revoked.unwrap_or(true);
        let deployer_pct = ctx.deployer_holding_percent.unwrap_or(0.0);
        let top10 = ctx.top10_concentration.unwrap_or(50.0);

        let mut score: u32 = 0;
        let mut flags = Vec::new();

        // Authorities: 30 + 20
        if mint_revoked {
            score += 30;
        } else {
            flags.push(FLAG_MINT_AUTHORITY_ACTIVE.to_string());
        }
        if freeze_revoked {
            score += 20;
        } else {
            flags.push(FLAG_FREEZE_AUTHORITY_ACTIVE.to_string());
        }

        // Deployer holding: 20
        score += match deployer_pct {
            p if p <= 5.0 => 20,
            p if p <= 15.0 => 12,
            p if p <= 30.0 => 5,
            _ => {
                flags.push(FLAG_DEPLOYER_CONCENTRATION.to_string());
                0
            }
        };

        // Top-10 concentration: 20
        score += match top10 {
            t if t <= 40.0 => 20,
            t if t <= 60.0 => 12,
            t if t <= 85.0 => 5,
            _ => {
                flags.push(FLAG_TOP10_EXTREME.to_string());
                0
            }
        };

        // Holder base: 10
        score += match ctx.holder_count.unwrap_or(0) {
            h if h >= 500 => 10,
            h if h >= 100 => 6,
            h if h >= 25 => 3,
            _ => 0,
        };

        if Self::honeypot_suspected(ctx) {
            flags.push(FLAG_HONEYPOT_SUSPECTED.to_string());
        }

        if ctx.mint_authority_revoked.is_none() && ctx.freeze_authority_revoked.is_none() {
            flags.push(FLAG_DATA_MISSING.to_string());
        }

        SafetyReport {
            mint_authority_revoked: mint_revoked,
            freeze_authority_revoked: freeze_revoked,
            // The parsed mint account does not carry mutability; a richer
            // metadata source could fill this in
            metadata_mutable: false,
            safety_score: score.min(100) as u8,
            deployer_holding_percent: deployer_pct.clamp(0.0, 100.0),
            top10_holder_concentration: top10.clamp(0.0, 100.0),
            insider_risk_score: 0,
            same_block_buyers: 0,
            deployer_funded_buyers: 0,
            flags,
        }
    }

    /// Report used when the chain source is disabled or silent
    pub fn permissive_default() -> SafetyReport {
        SafetyReport {
            mint_authority_revoked: true,
            freeze_authority_revoked: true,
            metadata_mutable: false,
            safety_score: NEUTRAL_SCORE,
            deployer_holding_percent: 0.0,
            top10_holder_concentration: 50.0,
            insider_risk_score: 0,
            same_block_buyers: 0,
            deployer_funded_buyers: 0,
            flags: vec![FLAG_DATA_MISSING.to_string()],
        }
    }

    /// Hard-block recommendation. Fires only when red flags combine; never
    /// on missing data.
    pub fn should_block(report: &SafetyReport, ctx: &SafetyContext) -> bool {
        if report.is_data_missing() {
            return false;
        }

        let authorities_both_active =
            !report.mint_authority_revoked && !report.freeze_authority_revoked;

        (authorities_both_active && report.deployer_holding_percent > 30.0)
            || Self::honeypot_suspected(ctx)
    }

    /// Scam-filter verdict over a finished report (pipeline layer 1)
    pub fn scam_check(report: &SafetyReport, metrics: &TokenMetrics) -> ScamVerdict {
        if report.is_data_missing() {
            return ScamVerdict::Pass;
        }

        if report.has_flag(FLAG_HONEYPOT_SUSPECTED) {
            return ScamVerdict::Reject("honeypot heuristic positive".to_string());
        }

        if !report.mint_authority_revoked
            && !report.freeze_authority_revoked
            && metrics.top10_concentration > 90.0
        {
            return ScamVerdict::Reject(
                "live authorities with extreme holder concentration".to_string(),
            );
        }

        if report.deployer_holding_percent > 60.0 {
            return ScamVerdict::Reject(format!(
                "deployer holds {:.0}% of supply",
                report.deployer_holding_percent
            ));
        }

        ScamVerdict::Pass
    }

    /// Active freeze authority with buys flowing and zero sells is the
    /// classic can't-sell shape.
    fn honeypot_suspected(ctx: &SafetyContext) -> bool {
        let freeze_active = ctx.freeze_authority_revoked == Some(false);
        freeze_active && ctx.sells_24h == 0 && ctx.buys_24h >= 10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_context() -> SafetyContext {
        SafetyContext {
            mint_authority_revoked: Some(true),
            freeze_authority_revoked: Some(true),
            deployer_holding_percent: Some(3.0),
            top10_concentration: Some(35.0),
            holder_count: Some(600),
            buys_24h: 500,
            sells_24h: 300,
        }
    }

    fn test_metrics(top10: f64) -> TokenMetrics {
        TokenMetrics {
            address: "mint".to_string(),
            ticker: "TEST".to_string(),
            name: "Test".to_string(),
            price: 0.001,
            market_cap: 1_000_000.0,
            volume_24h: 50_000.0,
            liquidity: 20_000.0,
            volume_market_cap_ratio: 0.05,
            holder_count: 200,
            holder_change_1h: 0.0,
            top10_concentration: top10,
            token_age_minutes: 30.0,
            lp_locked: None,
        }
    }

    #[test]
    fn test_clean_token_scores_high() {
        let report = SafetyChecker::evaluate(&clean_context());
        assert_eq!(report.safety_score, 100);
        assert!(report.flags.is_empty());
        assert!(!SafetyChecker::should_block(&report, &clean_context()));
    }

    #[test]
    fn test_missing_data_is_permissive() {
        let report = SafetyChecker::evaluate(&SafetyContext::default());
        assert!(report.is_data_missing());
        assert!(report.mint_authority_revoked);
        assert!(report.freeze_authority_revoked);
        assert_eq!(report.safety_score, NEUTRAL_SCORE);
        assert!(!SafetyChecker::should_block(&report, &SafetyContext::default()));
    }

    #[test]
    fn test_live_authorities_lower_score() {
        let mut ctx = clean_context();
        ctx.mint_authority_revoked = Some(false);
        ctx.freeze_authority_revoked = Some(false);
        let report = SafetyChecker::evaluate(&ctx);
        assert_eq!(report.safety_score, 50);
        assert!(report.has_flag(FLAG_MINT_AUTHORITY_ACTIVE));
        assert!(report.has_flag(FLAG_FREEZE_AUTHORITY_ACTIVE));
    }

    #[test]
    fn test_block_requires_combined_red_flags() {
        // Live authorities alone do not block
        let mut ctx = clean_context();
        ctx.mint_authority_revoked = Some(false);
        ctx.freeze_authority_revoked = Some(false);
        let report = SafetyChecker::evaluate(&ctx);
        assert!(!SafetyChecker::should_block(&report, &ctx));

        // Adding a heavy deployer bag does
        ctx.deployer_holding_percent = Some(45.0);
        let report = SafetyChecker::evaluate(&ctx);
        assert!(SafetyChecker::should_block(&report, &ctx));
    }

    #[test]
    fn test_honeypot_heuristic_blocks() {
        let mut ctx = clean_context();
        ctx.freeze_authority_revoked = Some(false);
        ctx.buys_24h = 50;
        ctx.sells_24h = 0;
        let report = SafetyChecker::evaluate(&ctx);
        assert!(report.has_flag(FLAG_HONEYPOT_SUSPECTED));
        assert!(SafetyChecker::should_block(&report, &ctx));
        assert!(matches!(
            SafetyChecker::scam_check(&report, &test_metrics(40.0)),
            ScamVerdict::Reject(_)
        ));
    }

    #[test]
    fn test_scam_check_passes_clean_token() {
        let report = SafetyChecker::evaluate(&clean_context());
        assert_eq!(
            SafetyChecker::scam_check(&report, &test_metrics(40.0)),
            ScamVerdict::Pass
        );
    }

    #[test]
    fn test_scam_check_never_rejects_missing_data() {
        let report = SafetyChecker::permissive_default();
        assert_eq!(
            SafetyChecker::scam_check(&report, &test_metrics(95.0)),
            ScamVerdict::Pass
        );
    }

    #[test]
    fn test_heavy_deployer_rejected_by_scam_check() {
        let mut ctx = clean_context();
        ctx.deployer_holding_percent = Some(70.0);
        let report = SafetyChecker::evaluate(&ctx);
        assert!(matches!(
            SafetyChecker::scam_check(&report, &test_metrics(40.0)),
            ScamVerdict::Reject(_)
        ));
    }
}
