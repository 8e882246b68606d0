//! Per-candidate evaluation pipeline
//!
//! Fourteen short-circuiting steps from open-position check to signal
//! emission, each returning a diagnostic code from a closed set. Provider
//! fan-out inside a step is parallel with all-settled semantics; the
//! threshold snapshot is taken once at pipeline entry and held for the
//! whole evaluation.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::analysis::exclusion::ExclusionFilter;
use crate::analysis::safety::{SafetyChecker, ScamVerdict};
use crate::analysis::scoring::{
    OnChainScorer, ScoreInputs, WARNING_NO_KOL_ACTIVITY, WARNING_NO_KOL_VALIDATION,
};
use crate::analysis::tier::{MarketCapTier, PositionSizer, TierSettings, TierTable};
use crate::analysis::track::{gates_for_track, route, RouteDecision};
use crate::config::ScreeningConfig;
use crate::engine::discovery::DiscoveryTracker;
use crate::engine::thresholds::{EffectiveThresholds, ThresholdStore};
use crate::market::types::{
    BundleReport, MomentumSnapshot, Recommendation, RiskLevel, SafetyReport, Signal, TokenMetrics,
    TokenSocialInfo, Track,
};
use crate::market::MarketData;
use crate::sink::{Notifier, SignalStore};

/// Number of serious warnings that fails a candidate in production mode
const MAX_SERIOUS_WARNINGS: usize = 4;

/// Diagnostic code for one pass through the pipeline. Closed set; counters
/// key off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvalOutcome {
    /// Open position or cancellation short-circuit
    Skipped,
    SafetyBlocked,
    NoMetrics,
    ScreeningFailed,
    ScamRejected,
    /// Composite score or recommendation below the gate
    ScoringFailed,
    /// Emitted by the broader system's KOL path; unused by the core loop
    SignalSent,
    /// Emitted by the broader system's discovery promotion; unused here
    DiscoverySent,
    /// Emitted when a tracked discovery is externally validated; unused here
    KolValidationSent,
    /// Serious-warning count gate
    DiscoveryFailed,
    OnchainSignalSent,
    MomentumFailed,
    BundleBlocked,
    TooEarly,
    TierBlocked,
}

impl EvalOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvalOutcome::Skipped => "SKIPPED",
            EvalOutcome::SafetyBlocked => "SAFETY_BLOCKED",
            EvalOutcome::NoMetrics => "NO_METRICS",
            EvalOutcome::ScreeningFailed => "SCREENING_FAILED",
            EvalOutcome::ScamRejected => "SCAM_REJECTED",
            EvalOutcome::ScoringFailed => "SCORING_FAILED",
            EvalOutcome::SignalSent => "SIGNAL_SENT",
            EvalOutcome::DiscoverySent => "DISCOVERY_SENT",
            EvalOutcome::KolValidationSent => "KOL_VALIDATION_SENT",
            EvalOutcome::DiscoveryFailed => "DISCOVERY_FAILED",
            EvalOutcome::OnchainSignalSent => "ONCHAIN_SIGNAL_SENT",
            EvalOutcome::MomentumFailed => "MOMENTUM_FAILED",
            EvalOutcome::BundleBlocked => "BUNDLE_BLOCKED",
            EvalOutcome::TooEarly => "TOO_EARLY",
            EvalOutcome::TierBlocked => "TIER_BLOCKED",
        }
    }
}

/// The per-candidate evaluation pipeline
pub struct Pipeline {
    market: Arc<MarketData>,
    scorer: OnChainScorer,
    tiers: TierTable,
    sizer: PositionSizer,
    screening: ScreeningConfig,
    thresholds: Arc<ThresholdStore>,
    discovery: Arc<DiscoveryTracker>,
    store: Arc<dyn SignalStore>,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        market: Arc<MarketData>,
        tiers: TierTable,
        sizer: PositionSizer,
        screening: ScreeningConfig,
        thresholds: Arc<ThresholdStore>,
        discovery: Arc<DiscoveryTracker>,
        store: Arc<dyn SignalStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            market,
            scorer: OnChainScorer::new(),
            tiers,
            sizer,
            screening,
            thresholds,
            discovery,
            store,
            notifier,
        }
    }

    /// Evaluate one candidate end to end
    pub async fn evaluate(&self, address: &str, cancel: &CancellationToken) -> EvalOutcome {
        // Thresholds are snapshotted at entry; a concurrent apply() does
        // not affect this evaluation
        let snapshot = self.thresholds.current();
        let eff = EffectiveThresholds::from(&*snapshot);
        self.scorer
            .set_dynamic_thresholds(eff.min_safety_score, eff.max_bundle_risk_score);

        // 1. Open-position short-circuit
        match self.store.has_open_position(address).await {
            Ok(true) => return EvalOutcome::Skipped,
            Ok(false) => {}
            Err(e) => {
                debug!(mint = %address, error = %e, "open-position check failed");
            }
        }
        if cancel.is_cancelled() {
            return EvalOutcome::Skipped;
        }

        // 2. Safety check
        let safety_ctx = self.market.contract_safety_context(address).await;
        let safety = SafetyChecker::evaluate(&safety_ctx);
        if SafetyChecker::should_block(&safety, &safety_ctx) {
            debug!(mint = %address, "hard safety block");
            return EvalOutcome::SafetyBlocked;
        }

        // 3. Fused metrics
        let metrics = match self.market.get_token_metrics(address).await {
            Some(m) => m,
            None => return EvalOutcome::NoMetrics,
        };

        // 4-7. Exclusion, tier, screening bounds, scam filter
        let tier_settings = match self.screen(&metrics, &safety, &eff) {
            Ok(settings) => settings,
            Err(outcome) => return outcome,
        };

        if cancel.is_cancelled() {
            return EvalOutcome::Skipped;
        }

        // 8. Parallel fan-out: bundle, momentum, authenticity, socials.
        // Each settles independently; a failed slot degrades to its empty
        // value.
        let (bundle, momentum, authenticity, social) = tokio::join!(
            self.market.analyze_bundles(address),
            self.market.analyze_momentum(address, &metrics),
            self.market.analyze_volume_authenticity(address),
            self.market.fetch_social(address),
        );
        let momentum = match momentum {
            Some(m) => m,
            None => return EvalOutcome::MomentumFailed,
        };

        // 8-13. Score and gate
        let signal = match self.score_and_gate(
            &metrics,
            &safety,
            &bundle,
            &momentum,
            authenticity,
            social.as_ref(),
            &eff,
            &tier_settings,
        ) {
            Ok(signal) => signal,
            Err((outcome, scored)) => {
                if let Some(score) = scored {
                    self.discovery.observe(address, score);
                }
                return outcome;
            }
        };

        // 14. Persist first, then notify; the record survives a failed
        // notification for later audit
        if let Err(e) = self.store.record_signal(&signal).await {
            error!(mint = %address, error = %e, "signal persistence failed");
            return EvalOutcome::ScoringFailed;
        }
        if let Err(e) = self.notifier.publish(&signal).await {
            warn!(mint = %address, id = %signal.id, error = %e, "notifier failed, record kept");
        }

        EvalOutcome::OnchainSignalSent
    }

    /// Steps 4-7: exclusion, tier gate, screening bounds, scam filter.
    /// Pure over its inputs so scenarios can drive it directly.
    fn screen(
        &self,
        metrics: &TokenMetrics,
        safety: &SafetyReport,
        eff: &EffectiveThresholds,
    ) -> Result<TierSettings, EvalOutcome> {
        // 4. Exclusion filter
        if let Some(reason) =
            ExclusionFilter::check(&metrics.address, &metrics.name, &metrics.ticker, metrics.price)
        {
            debug!(mint = %metrics.address, %reason, "excluded");
            return Err(EvalOutcome::ScreeningFailed);
        }

        // 5. Tier classification and per-tier gates
        let tier = MarketCapTier::classify(metrics.market_cap);
        let settings = self.tiers.settings(tier).clone();
        if !settings.enabled {
            debug!(mint = %metrics.address, %tier, "tier disabled");
            return Err(EvalOutcome::TierBlocked);
        }
        if metrics.liquidity < settings.min_liquidity
            || safety.safety_score < settings.min_safety_score
        {
            debug!(mint = %metrics.address, %tier, "tier gate failed");
            return Err(EvalOutcome::TierBlocked);
        }

        // 6. Screening thresholds: static config bounds plus the dynamic
        // liquidity/concentration gates from the snapshot
        let s = &self.screening;
        let screening_ok = metrics.market_cap >= s.min_market_cap
            && metrics.market_cap <= s.max_market_cap
            && metrics.volume_24h >= s.min_volume_24h
            && metrics.volume_market_cap_ratio >= s.min_volume_market_cap_ratio
            && metrics.holder_count >= s.min_holder_count
            && metrics.top10_concentration <= s.max_top10_concentration.min(eff.max_top10_concentration)
            && metrics.liquidity >= s.min_liquidity_pool.max(eff.min_liquidity)
            && metrics.token_age_minutes >= s.min_token_age_minutes;
        if !screening_ok {
            debug!(mint = %metrics.address, "screening bounds failed");
            return Err(EvalOutcome::ScreeningFailed);
        }

        // 7. Scam filter (layer 1)
        if let ScamVerdict::Reject(reason) = SafetyChecker::scam_check(safety, metrics) {
            debug!(mint = %metrics.address, %reason, "scam filter reject");
            return Err(EvalOutcome::ScamRejected);
        }

        Ok(settings)
    }

    /// Steps 8-14 minus emission: composite score, risk gate, routing,
    /// per-track gates, numeric threshold gates, warning gate, sizing.
    /// On rejection the adjusted score (when computed) travels out for
    /// discovery tracking.
    #[allow(clippy::too_many_arguments)]
    fn score_and_gate(
        &self,
        metrics: &TokenMetrics,
        safety: &SafetyReport,
        bundle: &BundleReport,
        momentum: &MomentumSnapshot,
        authenticity: Option<u8>,
        social: Option<&TokenSocialInfo>,
        eff: &EffectiveThresholds,
        tier: &TierSettings,
    ) -> Result<Signal, (EvalOutcome, Option<f64>)> {
        // 8. Composite score plus social bonus
        let score = self.scorer.score(&ScoreInputs {
            metrics,
            safety,
            bundle,
            momentum,
            volume_authenticity: authenticity,
        });
        let bonus = OnChainScorer::social_bonus(social);
        let adjusted_total = (score.total + bonus).min(100.0);

        // 9. Risk gate
        if score.risk_level == RiskLevel::Critical
            || (!eff.learning_mode && score.risk_level == RiskLevel::High)
        {
            return Err((EvalOutcome::BundleBlocked, Some(adjusted_total)));
        }

        // 10. Dual-track routing
        let track = match route(metrics.token_age_minutes) {
            RouteDecision::TooEarly => return Err((EvalOutcome::TooEarly, None)),
            RouteDecision::Route(track) => track,
        };

        // 11. Per-track gates
        if let Err(failure) = gates_for_track(track, eff, safety, bundle, momentum) {
            debug!(mint = %metrics.address, reason = %failure.reason, "track gate failed");
            let outcome = match (track, failure.reason.contains("bundle")) {
                (Track::ProvenRunner, _) => EvalOutcome::MomentumFailed,
                (Track::EarlyQuality, true) => EvalOutcome::BundleBlocked,
                (Track::EarlyQuality, false) => EvalOutcome::SafetyBlocked,
            };
            return Err((outcome, Some(adjusted_total)));
        }

        // 12. Numeric threshold gates and the recommendation gate
        if momentum.total_score < eff.min_momentum_score {
            return Err((EvalOutcome::MomentumFailed, Some(adjusted_total)));
        }
        if (safety.safety_score as f64) < eff.min_safety_score {
            return Err((EvalOutcome::SafetyBlocked, Some(adjusted_total)));
        }
        if (bundle.risk_score as f64) > eff.max_bundle_risk_score {
            return Err((EvalOutcome::BundleBlocked, Some(adjusted_total)));
        }
        let recommendation_blocks = score.recommendation == Recommendation::StrongAvoid
            || (eff.avoid_blocks && score.recommendation == Recommendation::Avoid);
        if adjusted_total < eff.min_onchain_score || recommendation_blocks {
            return Err((EvalOutcome::ScoringFailed, Some(adjusted_total)));
        }

        // 13. Serious-warning count gate (production mode only)
        if eff.warning_gate_enabled {
            let serious = score
                .warnings
                .iter()
                .filter(|w| {
                    w.as_str() != WARNING_NO_KOL_ACTIVITY && w.as_str() != WARNING_NO_KOL_VALIDATION
                })
                .count();
            if serious >= MAX_SERIOUS_WARNINGS {
                return Err((EvalOutcome::DiscoveryFailed, Some(adjusted_total)));
            }
        }

        // 14. Advisory sizing and signal assembly. The emitted safety
        // report carries the insider view the bundle analysis produced.
        let suggested_position_size = self.sizer.suggest(tier, adjusted_total);
        let now = chrono::Utc::now();

        let mut safety_out = safety.clone();
        safety_out.insider_risk_score = bundle.risk_score;
        safety_out.same_block_buyers = bundle.clustered_wallet_count;

        Ok(Signal {
            id: Signal::new_id(now),
            track,
            token_metrics: metrics.clone(),
            safety: safety_out,
            bundle: bundle.clone(),
            momentum: momentum.clone(),
            risk_warnings: score.warnings.clone(),
            on_chain_score: score,
            adjusted_total,
            suggested_position_size,
            generated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DexScreenerConfig, TierOverride, TierOverrides};
    use crate::engine::thresholds::Thresholds;
    use crate::market::types::MomentumComponents;
    use crate::providers::dexscreener::DexScreenerClient;
    use crate::sink::{LogNotifier, MemorySignalStore};

    fn test_pipeline(tiers: TierTable) -> Pipeline {
        let dex = Arc::new(DexScreenerClient::new(&DexScreenerConfig::default()).unwrap());
        let market = Arc::new(MarketData::new(None, dex, None));
        let store = Arc::new(MemorySignalStore::new());
        let thresholds = Arc::new(ThresholdStore::with_thresholds(
            store.clone() as Arc<dyn SignalStore>,
            Thresholds::default(),
        ));
        Pipeline::new(
            market,
            tiers,
            PositionSizer::new(0.5),
            ScreeningConfig::default(),
            thresholds,
            Arc::new(DiscoveryTracker::new()),
            store as Arc<dyn SignalStore>,
            Arc::new(LogNotifier),
        )
    }

    fn metrics(market_cap: f64, age: f64, liquidity: f64) -> TokenMetrics {
        TokenMetrics {
            address: "CandidateMint1111111111111111111111111111111".to_string(),
            ticker: "CAND".to_string(),
            name: "Candidate".to_string(),
            price: 0.002,
            market_cap,
            volume_24h: 80_000.0,
            liquidity,
            volume_market_cap_ratio: TokenMetrics::volume_mcap_ratio(80_000.0, market_cap),
            holder_count: 120,
            holder_change_1h: 15.0,
            top10_concentration: 40.0,
            token_age_minutes: age,
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
            risk_level: if risk > 80 {
                RiskLevel::Critical
            } else if risk > 60 {
                RiskLevel::High
            } else {
                RiskLevel::Low
            },
            risk_score: risk,
            clustered_wallet_count: 0,
            has_rug_history: false,
            flags: Vec::new(),
        }
    }

    fn momentum(total: f64, growth_rate: f64) -> MomentumSnapshot {
        MomentumSnapshot {
            buy_sell_ratio: 1.8,
            unique_buyers_5m: 25,
            net_buy_pressure_usd: 4_000.0,
            holder_growth_rate: growth_rate,
            components: MomentumComponents::default(),
            total_score: total,
        }
    }

    fn production() -> EffectiveThresholds {
        let mut t = Thresholds::default();
        t.learning_mode = false;
        EffectiveThresholds::from(&t)
    }

    #[test]
    fn test_stablecoin_rejected_by_address() {
        let pipeline = test_pipeline(TierTable::default());
        let mut m = metrics(2_000_000.0, 20.0, 30_000.0);
        m.address = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string();
        m.name = "USD Coin".to_string();
        m.ticker = "USDC".to_string();
        m.price = 1.0001;
        let outcome = pipeline.screen(&m, &safety(80), &production());
        assert_eq!(outcome.unwrap_err(), EvalOutcome::ScreeningFailed);
    }

    #[test]
    fn test_too_early_reject() {
        let pipeline = test_pipeline(TierTable::default());
        let m = metrics(1_500_000.0, 1.0, 10_000.0);
        let s = safety(70);
        let eff = production();

        // Passes screening at one minute old...
        let tier = pipeline.screen(&m, &s, &eff).expect("screening should pass");

        // ...and is rejected by the router, not the score gates
        let result = pipeline.score_and_gate(
            &m,
            &s,
            &bundle(20),
            &momentum(50.0, 0.1),
            Some(80),
            None,
            &eff,
            &tier,
        );
        assert_eq!(result.unwrap_err().0, EvalOutcome::TooEarly);
    }

    #[test]
    fn test_early_quality_accept() {
        let pipeline = test_pipeline(TierTable::default());
        let m = metrics(2_000_000.0, 20.0, 30_000.0);
        let s = safety(72);
        let eff = production();

        let tier = pipeline.screen(&m, &s, &eff).expect("screening should pass");
        let signal = pipeline
            .score_and_gate(
                &m,
                &s,
                &bundle(30),
                &momentum(70.0, 0.05),
                Some(80),
                None,
                &eff,
                &tier,
            )
            .expect("candidate should convert");

        assert_eq!(signal.track, Track::EarlyQuality);
        assert!(signal.on_chain_score.total >= eff.min_onchain_score);
        assert!(signal.suggested_position_size > 0.0);
        assert!(signal.adjusted_total >= signal.on_chain_score.total);
    }

    #[test]
    fn test_proven_runner_accept() {
        let pipeline = test_pipeline(TierTable::default());
        let m = metrics(3_500_000.0, 180.0, 80_000.0);
        let s = safety(80);
        let eff = production();

        let tier = pipeline.screen(&m, &s, &eff).expect("screening should pass");
        let signal = pipeline
            .score_and_gate(
                &m,
                &s,
                &bundle(20),
                &momentum(60.0, 0.05),
                Some(80),
                None,
                &eff,
                &tier,
            )
            .expect("candidate should convert");

        assert_eq!(signal.track, Track::ProvenRunner);
    }

    #[test]
    fn test_proven_runner_without_growth_fails() {
        let pipeline = test_pipeline(TierTable::default());
        let m = metrics(3_500_000.0, 180.0, 80_000.0);
        let s = safety(80);
        let eff = production();

        let tier = pipeline.screen(&m, &s, &eff).unwrap();
        let result = pipeline.score_and_gate(
            &m,
            &s,
            &bundle(20),
            &momentum(60.0, 0.0),
            Some(80),
            None,
            &eff,
            &tier,
        );
        assert_eq!(result.unwrap_err().0, EvalOutcome::MomentumFailed);
    }

    #[test]
    fn test_critical_bundle_blocks_regardless() {
        let pipeline = test_pipeline(TierTable::default());
        let m = metrics(2_000_000.0, 20.0, 30_000.0);
        let s = safety(72);
        let eff = production();

        let tier = pipeline.screen(&m, &s, &eff).unwrap();
        let result = pipeline.score_and_gate(
            &m,
            &s,
            &bundle(82),
            &momentum(70.0, 0.05),
            Some(80),
            None,
            &eff,
            &tier,
        );
        assert_eq!(result.unwrap_err().0, EvalOutcome::BundleBlocked);
    }

    #[test]
    fn test_disabled_tier_blocks() {
        let overrides = TierOverrides {
            emerging: Some(TierOverride {
                enabled: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };
        let pipeline = test_pipeline(TierTable::with_overrides(&overrides));
        let m = metrics(10_000_000.0, 60.0, 100_000.0);
        let outcome = pipeline.screen(&m, &safety(80), &production());
        assert_eq!(outcome.unwrap_err(), EvalOutcome::TierBlocked);
    }

    #[test]
    fn test_high_risk_blocked_in_production_only() {
        let pipeline = test_pipeline(TierTable::default());
        let m = metrics(2_000_000.0, 20.0, 30_000.0);
        // Low safety drives risk level to High without tripping Critical
        let s = safety(35);
        let b = bundle(30);
        let mo = momentum(70.0, 0.05);

        let prod = production();
        // Tier gate would reject safety 35 in RISING; use the gates directly
        let result = pipeline.score_and_gate(&m, &s, &b, &mo, Some(80), None, &prod,
            pipeline.tiers.settings(MarketCapTier::Rising));
        assert_eq!(result.unwrap_err().0, EvalOutcome::BundleBlocked);

        let mut t = Thresholds::default();
        t.learning_mode = true;
        let learning = EffectiveThresholds::from(&t);
        let result = pipeline.score_and_gate(&m, &s, &b, &mo, Some(80), None, &learning,
            pipeline.tiers.settings(MarketCapTier::Rising));
        // Learning mode lets the high-risk candidate through to the gates;
        // early-quality floor is 35 so it survives to conversion
        assert!(result.is_ok());
    }

    #[test]
    fn test_signal_invariants_at_emission() {
        let pipeline = test_pipeline(TierTable::default());
        let m = metrics(2_000_000.0, 20.0, 30_000.0);
        let s = safety(72);
        let eff = production();

        let tier = pipeline.screen(&m, &s, &eff).unwrap();
        let signal = pipeline
            .score_and_gate(
                &m,
                &s,
                &bundle(30),
                &momentum(70.0, 0.05),
                Some(80),
                None,
                &eff,
                &tier,
            )
            .unwrap();

        // The quantified emission invariants
        assert!(signal.adjusted_total >= eff.min_onchain_score);
        assert!((signal.safety.safety_score as f64) >= eff.min_safety_score);
        assert!((signal.bundle.risk_score as f64) <= eff.max_bundle_risk_score);
        assert_ne!(
            MarketCapTier::classify(signal.token_metrics.market_cap),
            MarketCapTier::Unknown
        );
    }

    #[tokio::test]
    async fn test_open_position_skips() {
        let dex = Arc::new(DexScreenerClient::new(&DexScreenerConfig::default()).unwrap());
        let market = Arc::new(MarketData::new(None, dex, None));
        let store = Arc::new(MemorySignalStore::new());
        store.set_open_position("held-mint");
        let thresholds = Arc::new(ThresholdStore::with_thresholds(
            store.clone() as Arc<dyn SignalStore>,
            Thresholds::default(),
        ));
        let pipeline = Pipeline::new(
            market,
            TierTable::default(),
            PositionSizer::new(0.5),
            ScreeningConfig::default(),
            thresholds,
            Arc::new(DiscoveryTracker::new()),
            store as Arc<dyn SignalStore>,
            Arc::new(LogNotifier),
        );

        let cancel = CancellationToken::new();
        let outcome = pipeline.evaluate("held-mint", &cancel).await;
        assert_eq!(outcome, EvalOutcome::Skipped);
    }

    #[test]
    fn test_rejected_scored_candidate_lands_in_discovery() {
        let pipeline = test_pipeline(TierTable::default());
        let m = metrics(2_000_000.0, 20.0, 30_000.0);
        let s = safety(72);
        let eff = production();
        let tier = pipeline.screen(&m, &s, &eff).unwrap();

        // Weak momentum trips the numeric gate after scoring
        let result = pipeline.score_and_gate(
            &m,
            &s,
            &bundle(30),
            &momentum(10.0, 0.05),
            Some(80),
            None,
            &eff,
            &tier,
        );
        let (outcome, scored) = result.unwrap_err();
        assert_eq!(outcome, EvalOutcome::MomentumFailed);
        assert!(scored.is_some());
    }
}
