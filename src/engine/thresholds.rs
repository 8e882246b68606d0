//! Dynamic threshold store
//!
//! Process-wide gating configuration with snapshotted read semantics:
//! readers grab an atomic pointer and keep it for the whole evaluation, so
//! an `apply()` mid-cycle never affects in-flight pipelines. The optimizer
//! correlates recent outcomes against factor values and proposes moves for
//! any factor whose low/high-band win rates differ materially.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::sink::{OutcomeRow, SignalStore};

/// The mutable gate values. Readers always see a consistent snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub min_momentum_score: f64,
    pub min_onchain_score: f64,
    pub min_safety_score: f64,
    pub max_bundle_risk_score: f64,
    pub min_liquidity: f64,
    pub max_top10_concentration: f64,
    /// Relaxes several hard gates to collect more outcome data
    pub learning_mode: bool,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_momentum_score: 20.0,
            min_onchain_score: 30.0,
            min_safety_score: 25.0,
            max_bundle_risk_score: 60.0,
            min_liquidity: 2_000.0,
            max_top10_concentration: 85.0,
            learning_mode: true,
        }
    }
}

/// Gate values with the learning-mode relaxations already folded in, so
/// call sites never branch on the flag themselves.
#[derive(Debug, Clone)]
pub struct EffectiveThresholds {
    pub min_momentum_score: f64,
    pub min_onchain_score: f64,
    pub min_safety_score: f64,
    pub max_bundle_risk_score: f64,
    pub min_liquidity: f64,
    pub max_top10_concentration: f64,
    /// Proven-runner gate: holders per minute
    pub min_holder_growth_rate: f64,
    /// Early-quality floors and ceilings
    pub early_min_safety_score: f64,
    pub early_max_bundle_risk: f64,
    /// AVOID recommendation blocks in production only
    pub avoid_blocks: bool,
    /// The serious-warning count gate is skipped in learning mode
    pub warning_gate_enabled: bool,
    pub learning_mode: bool,
}

impl From<&Thresholds> for EffectiveThresholds {
    fn from(t: &Thresholds) -> Self {
        let learning = t.learning_mode;
        Self {
            min_momentum_score: t.min_momentum_score,
            min_onchain_score: if learning {
                t.min_onchain_score.min(20.0)
            } else {
                t.min_onchain_score
            },
            min_safety_score: t.min_safety_score,
            max_bundle_risk_score: t.max_bundle_risk_score,
            min_liquidity: t.min_liquidity,
            max_top10_concentration: t.max_top10_concentration,
            min_holder_growth_rate: if learning { 0.0 } else { 0.01 },
            early_min_safety_score: if learning { 35.0 } else { 50.0 },
            early_max_bundle_risk: if learning { 70.0 } else { 55.0 },
            avoid_blocks: !learning,
            warning_gate_enabled: !learning,
            learning_mode: learning,
        }
    }
}

/// A gated factor the optimizer can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdFactor {
    Momentum,
    OnChain,
    Safety,
    BundleRisk,
    Liquidity,
    Top10,
}

impl ThresholdFactor {
    fn bounds(&self) -> (f64, f64) {
        match self {
            ThresholdFactor::Momentum => (0.0, 80.0),
            ThresholdFactor::OnChain => (10.0, 80.0),
            ThresholdFactor::Safety => (0.0, 80.0),
            ThresholdFactor::BundleRisk => (20.0, 95.0),
            ThresholdFactor::Liquidity => (500.0, 50_000.0),
            ThresholdFactor::Top10 => (50.0, 95.0),
        }
    }
}

/// A proposed threshold move
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdRecommendation {
    pub factor: ThresholdFactor,
    pub current: f64,
    pub proposed: f64,
    pub reason: String,
}

/// Changes actually written by `apply()`
#[derive(Debug, Clone, Default)]
pub struct AppliedSet {
    pub changes: Vec<(ThresholdFactor, f64, f64)>,
}

/// Result of an optimization pass
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub sample_size: usize,
    pub recommendations: Vec<ThresholdRecommendation>,
    pub applied: Option<AppliedSet>,
}

/// Win-rate difference between bands that counts as material
const MATERIAL_WIN_RATE_DIFF: f64 = 0.15;
/// Minimum outcomes per band before a factor is considered
const MIN_BAND_SAMPLES: usize = 5;
/// Fraction of the current value a single optimization step moves
const STEP_FRACTION: f64 = 0.10;

/// Process-wide threshold store with copy-on-write snapshots
pub struct ThresholdStore {
    current: ArcSwap<Thresholds>,
    store: Arc<dyn SignalStore>,
}

impl ThresholdStore {
    /// Initialize from the persistent store, falling back to defaults
    pub async fn load(store: Arc<dyn SignalStore>) -> Self {
        let initial = match store.load_thresholds().await {
            Ok(Some(persisted)) => {
                info!("loaded persisted thresholds");
                persisted
            }
            Ok(None) => Thresholds::default(),
            Err(e) => {
                debug!(error = %e, "threshold load failed, using defaults");
                Thresholds::default()
            }
        };
        Self {
            current: ArcSwap::from_pointee(initial),
            store,
        }
    }

    /// Construct with explicit values (tests and tools)
    pub fn with_thresholds(store: Arc<dyn SignalStore>, thresholds: Thresholds) -> Self {
        Self {
            current: ArcSwap::from_pointee(thresholds),
            store,
        }
    }

    /// Atomic snapshot; hold it for the whole evaluation
    pub fn current(&self) -> Arc<Thresholds> {
        self.current.load_full()
    }

    /// Apply recommendations copy-on-write: clone, mutate, persist, swap
    pub async fn apply(&self, recommendations: &[ThresholdRecommendation]) -> Result<AppliedSet> {
        let mut next = (*self.current.load_full()).clone();
        let mut applied = AppliedSet::default();

        for rec in recommendations {
            let slot = match rec.factor {
                ThresholdFactor::Momentum => &mut next.min_momentum_score,
                ThresholdFactor::OnChain => &mut next.min_onchain_score,
                ThresholdFactor::Safety => &mut next.min_safety_score,
                ThresholdFactor::BundleRisk => &mut next.max_bundle_risk_score,
                ThresholdFactor::Liquidity => &mut next.min_liquidity,
                ThresholdFactor::Top10 => &mut next.max_top10_concentration,
            };
            let (lo, hi) = rec.factor.bounds();
            let clamped = rec.proposed.clamp(lo, hi);
            if (*slot - clamped).abs() > f64::EPSILON {
                applied.changes.push((rec.factor, *slot, clamped));
                *slot = clamped;
            }
        }

        if !applied.changes.is_empty() {
            self.store.persist_thresholds(&next).await?;
            self.current.store(Arc::new(next));
            for (factor, from, to) in &applied.changes {
                info!(factor = ?factor, from, to, "threshold updated");
            }
        }

        Ok(applied)
    }

    /// Read recent outcomes and propose moves for factors whose low/high
    /// band win rates differ materially. Optionally applies them.
    pub async fn optimize(&self, apply_now: bool) -> Result<OptimizationResult> {
        let rows = self
            .store
            .recent_signals_with_outcomes(Duration::days(7))
            .await?;

        let snapshot = self.current();
        let mut recommendations = Vec::new();

        let factors: [(ThresholdFactor, f64, fn(&OutcomeRow) -> f64); 6] = [
            (ThresholdFactor::Momentum, snapshot.min_momentum_score, |r| r.momentum_score),
            (ThresholdFactor::OnChain, snapshot.min_onchain_score, |r| r.onchain_score),
            (ThresholdFactor::Safety, snapshot.min_safety_score, |r| r.safety_score),
            (ThresholdFactor::BundleRisk, snapshot.max_bundle_risk_score, |r| r.bundle_risk_score),
            (ThresholdFactor::Liquidity, snapshot.min_liquidity, |r| r.liquidity),
            (ThresholdFactor::Top10, snapshot.max_top10_concentration, |r| r.top10_concentration),
        ];

        for (factor, current, extract) in factors {
            if let Some(rec) = Self::recommend_for_factor(factor, current, &rows, extract) {
                recommendations.push(rec);
            }
        }

        let applied = if apply_now && !recommendations.is_empty() {
            Some(self.apply(&recommendations).await?)
        } else {
            None
        };

        Ok(OptimizationResult {
            sample_size: rows.len(),
            recommendations,
            applied,
        })
    }

    fn recommend_for_factor(
        factor: ThresholdFactor,
        current: f64,
        rows: &[OutcomeRow],
        extract: fn(&OutcomeRow) -> f64,
    ) -> Option<ThresholdRecommendation> {
        if rows.len() < MIN_BAND_SAMPLES * 2 {
            return None;
        }

        // Split at the median factor value
        let mut values: Vec<f64> = rows.iter().map(extract).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let median = values[values.len() / 2];

        let (low, high): (Vec<&OutcomeRow>, Vec<&OutcomeRow>) =
            rows.iter().partition(|r| extract(r) < median);
        if low.len() < MIN_BAND_SAMPLES || high.len() < MIN_BAND_SAMPLES {
            return None;
        }

        let win_rate = |band: &[&OutcomeRow]| {
            band.iter().filter(|r| r.win).count() as f64 / band.len() as f64
        };
        let low_rate = win_rate(&low);
        let high_rate = win_rate(&high);
        let diff = high_rate - low_rate;

        if diff.abs() < MATERIAL_WIN_RATE_DIFF {
            return None;
        }

        let step = current * STEP_FRACTION;
        // High-value rows winning more is evidence high values are good:
        // raise the gate (stricter floor, looser ceiling). Low-value rows
        // winning means the opposite.
        let proposed = if diff > 0.0 { current + step } else { current - step };
        let (lo, hi) = factor.bounds();

        Some(ThresholdRecommendation {
            factor,
            current,
            proposed: proposed.clamp(lo, hi),
            reason: format!(
                "win rate {:.0}% below median vs {:.0}% above ({} samples)",
                low_rate * 100.0,
                high_rate * 100.0,
                rows.len()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySignalStore;

    fn row(id: u32, onchain: f64, win: bool) -> OutcomeRow {
        OutcomeRow {
            signal_id: format!("sig-{}", id),
            momentum_score: 50.0,
            onchain_score: onchain,
            safety_score: 60.0,
            bundle_risk_score: 40.0,
            liquidity: 10_000.0,
            top10_concentration: 50.0,
            win,
        }
    }

    #[tokio::test]
    async fn test_defaults_match_contract() {
        let t = Thresholds::default();
        assert_eq!(t.min_momentum_score, 20.0);
        assert_eq!(t.min_onchain_score, 30.0);
        assert_eq!(t.min_safety_score, 25.0);
        assert_eq!(t.max_bundle_risk_score, 60.0);
        assert_eq!(t.min_liquidity, 2_000.0);
        assert_eq!(t.max_top10_concentration, 85.0);
    }

    #[test]
    fn test_effective_learning_relaxations() {
        let mut t = Thresholds::default();
        t.learning_mode = true;
        let eff = EffectiveThresholds::from(&t);
        assert_eq!(eff.min_onchain_score, 20.0);
        assert_eq!(eff.min_holder_growth_rate, 0.0);
        assert_eq!(eff.early_min_safety_score, 35.0);
        assert_eq!(eff.early_max_bundle_risk, 70.0);
        assert!(!eff.avoid_blocks);
        assert!(!eff.warning_gate_enabled);

        t.learning_mode = false;
        let eff = EffectiveThresholds::from(&t);
        assert_eq!(eff.min_onchain_score, 30.0);
        assert_eq!(eff.min_holder_growth_rate, 0.01);
        assert_eq!(eff.early_min_safety_score, 50.0);
        assert_eq!(eff.early_max_bundle_risk, 55.0);
        assert!(eff.avoid_blocks);
        assert!(eff.warning_gate_enabled);
    }

    #[tokio::test]
    async fn test_apply_persists_and_swaps() {
        let store = Arc::new(MemorySignalStore::new());
        let thresholds = ThresholdStore::load(store.clone() as Arc<dyn SignalStore>).await;

        let rec = ThresholdRecommendation {
            factor: ThresholdFactor::OnChain,
            current: 30.0,
            proposed: 35.0,
            reason: "test".to_string(),
        };
        let applied = thresholds.apply(&[rec]).await.unwrap();
        assert_eq!(applied.changes.len(), 1);
        assert_eq!(thresholds.current().min_onchain_score, 35.0);

        // Round-trip: persisting then reloading yields the same value
        let reloaded = ThresholdStore::load(store as Arc<dyn SignalStore>).await;
        assert_eq!(reloaded.current().min_onchain_score, 35.0);
    }

    #[tokio::test]
    async fn test_snapshot_unaffected_by_apply() {
        let store = Arc::new(MemorySignalStore::new()) as Arc<dyn SignalStore>;
        let thresholds = ThresholdStore::load(store).await;

        let snapshot = thresholds.current();
        let rec = ThresholdRecommendation {
            factor: ThresholdFactor::Safety,
            current: 25.0,
            proposed: 40.0,
            reason: "test".to_string(),
        };
        thresholds.apply(&[rec]).await.unwrap();

        // The held snapshot still shows the old value; new reads see the new
        assert_eq!(snapshot.min_safety_score, 25.0);
        assert_eq!(thresholds.current().min_safety_score, 40.0);
    }

    #[tokio::test]
    async fn test_apply_clamps_to_bounds() {
        let store = Arc::new(MemorySignalStore::new()) as Arc<dyn SignalStore>;
        let thresholds = ThresholdStore::load(store).await;

        let rec = ThresholdRecommendation {
            factor: ThresholdFactor::BundleRisk,
            current: 60.0,
            proposed: 5.0, // below the factor floor of 20
            reason: "test".to_string(),
        };
        thresholds.apply(&[rec]).await.unwrap();
        assert_eq!(thresholds.current().max_bundle_risk_score, 20.0);
    }

    #[test]
    fn test_recommendation_raises_loose_floor() {
        // High on-chain scores win far more often: the floor should rise
        let mut rows = Vec::new();
        for i in 0..10 {
            rows.push(row(i, 20.0, i % 5 == 0)); // low band: 20% wins
        }
        for i in 10..20 {
            rows.push(row(i, 70.0, i % 5 != 0)); // high band: 80% wins
        }
        let rec =
            ThresholdStore::recommend_for_factor(ThresholdFactor::OnChain, 30.0, &rows, |r| {
                r.onchain_score
            })
            .expect("material difference should produce a recommendation");
        assert!(rec.proposed > rec.current);
    }

    #[test]
    fn test_recommendation_lowers_tight_floor() {
        // Low-score signals win just as often: the floor should come down
        let mut rows = Vec::new();
        for i in 0..10 {
            rows.push(row(i, 20.0, i % 5 != 0)); // low band: 80% wins
        }
        for i in 10..20 {
            rows.push(row(i, 70.0, i % 5 == 0)); // high band: 20% wins
        }
        let rec =
            ThresholdStore::recommend_for_factor(ThresholdFactor::OnChain, 30.0, &rows, |r| {
                r.onchain_score
            })
            .expect("material difference should produce a recommendation");
        assert!(rec.proposed < rec.current);
    }

    #[test]
    fn test_no_recommendation_without_material_difference() {
        let mut rows = Vec::new();
        for i in 0..20 {
            rows.push(row(i, if i < 10 { 20.0 } else { 70.0 }, i % 2 == 0));
        }
        let rec =
            ThresholdStore::recommend_for_factor(ThresholdFactor::OnChain, 30.0, &rows, |r| {
                r.onchain_score
            });
        assert!(rec.is_none());
    }

    #[test]
    fn test_no_recommendation_with_thin_samples() {
        let rows: Vec<OutcomeRow> = (0..6).map(|i| row(i, 20.0 + i as f64, i % 2 == 0)).collect();
        let rec =
            ThresholdStore::recommend_for_factor(ThresholdFactor::OnChain, 30.0, &rows, |r| {
                r.onchain_score
            });
        assert!(rec.is_none());
    }

    #[test]
    fn test_ceiling_direction_inverts() {
        // Low bundle risk wins more: tighten (lower) the ceiling
        let mut rows = Vec::new();
        for i in 0..10 {
            let mut r = row(i, 50.0, i % 5 != 0); // wins
            r.bundle_risk_score = 20.0;
            rows.push(r);
        }
        for i in 10..20 {
            let mut r = row(i, 50.0, i % 5 == 0); // losses
            r.bundle_risk_score = 75.0;
            rows.push(r);
        }
        let rec = ThresholdStore::recommend_for_factor(
            ThresholdFactor::BundleRisk,
            60.0,
            &rows,
            |r| r.bundle_risk_score,
        )
        .expect("material difference should produce a recommendation");
        assert!(rec.proposed < rec.current);
    }
}
