//! Scan scheduler and cycle driver
//!
//! One driver task runs the periodic scan loop. Cycles never overlap: the
//! next one starts after the previous completes, immediately when overdue.
//! Candidates come from three independent feed sources, deduplicated in
//! arrival order, and are evaluated sequentially so diagnostic counters
//! observe candidate order. Shutdown is cooperative via a cancellation
//! token.

pub mod discovery;
pub mod pipeline;
pub mod thresholds;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ScanConfig;
use crate::market::MarketData;
use crate::providers::jupiter::DirectoryClient;

use discovery::DiscoveryTracker;
use pipeline::{EvalOutcome, Pipeline};

/// Per-cycle diagnostics, mutated only by the single-threaded driver
#[derive(Debug, Default, Clone)]
pub struct CycleCounters {
    pub candidates: usize,
    pub skipped: u32,
    pub safety_blocked: u32,
    pub no_metrics: u32,
    pub screening_failed: u32,
    pub scam_rejected: u32,
    pub scoring_failed: u32,
    pub discovery_failed: u32,
    pub momentum_failed: u32,
    pub bundle_blocked: u32,
    pub too_early: u32,
    pub tier_blocked: u32,
    pub signals_emitted: u32,
    pub other: u32,
}

impl CycleCounters {
    pub fn record(&mut self, outcome: EvalOutcome) {
        match outcome {
            EvalOutcome::Skipped => self.skipped += 1,
            EvalOutcome::SafetyBlocked => self.safety_blocked += 1,
            EvalOutcome::NoMetrics => self.no_metrics += 1,
            EvalOutcome::ScreeningFailed => self.screening_failed += 1,
            EvalOutcome::ScamRejected => self.scam_rejected += 1,
            EvalOutcome::ScoringFailed => self.scoring_failed += 1,
            EvalOutcome::DiscoveryFailed => self.discovery_failed += 1,
            EvalOutcome::MomentumFailed => self.momentum_failed += 1,
            EvalOutcome::BundleBlocked => self.bundle_blocked += 1,
            EvalOutcome::TooEarly => self.too_early += 1,
            EvalOutcome::TierBlocked => self.tier_blocked += 1,
            EvalOutcome::OnchainSignalSent => self.signals_emitted += 1,
            EvalOutcome::SignalSent
            | EvalOutcome::DiscoverySent
            | EvalOutcome::KolValidationSent => self.other += 1,
        }
    }

    /// Everything that got past the cheap rejects
    pub fn pre_filtered(&self) -> usize {
        self.candidates
            - (self.skipped
                + self.no_metrics
                + self.screening_failed
                + self.tier_blocked
                + self.too_early) as usize
    }
}

/// The scan engine: scheduler plus candidate feed
pub struct Engine {
    config: ScanConfig,
    market: Arc<MarketData>,
    directory: Option<Arc<DirectoryClient>>,
    pipeline: Pipeline,
    discovery: Arc<DiscoveryTracker>,
    cancel: CancellationToken,
}

impl Engine {
    pub fn new(
        config: ScanConfig,
        market: Arc<MarketData>,
        directory: Option<Arc<DirectoryClient>>,
        pipeline: Pipeline,
        discovery: Arc<DiscoveryTracker>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            market,
            directory,
            pipeline,
            discovery,
            cancel,
        }
    }

    /// Run scan cycles until cancelled. Nothing escapes a cycle; failures
    /// show up only as absent signals and the per-cycle counter line.
    pub async fn run(&self) {
        let interval = Duration::from_millis(self.config.scan_interval_ms);
        info!(
            interval_ms = self.config.scan_interval_ms,
            learning_mode = self.config.learning_mode,
            "scan engine started"
        );

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let started = Instant::now();
            let counters = self.scan_cycle().await;
            let elapsed = started.elapsed();
            let (cache_hits, cache_misses) = self.market.cache_stats();

            info!(
                candidates = counters.candidates,
                pre_filtered = counters.pre_filtered(),
                signals = counters.signals_emitted,
                too_early = counters.too_early,
                screening_failed = counters.screening_failed,
                tier_blocked = counters.tier_blocked,
                bundle_blocked = counters.bundle_blocked,
                scoring_failed = counters.scoring_failed,
                cache_hits,
                cache_misses,
                elapsed_ms = elapsed.as_millis() as u64,
                "scan cycle complete"
            );

            // Overdue cycles roll straight into the next one
            if elapsed < interval {
                tokio::select! {
                    _ = self.cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval - elapsed) => {}
                }
            }
        }

        info!("scan engine stopped");
    }

    /// One scan cycle: sweep, acquire candidates, evaluate sequentially
    async fn scan_cycle(&self) -> CycleCounters {
        let expired = self.discovery.sweep();
        if expired > 0 {
            debug!(expired, "discovery entries expired");
        }

        let candidates = self.collect_candidates().await;
        let mut counters = CycleCounters {
            candidates: candidates.len(),
            ..Default::default()
        };

        for address in &candidates {
            if self.cancel.is_cancelled() {
                break;
            }
            let outcome = self.pipeline.evaluate(address, &self.cancel).await;
            debug!(mint = %address, outcome = outcome.as_str(), "candidate evaluated");
            counters.record(outcome);
        }

        counters
    }

    /// Build the cycle's unique candidate set: new pairs, then directory
    /// recents, then trending, deduplicated in that order. Sources are
    /// fetched concurrently and each tolerates failure independently.
    async fn collect_candidates(&self) -> Vec<String> {
        let per_source = self.config.candidates_per_source;

        let directory_recents = async {
            match &self.directory {
                Some(directory) => directory.get_recent_tokens(per_source).await,
                None => Vec::new(),
            }
        };
        let (new_pairs, recents, trending) = futures::join!(
            self.market.new_pair_candidates(per_source),
            directory_recents,
            self.market.trending_candidates(per_source),
        );

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for batch in [new_pairs, recents, trending] {
            for address in batch {
                if seen.insert(address.clone()) {
                    candidates.push(address);
                }
            }
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_record_each_outcome() {
        let mut counters = CycleCounters::default();
        counters.candidates = 6;
        counters.record(EvalOutcome::TooEarly);
        counters.record(EvalOutcome::ScreeningFailed);
        counters.record(EvalOutcome::OnchainSignalSent);
        counters.record(EvalOutcome::BundleBlocked);
        counters.record(EvalOutcome::TierBlocked);
        counters.record(EvalOutcome::Skipped);

        assert_eq!(counters.too_early, 1);
        assert_eq!(counters.screening_failed, 1);
        assert_eq!(counters.signals_emitted, 1);
        assert_eq!(counters.bundle_blocked, 1);
        assert_eq!(counters.tier_blocked, 1);
        assert_eq!(counters.skipped, 1);
    }

    #[test]
    fn test_candidate_funnel_narrows() {
        // candidates >= pre_filtered >= signals
        let mut counters = CycleCounters::default();
        counters.candidates = 10;
        counters.record(EvalOutcome::TooEarly);
        counters.record(EvalOutcome::ScreeningFailed);
        counters.record(EvalOutcome::NoMetrics);
        counters.record(EvalOutcome::BundleBlocked);
        counters.record(EvalOutcome::OnchainSignalSent);

        assert!(counters.candidates >= counters.pre_filtered());
        assert!(counters.pre_filtered() >= counters.signals_emitted as usize);
    }
}
