//! Authoritative holder count provider (paid API)
//!
//! Unlike the RPC token-accounts index, this source reports a true total
//! holder count. On every successful fetch a snapshot is appended to a
//! bounded per-token history from which the 1-hour holder change is derived.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::HolderScanConfig;
use crate::error::{Error, Result};
use crate::net::{InflightRegistry, RateLimiter, TtlCache};
use crate::providers::rpc::{HolderBreakdown, HolderInfo};

const HOLDERS_TTL: Duration = Duration::from_secs(60);
/// Snapshot history horizon per token
const SNAPSHOT_HORIZON_MINUTES: i64 = 120;
/// Below this much history the 1h change is reported as zero
const MIN_HISTORY_MINUTES: f64 = 5.0;
/// Extrapolating a short history to a 1h rate is capped at this factor.
/// Empirical; tunable if the cap proves too tight.
const MAX_EXTRAPOLATION: f64 = 3.0;
const PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
struct HolderSnapshot {
    holder_count: u64,
    taken_at: DateTime<Utc>,
}

/// Authoritative holder API client (Provider C)
pub struct HolderScanClient {
    client: Client,
    base_url: String,
    api_key: String,
    limiter: RateLimiter,
    cache: Arc<TtlCache<Option<HolderBreakdown>>>,
    inflight: InflightRegistry<Option<HolderBreakdown>>,
    /// Append-mostly per-token history, bounded to the snapshot horizon
    snapshots: DashMap<String, VecDeque<HolderSnapshot>>,
}

impl HolderScanClient {
    pub fn new(config: &HolderScanConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::Config("holderscan.api_key is not set".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Provider(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            limiter: RateLimiter::min_interval("holderscan", config.min_interval_ms),
            cache: Arc::new(TtlCache::new("holderscan.holders", 500)),
            inflight: InflightRegistry::new(),
            snapshots: DashMap::new(),
        })
    }

    /// Authoritative holder breakdown (60s cache). Appends to the snapshot
    /// history on success.
    pub async fn get_token_holders(&self, address: &str) -> Option<HolderBreakdown> {
        if let Some(cached) = self.cache.get(address) {
            return cached;
        }

        let address_owned = address.to_string();
        self.inflight
            .get_or_start(address, || async move {
                let result = self.fetch_holders(&address_owned).await;
                if let Some(ref breakdown) = result {
                    self.record_snapshot(&address_owned, breakdown.total, Utc::now());
                }
                let ttl = if result.is_some() {
                    HOLDERS_TTL
                } else {
                    Duration::from_secs(15)
                };
                self.cache.put(&address_owned, result.clone(), ttl);
                result
            })
            .await
    }

    /// Signed percent change in holders over the last hour.
    ///
    /// Picks the snapshot closest to one hour old when one exists in the
    /// [30, 90] minute window; otherwise scales the oldest available delta
    /// to a 1-hour rate, capped at 3x extrapolation. Zero with under five
    /// minutes of history.
    pub fn derive_holder_change_1h(&self, address: &str, current: u64) -> f64 {
        self.derive_holder_change_at(address, current, Utc::now())
    }

    fn derive_holder_change_at(&self, address: &str, current: u64, now: DateTime<Utc>) -> f64 {
        let history = match self.snapshots.get(address) {
            Some(h) => h,
            None => return 0.0,
        };

        let oldest = match history.front() {
            Some(s) => s.clone(),
            None => return 0.0,
        };

        let coverage_minutes = (now - oldest.taken_at).num_seconds() as f64 / 60.0;
        if coverage_minutes < MIN_HISTORY_MINUTES {
            return 0.0;
        }

        // Snapshot closest to one hour old, if any falls in [30, 90] minutes
        let in_window = history
            .iter()
            .filter(|s| {
                let age = (now - s.taken_at).num_seconds() as f64 / 60.0;
                (30.0..=90.0).contains(&age)
            })
            .min_by_key(|s| ((now - s.taken_at).num_seconds() - 3_600).abs());

        let (reference, scale) = match in_window {
            Some(s) => (s.clone(), 1.0),
            None => {
                let age = (now - oldest.taken_at).num_seconds() as f64 / 60.0;
                let scale = (60.0 / age.max(1.0)).min(MAX_EXTRAPOLATION);
                (oldest, scale)
            }
        };

        if reference.holder_count == 0 {
            return 0.0;
        }

        let raw_change = (current as f64 - reference.holder_count as f64)
            / reference.holder_count as f64
            * 100.0;
        raw_change * scale
    }

    fn record_snapshot(&self, address: &str, holder_count: u64, at: DateTime<Utc>) {
        let mut history = self.snapshots.entry(address.to_string()).or_default();
        history.push_back(HolderSnapshot {
            holder_count,
            taken_at: at,
        });
        let cutoff = at - chrono::Duration::minutes(SNAPSHOT_HORIZON_MINUTES);
        while history.front().map_or(false, |s| s.taken_at < cutoff) {
            history.pop_front();
        }
    }

    /// Drop histories for tokens not snapshotted within the horizon
    pub fn sweep_snapshots(&self) {
        let cutoff = Utc::now() - chrono::Duration::minutes(SNAPSHOT_HORIZON_MINUTES);
        self.snapshots
            .retain(|_, h| h.back().map_or(false, |s| s.taken_at >= cutoff));
    }

    /// Reclaim expired cache entries and stale snapshot histories
    pub fn sweep_caches(&self) -> usize {
        self.sweep_snapshots();
        self.cache.sweep()
    }

    /// (hits, misses) for the holder cache
    pub fn cache_stats(&self) -> (u64, u64) {
        self.cache.stats()
    }

    async fn fetch_holders(&self, address: &str) -> Option<HolderBreakdown> {
        let url = format!(
            "{}/token/holders?address={}&page=1&page_size={}",
            self.base_url, address, PAGE_SIZE
        );

        self.limiter.acquire().await;

        let response = match self
            .client
            .get(&url)
            .header("token", &self.api_key)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                debug!(address = %address, error = %e, "holder fetch failed");
                return None;
            }
        };

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            self.limiter.report_rejection().await;
            debug!(address = %address, "holder fetch rate limited");
            return None;
        }
        if !response.status().is_success() {
            debug!(address = %address, status = %response.status(), "holder fetch failed");
            return None;
        }

        let parsed: HoldersResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                debug!(address = %address, error = %e, "holder response parse failed");
                return None;
            }
        };

        self.limiter.report_success().await;

        let top_holders: Vec<HolderInfo> = parsed
            .holders
            .into_iter()
            .map(|h| HolderInfo {
                owner: h.address,
                amount: h.amount.unwrap_or(0),
                percentage: h.pct.unwrap_or(0.0),
            })
            .collect();

        Some(HolderBreakdown {
            total: parsed.total,
            top_holders,
        })
    }
}

// ============ API response DTOs ============

#[derive(Debug, Deserialize)]
struct HoldersResponse {
    total: u64,
    #[serde(default)]
    holders: Vec<HolderRow>,
}

#[derive(Debug, Deserialize)]
struct HolderRow {
    address: String,
    amount: Option<u64>,
    pct: Option<f64>,
}
