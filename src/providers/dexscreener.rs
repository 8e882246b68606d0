//! DexScreener API client (market aggregator, free tier)
//!
//! Pair lookups, new-listing discovery, trending tokens and social/profile
//! info. Rate-limited with a min-interval gate; empty pair responses are
//! cached briefly so a dead token does not get hammered every cycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DexScreenerConfig;
use crate::error::{Error, Result};
use crate::market::types::TokenSocialInfo;
use crate::net::{InflightRegistry, RateLimiter, TtlCache};

const PAIRS_TTL: Duration = Duration::from_secs(30);
/// Shorter TTL for empty results so late-listed pairs show up quickly
const EMPTY_PAIRS_TTL: Duration = Duration::from_secs(10);
const PROFILE_LIST_TTL: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceChange {
    pub m5: Option<f64>,
    pub h1: Option<f64>,
    pub h6: Option<f64>,
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Txns {
    pub m5: Option<TxnCount>,
    pub h1: Option<TxnCount>,
    pub h6: Option<TxnCount>,
    pub h24: Option<TxnCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxnCount {
    pub buys: u32,
    pub sells: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Liquidity {
    pub usd: Option<f64>,
    pub base: Option<f64>,
    pub quote: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    pub m5: Option<f64>,
    pub h1: Option<f64>,
    pub h6: Option<f64>,
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseToken {
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexPair {
    #[serde(rename = "chainId")]
    pub chain_id: String,
    #[serde(rename = "dexId")]
    pub dex_id: String,
    #[serde(rename = "pairAddress")]
    pub pair_address: String,
    #[serde(rename = "baseToken")]
    pub base_token: BaseToken,
    #[serde(rename = "priceUsd")]
    pub price_usd: Option<String>,
    #[serde(rename = "priceChange")]
    pub price_change: Option<PriceChange>,
    pub txns: Option<Txns>,
    pub volume: Option<Volume>,
    pub liquidity: Option<Liquidity>,
    #[serde(rename = "marketCap")]
    pub market_cap: Option<f64>,
    pub fdv: Option<f64>,
    /// Unix millis of pair creation; the source of token age
    #[serde(rename = "pairCreatedAt")]
    pub pair_created_at: Option<i64>,
}

impl DexPair {
    pub fn price(&self) -> f64 {
        self.price_usd
            .as_ref()
            .and_then(|p| p.parse::<f64>().ok())
            .unwrap_or(0.0)
    }

    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
    }

    pub fn volume_h24(&self) -> f64 {
        self.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0)
    }

    pub fn volume_h1(&self) -> f64 {
        self.volume.as_ref().and_then(|v| v.h1).unwrap_or(0.0)
    }

    /// Age in minutes derived from pair creation time; None when unreported
    pub fn age_minutes(&self) -> Option<f64> {
        self.pair_created_at.map(|created_ms| {
            let elapsed_ms = Utc::now().timestamp_millis() - created_ms;
            (elapsed_ms as f64 / 60_000.0).max(0.0)
        })
    }

    pub fn txn_counts(&self, window: TxnWindow) -> (u32, u32) {
        let txns = match &self.txns {
            Some(t) => t,
            None => return (0, 0),
        };
        let count = match window {
            TxnWindow::M5 => &txns.m5,
            TxnWindow::H1 => &txns.h1,
            TxnWindow::H24 => &txns.h24,
        };
        count.as_ref().map(|c| (c.buys, c.sells)).unwrap_or((0, 0))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum TxnWindow {
    M5,
    H1,
    H24,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPairsResponse {
    pub pairs: Option<Vec<DexPair>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenProfile {
    #[serde(rename = "chainId")]
    pub chain_id: String,
    #[serde(rename = "tokenAddress")]
    pub token_address: String,
    pub description: Option<String>,
    pub links: Option<Vec<ProfileLink>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileLink {
    #[serde(rename = "type")]
    pub link_type: Option<String>,
    pub label: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBoost {
    #[serde(rename = "chainId")]
    pub chain_id: String,
    #[serde(rename = "tokenAddress")]
    pub token_address: String,
    #[serde(rename = "totalAmount")]
    pub total_amount: Option<f64>,
}

/// Market aggregator client (Provider B)
pub struct DexScreenerClient {
    client: Client,
    base_url: String,
    chain_id: String,
    limiter: RateLimiter,
    pairs_cache: Arc<TtlCache<Vec<DexPair>>>,
    pairs_inflight: InflightRegistry<Vec<DexPair>>,
    profiles_cache: Arc<TtlCache<Vec<TokenProfile>>>,
    boosts_cache: Arc<TtlCache<Vec<TokenBoost>>>,
}

impl DexScreenerClient {
    pub fn new(config: &DexScreenerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Provider(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chain_id: config.chain_id.clone(),
            limiter: RateLimiter::min_interval("dexscreener", config.min_interval_ms),
            pairs_cache: Arc::new(TtlCache::new("dexscreener.pairs", 1_000)),
            pairs_inflight: InflightRegistry::new(),
            profiles_cache: Arc::new(TtlCache::new("dexscreener.profiles", 4)),
            boosts_cache: Arc::new(TtlCache::new("dexscreener.boosts", 4)),
        })
    }

    /// All pairs for a token on the target chain (30s cache, 10s when empty)
    pub async fn get_token_pairs(&self, address: &str) -> Vec<DexPair> {
        if let Some(cached) = self.pairs_cache.get(address) {
            return cached;
        }

        let address_owned = address.to_string();
        self.pairs_inflight
            .get_or_start(address, || async move {
                let pairs = self.fetch_pairs(&address_owned).await;
                let ttl = if pairs.is_empty() { EMPTY_PAIRS_TTL } else { PAIRS_TTL };
                self.pairs_cache.put(&address_owned, pairs.clone(), ttl);
                pairs
            })
            .await
    }

    /// The primary (deepest-liquidity) pair for a token
    pub async fn get_primary_pair(&self, address: &str) -> Option<DexPair> {
        let mut pairs = self.get_token_pairs(address).await;
        pairs.sort_by(|a, b| {
            b.liquidity_usd()
                .partial_cmp(&a.liquidity_usd())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        pairs.into_iter().next()
    }

    /// Token addresses of newly listed pairs, newest first. The profile feed
    /// is primary; the search endpoint is the fallback when it fails.
    pub async fn get_new_pairs(&self, limit: usize) -> Vec<String> {
        match self.fetch_latest_profiles().await {
            Ok(profiles) => profiles
                .into_iter()
                .filter(|p| p.chain_id == self.chain_id)
                .map(|p| p.token_address)
                .take(limit)
                .collect(),
            Err(e) => {
                debug!(error = %e, "profile feed failed, falling back to search");
                self.search_newest(limit).await
            }
        }
    }

    /// Trending token addresses from the boost feed, profile-feed fallback
    pub async fn get_trending(&self, limit: usize) -> Vec<String> {
        match self.fetch_latest_boosts().await {
            Ok(boosts) => boosts
                .into_iter()
                .filter(|b| b.chain_id == self.chain_id)
                .map(|b| b.token_address)
                .take(limit)
                .collect(),
            Err(e) => {
                debug!(error = %e, "boost feed failed, falling back to profiles");
                match self.fetch_latest_profiles().await {
                    Ok(profiles) => profiles
                        .into_iter()
                        .filter(|p| p.chain_id == self.chain_id)
                        .map(|p| p.token_address)
                        .take(limit)
                        .collect(),
                    Err(_) => Vec::new(),
                }
            }
        }
    }

    /// Social links, paid-profile and boost state for a token
    pub async fn get_token_info(&self, address: &str) -> Option<TokenSocialInfo> {
        let profiles = self.fetch_latest_profiles().await.unwrap_or_default();
        let boosts = self.fetch_latest_boosts().await.unwrap_or_default();

        let profile = profiles
            .iter()
            .find(|p| p.chain_id == self.chain_id && p.token_address == address);
        let boost_count = boosts
            .iter()
            .filter(|b| b.chain_id == self.chain_id && b.token_address == address)
            .count() as u32;

        if profile.is_none() && boost_count == 0 {
            return None;
        }

        let mut info = TokenSocialInfo {
            has_paid_profile: profile.is_some(),
            boost_count,
            ..Default::default()
        };

        if let Some(profile) = profile {
            info.description = profile.description.clone();
            for link in profile.links.iter().flatten() {
                let url = match &link.url {
                    Some(u) => u.clone(),
                    None => continue,
                };
                let kind = link
                    .link_type
                    .as_deref()
                    .or(link.label.as_deref())
                    .unwrap_or("")
                    .to_lowercase();
                if kind.contains("twitter") || url.contains("twitter.com") || url.contains("x.com") {
                    info.twitter.get_or_insert(url);
                } else if kind.contains("telegram") || url.contains("t.me") {
                    info.telegram.get_or_insert(url);
                } else if kind.contains("discord") || url.contains("discord") {
                    info.discord.get_or_insert(url);
                } else {
                    info.website.get_or_insert(url);
                }
            }
        }

        Some(info)
    }

    /// Reclaim expired cache entries; driven by the maintenance task
    pub fn sweep_caches(&self) -> usize {
        self.pairs_cache.sweep() + self.profiles_cache.sweep() + self.boosts_cache.sweep()
    }

    /// Aggregate (hits, misses) across this client's caches
    pub fn cache_stats(&self) -> (u64, u64) {
        let (h1, m1) = self.pairs_cache.stats();
        let (h2, m2) = self.profiles_cache.stats();
        let (h3, m3) = self.boosts_cache.stats();
        (h1 + h2 + h3, m1 + m2 + m3)
    }

    async fn fetch_pairs(&self, address: &str) -> Vec<DexPair> {
        let url = format!("{}/latest/dex/tokens/{}", self.base_url, address);
        match self.get_json::<TokenPairsResponse>(&url).await {
            Ok(data) => data
                .pairs
                .unwrap_or_default()
                .into_iter()
                .filter(|p| p.chain_id == self.chain_id)
                .collect(),
            Err(e) => {
                debug!(address = %address, error = %e, "pair fetch failed");
                Vec::new()
            }
        }
    }

    async fn search_newest(&self, limit: usize) -> Vec<String> {
        let url = format!("{}/latest/dex/search?q={}", self.base_url, self.chain_id);
        match self.get_json::<TokenPairsResponse>(&url).await {
            Ok(data) => {
                let mut pairs: Vec<DexPair> = data
                    .pairs
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|p| p.chain_id == self.chain_id)
                    .collect();
                pairs.sort_by_key(|p| std::cmp::Reverse(p.pair_created_at.unwrap_or(0)));
                let mut seen = std::collections::HashSet::new();
                pairs
                    .into_iter()
                    .map(|p| p.base_token.address)
                    .filter(|a| seen.insert(a.clone()))
                    .take(limit)
                    .collect()
            }
            Err(e) => {
                debug!(error = %e, "search fallback failed");
                Vec::new()
            }
        }
    }

    async fn fetch_latest_profiles(&self) -> Result<Vec<TokenProfile>> {
        if let Some(cached) = self.profiles_cache.get("latest") {
            return Ok(cached);
        }
        let url = format!("{}/token-profiles/latest/v1", self.base_url);
        let profiles: Vec<TokenProfile> = self.get_json(&url).await?;
        self.profiles_cache.put("latest", profiles.clone(), PROFILE_LIST_TTL);
        Ok(profiles)
    }

    async fn fetch_latest_boosts(&self) -> Result<Vec<TokenBoost>> {
        if let Some(cached) = self.boosts_cache.get("latest") {
            return Ok(cached);
        }
        let url = format!("{}/token-boosts/latest/v1", self.base_url);
        let boosts: Vec<TokenBoost> = self.get_json(&url).await?;
        self.boosts_cache.put("latest", boosts.clone(), PROFILE_LIST_TTL);
        Ok(boosts)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        self.limiter.acquire().await;

        let response = self.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            self.limiter.report_rejection().await;
            return Err(Error::RateLimited(url.to_string()));
        }
        if !response.status().is_success() {
            return Err(Error::Provider(format!("{} returned {}", url, response.status())));
        }

        self.limiter.report_success().await;
        response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("{}: {}", url, e)))
    }
}
