//! Acquisition facade over the provider clients
//!
//! Fans out across providers in parallel with all-settled semantics and
//! composes whatever answered into the fused token view. Any subset of
//! sources may fail; only a total blackout yields `None`.

pub mod types;

use std::sync::Arc;

use tracing::debug;

use crate::analysis::bundle::BundleDetector;
use crate::analysis::momentum::MomentumAnalyzer;
use crate::analysis::safety::SafetyContext;
use crate::providers::dexscreener::{DexPair, DexScreenerClient, TxnWindow};
use crate::providers::holderscan::HolderScanClient;
use crate::providers::rpc::{HolderBreakdown, RpcClient};

use types::{BundleReport, MomentumSnapshot, TokenMetrics, TokenSocialInfo};

/// Conservative default when no holder source answered
const DEFAULT_HOLDER_COUNT: u64 = 25;
/// Conservative default concentration when holders are unknown
const DEFAULT_TOP10_CONCENTRATION: f64 = 50.0;
/// Assumed age when the pair creation time is unreported
const DEFAULT_TOKEN_AGE_MINUTES: f64 = 5.0;
/// Signatures fetched for bundle analysis
const BUNDLE_SIGNATURE_LIMIT: u32 = 100;
/// Early transactions sampled for fee-payer extraction
const EARLY_TX_SAMPLE: usize = 8;
/// Slots after creation still sampled as "early"
const EARLY_TX_SLOT_WINDOW: u64 = 2;

/// Process-wide facade over the four provider clients
pub struct MarketData {
    rpc: Option<Arc<RpcClient>>,
    dex: Arc<DexScreenerClient>,
    holders: Option<Arc<HolderScanClient>>,
}

impl MarketData {
    pub fn new(
        rpc: Option<Arc<RpcClient>>,
        dex: Arc<DexScreenerClient>,
        holders: Option<Arc<HolderScanClient>>,
    ) -> Self {
        Self { rpc, dex, holders }
    }

    /// Fused token snapshot. `None` only when every source came back empty.
    pub async fn get_token_metrics(&self, address: &str) -> Option<TokenMetrics> {
        let (pairs, holder_data) = tokio::join!(
            self.dex.get_token_pairs(address),
            self.fetch_holder_breakdown(address),
        );

        if pairs.is_empty() && holder_data.is_none() {
            debug!(mint = %address, "no provider returned data");
            return None;
        }

        let primary = Self::primary_pair(pairs);

        let (ticker, name) = primary
            .as_ref()
            .map(|p| {
                (
                    p.base_token
                        .symbol
                        .clone()
                        .filter(|s| !s.is_empty())
                        .unwrap_or_else(|| "UNKNOWN".to_string()),
                    p.base_token
                        .name
                        .clone()
                        .filter(|n| !n.is_empty())
                        .unwrap_or_else(|| "Unknown".to_string()),
                )
            })
            .unwrap_or_else(|| ("UNKNOWN".to_string(), "Unknown".to_string()));

        let price = primary.as_ref().map(|p| p.price()).unwrap_or(0.0);
        let market_cap = primary
            .as_ref()
            .and_then(|p| p.market_cap.or(p.fdv))
            .unwrap_or(0.0);
        let volume_24h = primary.as_ref().map(|p| p.volume_h24()).unwrap_or(0.0);
        let liquidity = primary.as_ref().map(|p| p.liquidity_usd()).unwrap_or(0.0);

        let holder_count = holder_data
            .as_ref()
            .map(|(b, _)| b.total)
            .unwrap_or(DEFAULT_HOLDER_COUNT);

        let top10_concentration = holder_data
            .as_ref()
            .map(|(b, _)| {
                let sum: f64 = b.top_holders.iter().take(10).map(|h| h.percentage).sum();
                if sum > 0.0 {
                    sum.min(100.0)
                } else {
                    DEFAULT_TOP10_CONCENTRATION
                }
            })
            .unwrap_or(DEFAULT_TOP10_CONCENTRATION);

        let token_age_minutes = primary
            .as_ref()
            .and_then(|p| p.age_minutes())
            .unwrap_or(DEFAULT_TOKEN_AGE_MINUTES);

        // Holder change comes from the authoritative snapshot history only
        let holder_change_1h = match (&self.holders, &holder_data) {
            (Some(client), Some((breakdown, true))) => {
                client.derive_holder_change_1h(address, breakdown.total)
            }
            _ => 0.0,
        };

        Some(TokenMetrics {
            address: address.to_string(),
            ticker,
            name,
            price,
            market_cap,
            volume_24h,
            liquidity,
            volume_market_cap_ratio: TokenMetrics::volume_mcap_ratio(volume_24h, market_cap),
            holder_count,
            holder_change_1h,
            top10_concentration,
            token_age_minutes,
            lp_locked: None,
        })
    }

    /// Contract-level inputs for the safety checker. Degrades to an empty
    /// context (permissive defaults downstream) when the RPC source is
    /// disabled or silent.
    pub async fn contract_safety_context(&self, address: &str) -> SafetyContext {
        let rpc = match &self.rpc {
            Some(rpc) => rpc,
            None => return SafetyContext::default(),
        };

        let (mint_info, holder_data, pairs) = tokio::join!(
            rpc.get_token_mint_info(address),
            self.fetch_holder_breakdown(address),
            self.dex.get_token_pairs(address),
        );

        let mut ctx = SafetyContext::default();

        if let Some(info) = mint_info {
            ctx.mint_authority_revoked = Some(info.mint_authority.is_none());
            ctx.freeze_authority_revoked = Some(info.freeze_authority.is_none());
        }

        if let Some((breakdown, _)) = holder_data {
            ctx.holder_count = Some(breakdown.total);
            ctx.top10_concentration = Some(
                breakdown
                    .top_holders
                    .iter()
                    .take(10)
                    .map(|h| h.percentage)
                    .sum::<f64>()
                    .min(100.0),
            );
            // The deployer is conventionally the largest non-pool holder
            ctx.deployer_holding_percent =
                breakdown.top_holders.first().map(|h| h.percentage);
        }

        if let Some(pair) = Self::primary_pair(pairs) {
            let (buys, sells) = pair.txn_counts(TxnWindow::H24);
            ctx.buys_24h = buys;
            ctx.sells_24h = sells;
        }

        ctx
    }

    /// Volume authenticity 0..100 from aggregator trade shape
    pub async fn analyze_volume_authenticity(&self, address: &str) -> Option<u8> {
        let pair = self.dex.get_primary_pair(address).await?;
        Some(volume_authenticity(&pair))
    }

    /// Bundle analysis from early-signature clustering. Samples a handful
    /// of early transactions to identify distinct fee payers.
    pub async fn analyze_bundles(&self, address: &str) -> BundleReport {
        let rpc = match &self.rpc {
            Some(rpc) => rpc,
            None => return BundleReport::unknown(),
        };

        let (creation, recent) = tokio::join!(
            rpc.get_token_creation(address),
            rpc.get_recent_signatures(address, BUNDLE_SIGNATURE_LIMIT),
        );

        let early_buyers = match &creation {
            Some(creation) => {
                let sample: Vec<&str> = recent
                    .iter()
                    .filter(|s| {
                        !s.err
                            && s.slot >= creation.slot
                            && s.slot <= creation.slot + EARLY_TX_SLOT_WINDOW
                    })
                    .take(EARLY_TX_SAMPLE)
                    .map(|s| s.signature.as_str())
                    .collect();
                let details = futures::future::join_all(
                    sample.iter().map(|sig| rpc.get_transaction(sig)),
                )
                .await;
                details
                    .into_iter()
                    .flatten()
                    .filter_map(|tx| tx.fee_payer)
                    .collect()
            }
            None => Vec::new(),
        };

        BundleDetector::analyze(creation.as_ref(), &recent, &early_buyers)
    }

    /// Momentum snapshot; `None` when no pair exists to read activity from
    pub async fn analyze_momentum(
        &self,
        address: &str,
        metrics: &TokenMetrics,
    ) -> Option<MomentumSnapshot> {
        let pair = self.dex.get_primary_pair(address).await?;
        Some(MomentumAnalyzer::analyze(&pair, metrics))
    }

    /// Social links and promotion state from the aggregator
    pub async fn fetch_social(&self, address: &str) -> Option<TokenSocialInfo> {
        self.dex.get_token_info(address).await
    }

    /// Candidate feed sources (new pairs + trending)
    pub async fn new_pair_candidates(&self, limit: usize) -> Vec<String> {
        self.dex.get_new_pairs(limit).await
    }

    pub async fn trending_candidates(&self, limit: usize) -> Vec<String> {
        self.dex.get_trending(limit).await
    }

    /// Whether the chain RPC source is wired
    pub fn rpc_enabled(&self) -> bool {
        self.rpc.is_some()
    }

    /// Sweep every owned client cache; returns reclaimed entry count
    pub fn sweep_caches(&self) -> usize {
        let mut removed = self.dex.sweep_caches();
        if let Some(rpc) = &self.rpc {
            removed += rpc.sweep_caches();
        }
        if let Some(holders) = &self.holders {
            removed += holders.sweep_caches();
        }
        removed
    }

    /// Aggregate cache (hits, misses) across the owned clients
    pub fn cache_stats(&self) -> (u64, u64) {
        let (mut hits, mut misses) = self.dex.cache_stats();
        if let Some(rpc) = &self.rpc {
            let (h, m) = rpc.cache_stats();
            hits += h;
            misses += m;
        }
        if let Some(holders) = &self.holders {
            let (h, m) = holders.cache_stats();
            hits += h;
            misses += m;
        }
        (hits, misses)
    }

    /// Prefer the authoritative holder source; fall back to the RPC index.
    /// The bool marks whether the total is authoritative.
    async fn fetch_holder_breakdown(&self, address: &str) -> Option<(HolderBreakdown, bool)> {
        if let Some(client) = &self.holders {
            if let Some(breakdown) = client.get_token_holders(address).await {
                return Some((breakdown, true));
            }
        }
        if let Some(rpc) = &self.rpc {
            if let Some(breakdown) = rpc.get_token_holders(address).await {
                return Some((breakdown, false));
            }
        }
        None
    }

    fn primary_pair(mut pairs: Vec<DexPair>) -> Option<DexPair> {
        pairs.sort_by(|a, b| {
            b.liquidity_usd()
                .partial_cmp(&a.liquidity_usd())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        pairs.into_iter().next()
    }
}

/// Score trade shape for authenticity: buy/sell balance, average trade
/// size band and hourly-versus-daily volume ratio. A wash-trading proxy
/// below 0.3 caps the score in the suspect range.
pub fn volume_authenticity(pair: &DexPair) -> u8 {
    let (buys, sells) = pair.txn_counts(TxnWindow::H24);
    let trades = buys + sells;
    if trades == 0 {
        // No trade data is absence, not evidence of washing
        return 50;
    }

    let balance = buys.min(sells) as f64 / buys.max(sells).max(1) as f64;
    let balance_part: f64 = match balance {
        b if b >= 0.4 => 35.0,
        b if b >= 0.25 => 25.0,
        b if b >= 0.1 => 12.0,
        _ => 4.0,
    };

    let avg_trade = pair.volume_h24() / trades as f64;
    let (size_part, size_factor) = if (50.0..=2_000.0).contains(&avg_trade) {
        (35.0, 1.0)
    } else if (10.0..50.0).contains(&avg_trade) || (2_000.0..10_000.0).contains(&avg_trade) {
        (20.0, 0.6)
    } else {
        (5.0, 0.3)
    };

    let velocity_part = if pair.volume_h24() > 0.0 {
        let velocity = pair.volume_h1() * 24.0 / pair.volume_h24();
        if (0.3..=3.0).contains(&velocity) {
            30.0
        } else if velocity <= 6.0 {
            15.0
        } else {
            5.0
        }
    } else {
        5.0
    };

    let score = (balance_part + size_part + velocity_part).min(100.0);

    // Unique-wallet proxy: balanced flow in a healthy size band. Heavily
    // skewed or dust-sized flow reads as one actor painting the tape.
    let wash_proxy = balance * size_factor;
    if wash_proxy < 0.3 {
        return score.min(25.0) as u8;
    }

    score as u8
}
