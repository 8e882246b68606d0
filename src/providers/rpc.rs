//! Chain RPC client for authoritative on-chain data
//!
//! Speaks JSON-RPC to an indexer-backed RPC node. The API key travels as a
//! URL query parameter. All operations degrade to `None`/empty on failure;
//! nothing propagates past the acquisition facade.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::RpcConfig;
use crate::error::{Error, Result};
use crate::net::{InflightRegistry, RateLimiter, TtlCache};

const MINT_INFO_TTL: Duration = Duration::from_secs(300);
const HOLDERS_TTL: Duration = Duration::from_secs(60);
/// Cooldown applied on a 429 before the single re-queue
const REJECTION_COOLDOWN: Duration = Duration::from_secs(2);
/// Largest page the holder endpoint serves; `total` is a floor when capped
const HOLDER_PAGE_LIMIT: u32 = 1_000;

/// Parsed mint account state
#[derive(Debug, Clone)]
pub struct MintInfo {
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    pub decimals: u8,
    pub supply: u64,
    pub is_initialized: bool,
}

impl MintInfo {
    pub fn is_fully_renounced(&self) -> bool {
        self.mint_authority.is_none() && self.freeze_authority.is_none()
    }
}

/// One holder row from the token-accounts index
#[derive(Debug, Clone)]
pub struct HolderInfo {
    pub owner: String,
    pub amount: u64,
    /// Percent of the visible supply held
    pub percentage: f64,
}

/// Holder breakdown; `total` may be pagination-capped (treat as a floor)
#[derive(Debug, Clone)]
pub struct HolderBreakdown {
    pub total: u64,
    pub top_holders: Vec<HolderInfo>,
}

/// A confirmed signature touching an address
#[derive(Debug, Clone)]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub err: bool,
}

/// The transaction that created the token account
#[derive(Debug, Clone)]
pub struct CreationInfo {
    pub signature: String,
    pub block_time: Option<i64>,
    pub slot: u64,
}

/// Minimal transaction detail used by the bundle detector
#[derive(Debug, Clone)]
pub struct TransactionDetail {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub fee_payer: Option<String>,
    pub account_keys: Vec<String>,
}

/// Chain RPC client (Provider A)
pub struct RpcClient {
    client: Client,
    /// Endpoint with the api-key query parameter already attached
    rpc_url: String,
    limiter: RateLimiter,
    mint_cache: Arc<TtlCache<Option<MintInfo>>>,
    holders_cache: Arc<TtlCache<Option<HolderBreakdown>>>,
    holders_inflight: InflightRegistry<Option<HolderBreakdown>>,
    mint_inflight: InflightRegistry<Option<MintInfo>>,
}

impl RpcClient {
    pub fn new(config: &RpcConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::Config("rpc.api_key is not set".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Provider(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            rpc_url: format!("{}/?api-key={}", config.endpoint.trim_end_matches('/'), config.api_key),
            limiter: RateLimiter::per_second("rpc", config.max_requests_per_second),
            mint_cache: Arc::new(TtlCache::new("rpc.mint_info", 1_000)),
            holders_cache: Arc::new(TtlCache::new("rpc.holders", 500)),
            holders_inflight: InflightRegistry::new(),
            mint_inflight: InflightRegistry::new(),
        })
    }

    /// Mint authorities, supply and decimals (5-minute cache)
    pub async fn get_token_mint_info(&self, mint: &str) -> Option<MintInfo> {
        if let Some(cached) = self.mint_cache.get(mint) {
            return cached;
        }

        let mint_owned = mint.to_string();
        self.mint_inflight
            .get_or_start(mint, || async move {
                let result = self.fetch_mint_info(&mint_owned).await;
                let ttl = if result.is_some() {
                    MINT_INFO_TTL
                } else {
                    // Negative result: shorter TTL so a late-indexed mint shows up
                    Duration::from_secs(30)
                };
                self.mint_cache.put(&mint_owned, result.clone(), ttl);
                result
            })
            .await
    }

    /// Holder breakdown from the token-accounts index (60-second cache).
    /// The total is pagination-capped; callers must treat it as a floor.
    pub async fn get_token_holders(&self, mint: &str) -> Option<HolderBreakdown> {
        if let Some(cached) = self.holders_cache.get(mint) {
            return cached;
        }

        let mint_owned = mint.to_string();
        self.holders_inflight
            .get_or_start(mint, || async move {
                let result = self.fetch_holders(&mint_owned).await;
                let ttl = if result.is_some() {
                    HOLDERS_TTL
                } else {
                    Duration::from_secs(15)
                };
                self.holders_cache.put(&mint_owned, result.clone(), ttl);
                result
            })
            .await
    }

    /// Recent confirmed signatures for an address (no cache)
    pub async fn get_recent_signatures(&self, address: &str, limit: u32) -> Vec<SignatureInfo> {
        let params = json!([address, { "limit": limit }]);
        match self
            .call::<Vec<SignatureRow>>("getSignaturesForAddress", params)
            .await
        {
            Ok(rows) => rows
                .into_iter()
                .map(|r| SignatureInfo {
                    signature: r.signature,
                    slot: r.slot,
                    block_time: r.block_time,
                    err: r.err.is_some(),
                })
                .collect(),
            Err(e) => {
                debug!(address = %address, error = %e, "signature fetch failed");
                Vec::new()
            }
        }
    }

    /// Fetch a single transaction by signature
    pub async fn get_transaction(&self, signature: &str) -> Option<TransactionDetail> {
        let params = json!([
            signature,
            { "encoding": "jsonParsed", "maxSupportedTransactionVersion": 0 }
        ]);
        match self.call::<TransactionEnvelope>("getTransaction", params).await {
            Ok(envelope) => {
                let keys: Vec<String> = envelope
                    .transaction
                    .message
                    .account_keys
                    .into_iter()
                    .map(|k| k.pubkey)
                    .collect();
                Some(TransactionDetail {
                    signature: signature.to_string(),
                    slot: envelope.slot,
                    block_time: envelope.block_time,
                    fee_payer: keys.first().cloned(),
                    account_keys: keys,
                })
            }
            Err(e) => {
                debug!(signature = %signature, error = %e, "transaction fetch failed");
                None
            }
        }
    }

    /// Oldest signature touching the mint: its creation transaction
    pub async fn get_token_creation(&self, mint: &str) -> Option<CreationInfo> {
        // The oldest page of signatures ends with the creation transaction
        let params = json!([mint, { "limit": 1_000 }]);
        match self
            .call::<Vec<SignatureRow>>("getSignaturesForAddress", params)
            .await
        {
            Ok(rows) => rows.into_iter().last().map(|r| CreationInfo {
                signature: r.signature,
                block_time: r.block_time,
                slot: r.slot,
            }),
            Err(e) => {
                debug!(mint = %mint, error = %e, "creation signature fetch failed");
                None
            }
        }
    }

    /// Reclaim expired cache entries; driven by the maintenance task
    pub fn sweep_caches(&self) -> usize {
        self.mint_cache.sweep() + self.holders_cache.sweep()
    }

    /// Aggregate (hits, misses) across this client's caches
    pub fn cache_stats(&self) -> (u64, u64) {
        let (h1, m1) = self.mint_cache.stats();
        let (h2, m2) = self.holders_cache.stats();
        (h1 + h2, m1 + m2)
    }

    async fn fetch_mint_info(&self, mint: &str) -> Option<MintInfo> {
        let params = json!([mint, { "encoding": "jsonParsed" }]);
        match self.call::<AccountInfoResult>("getAccountInfo", params).await {
            Ok(result) => {
                let info = result.value?.data.parsed?.info?;
                Some(MintInfo {
                    mint_authority: info.mint_authority,
                    freeze_authority: info.freeze_authority,
                    decimals: info.decimals,
                    supply: info.supply.parse().unwrap_or(0),
                    is_initialized: info.is_initialized.unwrap_or(true),
                })
            }
            Err(e) => {
                debug!(mint = %mint, error = %e, "mint info fetch failed");
                None
            }
        }
    }

    async fn fetch_holders(&self, mint: &str) -> Option<HolderBreakdown> {
        let params = json!({
            "page": 1,
            "limit": HOLDER_PAGE_LIMIT,
            "mint": mint,
            "options": { "showZeroBalance": false }
        });
        match self.call::<TokenAccountsResult>("getTokenAccounts", params).await {
            Ok(result) => {
                let mut holders: Vec<HolderInfo> = result
                    .token_accounts
                    .into_iter()
                    .map(|a| HolderInfo {
                        owner: a.owner,
                        amount: a.amount,
                        percentage: 0.0,
                    })
                    .collect();

                let visible: u64 = holders.iter().map(|h| h.amount).sum();
                if visible > 0 {
                    for h in &mut holders {
                        h.percentage = h.amount as f64 / visible as f64 * 100.0;
                    }
                }
                holders.sort_by(|a, b| b.amount.cmp(&a.amount));
                holders.truncate(20);

                // When the page is full the index held more accounts than we
                // saw; `total` is then a floor, not the true count.
                let total = result.total.max(holders.len() as u64);

                Some(HolderBreakdown {
                    total,
                    top_holders: holders,
                })
            }
            Err(e) => {
                debug!(mint = %mint, error = %e, "holder fetch failed");
                None
            }
        }
    }

    /// Issue one JSON-RPC call. A 429 backs off 2s and re-queues once.
    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        let mut requeued = false;
        loop {
            self.limiter.acquire().await;

            let body = json!({
                "jsonrpc": "2.0",
                "id": "memescout",
                "method": method,
                "params": params.clone(),
            });

            let response = self.client.post(&self.rpc_url).json(&body).send().await?;

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.limiter.report_rejection().await;
                self.limiter.cooldown_for(REJECTION_COOLDOWN).await;
                if requeued {
                    return Err(Error::RateLimited(format!("rpc {}", method)));
                }
                requeued = true;
                continue;
            }

            if !response.status().is_success() {
                let status = response.status();
                return Err(Error::Provider(format!("rpc {} returned {}", method, status)));
            }

            let rpc: RpcResponse<T> = response
                .json()
                .await
                .map_err(|e| Error::Serialization(format!("rpc {}: {}", method, e)))?;

            if let Some(err) = rpc.error {
                return Err(Error::Provider(format!("rpc {}: {}", method, err.message)));
            }

            self.limiter.report_success().await;
            return rpc
                .result
                .ok_or_else(|| Error::Schema(format!("rpc {}: empty result", method)));
        }
    }
}

// ============ RPC response DTOs ============

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SignatureRow {
    signature: String,
    slot: u64,
    #[serde(rename = "blockTime")]
    block_time: Option<i64>,
    err: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct AccountInfoResult {
    value: Option<AccountValue>,
}

#[derive(Debug, Deserialize)]
struct AccountValue {
    data: AccountData,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    parsed: Option<ParsedData>,
}

#[derive(Debug, Deserialize)]
struct ParsedData {
    info: Option<MintInfoData>,
}

#[derive(Debug, Deserialize)]
struct MintInfoData {
    decimals: u8,
    #[serde(rename = "freezeAuthority")]
    freeze_authority: Option<String>,
    #[serde(rename = "mintAuthority")]
    mint_authority: Option<String>,
    supply: String,
    #[serde(rename = "isInitialized")]
    is_initialized: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct TokenAccountsResult {
    total: u64,
    #[serde(rename = "token_accounts")]
    token_accounts: Vec<TokenAccount>,
}

#[derive(Debug, Deserialize)]
struct TokenAccount {
    owner: String,
    amount: u64,
}

#[derive(Debug, Deserialize)]
struct TransactionEnvelope {
    slot: u64,
    #[serde(rename = "blockTime")]
    block_time: Option<i64>,
    transaction: TransactionBody,
}

#[derive(Debug, Deserialize)]
struct TransactionBody {
    message: TransactionMessage,
}

#[derive(Debug, Deserialize)]
struct TransactionMessage {
    #[serde(rename = "accountKeys")]
    account_keys: Vec<AccountKey>,
}

#[derive(Debug, Deserialize)]
struct AccountKey {
    pubkey: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RpcConfig;

    fn test_config() -> RpcConfig {
        RpcConfig {
            api_key: "test-key".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let config = RpcConfig::default();
        assert!(RpcClient::new(&config).is_err());
    }

    #[test]
    fn test_api_key_travels_in_url() {
        let client = RpcClient::new(&test_config()).unwrap();
        assert!(client.rpc_url.contains("api-key=test-key"));
    }

    #[test]
    fn test_mint_info_renounced() {
        let renounced = MintInfo {
            mint_authority: None,
            freeze_authority: None,
            decimals: 6,
            supply: 1_000_000,
            is_initialized: true,
        };
        assert!(renounced.is_fully_renounced());

        let live = MintInfo {
            mint_authority: Some("auth".to_string()),
            ..renounced
        };
        assert!(!live.is_fully_renounced());
    }

    #[test]
    fn test_signature_row_parses_block_time() {
        let json = r#"{"signature":"abc","slot":123,"blockTime":1700000000,"err":null}"#;
        let row: SignatureRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.block_time, Some(1_700_000_000));
        assert!(row.err.is_none());
    }

    #[test]
    fn test_token_accounts_result_parses() {
        let json = r#"{"total":42,"limit":1000,"token_accounts":[{"address":"x","mint":"m","owner":"o","amount":10,"frozen":false}]}"#;
        let parsed: TokenAccountsResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.total, 42);
        assert_eq!(parsed.token_accounts[0].owner, "o");
    }
}
