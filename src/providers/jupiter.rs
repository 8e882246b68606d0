//! Token directory client
//!
//! Serves the verified-token list (long cache) and the recent-listing feed
//! consumed by the candidate scan. Responses are JSON arrays of token
//! records keyed by `id`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::DirectoryConfig;
use crate::error::{Error, Result};
use crate::net::{RateLimiter, TtlCache};

const VERIFIED_TTL: Duration = Duration::from_secs(600);

/// Token directory client (Provider D)
pub struct DirectoryClient {
    client: Client,
    base_url: String,
    limiter: RateLimiter,
    verified_cache: Arc<TtlCache<Vec<String>>>,
}

impl DirectoryClient {
    pub fn new(config: &DirectoryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Provider(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter: RateLimiter::min_interval("directory", config.min_interval_ms),
            verified_cache: Arc::new(TtlCache::new("directory.verified", 4)),
        })
    }

    /// Verified token addresses (10-minute cache)
    pub async fn get_verified_tokens(&self, limit: usize) -> Vec<String> {
        if let Some(cached) = self.verified_cache.get("verified") {
            return cached.into_iter().take(limit).collect();
        }

        let url = format!("{}/tokens/v2/tag?query=verified", self.base_url);
        let tokens = self.fetch_token_list(&url).await;
        if !tokens.is_empty() {
            self.verified_cache.put("verified", tokens.clone(), VERIFIED_TTL);
        }
        tokens.into_iter().take(limit).collect()
    }

    /// Recently listed token addresses (no cache; the feed churns)
    pub async fn get_recent_tokens(&self, limit: usize) -> Vec<String> {
        let url = format!("{}/tokens/v2/recent", self.base_url);
        let tokens = self.fetch_token_list(&url).await;
        tokens.into_iter().take(limit).collect()
    }

    /// Reclaim expired cache entries; driven by the maintenance task
    pub fn sweep_caches(&self) -> usize {
        self.verified_cache.sweep()
    }

    async fn fetch_token_list(&self, url: &str) -> Vec<String> {
        self.limiter.acquire().await;

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(url = %url, error = %e, "directory fetch failed");
                return Vec::new();
            }
        };

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            self.limiter.report_rejection().await;
            debug!(url = %url, "directory fetch rate limited");
            return Vec::new();
        }
        if !response.status().is_success() {
            debug!(url = %url, status = %response.status(), "directory fetch failed");
            return Vec::new();
        }

        match response.json::<Vec<TokenRecord>>().await {
            Ok(records) => {
                self.limiter.report_success().await;
                records.into_iter().map(|r| r.id).collect()
            }
            Err(e) => {
                debug!(url = %url, error = %e, "directory response parse failed");
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenRecord {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_record_parses_extra_fields() {
        let json = r#"[{"id": "mint1", "symbol": "AAA", "decimals": 6}, {"id": "mint2"}]"#;
        let records: Vec<TokenRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "mint1");
    }

    #[test]
    fn test_client_builds_with_defaults() {
        assert!(DirectoryClient::new(&DirectoryConfig::default()).is_ok());
    }
}
