//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub screening: ScreeningConfig,
    #[serde(default)]
    pub tiers: TierOverrides,
    #[serde(default)]
    pub sizing: SizingConfig,
}

/// Scan scheduler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Pacing of the scan scheduler in milliseconds
    #[serde(default = "default_scan_interval_ms")]
    pub scan_interval_ms: u64,
    /// When true several hard gates are relaxed to collect more outcome data
    #[serde(default = "default_true")]
    pub learning_mode: bool,
    /// How many candidates each feed source contributes per cycle
    #[serde(default = "default_candidates_per_source")]
    pub candidates_per_source: usize,
}

fn default_scan_interval_ms() -> u64 {
    20_000
}
fn default_candidates_per_source() -> usize {
    50
}
fn default_true() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: default_scan_interval_ms(),
            learning_mode: true,
            candidates_per_source: default_candidates_per_source(),
        }
    }
}

/// All provider client configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub dexscreener: DexScreenerConfig,
    #[serde(default)]
    pub holderscan: HolderScanConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
}

/// Chain RPC provider (authoritative on-chain data)
#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_endpoint")]
    pub endpoint: String,
    /// Conveyed as a URL query parameter. Empty key disables the provider.
    #[serde(default)]
    pub api_key: String,
    /// Short-circuits RPC-dependent steps to permissive defaults
    #[serde(default)]
    pub disabled: bool,
    #[serde(default = "default_rpc_max_rps")]
    pub max_requests_per_second: u32,
    #[serde(default = "default_rpc_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_rpc_endpoint() -> String {
    "https://mainnet.helius-rpc.com".to_string()
}
fn default_rpc_max_rps() -> u32 {
    5
}
fn default_rpc_timeout_secs() -> u64 {
    30
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: default_rpc_endpoint(),
            api_key: String::new(),
            disabled: false,
            max_requests_per_second: default_rpc_max_rps(),
            timeout_secs: default_rpc_timeout_secs(),
        }
    }
}

impl RpcConfig {
    /// Whether the client should be constructed at all
    pub fn enabled(&self) -> bool {
        !self.disabled && !self.api_key.is_empty()
    }
}

/// Market aggregator provider (free, rate-limited)
#[derive(Debug, Clone, Deserialize)]
pub struct DexScreenerConfig {
    #[serde(default = "default_dexscreener_base")]
    pub base_url: String,
    #[serde(default = "default_dexscreener_interval_ms")]
    pub min_interval_ms: u64,
    #[serde(default = "default_dexscreener_timeout_secs")]
    pub timeout_secs: u64,
    /// Chain filter applied client-side on `chainId`
    #[serde(default = "default_chain_id")]
    pub chain_id: String,
}

fn default_dexscreener_base() -> String {
    "https://api.dexscreener.com".to_string()
}
fn default_dexscreener_interval_ms() -> u64 {
    300
}
fn default_dexscreener_timeout_secs() -> u64 {
    10
}
fn default_chain_id() -> String {
    "solana".to_string()
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self {
            base_url: default_dexscreener_base(),
            min_interval_ms: default_dexscreener_interval_ms(),
            timeout_secs: default_dexscreener_timeout_secs(),
            chain_id: default_chain_id(),
        }
    }
}

/// Authoritative holder count provider (paid)
#[derive(Debug, Clone, Deserialize)]
pub struct HolderScanConfig {
    #[serde(default = "default_holderscan_base")]
    pub base_url: String,
    /// Conveyed in a `token:` header. Empty key disables the provider.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_holderscan_interval_ms")]
    pub min_interval_ms: u64,
    #[serde(default = "default_holderscan_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_holderscan_base() -> String {
    "https://api.holderscan.com".to_string()
}
fn default_holderscan_interval_ms() -> u64 {
    500
}
fn default_holderscan_timeout_secs() -> u64 {
    15
}

impl Default for HolderScanConfig {
    fn default() -> Self {
        Self {
            base_url: default_holderscan_base(),
            api_key: String::new(),
            min_interval_ms: default_holderscan_interval_ms(),
            timeout_secs: default_holderscan_timeout_secs(),
        }
    }
}

impl HolderScanConfig {
    pub fn enabled(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Token directory provider
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_directory_base")]
    pub base_url: String,
    #[serde(default = "default_directory_interval_ms")]
    pub min_interval_ms: u64,
    #[serde(default = "default_directory_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_directory_base() -> String {
    "https://lite-api.jup.ag".to_string()
}
fn default_directory_interval_ms() -> u64 {
    500
}
fn default_directory_timeout_secs() -> u64 {
    10
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_directory_base(),
            min_interval_ms: default_directory_interval_ms(),
            timeout_secs: default_directory_timeout_secs(),
            enabled: true,
        }
    }
}

/// Static screening bounds applied before scoring
#[derive(Debug, Clone, Deserialize)]
pub struct ScreeningConfig {
    #[serde(default = "default_min_market_cap")]
    pub min_market_cap: f64,
    #[serde(default = "default_max_market_cap")]
    pub max_market_cap: f64,
    #[serde(default = "default_min_volume_24h")]
    pub min_volume_24h: f64,
    #[serde(default = "default_min_volume_mcap_ratio")]
    pub min_volume_market_cap_ratio: f64,
    #[serde(default = "default_min_holder_count")]
    pub min_holder_count: u64,
    #[serde(default = "default_max_top10_concentration")]
    pub max_top10_concentration: f64,
    #[serde(default = "default_min_liquidity_pool")]
    pub min_liquidity_pool: f64,
    #[serde(default = "default_min_token_age_minutes")]
    pub min_token_age_minutes: f64,
}

fn default_min_market_cap() -> f64 {
    50_000.0
}
fn default_max_market_cap() -> f64 {
    150_000_000.0
}
fn default_min_volume_24h() -> f64 {
    5_000.0
}
fn default_min_volume_mcap_ratio() -> f64 {
    0.002
}
fn default_min_holder_count() -> u64 {
    25
}
fn default_max_top10_concentration() -> f64 {
    85.0
}
fn default_min_liquidity_pool() -> f64 {
    2_000.0
}
fn default_min_token_age_minutes() -> f64 {
    0.0
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            min_market_cap: default_min_market_cap(),
            max_market_cap: default_max_market_cap(),
            min_volume_24h: default_min_volume_24h(),
            min_volume_market_cap_ratio: default_min_volume_mcap_ratio(),
            min_holder_count: default_min_holder_count(),
            max_top10_concentration: default_max_top10_concentration(),
            min_liquidity_pool: default_min_liquidity_pool(),
            min_token_age_minutes: default_min_token_age_minutes(),
        }
    }
}

/// Optional per-tier overrides of the built-in tier table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TierOverrides {
    #[serde(default)]
    pub micro: Option<TierOverride>,
    #[serde(default)]
    pub rising: Option<TierOverride>,
    #[serde(default)]
    pub emerging: Option<TierOverride>,
    #[serde(default)]
    pub graduated: Option<TierOverride>,
    #[serde(default)]
    pub established: Option<TierOverride>,
}

/// A partial override; unset fields keep the built-in value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TierOverride {
    pub enabled: Option<bool>,
    pub min_liquidity: Option<f64>,
    pub min_safety_score: Option<u8>,
    pub position_multiplier: Option<f64>,
    pub max_position: Option<f64>,
}

/// Position sizing configuration (advisory; no trade is placed)
#[derive(Debug, Clone, Deserialize)]
pub struct SizingConfig {
    /// Base position size in the chain's base unit
    #[serde(default = "default_base_position")]
    pub base_position_size: f64,
}

fn default_base_position() -> f64 {
    0.5
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            base_position_size: default_base_position(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix MEMESCOUT_)
            .add_source(
                config::Environment::with_prefix("MEMESCOUT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.scan.scan_interval_ms < 1_000 {
            anyhow::bail!(
                "scan_interval_ms {} is below the 1000ms floor",
                self.scan.scan_interval_ms
            );
        }

        if self.providers.rpc.max_requests_per_second == 0 {
            anyhow::bail!("rpc.max_requests_per_second must be at least 1");
        }

        if self.screening.min_market_cap >= self.screening.max_market_cap {
            anyhow::bail!(
                "min_market_cap {} must be below max_market_cap {}",
                self.screening.min_market_cap,
                self.screening.max_market_cap
            );
        }

        if self.sizing.base_position_size <= 0.0 {
            anyhow::bail!("base_position_size must be positive");
        }

        Ok(())
    }

    /// Redacted summary for the `config` CLI command (secrets masked)
    pub fn masked_summary(&self) -> String {
        let mask = |key: &str| -> String {
            if key.is_empty() {
                "<unset>".to_string()
            } else if key.len() <= 8 {
                "****".to_string()
            } else {
                format!("{}****", &key[..4])
            }
        };

        format!(
            "scan_interval_ms={} learning_mode={} rpc={} (key={}) holderscan={} (key={}) \
             dexscreener={} directory={}",
            self.scan.scan_interval_ms,
            self.scan.learning_mode,
            if self.providers.rpc.enabled() { "on" } else { "off" },
            mask(&self.providers.rpc.api_key),
            if self.providers.holderscan.enabled() { "on" } else { "off" },
            mask(&self.providers.holderscan.api_key),
            self.providers.dexscreener.base_url,
            if self.providers.directory.enabled { "on" } else { "off" },
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            providers: ProvidersConfig::default(),
            screening: ScreeningConfig::default(),
            tiers: TierOverrides::default(),
            sizing: SizingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scan.scan_interval_ms, 20_000);
        assert!(config.scan.learning_mode);
        assert!(!config.providers.rpc.enabled()); // no key -> disabled
        assert_eq!(config.screening.min_liquidity_pool, 2_000.0);
    }

    #[test]
    fn test_validate_rejects_fast_scan() {
        let mut config = Config::default();
        config.scan.scan_interval_ms = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_mcap_bounds() {
        let mut config = Config::default();
        config.screening.min_market_cap = 1_000_000.0;
        config.screening.max_market_cap = 500_000.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_masked_summary_hides_keys() {
        let mut config = Config::default();
        config.providers.rpc.api_key = "super-secret-api-key".to_string();
        let summary = config.masked_summary();
        assert!(!summary.contains("super-secret-api-key"));
        assert!(summary.contains("supe****"));
    }
}
