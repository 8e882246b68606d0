//! Exclusion filter for tokens that are not memecoin candidates
//!
//! Stablecoins, wrapped/bridged assets, LP and staking derivatives and
//! protocol tokens are rejected by a static address blocklist plus a small
//! set of precompiled case-insensitive name patterns. A price pinned near
//! $1 combined with stable-sounding naming is also treated as a stablecoin.

use lazy_static::lazy_static;
use regex::Regex;

/// Why a token was excluded
#[derive(Debug, Clone, PartialEq)]
pub enum ExclusionReason {
    /// Address is on the static blocklist
    BlockedAddress(&'static str),
    /// Name or ticker matched an exclusion pattern
    PatternMatch(String),
    /// Price pinned near $1 with stable-sounding naming
    StablecoinPricePin,
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusionReason::BlockedAddress(label) => write!(f, "blocklisted address ({})", label),
            ExclusionReason::PatternMatch(pattern) => write!(f, "matched pattern {}", pattern),
            ExclusionReason::StablecoinPricePin => write!(f, "price pinned near $1 with stable naming"),
        }
    }
}

/// Known non-candidate addresses: stables, wrapped SOL, staking derivatives
/// and protocol tokens.
const BLOCKED_ADDRESSES: &[(&str, &str)] = &[
    ("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "USDC"),
    ("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", "USDT"),
    ("So11111111111111111111111111111111111111112", "wSOL"),
    ("mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So", "mSOL"),
    ("J1toso1uCk3RLmjorhTtrVwY9HJ7X8V9yYac6Y7kGCPn", "jitoSOL"),
    ("7dHbWXmci3dT8UFYWYZweBLXgycu7Y3iL6trKn1Y7ARj", "stSOL"),
    ("bSo13r4TkiE4KumL71LsHTPpL2euBYLFx6h9HP3piy1", "bSOL"),
    ("JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN", "JUP"),
    ("4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R", "RAY"),
    ("orcaEKTdK7LKz57vaAYr9QeNsVEPfiu6QeMU1kektZE", "ORCA"),
];

lazy_static! {
    /// Case-insensitive patterns over name and ticker
    static ref EXCLUSION_PATTERNS: Vec<Regex> = vec![
        // Stablecoins by name shape
        Regex::new(r"(?i)usd$").unwrap(),
        Regex::new(r"(?i)^(usdt|usdc|busd|dai|frax|tusd|usdd|gusd|lusd|usde|pyusd)$").unwrap(),
        // Wrapped / bridged assets
        Regex::new(r"(?i)^w(btc|eth|sol|bnb|avax|matic)\b").unwrap(),
        Regex::new(r"(?i)^(wrapped|bridged)\b").unwrap(),
        // LP and staking derivative shapes
        Regex::new(r"(?i)-lp-").unwrap(),
        Regex::new(r"/").unwrap(),
        Regex::new(r"(?i)^(m|jito|st|b)sol$").unwrap(),
        // Protocol tokens
        Regex::new(r"(?i)^(raydium|orca|jupiter|serum|marinade|drift|kamino)\b").unwrap(),
    ];

    static ref STABLE_NAME_HINT: Regex = Regex::new(r"(?i)(usd|stable|peg|dollar)").unwrap();
}

/// Static exclusion filter; precompiled, process-wide
pub struct ExclusionFilter;

impl ExclusionFilter {
    /// Check a token against the blocklist and patterns. `None` means the
    /// token is a valid candidate.
    pub fn check(address: &str, name: &str, ticker: &str, price: f64) -> Option<ExclusionReason> {
        for (blocked, label) in BLOCKED_ADDRESSES {
            if address == *blocked {
                return Some(ExclusionReason::BlockedAddress(label));
            }
        }

        for pattern in EXCLUSION_PATTERNS.iter() {
            if pattern.is_match(name) || pattern.is_match(ticker) {
                return Some(ExclusionReason::PatternMatch(pattern.to_string()));
            }
        }

        // Dollar-pegged price with stable-sounding naming
        if (0.95..=1.05).contains(&price) {
            let combined = format!("{} {}", name, ticker);
            if STABLE_NAME_HINT.is_match(&combined) {
                return Some(ExclusionReason::StablecoinPricePin);
            }
        }

        None
    }
}
