//! Bundle / insider-risk detection from early-block transaction shape
//!
//! Coordinated launches leave a signature trail: a dense burst of
//! transactions in the creation block and tight same-slot clusters shortly
//! after. The detector scores that shape. Buyer identification is shallow:
//! `early_buyers` carries fee payers of a sample of early transactions, not
//! a full instruction parse, so `clustered_wallet_count` is a lower bound.

use crate::market::types::{BundleReport, RiskLevel};
use crate::providers::rpc::{CreationInfo, SignatureInfo};

use std::collections::{HashMap, HashSet};

pub const FLAG_DENSE_CREATION_BLOCK: &str = "dense_creation_block";
pub const FLAG_SAME_SLOT_CLUSTER: &str = "same_slot_cluster";
pub const FLAG_HIGH_FAILURE_RATE: &str = "high_failure_rate";
pub const FLAG_CLUSTERED_EARLY_BUYERS: &str = "clustered_early_buyers";

/// Slots after creation still counted as "early"
const EARLY_SLOT_WINDOW: u64 = 2;

/// Early-block clustering detector
pub struct BundleDetector;

impl BundleDetector {
    /// Score the early transaction shape of a token. `early_buyers` are fee
    /// payers sampled from early transactions (may be empty). `None`
    /// creation info yields the neutral unknown report.
    pub fn analyze(
        creation: Option<&CreationInfo>,
        recent: &[SignatureInfo],
        early_buyers: &[String],
    ) -> BundleReport {
        let creation = match creation {
            Some(c) => c,
            None => return BundleReport::unknown(),
        };

        if recent.is_empty() {
            return BundleReport::unknown();
        }

        let mut score: u32 = 10;
        let mut flags = Vec::new();

        // Transactions landing in the creation block or right after
        let early: Vec<&SignatureInfo> = recent
            .iter()
            .filter(|s| s.slot >= creation.slot && s.slot <= creation.slot + EARLY_SLOT_WINDOW)
            .collect();

        score += match early.len() {
            n if n >= 15 => {
                flags.push(FLAG_DENSE_CREATION_BLOCK.to_string());
                40
            }
            n if n >= 8 => {
                flags.push(FLAG_DENSE_CREATION_BLOCK.to_string());
                25
            }
            n if n >= 4 => 12,
            _ => 0,
        };

        // Largest same-slot cluster across the recent window
        let mut by_slot: HashMap<u64, u32> = HashMap::new();
        for sig in recent {
            *by_slot.entry(sig.slot).or_insert(0) += 1;
        }
        let max_cluster = by_slot.values().copied().max().unwrap_or(0);

        score += match max_cluster {
            n if n >= 10 => {
                flags.push(FLAG_SAME_SLOT_CLUSTER.to_string());
                30
            }
            n if n >= 5 => {
                flags.push(FLAG_SAME_SLOT_CLUSTER.to_string());
                15
            }
            n if n >= 3 => 8,
            _ => 0,
        };

        // Bot spam shows up as a high failed-transaction ratio
        let failed = recent.iter().filter(|s| s.err).count();
        let failure_ratio = failed as f64 / recent.len() as f64;
        if failure_ratio > 0.3 {
            flags.push(FLAG_HIGH_FAILURE_RATE.to_string());
            score += 10;
        }

        // Distinct sampled fee payers in the early window. A handful of
        // wallets landing together is the classic bundle shape.
        let distinct_buyers = early_buyers.iter().collect::<HashSet<_>>().len() as u32;
        if distinct_buyers >= 5 {
            flags.push(FLAG_CLUSTERED_EARLY_BUYERS.to_string());
            score += 10;
        }

        let risk_score = score.min(100) as u8;

        let clustered_wallet_count = if distinct_buyers > 0 {
            distinct_buyers
        } else if max_cluster >= 3 {
            max_cluster
        } else {
            0
        };

        BundleReport {
            risk_level: Self::level_for(risk_score),
            risk_score,
            clustered_wallet_count,
            has_rug_history: false,
            flags,
        }
    }

    fn level_for(score: u8) -> RiskLevel {
        match score {
            s if s >= 80 => RiskLevel::Critical,
            s if s >= 60 => RiskLevel::High,
            s if s >= 35 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}
