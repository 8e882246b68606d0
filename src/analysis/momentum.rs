//! Market-activity momentum scoring
//!
//! Four components, 25 points each: buy pressure, volume velocity, trade
//! quality and holder growth. The composite scorer consumes the total and
//! the per-track gates consume the derived holder growth rate.

use crate::market::types::{MomentumComponents, MomentumSnapshot, TokenMetrics};
use crate::providers::dexscreener::{DexPair, TxnWindow};

/// Momentum analyzer over aggregator pair data
pub struct MomentumAnalyzer;

impl MomentumAnalyzer {
    pub fn analyze(pair: &DexPair, metrics: &TokenMetrics) -> MomentumSnapshot {
        let (buys_h1, sells_h1) = pair.txn_counts(TxnWindow::H1);
        let (buys_m5, sells_m5) = pair.txn_counts(TxnWindow::M5);
        let (buys_h24, sells_h24) = pair.txn_counts(TxnWindow::H24);

        let buy_sell_ratio = if sells_h1 > 0 {
            buys_h1 as f64 / sells_h1 as f64
        } else {
            buys_h1 as f64
        };

        let buy_pressure = Self::buy_pressure_score(buys_h1, sells_h1, buys_m5, sells_m5);
        let volume_velocity = Self::volume_velocity_score(pair.volume_h1(), pair.volume_h24());
        let trade_quality =
            Self::trade_quality_score(pair.volume_h24(), buys_h24 + sells_h24, buys_m5);
        let holder_growth = Self::holder_growth_score(metrics.holder_change_1h);

        let components = MomentumComponents {
            buy_pressure,
            volume_velocity,
            trade_quality,
            holder_growth,
        };
        let total_score =
            (buy_pressure + volume_velocity + trade_quality + holder_growth).clamp(0.0, 100.0);

        let h1_trades = buys_h1 + sells_h1;
        let net_buy_pressure_usd = if h1_trades > 0 {
            pair.volume_h1() * (buys_h1 as f64 - sells_h1 as f64) / h1_trades as f64
        } else {
            0.0
        };

        // Holders gained per minute implied by the 1h change
        let holder_growth_rate =
            metrics.holder_count as f64 * (metrics.holder_change_1h / 100.0) / 60.0;

        MomentumSnapshot {
            buy_sell_ratio,
            unique_buyers_5m: buys_m5,
            net_buy_pressure_usd,
            holder_growth_rate,
            components,
            total_score,
        }
    }

    /// Buys outweighing sells in both the 5m and 1h windows
    fn buy_pressure_score(buys_h1: u32, sells_h1: u32, buys_m5: u32, sells_m5: u32) -> f64 {
        let h1_ratio = buys_h1 as f64 / sells_h1.max(1) as f64;
        let m5_ratio = buys_m5 as f64 / sells_m5.max(1) as f64;

        // 1:1 scores nothing, 2.5:1 maxes out; the 5m window gets less weight
        let h1_score = ((h1_ratio - 1.0) / 1.5 * 18.0).clamp(0.0, 18.0);
        let m5_score = ((m5_ratio - 1.0) / 1.5 * 7.0).clamp(0.0, 7.0);
        h1_score + m5_score
    }

    /// Hourly volume versus the daily average hour
    fn volume_velocity_score(volume_h1: f64, volume_h24: f64) -> f64 {
        if volume_h24 <= 0.0 {
            return 0.0;
        }
        let velocity = volume_h1 * 24.0 / volume_h24;
        // Steady flow (1x) is mid-score, a 3x acceleration maxes out
        (velocity / 3.0 * 25.0).clamp(0.0, 25.0)
    }

    /// Average trade size in a healthy band plus recent buyer count
    fn trade_quality_score(volume_h24: f64, trades_h24: u32, buys_m5: u32) -> f64 {
        let size_score = if trades_h24 == 0 {
            0.0
        } else {
            let avg = volume_h24 / trades_h24 as f64;
            // Dust trades and whale-only flow both score poorly
            if (50.0..=2_000.0).contains(&avg) {
                15.0
            } else if (10.0..50.0).contains(&avg) || (2_000.0..10_000.0).contains(&avg) {
                8.0
            } else {
                2.0
            }
        };
        let buyer_score = (buys_m5 as f64 / 3.0).min(10.0);
        size_score + buyer_score
    }

    fn holder_growth_score(holder_change_1h: f64) -> f64 {
        // +20%/h maxes out; shrinking holder sets score zero
        (holder_change_1h / 20.0 * 25.0).clamp(0.0, 25.0)
    }
}
