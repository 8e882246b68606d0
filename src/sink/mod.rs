//! Outbound collaborators: the notification sink and the outcome store
//!
//! The core only knows these traits. Delivery channels and persistence
//! backends live outside; the in-process implementations here exist for
//! default wiring and tests. Both are treated as thread-safe collaborators.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::engine::thresholds::Thresholds;
use crate::error::{Error, Result};
use crate::market::types::Signal;

/// Accepts a formatted signal payload. Human-readable rendering is the
/// notifier's concern; the core provides the fields.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, signal: &Signal) -> Result<()>;
}

/// Outcome attached to a signal by an out-of-core component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalOutcome {
    pub win: bool,
    pub pnl_percent: f64,
    pub recorded_at: DateTime<Utc>,
}

/// One signal joined with its outcome, flattened to the factor values the
/// threshold optimizer correlates against
#[derive(Debug, Clone)]
pub struct OutcomeRow {
    pub signal_id: String,
    pub momentum_score: f64,
    pub onchain_score: f64,
    pub safety_score: f64,
    pub bundle_risk_score: f64,
    pub liquidity: f64,
    pub top10_concentration: f64,
    pub win: bool,
}

/// Persistent store of signals, outcomes and thresholds
#[async_trait]
pub trait SignalStore: Send + Sync {
    async fn has_open_position(&self, address: &str) -> Result<bool>;
    /// Returns the stored signal id
    async fn record_signal(&self, signal: &Signal) -> Result<String>;
    async fn record_outcome(&self, signal_id: &str, outcome: SignalOutcome) -> Result<()>;
    /// Signals with outcomes recorded inside the window, for optimization
    async fn recent_signals_with_outcomes(&self, window: Duration) -> Result<Vec<OutcomeRow>>;
    async fn load_thresholds(&self) -> Result<Option<Thresholds>>;
    async fn persist_thresholds(&self, thresholds: &Thresholds) -> Result<()>;
}

/// Notifier that renders signals to the structured log
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, signal: &Signal) -> Result<()> {
        info!(
            id = %signal.id,
            track = ?signal.track,
            ticker = %signal.token_metrics.ticker,
            mint = %signal.token_metrics.address,
            score = signal.on_chain_score.total,
            adjusted = signal.adjusted_total,
            size = signal.suggested_position_size,
            "signal published"
        );
        Ok(())
    }
}

struct StoredSignal {
    signal: Signal,
    outcome: Option<SignalOutcome>,
}

/// In-memory store for default wiring and tests
pub struct MemorySignalStore {
    signals: DashMap<String, StoredSignal>,
    open_positions: DashMap<String, ()>,
    thresholds: RwLock<Option<Thresholds>>,
}

impl MemorySignalStore {
    pub fn new() -> Self {
        Self {
            signals: DashMap::new(),
            open_positions: DashMap::new(),
            thresholds: RwLock::new(None),
        }
    }

    /// Mark a token as holding an open position (test hook)
    pub fn set_open_position(&self, address: &str) {
        self.open_positions.insert(address.to_string(), ());
    }

    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }
}

impl Default for MemorySignalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalStore for MemorySignalStore {
    async fn has_open_position(&self, address: &str) -> Result<bool> {
        Ok(self.open_positions.contains_key(address))
    }

    async fn record_signal(&self, signal: &Signal) -> Result<String> {
        self.signals.insert(
            signal.id.clone(),
            StoredSignal {
                signal: signal.clone(),
                outcome: None,
            },
        );
        Ok(signal.id.clone())
    }

    async fn record_outcome(&self, signal_id: &str, outcome: SignalOutcome) -> Result<()> {
        let mut entry = self
            .signals
            .get_mut(signal_id)
            .ok_or_else(|| Error::Store(format!("unknown signal id {}", signal_id)))?;
        entry.outcome = Some(outcome);
        Ok(())
    }

    async fn recent_signals_with_outcomes(&self, window: Duration) -> Result<Vec<OutcomeRow>> {
        let cutoff = Utc::now() - window;
        let rows = self
            .signals
            .iter()
            .filter_map(|entry| {
                let outcome = entry.outcome.as_ref()?;
                if outcome.recorded_at < cutoff {
                    return None;
                }
                let s = &entry.signal;
                Some(OutcomeRow {
                    signal_id: s.id.clone(),
                    momentum_score: s.momentum.total_score,
                    onchain_score: s.on_chain_score.total,
                    safety_score: s.safety.safety_score as f64,
                    bundle_risk_score: s.bundle.risk_score as f64,
                    liquidity: s.token_metrics.liquidity,
                    top10_concentration: s.token_metrics.top10_concentration,
                    win: outcome.win,
                })
            })
            .collect();
        Ok(rows)
    }

    async fn load_thresholds(&self) -> Result<Option<Thresholds>> {
        Ok(self.thresholds.read().await.clone())
    }

    async fn persist_thresholds(&self, thresholds: &Thresholds) -> Result<()> {
        *self.thresholds.write().await = Some(thresholds.clone());
        Ok(())
    }
}
