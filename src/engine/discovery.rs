//! Short-lived registry of observed-but-not-yet-signalled tokens
//!
//! Tokens that scored but missed the final gates are remembered for a day.
//! If the broader system later validates one (e.g. a KOL signal), the
//! pipeline can tell it has seen the token before.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// How long an observation is retained
const EXPIRY_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct DiscoveryEntry {
    pub address: String,
    pub first_seen_at: DateTime<Utc>,
    pub last_score: f64,
}

/// Keyed set of recent observations, swept every scan cycle
pub struct DiscoveryTracker {
    entries: DashMap<String, DiscoveryEntry>,
}

impl DiscoveryTracker {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Record an observation, keeping the original first-seen time
    pub fn observe(&self, address: &str, score: f64) {
        self.entries
            .entry(address.to_string())
            .and_modify(|e| e.last_score = score)
            .or_insert_with(|| DiscoveryEntry {
                address: address.to_string(),
                first_seen_at: Utc::now(),
                last_score: score,
            });
    }

    pub fn seen(&self, address: &str) -> bool {
        self.entries.contains_key(address)
    }

    pub fn get(&self, address: &str) -> Option<DiscoveryEntry> {
        self.entries.get(address).map(|e| e.clone())
    }

    /// Drop entries older than the expiry window
    pub fn sweep(&self) -> usize {
        let cutoff = Utc::now() - Duration::hours(EXPIRY_HOURS);
        let before = self.entries.len();
        self.entries.retain(|_, e| e.first_seen_at >= cutoff);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DiscoveryTracker {
    fn default() -> Self {
        Self::new()
    }
}
