//! Coalesces concurrent identical requests into a single upstream call
//!
//! During a scan burst many code paths ask for the same token's holders or
//! security at once; only the first caller runs the producer, everyone else
//! awaits the same result. Entries are removed on completion either way, so
//! failures are never cached.

use std::future::Future;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;

/// Registry of in-progress requests keyed by an arbitrary string
pub struct InflightRegistry<R: Clone + Send + Sync + 'static> {
    pending: DashMap<String, watch::Receiver<Option<R>>>,
}

/// Removes the pending entry when the leader finishes or is cancelled, so
/// followers of a dead leader can elect a new one.
struct ClearOnDrop<'a, R: Clone + Send + Sync + 'static> {
    map: &'a DashMap<String, watch::Receiver<Option<R>>>,
    key: String,
}

impl<R: Clone + Send + Sync + 'static> Drop for ClearOnDrop<'_, R> {
    fn drop(&mut self) {
        self.map.remove(&self.key);
    }
}

impl<R: Clone + Send + Sync + 'static> InflightRegistry<R> {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
        }
    }

    /// Run `producer` for `key`, or await the result of the producer another
    /// caller has already started for the same key.
    pub async fn get_or_start<F, Fut>(&self, key: &str, producer: F) -> R
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
    {
        let mut producer = Some(producer);

        loop {
            // Follow an existing leader if one is registered
            let existing = self.pending.get(key).map(|r| r.value().clone());
            if let Some(rx) = existing {
                if let Some(result) = Self::follow(rx).await {
                    return result;
                }
                // Leader died without producing; try to take over
                continue;
            }

            // Try to become the leader
            let (tx, rx) = watch::channel(None);
            match self.pending.entry(key.to_string()) {
                Entry::Occupied(entry) => {
                    // Lost the race; follow the winner
                    let rx = entry.get().clone();
                    drop(entry);
                    if let Some(result) = Self::follow(rx).await {
                        return result;
                    }
                    continue;
                }
                Entry::Vacant(slot) => {
                    slot.insert(rx);
                }
            }

            let _guard = ClearOnDrop {
                map: &self.pending,
                key: key.to_string(),
            };

            let produce = producer.take().expect("producer consumed twice");
            let result = produce().await;
            let _ = tx.send(Some(result.clone()));
            return result;
        }
    }

    /// Number of requests currently in flight
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    async fn follow(mut rx: watch::Receiver<Option<R>>) -> Option<R> {
        loop {
            if let Some(value) = rx.borrow().clone() {
                return Some(value);
            }
            if rx.changed().await.is_err() {
                // Sender dropped without a value (leader cancelled)
                return None;
            }
        }
    }
}

impl<R: Clone + Send + Sync + 'static> Default for InflightRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}
