//! Rate limiter gating calls to upstream providers
//!
//! Two pacing modes: a sliding one-second window for the heavier providers
//! and a minimum-interval gate for the lighter ones. Both carry an additive
//! backoff that grows on 429-equivalent rejections and decays on success.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Maximum additive backoff after repeated rejections
const MAX_BACKOFF: Duration = Duration::from_millis(5_000);
/// Backoff applied on the first rejection
const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
/// Backoff below this decays to zero
const BACKOFF_FLOOR: Duration = Duration::from_millis(50);
/// Rate-limit hits are logged at most once per this interval
const HIT_LOG_INTERVAL: Duration = Duration::from_secs(60);

enum Mode {
    /// At most N acquires in any sliding one-second window
    PerSecond(u32),
    /// At least this much time between consecutive acquires
    MinInterval(Duration),
}

struct State {
    /// Completion instants of recent acquires (PerSecond mode only)
    recent: VecDeque<Instant>,
    /// Last acquire instant (MinInterval mode only)
    last_acquire: Option<Instant>,
    /// Additive penalty applied as a cooldown on rejection
    backoff: Duration,
    /// No acquire completes before this instant
    cooldown_until: Option<Instant>,
    /// Rejections since the last throttled log line
    hits_since_log: u64,
    last_hit_log: Option<Instant>,
}

/// Token-bucket / min-interval gate with exponential backoff on rejection
pub struct RateLimiter {
    name: String,
    mode: Mode,
    state: Mutex<State>,
}

impl RateLimiter {
    /// Sliding-window limiter: at most `max_per_second` acquires per second
    pub fn per_second(name: impl Into<String>, max_per_second: u32) -> Self {
        Self {
            name: name.into(),
            mode: Mode::PerSecond(max_per_second.max(1)),
            state: Mutex::new(State::new()),
        }
    }

    /// Min-interval limiter: at least `min_interval_ms` between acquires
    pub fn min_interval(name: impl Into<String>, min_interval_ms: u64) -> Self {
        Self {
            name: name.into(),
            mode: Mode::MinInterval(Duration::from_millis(min_interval_ms)),
            state: Mutex::new(State::new()),
        }
    }

    /// Block until the caller is permitted to proceed
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut s = self.state.lock().await;
                let now = Instant::now();

                let mut ready_at = now;
                if let Some(cooldown) = s.cooldown_until {
                    if cooldown > now {
                        ready_at = cooldown;
                    } else {
                        s.cooldown_until = None;
                    }
                }

                match self.mode {
                    Mode::PerSecond(limit) => {
                        let window = Duration::from_secs(1);
                        while let Some(&front) = s.recent.front() {
                            if now.duration_since(front) >= window {
                                s.recent.pop_front();
                            } else {
                                break;
                            }
                        }
                        if s.recent.len() >= limit as usize {
                            if let Some(&front) = s.recent.front() {
                                ready_at = ready_at.max(front + window);
                            }
                        }
                        if ready_at <= now {
                            s.recent.push_back(now);
                            return;
                        }
                    }
                    Mode::MinInterval(gap) => {
                        if let Some(last) = s.last_acquire {
                            ready_at = ready_at.max(last + gap);
                        }
                        if ready_at <= now {
                            s.last_acquire = Some(now);
                            return;
                        }
                    }
                }

                ready_at - now
            };

            tokio::time::sleep(wait).await;
        }
    }

    /// Report a 429-equivalent rejection: double the backoff (capped) and
    /// push the next permit out by it. Logging is throttled to once per
    /// minute with a hit counter.
    pub async fn report_rejection(&self) {
        let mut s = self.state.lock().await;
        let now = Instant::now();

        s.backoff = if s.backoff.is_zero() {
            INITIAL_BACKOFF
        } else {
            (s.backoff * 2).min(MAX_BACKOFF)
        };

        let until = now + s.backoff;
        s.cooldown_until = Some(s.cooldown_until.map_or(until, |c| c.max(until)));
        s.hits_since_log += 1;

        let should_log = s
            .last_hit_log
            .map_or(true, |t| now.duration_since(t) >= HIT_LOG_INTERVAL);
        if should_log {
            warn!(
                limiter = %self.name,
                hits = s.hits_since_log,
                backoff_ms = s.backoff.as_millis() as u64,
                "rate limit hit, backing off"
            );
            s.last_hit_log = Some(now);
            s.hits_since_log = 0;
        } else {
            debug!(limiter = %self.name, backoff_ms = s.backoff.as_millis() as u64, "rate limit hit");
        }
    }

    /// Report a successful upstream call: decay the backoff toward zero
    pub async fn report_success(&self) {
        let mut s = self.state.lock().await;
        s.backoff = s.backoff / 2;
        if s.backoff < BACKOFF_FLOOR {
            s.backoff = Duration::ZERO;
        }
    }

    /// Hold all acquires until `duration` from now has elapsed
    pub async fn cooldown_for(&self, duration: Duration) {
        let mut s = self.state.lock().await;
        let until = Instant::now() + duration;
        s.cooldown_until = Some(s.cooldown_until.map_or(until, |c| c.max(until)));
    }

    /// Current backoff (diagnostics)
    pub async fn current_backoff(&self) -> Duration {
        self.state.lock().await.backoff
    }
}

impl State {
    fn new() -> Self {
        Self {
            recent: VecDeque::new(),
            last_acquire: None,
            backoff: Duration::ZERO,
            cooldown_until: None,
            hits_since_log: 0,
            last_hit_log: None,
        }
    }
}
