//! Shared acquisition plumbing for provider clients
//!
//! Every provider client wraps the same three pieces: a rate limiter gating
//! upstream calls, a TTL cache in front of them, and an inflight registry
//! coalescing concurrent identical requests.

pub mod inflight;
pub mod rate_limit;
pub mod ttl_cache;

pub use inflight::InflightRegistry;
pub use rate_limit::RateLimiter;
pub use ttl_cache::TtlCache;
