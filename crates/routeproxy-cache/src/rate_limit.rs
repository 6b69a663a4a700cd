//! Per-client fixed-window rate limiting.

use std::hash::Hash;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use routeproxy_core::clock::{Clock, SystemClock};

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window: Duration::from_secs(10),
        }
    }
}

/// Outcome of a single admission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Configured ceiling
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// Time until the current window closes
    pub reset_after: Duration,
}

impl RateLimitDecision {
    /// Seconds until reset, rounded up so clients never retry early
    pub fn reset_after_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        if self.reset_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started_at: Instant,
}

/// Fixed-window request counter keyed by client
///
/// Each key gets `max_requests` admissions per window; the window restarts
/// on the first request after it has elapsed. The per-key update happens
/// under the map shard lock, so concurrent requests from one client cannot
/// double-count.
pub struct FixedWindowLimiter<K = IpAddr>
where
    K: Eq + Hash + Clone,
{
    windows: DashMap<K, Window>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl<K> FixedWindowLimiter<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count a request from `key` and decide whether to admit it
    pub fn check(&self, key: &K) -> RateLimitDecision {
        let now = self.clock.now();
        let limit = self.config.max_requests;

        let mut window = self
            .windows
            .entry(key.clone())
            .or_insert(Window {
                count: 0,
                started_at: now,
            });

        if now.duration_since(window.started_at) >= self.config.window {
            window.count = 0;
            window.started_at = now;
        }

        window.count = window.count.saturating_add(1);

        let elapsed = now.duration_since(window.started_at);
        let reset_after = self.config.window.saturating_sub(elapsed);

        RateLimitDecision {
            allowed: window.count <= limit,
            limit,
            remaining: limit.saturating_sub(window.count),
            reset_after,
        }
    }

    /// Drop windows that have fully elapsed, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.windows.len();
        self.windows.retain(|_, w| now.duration_since(w.started_at) < self.config.window);
        before.saturating_sub(self.windows.len())
    }

    /// Number of tracked clients
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }
}
