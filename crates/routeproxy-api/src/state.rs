use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use routeproxy_cache::{CacheConfig, FixedWindowLimiter, RateLimitConfig, SuggestionCache};
use routeproxy_core::clock::{Clock, SystemClock};
use routeproxy_core::config::ProxySettings;
use routeproxy_core::ports::MapProvider;

/// Interval between sweeps of expired cache entries and rate-limit windows
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared state handed to every handler
///
/// The suggestion cache and the rate-limit counters are the only mutable
/// state; both are owned here rather than living in globals.
pub struct AppState {
    pub provider: Arc<dyn MapProvider>,
    pub cache: SuggestionCache,
    pub rate_limiter: FixedWindowLimiter<IpAddr>,
    pub settings: ProxySettings,
}

impl AppState {
    pub fn new(provider: Arc<dyn MapProvider>, settings: ProxySettings) -> Self {
        Self::with_clock(provider, settings, Arc::new(SystemClock))
    }

    /// Build state whose cache and limiter read time from `clock`
    pub fn with_clock(
        provider: Arc<dyn MapProvider>,
        settings: ProxySettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = SuggestionCache::with_clock(
            CacheConfig {
                max_entries: settings.cache_max_entries,
                ttl_seconds: settings.cache_ttl.as_secs(),
            },
            clock.clone(),
        );

        let rate_limiter = FixedWindowLimiter::with_clock(
            RateLimitConfig {
                max_requests: settings.rate_limit_max,
                window: settings.rate_limit_window,
            },
            clock,
        );

        Self {
            provider,
            cache,
            rate_limiter,
            settings,
        }
    }

    /// Drop expired cache entries and elapsed rate-limit windows
    pub fn sweep(&self) {
        let entries = self.cache.purge_expired();
        let windows = self.rate_limiter.purge_expired();
        if entries > 0 || windows > 0 {
            let stats = self.cache.stats();
            tracing::debug!(
                expired_entries = entries,
                expired_windows = windows,
                cached = stats.valid_entries,
                capacity = stats.capacity,
                "Swept expired state"
            );
        }
    }
}

/// Run [`AppState::sweep`] periodically for the lifetime of the process
pub fn spawn_sweeper(state: Arc<AppState>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            state.sweep();
        }
    })
}
