//! routeproxy cache - In-process state owned by the proxy service
//!
//! Both structures are explicitly constructed and injected into the service
//! state; there are no process-wide singletons. Neither survives a restart.

pub mod rate_limit;
pub mod suggestions;

pub use rate_limit::{FixedWindowLimiter, RateLimitConfig, RateLimitDecision};
pub use suggestions::{CacheConfig, CacheStats, SuggestionCache};
