//! Storefront query cache.
//!
//! Caches catalog reads per query key, coalesces concurrent requests for the
//! same key into one, and supports stale-marking and eviction so mutations
//! can keep reads consistent.
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `storefront.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! product_limit = 500
//! list_limit = 50
//! # ttl_seconds = 300
//! ```

mod config;
mod keys;
pub(crate) mod lock;
mod query;
mod state;

pub use config::{CacheConfig, DEFAULT_LIST_LIMIT, DEFAULT_PRODUCT_LIMIT};
pub use keys::{ListKey, QueryFamily, QueryKey};
pub use query::{
    Fetch, METRIC_CACHE_COALESCED, METRIC_CACHE_EVICTED, METRIC_CACHE_HIT,
    METRIC_CACHE_INVALIDATED, METRIC_CACHE_MISS, QueryCache,
};
pub use state::QueryState;
