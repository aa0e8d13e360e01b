//! Query cache configuration.
//!
//! Built from the resolved [`CacheSettings`](crate::config::CacheSettings).

use std::num::NonZeroUsize;
use std::time::Duration;

pub const DEFAULT_PRODUCT_LIMIT: usize = 500;
pub const DEFAULT_LIST_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Serve reads from cache. When off, reads still coalesce but nothing is retained.
    pub enabled: bool,
    /// Maximum single products kept.
    pub product_limit: usize,
    /// Maximum listing pages kept.
    pub list_limit: usize,
    /// Age after which an entry refetches even without invalidation.
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            product_limit: DEFAULT_PRODUCT_LIMIT,
            list_limit: DEFAULT_LIST_LIMIT,
            ttl: None,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            product_limit: settings.product_limit,
            list_limit: settings.list_limit,
            ttl: settings.ttl,
        }
    }
}

impl CacheConfig {
    /// Returns the product limit as NonZeroUsize, clamping to 1 if zero.
    pub fn product_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.product_limit).unwrap_or(NonZeroUsize::MIN)
    }

    /// Returns the list limit as NonZeroUsize, clamping to 1 if zero.
    pub fn list_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.list_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
