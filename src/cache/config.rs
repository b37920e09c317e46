//! Cache lifetimes derived from settings.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::config::Settings;
use crate::domain::types::ContentKind;

const DEFAULT_CONTENT_TTL: Duration = Duration::from_secs(300);
const DEFAULT_REVALIDATE_INTERVAL: Duration = Duration::from_secs(3600);
const DEFAULT_RESPONSE_LIMIT: usize = 256;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL of every per-kind configuration store.
    pub content_ttl: Duration,
    /// Lifetime of a cached public response when the kind has no override.
    pub revalidate_interval: Duration,
    pub revalidate_overrides: HashMap<ContentKind, Duration>,
    /// Capacity of the public response cache.
    pub response_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            content_ttl: DEFAULT_CONTENT_TTL,
            revalidate_interval: DEFAULT_REVALIDATE_INTERVAL,
            revalidate_overrides: HashMap::new(),
            response_limit: DEFAULT_RESPONSE_LIMIT,
        }
    }
}

impl From<&Settings> for CacheConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            content_ttl: settings.content.cache_ttl,
            revalidate_interval: settings.revalidation.interval,
            revalidate_overrides: settings.revalidation.intervals.clone(),
            response_limit: settings.cache.response_limit,
        }
    }
}

impl CacheConfig {
    /// Response lifetime for `kind`.
    pub fn response_ttl(&self, kind: ContentKind) -> Duration {
        self.revalidate_overrides
            .get(&kind)
            .copied()
            .unwrap_or(self.revalidate_interval)
    }

    pub fn response_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.response_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
