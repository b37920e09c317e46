//! Cache-or-fetch resolution of one content kind.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use metrics::counter;
use tracing::{debug, instrument, warn};

use crate::{
    cache::CacheStore,
    domain::{content::ContentSchema, types::Locale},
    infra::fetch::{ContentFetcher, FetchError},
};

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Cached,
    Fetched,
    /// The default configuration, served because resolution failed.
    Fallback,
}

/// Resolves configurations of kind `T::KIND`.
///
/// Callers only ever receive a complete value: every failure, including an
/// unusable locale, resolves to `T::default_config()` and is logged. Failures
/// are never cached, so the next call goes back to the network.
pub struct ConfigService<T: ContentSchema> {
    fetcher: Arc<dyn ContentFetcher>,
    cache: CacheStore<T>,
    _schema: PhantomData<fn() -> T>,
}

impl<T: ContentSchema> ConfigService<T> {
    pub fn new(fetcher: Arc<dyn ContentFetcher>, ttl: Duration) -> Self {
        Self {
            fetcher,
            cache: CacheStore::new(ttl),
            _schema: PhantomData,
        }
    }

    pub fn cache(&self) -> &CacheStore<T> {
        &self.cache
    }

    /// Cached value within TTL, otherwise fetch, validate and store.
    pub async fn get(&self, locale: &str) -> T {
        match self.parse_locale(locale) {
            Some(locale) => self.get_locale(&locale).await,
            None => T::default_config(),
        }
    }

    pub async fn get_locale(&self, locale: &Locale) -> T {
        self.resolve(locale).await.0
    }

    /// Like [`ConfigService::get_locale`], also reporting where the value
    /// came from.
    pub async fn resolve(&self, locale: &Locale) -> (T, Resolution) {
        if let Some(value) = self.cache.get(locale) {
            counter!("atrium_content_cache_hit_total", "kind" => T::KIND.as_str()).increment(1);
            debug!(kind = %T::KIND, locale = %locale, outcome = "hit", "content cache");
            return (value, Resolution::Cached);
        }

        counter!("atrium_content_cache_miss_total", "kind" => T::KIND.as_str()).increment(1);
        debug!(kind = %T::KIND, locale = %locale, outcome = "miss", "content cache");
        self.resolve_or_default(locale).await
    }

    /// Drop the cached value for `locale` and resolve it again, ignoring TTL.
    pub async fn refresh(&self, locale: &str) -> T {
        let Some(locale) = self.parse_locale(locale) else {
            return T::default_config();
        };

        self.cache.clear(Some(&locale));
        self.resolve_or_default(&locale).await.0
    }

    /// Evict one locale, or every locale when `locale` is `None`. An
    /// unparseable locale cannot have an entry, so nothing is evicted.
    pub fn clear_cache(&self, locale: Option<&str>) {
        match locale {
            None => self.cache.clear(None),
            Some(code) => match Locale::parse(code) {
                Ok(locale) => self.cache.clear(Some(&locale)),
                Err(err) => debug!(kind = %T::KIND, error = %err, "nothing to clear"),
            },
        }
    }

    /// Warm every locale concurrently. One locale failing does not affect the
    /// others; only successful resolutions end up cached.
    #[instrument(skip_all, fields(kind = %T::KIND, locales = locales.len()))]
    pub async fn prefetch(&self, locales: &[Locale]) {
        join_all(locales.iter().map(|locale| self.get_locale(locale))).await;
    }

    /// Fetch and validate without consulting the cache; stores the value on
    /// success.
    pub async fn try_resolve(&self, locale: &Locale) -> Result<T, FetchError> {
        let raw = self.fetcher.fetch(T::KIND, locale).await?;
        let value = T::validate(&raw);
        self.cache.set(locale.clone(), value.clone());
        Ok(value)
    }

    async fn resolve_or_default(&self, locale: &Locale) -> (T, Resolution) {
        match self.try_resolve(locale).await {
            Ok(value) => (value, Resolution::Fetched),
            Err(err) => {
                counter!(
                    "atrium_content_fallback_total",
                    "kind" => T::KIND.as_str(),
                    "class" => err.class()
                )
                .increment(1);
                warn!(
                    kind = %T::KIND,
                    locale = %locale,
                    class = err.class(),
                    error = %err,
                    "content resolution failed, serving default"
                );
                (T::default_config(), Resolution::Fallback)
            }
        }
    }

    fn parse_locale(&self, raw: &str) -> Option<Locale> {
        match Locale::parse(raw) {
            Ok(locale) => Some(locale),
            Err(err) => {
                counter!(
                    "atrium_content_fallback_total",
                    "kind" => T::KIND.as_str(),
                    "class" => "locale"
                )
                .increment(1);
                warn!(
                    kind = %T::KIND,
                    class = "locale",
                    error = %err,
                    "unusable locale, serving default"
                );
                None
            }
        }
    }
}
