//! Tagged HTTP response cache.
//!
//! Unlike [`super::CacheStore`], which holds typed configurations for the
//! resolution services, this cache holds rendered responses of the public
//! content route. Entries expire after their kind's revalidation interval and
//! are dropped early when their `<kind>-<locale>` tag is revalidated. The
//! store is bounded; the least recently used entry is evicted first.

use std::sync::RwLock;
use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::Response,
};
use bytes::Bytes;
use http_body_util::BodyExt;
use lru::LruCache;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::response";

/// Attached by a handler to opt its response into the cache.
#[derive(Debug, Clone)]
pub struct CacheDirective {
    pub tag: String,
    pub ttl: Duration,
}

#[derive(Clone)]
pub struct CachedResponse {
    status: StatusCode,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Bytes,
    tag: String,
    stored_at: Instant,
    ttl: Duration,
}

impl CachedResponse {
    pub fn new(
        status: StatusCode,
        headers: &HeaderMap,
        body: Bytes,
        directive: &CacheDirective,
    ) -> Self {
        let stored_headers = headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        Self {
            status,
            headers: stored_headers,
            body,
            tag: directive.tag.clone(),
            stored_at: Instant::now(),
            ttl: directive.ttl,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) > self.ttl
    }

    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        for (name, value) in self.headers {
            headers.append(name, value);
        }

        response
    }
}

#[derive(Debug, Error)]
pub enum CacheStoreError {
    #[error("failed to buffer response body: {0}")]
    Buffer(String),
}

pub struct ResponseCache {
    entries: RwLock<LruCache<String, CachedResponse>>,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.response_limit_non_zero())),
        }
    }

    /// Cached response for `key`, evicting it first if it outlived its TTL.
    pub fn get(&self, key: &str) -> Option<Response> {
        let now = Instant::now();
        let mut entries = rw_write(&self.entries, SOURCE, "get");

        let expired = match entries.get(key) {
            Some(cached) if !cached.is_expired(now) => {
                return Some(cached.clone().into_response());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
        }
        None
    }

    /// Returns the key pushed out to make room, if any.
    pub fn put(&self, key: String, response: CachedResponse) -> Option<String> {
        rw_write(&self.entries, SOURCE, "put")
            .push(key.clone(), response)
            .and_then(|(evicted, _)| (evicted != key).then_some(evicted))
    }

    /// Buffer `response`, store it under `key`, and hand back an equivalent
    /// response for the caller to return.
    pub async fn store_response(
        &self,
        key: &str,
        directive: &CacheDirective,
        response: Response,
    ) -> Result<Response, (Response, CacheStoreError)> {
        let (parts, body) = response.into_parts();
        match BodyExt::collect(body).await {
            Ok(collected) => {
                let bytes = collected.to_bytes();
                let cached =
                    CachedResponse::new(parts.status, &parts.headers, bytes.clone(), directive);
                if let Some(evicted) = self.put(key.to_string(), cached) {
                    debug!(
                        cache = "response",
                        evicted = %evicted,
                        "evicted least recently used response"
                    );
                }
                Ok(Response::from_parts(parts, Body::from(bytes)))
            }
            Err(error) => {
                let rebuilt = Response::from_parts(parts, Body::empty());
                Err((rebuilt, CacheStoreError::Buffer(error.to_string())))
            }
        }
    }

    /// Drop every entry stored under `tag`; returns how many were removed.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        let mut entries = rw_write(&self.entries, SOURCE, "invalidate_tag");
        let keys: Vec<String> = entries
            .iter()
            .filter(|(_, cached)| cached.tag == tag)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys {
            entries.pop(key);
        }
        keys.len()
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn should_store_response(response: &Response) -> bool {
    if !response.status().is_success() {
        return false;
    }

    !response.headers().contains_key(header::SET_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(tag: &str, ttl_secs: u64) -> CacheDirective {
        CacheDirective {
            tag: tag.to_string(),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    fn cached(tag: &str, ttl_secs: u64) -> CachedResponse {
        CachedResponse::new(
            StatusCode::OK,
            &HeaderMap::new(),
            Bytes::from_static(b"{}"),
            &directive(tag, ttl_secs),
        )
    }

    #[test]
    fn invalidate_tag_only_touches_matching_entries() {
        let cache = ResponseCache::new(&CacheConfig::default());
        cache.put("/content/footer?locale=en".to_string(), cached("footer-en", 60));
        cache.put("/content/footer?locale=EN".to_string(), cached("footer-en", 60));
        cache.put("/content/footer?locale=tr".to_string(), cached("footer-tr", 60));

        assert_eq!(cache.invalidate_tag("footer-en"), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("/content/footer?locale=tr").is_some());
        assert_eq!(cache.invalidate_tag("footer-en"), 0);
    }

    #[test]
    fn least_recently_used_entry_is_evicted_at_capacity() {
        let cache = ResponseCache::new(&CacheConfig {
            response_limit: 2,
            ..Default::default()
        });
        assert_eq!(cache.put("footer:en".to_string(), cached("footer-en", 60)), None);
        assert_eq!(cache.put("footer:tr".to_string(), cached("footer-tr", 60)), None);
        assert!(cache.get("footer:en").is_some());

        let evicted = cache.put("hero:en".to_string(), cached("hero-en", 60));
        assert_eq!(evicted.as_deref(), Some("footer:tr"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("footer:tr").is_none());

        assert_eq!(cache.put("hero:en".to_string(), cached("hero-en", 60)), None);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_their_ttl() {
        let cache = ResponseCache::new(&CacheConfig::default());
        cache.put("/content/hero?locale=en".to_string(), cached("hero-en", 5));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(cache.get("/content/hero?locale=en").is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get("/content/hero?locale=en").is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn store_response_returns_equivalent_response() {
        let cache = ResponseCache::new(&CacheConfig::default());
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"ok":true}"#))
            .expect("response should build");

        let returned = cache
            .store_response("/k", &directive("navbar-en", 60), response)
            .await
            .unwrap_or_else(|_| panic!("store should succeed"));
        let body = returned
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        assert_eq!(body, Bytes::from_static(br#"{"ok":true}"#));

        let cached = cache.get("/k").expect("cached response");
        assert_eq!(
            cached.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
    }

    #[test]
    fn responses_with_cookies_or_errors_are_not_stored() {
        let ok = Response::new(Body::empty());
        assert!(should_store_response(&ok));

        let mut failed = Response::new(Body::empty());
        *failed.status_mut() = StatusCode::BAD_GATEWAY;
        assert!(!should_store_response(&failed));

        let mut with_cookie = Response::new(Body::empty());
        with_cookie
            .headers_mut()
            .insert(header::SET_COOKIE, HeaderValue::from_static("a=b"));
        assert!(!should_store_response(&with_cookie));
    }
}
