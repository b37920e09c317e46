//! Response cache middleware for the public content route.
//!
//! Only GET requests are looked up. Entries are keyed on the parsed kind and
//! locale, so unrelated query parameters share one entry. A miss is stored
//! when the handler attached a [`CacheDirective`] and the response is
//! cacheable.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use tracing::{debug, instrument, warn};
use url::form_urlencoded;

use super::response::{CacheDirective, ResponseCache, should_store_response};
use crate::domain::types::{ContentKind, Locale};

pub const CACHE_STATUS_HEADER: &str = "x-atrium-cache";

#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn response_cache_layer(
    State(cache): State<Arc<ResponseCache>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    // Unknown kinds and invalid locales are rejected by the handler.
    let Some(key) = cache_key(&request) else {
        let mut response = next.run(request).await;
        mark(&mut response, "miss");
        return response;
    };

    if let Some(mut cached) = cache.get(&key) {
        counter!("atrium_response_cache_hit_total").increment(1);
        debug!(cache = "response", outcome = "hit", key = %key, "serving cached response");
        mark(&mut cached, "hit");
        return cached;
    }

    counter!("atrium_response_cache_miss_total").increment(1);
    debug!(cache = "response", outcome = "miss", key = %key, "executing handler");

    let response = next.run(request).await;

    let directive = response.extensions().get::<CacheDirective>().cloned();
    let mut response = match directive {
        Some(directive) if should_store_response(&response) => {
            match cache.store_response(&key, &directive, response).await {
                Ok(stored) => stored,
                Err((fallback, error)) => {
                    warn!(
                        cache = "response",
                        key = %key,
                        error = %error,
                        "failed to store response"
                    );
                    fallback
                }
            }
        }
        _ => response,
    };

    mark(&mut response, "miss");
    response
}

/// `<kind>:<locale>`, with an empty locale when the request names none.
fn cache_key(request: &Request<Body>) -> Option<String> {
    let uri = request.uri();
    let kind: ContentKind = uri.path().rsplit('/').next()?.parse().ok()?;

    let locale = uri
        .query()
        .and_then(|query| {
            form_urlencoded::parse(query.as_bytes()).find(|(name, _)| name == "locale")
        })
        .map(|(_, value)| Locale::parse(&value))
        .transpose()
        .ok()?;

    Some(match locale {
        Some(locale) => format!("{kind}:{locale}"),
        None => format!("{kind}:"),
    })
}

fn mark(response: &mut Response, outcome: &'static str) {
    response
        .headers_mut()
        .insert(CACHE_STATUS_HEADER, HeaderValue::from_static(outcome));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_for(uri: &str) -> Option<String> {
        let req = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        cache_key(&req)
    }

    #[test]
    fn cache_key_normalises_kind_and_locale() {
        assert_eq!(
            key_for("/content/footer?locale=en").as_deref(),
            Some("footer:en")
        );
        assert_eq!(
            key_for("/content/Footer?junk=1&locale=%20EN%20").as_deref(),
            Some("footer:en")
        );
        assert_eq!(
            key_for("/content/contact-map?locale=tr").as_deref(),
            Some("contactMap:tr")
        );
        assert_eq!(key_for("/content/hero?page=2").as_deref(), Some("hero:"));
    }

    #[test]
    fn unknown_kinds_and_bad_locales_are_not_cacheable() {
        assert_eq!(key_for("/content/pricing?locale=en"), None);
        assert_eq!(key_for("/content/footer?locale=t%20r"), None);
        assert_eq!(key_for("/content/footer?locale="), None);
    }
}
