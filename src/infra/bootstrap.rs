//! Builds the service graph from validated settings.

use std::sync::Arc;

use crate::{
    application::{revalidation::RevalidationService, site_content::SiteContent},
    cache::{CacheConfig, ResponseCache},
    config::{ContentSettings, Settings},
    domain::types::ContentKind,
    infra::{
        error::InfraError,
        fetch::{ContentFetcher, HttpFetcher},
        http::{HttpState, WebhookAuth},
        retry::RetryingFetcher,
    },
};

/// Kinds listed in `retry_kinds` get the retrying decorator, the rest fetch once.
pub fn site_content(settings: &ContentSettings) -> Result<SiteContent, InfraError> {
    let http = HttpFetcher::new(&settings.base_url, settings.timeout)?;
    let plain: Arc<dyn ContentFetcher> = Arc::new(http.clone());
    let retrying: Arc<dyn ContentFetcher> = Arc::new(RetryingFetcher::new(http, settings.retry));

    Ok(site_content_with(
        plain,
        retrying,
        &settings.retry_kinds,
        settings.cache_ttl,
    ))
}

fn site_content_with(
    plain: Arc<dyn ContentFetcher>,
    retrying: Arc<dyn ContentFetcher>,
    retry_kinds: &[ContentKind],
    ttl: std::time::Duration,
) -> SiteContent {
    SiteContent::with_fetchers(
        |kind| {
            if retry_kinds.contains(&kind) {
                retrying.clone()
            } else {
                plain.clone()
            }
        },
        ttl,
    )
}

pub fn http_state(settings: &Settings) -> Result<HttpState, InfraError> {
    let content = Arc::new(site_content(&settings.content)?);
    http_state_with(settings, content)
}

/// Same as [`http_state`] but with a caller-supplied content handle.
pub fn http_state_with(
    settings: &Settings,
    content: Arc<SiteContent>,
) -> Result<HttpState, InfraError> {
    let cache = CacheConfig::from(settings);
    let responses = Arc::new(ResponseCache::new(&cache));
    let locales = settings.content.locales.clone();
    let default_locale = locales
        .first()
        .cloned()
        .ok_or_else(|| InfraError::configuration("at least one locale is required"))?;

    Ok(HttpState {
        content,
        revalidation: RevalidationService::new(responses.clone(), locales),
        responses,
        cache,
        webhook: WebhookAuth::new(settings.revalidation.secret.as_deref()),
        default_locale,
    })
}
