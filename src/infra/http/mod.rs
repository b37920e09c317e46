mod content;
mod error;
mod middleware;
mod revalidate;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::{
    application::{revalidation::RevalidationService, site_content::SiteContent},
    cache::{CacheConfig, ResponseCache, response_cache_layer},
    domain::types::Locale,
};

pub use error::{ApiError, codes};
pub use middleware::{REQUEST_ID_HEADER, RequestContext};
pub use revalidate::WebhookAuth;

#[derive(Clone)]
pub struct HttpState {
    pub content: Arc<SiteContent>,
    pub revalidation: RevalidationService,
    pub responses: Arc<ResponseCache>,
    pub cache: CacheConfig,
    pub webhook: WebhookAuth,
    /// Used when a content request carries no `locale` parameter.
    pub default_locale: Locale,
}

pub fn build_router(state: HttpState) -> Router {
    let cached_routes = Router::new()
        .route("/content/{kind}", get(content::content))
        .layer(axum_middleware::from_fn_with_state(
            state.responses.clone(),
            response_cache_layer,
        ));

    let uncached_routes = Router::new()
        .route("/api/revalidate/{kind}", post(revalidate::revalidate))
        .route("/_health", get(health));

    cached_routes
        .merge(uncached_routes)
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}
