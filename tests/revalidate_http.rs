mod support;

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use atrium::{
    application::site_content::SiteContent,
    domain::types::{ContentKind, Locale},
    infra::{
        bootstrap,
        fetch::{ContentFetcher, FetchError},
        http::{self, HttpState},
    },
};
use axum::{Router, http::StatusCode};
use serde_json::{Value, json};

use support::{SECRET, get, post_revalidate, settings};

#[derive(Default)]
struct StaticFetcher {
    calls: AtomicUsize,
}

#[async_trait]
impl ContentFetcher for StaticFetcher {
    async fn fetch(&self, kind: ContentKind, locale: &Locale) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "description": format!("{kind} {locale}") }))
    }
}

fn app() -> (Router, HttpState) {
    let content = SiteContent::new(
        Arc::new(StaticFetcher::default()),
        Duration::from_secs(300),
    );
    let state = bootstrap::http_state_with(&settings("http://cms.invalid"), Arc::new(content))
        .expect("http state");
    (http::build_router(state.clone()), state)
}

async fn warm(router: &Router) {
    for locale in ["tr", "en"] {
        let reply = get(router, &format!("/content/footer?locale={locale}")).await;
        assert_eq!(reply.status, StatusCode::OK);
    }
}

#[tokio::test]
async fn wrong_or_missing_secret_is_rejected_without_invalidating() {
    let (router, state) = app();
    warm(&router).await;

    let missing = post_revalidate(&router, "footer", None, "{}").await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["error"]["code"], "unauthorized");

    let wrong = post_revalidate(&router, "footer", Some("nope"), "{}").await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    assert_eq!(state.responses.len(), 2);
    let cached = get(&router, "/content/footer?locale=tr").await;
    assert_eq!(cached.cache.as_deref(), Some("hit"));
}

#[tokio::test]
async fn locale_scoped_revalidation_only_drops_that_tag() {
    let (router, state) = app();
    warm(&router).await;

    let reply = post_revalidate(
        &router,
        "footer",
        Some(SECRET),
        r#"{"locale":"en","entity":"api::footer.footer"}"#,
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["revalidated"], true);
    assert!(reply.body["now"].as_i64().is_some_and(|now| now > 0));

    assert_eq!(state.responses.len(), 1);
    assert_eq!(
        get(&router, "/content/footer?locale=tr").await.cache.as_deref(),
        Some("hit")
    );
    assert_eq!(
        get(&router, "/content/footer?locale=en").await.cache.as_deref(),
        Some("miss")
    );
}

#[tokio::test]
async fn omitted_locale_revalidates_every_supported_locale() {
    let (router, state) = app();
    warm(&router).await;

    let reply = post_revalidate(&router, "footer", Some(SECRET), "").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(state.responses.is_empty());
}

#[tokio::test]
async fn other_kinds_are_left_alone() {
    let (router, state) = app();
    warm(&router).await;

    let reply = post_revalidate(&router, "hero", Some(SECRET), "{}").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(state.responses.len(), 2);
}

#[tokio::test]
async fn unknown_kind_is_not_found() {
    let (router, _) = app();

    let reply = post_revalidate(&router, "pricing", Some(SECRET), "{}").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_payloads_are_internal_errors() {
    let (router, state) = app();
    warm(&router).await;

    let broken = post_revalidate(&router, "footer", Some(SECRET), "{not json").await;
    assert_eq!(broken.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(broken.body["error"]["code"], "internal_error");

    let bad_locale =
        post_revalidate(&router, "footer", Some(SECRET), r#"{"locale":"t r"}"#).await;
    assert_eq!(bad_locale.status, StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(state.responses.len(), 2);
}

#[tokio::test]
async fn server_action_reports_outcome() {
    let (router, state) = app();
    warm(&router).await;

    let outcome = state.revalidation.revalidate("footer", Some("tr"));
    assert!(outcome.success);
    assert_eq!(outcome.message, "Revalidated footer-tr");
    assert_eq!(state.responses.len(), 1);

    let failed = state.revalidation.revalidate("pricing", None);
    assert!(!failed.success);
    assert!(failed.message.starts_with("Revalidation failed"));
}
