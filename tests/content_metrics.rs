mod support;

use std::{
    collections::HashSet,
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
        http,
        retry::{RetryPolicy, RetryingFetcher},
    },
};
use axum::http::StatusCode;
use metrics_util::debugging::DebuggingRecorder;
use serde_json::{Value, json};

use support::{SECRET, get, post_revalidate, settings};

/// Fails with a transport error on the first call, then succeeds.
#[derive(Default)]
struct FlakyOnce {
    calls: AtomicUsize,
}

#[async_trait]
impl ContentFetcher for FlakyOnce {
    async fn fetch(&self, _kind: ContentKind, _locale: &Locale) -> Result<Value, FetchError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(FetchError::Transport("connection reset".into()));
        }
        Ok(json!({"description": "Klinik"}))
    }
}

struct Missing;

#[async_trait]
impl ContentFetcher for Missing {
    async fn fetch(&self, _kind: ContentKind, _locale: &Locale) -> Result<Value, FetchError> {
        Err(FetchError::Client {
            status: 404,
            message: "Not Found".into(),
        })
    }
}

#[tokio::test]
async fn content_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let flaky: Arc<dyn ContentFetcher> = Arc::new(RetryingFetcher::new(
        FlakyOnce::default(),
        RetryPolicy::new(2, Duration::from_millis(1)),
    ));
    let missing: Arc<dyn ContentFetcher> = Arc::new(Missing);
    let content = SiteContent::with_fetchers(
        |kind| match kind {
            ContentKind::Footer => flaky.clone(),
            _ => missing.clone(),
        },
        Duration::from_secs(300),
    );
    let state = bootstrap::http_state_with(&settings("http://cms.invalid"), Arc::new(content))
        .expect("http state");
    let router = http::build_router(state.clone());

    // Response miss, content miss, one retry, then a stored response.
    let first = get(&router, "/content/footer?locale=tr").await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["description"], "Klinik");
    // Response hit.
    get(&router, "/content/footer?locale=tr").await;
    // Content hit behind the response cache.
    state.content.footer.get("tr").await;
    // Fallback.
    get(&router, "/content/hero?locale=en").await;

    let reply = post_revalidate(&router, "footer", Some(SECRET), "{}").await;
    assert_eq!(reply.status, StatusCode::OK);

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "atrium_content_cache_hit_total",
        "atrium_content_cache_miss_total",
        "atrium_content_fallback_total",
        "atrium_content_fetch_retry_total",
        "atrium_response_cache_hit_total",
        "atrium_response_cache_miss_total",
        "atrium_revalidate_total",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
