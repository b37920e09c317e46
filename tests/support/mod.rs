#![allow(dead_code)]

use std::{collections::HashMap, time::Duration};

use atrium::{
    config::{
        CacheSettings, ContentSettings, LogFormat, LoggingSettings, RevalidationSettings,
        ServerSettings, Settings,
    },
    domain::types::Locale,
    infra::retry::RetryPolicy,
};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use tracing::level_filters::LevelFilter;
use url::Url;

pub const SECRET: &str = "s3cret";

pub fn settings(base_url: &str) -> Settings {
    Settings {
        server: ServerSettings {
            addr: "127.0.0.1:0".parse().expect("socket addr"),
            graceful_shutdown: Duration::from_secs(1),
        },
        logging: LoggingSettings {
            level: LevelFilter::INFO,
            format: LogFormat::Compact,
        },
        content: ContentSettings {
            base_url: Url::parse(base_url).expect("base url"),
            timeout: Duration::from_secs(2),
            cache_ttl: Duration::from_secs(300),
            locales: Locale::parse_list("tr,en").expect("locales"),
            retry: RetryPolicy::new(1, Duration::from_millis(1)),
            retry_kinds: Vec::new(),
            prefetch_on_startup: false,
        },
        revalidation: RevalidationSettings {
            secret: Some(SECRET.to_string()),
            interval: Duration::from_secs(3600),
            intervals: HashMap::new(),
        },
        cache: CacheSettings { response_limit: 64 },
    }
}

pub struct Reply {
    pub status: StatusCode,
    pub cache: Option<String>,
    pub body: Value,
}

pub async fn send(router: &Router, request: Request<Body>) -> Reply {
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let cache = response
        .headers()
        .get(atrium::cache::CACHE_STATUS_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Reply {
        status,
        cache,
        body,
    }
}

pub async fn get(router: &Router, uri: &str) -> Reply {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    send(router, request).await
}

/// `token` of `None` sends no Authorization header.
pub async fn post_revalidate(
    router: &Router,
    kind: &str,
    token: Option<&str>,
    body: &str,
) -> Reply {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/revalidate/{kind}"));
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body.to_string())).expect("request");
    send(router, request).await
}
