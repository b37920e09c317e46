use axum::{
    body::Body,
    http::{HeaderValue, Request, Uri},
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;
use tracing::{Level, event};
use url::form_urlencoded;
use uuid::Uuid;

use crate::application::error::ErrorReport;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response.extensions_mut().insert(ctx);
    response
}

/// What a content or revalidation request was about, as far as the URI says.
#[derive(Debug, Default, PartialEq, Eq)]
struct ContentTarget {
    route: &'static str,
    kind: String,
    locale: String,
}

impl ContentTarget {
    fn from_uri(uri: &Uri) -> Self {
        let path = uri.path();
        let (route, kind) = if let Some(kind) = path.strip_prefix("/content/") {
            ("content", kind)
        } else if let Some(kind) = path.strip_prefix("/api/revalidate/") {
            ("revalidate", kind)
        } else {
            ("other", "")
        };

        let locale = uri
            .query()
            .and_then(|query| {
                form_urlencoded::parse(query.as_bytes()).find(|(name, _)| name == "locale")
            })
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();

        Self {
            route,
            kind: kind.to_string(),
            locale,
        }
    }
}

/// Log every 4xx/5xx with the attached [`ErrorReport`] and the content kind
/// and locale the request targeted.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let target = ContentTarget::from_uri(request.uri());
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let (source, messages) = match response.extensions_mut().remove::<ErrorReport>() {
        Some(report) => (report.source, report.messages),
        None => ("unknown", Vec::new()),
    };
    let detail = messages
        .first()
        .map(String::as_str)
        .unwrap_or("no diagnostic available");

    macro_rules! log_failure {
        ($level:expr, $message:literal) => {
            event!(
                target: "atrium::http::response",
                $level,
                status = status.as_u16(),
                method = %method,
                route = target.route,
                kind = %target.kind,
                locale = %target.locale,
                elapsed_ms = start.elapsed().as_millis(),
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = %request_id,
                $message,
            )
        };
    }

    if status.is_server_error() {
        log_failure!(Level::ERROR, "request failed");
    } else {
        log_failure!(Level::WARN, "client request error");
    }

    response
}
