//! `POST /api/revalidate/{kind}`: bearer-authenticated tag invalidation.

use atrium_api_types::{RevalidateRequest, RevalidateResponse};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use time::OffsetDateTime;
use tracing::debug;

use crate::{
    application::revalidation::RevalidationSource,
    domain::types::{ContentKind, Locale},
};

use super::{HttpState, error::ApiError};

const SOURCE: &str = "infra::http::revalidate";

/// Shared-secret check for the webhook. Only the digest of the secret is
/// kept, and comparison is constant time.
#[derive(Clone, Default)]
pub struct WebhookAuth {
    secret_digest: Option<Vec<u8>>,
}

impl WebhookAuth {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret_digest: secret.map(digest),
        }
    }

    /// `false` when no secret is configured.
    pub fn verify(&self, header: Option<&HeaderValue>) -> bool {
        let Some(expected) = self.secret_digest.as_ref() else {
            return false;
        };
        let Some(token) = extract_token(header) else {
            return false;
        };
        expected.ct_eq(&digest(token)).unwrap_u8() == 1
    }
}

fn digest(secret: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.finalize().to_vec()
}

fn extract_token(header: Option<&HeaderValue>) -> Option<&str> {
    let raw = header?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

pub(super) async fn revalidate(
    State(state): State<HttpState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !state.webhook.verify(headers.get(AUTHORIZATION)) {
        return ApiError::unauthorized().into_response();
    }

    let kind: ContentKind = match kind.parse() {
        Ok(kind) => kind,
        Err(err) => {
            return ApiError::not_found("Unknown content kind")
                .with_source(SOURCE, &err)
                .into_response();
        }
    };

    let request = match parse_body(&body) {
        Ok(request) => request,
        Err(err) => {
            return ApiError::internal("Revalidation failed")
                .with_source(SOURCE, &err)
                .into_response();
        }
    };

    let locale = match request.locale.as_deref().map(Locale::parse).transpose() {
        Ok(locale) => locale,
        Err(err) => {
            return ApiError::internal("Revalidation failed")
                .with_source(SOURCE, &err)
                .into_response();
        }
    };

    debug!(kind = %kind, entity = request.entity.as_deref(), "revalidation webhook accepted");
    state
        .revalidation
        .invalidate(kind, locale.as_ref(), RevalidationSource::Webhook);

    Json(RevalidateResponse {
        revalidated: true,
        now: now_millis(),
    })
    .into_response()
}

/// An empty body is the same as `{}`.
fn parse_body(body: &[u8]) -> Result<RevalidateRequest, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RevalidateRequest::default());
    }
    serde_json::from_slice(body)
}

fn now_millis() -> i64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    i64::try_from(nanos / 1_000_000).unwrap_or(i64::MAX)
}
