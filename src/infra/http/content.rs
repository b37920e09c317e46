//! `GET /content/{kind}?locale=<code>`: resolved configuration as JSON.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    application::{config_service::Resolution, error::AppError},
    cache::CacheDirective,
    domain::types::{ContentKind, Locale},
};

use super::{HttpState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct LocaleQuery {
    locale: Option<String>,
}

pub(super) async fn content(
    State(state): State<HttpState>,
    Path(kind): Path<String>,
    Query(query): Query<LocaleQuery>,
) -> Result<Response, ApiError> {
    let kind: ContentKind = kind.parse().map_err(AppError::from)?;

    let locale = match query.locale.as_deref() {
        Some(raw) => Locale::parse(raw).map_err(AppError::from)?,
        None => state.default_locale.clone(),
    };

    let (value, resolution) = state
        .content
        .resolve_json(kind, &locale)
        .await
        .map_err(AppError::from)?;

    let mut response = Json(value).into_response();
    // Fallbacks are served but not cached, so the next request retries.
    if resolution != Resolution::Fallback {
        response.extensions_mut().insert(CacheDirective {
            tag: kind.tag(&locale),
            ttl: state.cache.response_ttl(kind),
        });
    }
    Ok(response)
}
