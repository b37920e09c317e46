//! HTTP client for the content backend.

use std::time::Duration;

use async_trait::async_trait;
use atrium_api_types::{BackendErrorBody, ContentEnvelope};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::domain::types::{ContentKind, Locale};

/// Why a single fetch failed.
///
/// The variant decides retry eligibility: client errors never retry,
/// server and transport errors do, decode errors are terminal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("content backend rejected the request with {status}: {message}")]
    Client { status: u16, message: String },
    #[error("content backend failed with {status}")]
    Server { status: u16 },
    #[error("content backend unreachable: {0}")]
    Transport(String),
    #[error("content backend returned an unusable body: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Transport(_))
    }

    /// Short label used as the `class` field in logs.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Client { .. } => "client",
            Self::Server { .. } => "server",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// One GET for one `(kind, locale)`, no retries, no caching.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, kind: ContentKind, locale: &Locale) -> Result<Value, FetchError>;
}

#[derive(Debug, Error)]
#[error("failed to build http client: {0}")]
pub struct FetcherBuildError(#[from] reqwest::Error);

#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base: &Url, timeout: Duration) -> Result<Self, FetcherBuildError> {
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()?;
        Ok(Self { client, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("atrium/", env!("CARGO_PKG_VERSION"))
    }

    fn url(&self, kind: ContentKind, locale: &Locale) -> Result<Url, FetchError> {
        let mut url = self
            .base
            .join(&format!("api/{}", kind.endpoint()))
            .map_err(|err| FetchError::Transport(format!("invalid endpoint url: {err}")))?;
        url.query_pairs_mut().append_pair("locale", locale.as_str());
        Ok(url)
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, kind: ContentKind, locale: &Locale) -> Result<Value, FetchError> {
        let url = self.url(kind, locale)?;
        debug!(kind = %kind, locale = %locale, url = %url, "fetching content");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            // The status decides the class; an unreadable body only costs the message.
            let body = response.bytes().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let bytes = response.bytes().await?;

        let envelope: ContentEnvelope = serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::Decode(format!("failed to parse body: {err}")))?;

        match envelope.data {
            Some(Value::Null) | None => Err(FetchError::Decode(
                "response has no `data` field".to_string(),
            )),
            Some(data) => Ok(data),
        }
    }
}

fn classify_status(status: StatusCode, body: &[u8]) -> FetchError {
    if status.is_client_error() {
        let message = serde_json::from_slice::<BackendErrorBody>(body)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
        FetchError::Client {
            status: status.as_u16(),
            message,
        }
    } else {
        FetchError::Server {
            status: status.as_u16(),
        }
    }
}
