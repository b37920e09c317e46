//! Tag-based invalidation of the public response cache.
//!
//! This never touches the per-kind content stores; those expire on their own
//! TTL or through `ConfigService::refresh`.

use std::sync::Arc;

use atrium_api_types::ActionOutcome;
use metrics::counter;
use tracing::{error, info};

use crate::{
    application::error::AppError,
    cache::ResponseCache,
    domain::types::{ContentKind, Locale},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevalidationSource {
    Webhook,
    Action,
}

impl RevalidationSource {
    fn as_str(self) -> &'static str {
        match self {
            Self::Webhook => "webhook",
            Self::Action => "action",
        }
    }
}

#[derive(Clone)]
pub struct RevalidationService {
    responses: Arc<ResponseCache>,
    locales: Arc<[Locale]>,
}

impl RevalidationService {
    pub fn new(responses: Arc<ResponseCache>, locales: Vec<Locale>) -> Self {
        Self {
            responses,
            locales: locales.into(),
        }
    }

    /// Invalidate `<kind>-<locale>`, or the tag of every supported locale when
    /// `locale` is `None`. Returns the tags that were invalidated.
    pub fn invalidate(
        &self,
        kind: ContentKind,
        locale: Option<&Locale>,
        source: RevalidationSource,
    ) -> Vec<String> {
        let tags: Vec<String> = match locale {
            Some(locale) => vec![kind.tag(locale)],
            None => self.locales.iter().map(|locale| kind.tag(locale)).collect(),
        };

        let removed: usize = tags
            .iter()
            .map(|tag| self.responses.invalidate_tag(tag))
            .sum();

        counter!(
            "atrium_revalidate_total",
            "kind" => kind.as_str(),
            "source" => source.as_str()
        )
        .increment(1);
        info!(
            kind = %kind,
            source = source.as_str(),
            tags = ?tags,
            removed,
            "revalidated content tags"
        );

        tags
    }

    /// Parse raw identifiers and invalidate, surfacing bad input as an error.
    pub fn revalidate_raw(
        &self,
        kind: &str,
        locale: Option<&str>,
        source: RevalidationSource,
    ) -> Result<Vec<String>, AppError> {
        let kind: ContentKind = kind.parse()?;
        let locale = locale.map(Locale::parse).transpose()?;
        Ok(self.invalidate(kind, locale.as_ref(), source))
    }

    /// In-process action: same effect as the webhook, but failures are
    /// logged and reported in the outcome instead of propagated.
    pub fn revalidate(&self, kind: &str, locale: Option<&str>) -> ActionOutcome {
        match self.revalidate_raw(kind, locale, RevalidationSource::Action) {
            Ok(tags) => ActionOutcome::ok(format!("Revalidated {}", tags.join(", "))),
            Err(err) => {
                error!(kind, locale, error = %err, "revalidation action failed");
                ActionOutcome::failed(format!("Revalidation failed: {err}"))
            }
        }
    }
}
