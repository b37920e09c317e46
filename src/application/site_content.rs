//! The six content services behind one handle.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::{
    application::config_service::{ConfigService, Resolution},
    domain::{
        content::{
            ContactMapConfig, FooterConfig, HeroConfig, NavbarConfig, TreatmentsConfig,
            WelcomeConfig,
        },
        types::{ContentKind, Locale},
    },
    infra::fetch::ContentFetcher,
};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to serialise {kind} configuration: {source}")]
    Serialize {
        kind: ContentKind,
        #[source]
        source: serde_json::Error,
    },
}

pub struct SiteContent {
    pub navbar: ConfigService<NavbarConfig>,
    pub hero: ConfigService<HeroConfig>,
    pub welcome: ConfigService<WelcomeConfig>,
    pub treatments: ConfigService<TreatmentsConfig>,
    pub contact_map: ConfigService<ContactMapConfig>,
    pub footer: ConfigService<FooterConfig>,
}

impl SiteContent {
    /// Every kind shares `fetcher`.
    pub fn new(fetcher: Arc<dyn ContentFetcher>, ttl: Duration) -> Self {
        Self::with_fetchers(|_| fetcher.clone(), ttl)
    }

    /// `fetcher_for` picks the fetcher of each kind, e.g. a retrying one for
    /// kinds that opted into backoff.
    pub fn with_fetchers<F>(fetcher_for: F, ttl: Duration) -> Self
    where
        F: Fn(ContentKind) -> Arc<dyn ContentFetcher>,
    {
        Self {
            navbar: ConfigService::new(fetcher_for(ContentKind::Navbar), ttl),
            hero: ConfigService::new(fetcher_for(ContentKind::Hero), ttl),
            welcome: ConfigService::new(fetcher_for(ContentKind::Welcome), ttl),
            treatments: ConfigService::new(fetcher_for(ContentKind::Treatments), ttl),
            contact_map: ConfigService::new(fetcher_for(ContentKind::ContactMap), ttl),
            footer: ConfigService::new(fetcher_for(ContentKind::Footer), ttl),
        }
    }

    /// Warm every kind for every locale; never fails.
    pub async fn prefetch_all(&self, locales: &[Locale]) {
        tokio::join!(
            self.navbar.prefetch(locales),
            self.hero.prefetch(locales),
            self.welcome.prefetch(locales),
            self.treatments.prefetch(locales),
            self.contact_map.prefetch(locales),
            self.footer.prefetch(locales),
        );
        info!(locales = locales.len(), "content prefetch finished");
    }

    pub fn clear_all(&self, locale: Option<&str>) {
        self.navbar.clear_cache(locale);
        self.hero.clear_cache(locale);
        self.welcome.clear_cache(locale);
        self.treatments.clear_cache(locale);
        self.contact_map.clear_cache(locale);
        self.footer.clear_cache(locale);
    }

    /// Resolve `kind` for `locale` and serialise it in wire format.
    pub async fn resolve_json(
        &self,
        kind: ContentKind,
        locale: &Locale,
    ) -> Result<(Value, Resolution), ResolveError> {
        match kind {
            ContentKind::Navbar => to_json(kind, self.navbar.resolve(locale).await),
            ContentKind::Hero => to_json(kind, self.hero.resolve(locale).await),
            ContentKind::Welcome => to_json(kind, self.welcome.resolve(locale).await),
            ContentKind::Treatments => to_json(kind, self.treatments.resolve(locale).await),
            ContentKind::ContactMap => to_json(kind, self.contact_map.resolve(locale).await),
            ContentKind::Footer => to_json(kind, self.footer.resolve(locale).await),
        }
    }
}

fn to_json<T: Serialize>(
    kind: ContentKind,
    (value, resolution): (T, Resolution),
) -> Result<(Value, Resolution), ResolveError> {
    serde_json::to_value(value)
        .map(|value| (value, resolution))
        .map_err(|source| ResolveError::Serialize { kind, source })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::domain::content::ContentSchema;
    use crate::infra::fetch::FetchError;

    #[derive(Default)]
    struct RecordingFetcher {
        seen: Mutex<Vec<(ContentKind, String)>>,
    }

    #[async_trait]
    impl ContentFetcher for RecordingFetcher {
        async fn fetch(&self, kind: ContentKind, locale: &Locale) -> Result<Value, FetchError> {
            self.seen
                .lock()
                .expect("seen lock")
                .push((kind, locale.as_str().to_string()));
            match kind {
                ContentKind::ContactMap => Err(FetchError::Server { status: 500 }),
                _ => Ok(json!({})),
            }
        }
    }

    #[tokio::test]
    async fn prefetch_all_touches_every_kind_and_locale() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let content = SiteContent::new(fetcher.clone(), Duration::from_secs(60));
        let locales = Locale::parse_list("tr,en").expect("locales");

        content.prefetch_all(&locales).await;

        assert_eq!(fetcher.seen.lock().expect("seen lock").len(), 12);
        assert_eq!(content.footer.cache().len(), 2);
        assert!(content.contact_map.cache().is_empty());
    }

    #[tokio::test]
    async fn clear_all_empties_every_store() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let content = SiteContent::new(fetcher, Duration::from_secs(60));
        content
            .prefetch_all(&Locale::parse_list("en").expect("locales"))
            .await;

        content.clear_all(None);

        assert!(content.navbar.cache().is_empty());
        assert!(content.footer.cache().is_empty());
    }

    #[tokio::test]
    async fn resolve_json_uses_camel_case_wire_format() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let content = SiteContent::new(fetcher, Duration::from_secs(60));

        let en = Locale::parse("en").expect("locale");
        let (value, resolution) = content
            .resolve_json(ContentKind::ContactMap, &en)
            .await
            .expect("serialise");

        assert_eq!(resolution, Resolution::Fallback);

        let expected =
            serde_json::to_value(ContactMapConfig::default_config()).expect("serialise default");
        assert_eq!(value, expected);
        assert!(value.get("workingHours").is_some());
    }

    #[tokio::test]
    async fn with_fetchers_routes_each_kind() {
        let shared = Arc::new(RecordingFetcher::default());
        let footer_only = Arc::new(RecordingFetcher::default());
        let content = SiteContent::with_fetchers(
            |kind| -> Arc<dyn ContentFetcher> {
                if kind == ContentKind::Footer {
                    footer_only.clone()
                } else {
                    shared.clone()
                }
            },
            Duration::from_secs(60),
        );

        content.footer.get("en").await;
        content.navbar.get("en").await;

        let footer_seen = footer_only.seen.lock().expect("seen lock").clone();
        assert_eq!(footer_seen, vec![(ContentKind::Footer, "en".to_string())]);
        assert_eq!(shared.seen.lock().expect("seen lock").len(), 1);
    }
}
