use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::merge::{Fields, Ordered};
use super::ContentSchema;
use crate::domain::types::ContentKind;

const DEFAULT_INTERVAL_MS: u64 = 6000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroConfig {
    pub slides: Vec<HeroSlide>,
    pub autoplay: bool,
    pub interval_ms: u64,
    pub show_indicators: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSlide {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub image: String,
    #[serde(default)]
    pub image_alt: String,
    #[serde(default)]
    pub cta_label: String,
    #[serde(default)]
    pub cta_href: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Ordered for HeroSlide {
    fn order(&self) -> i64 {
        self.order
    }

    fn is_active(&self) -> bool {
        self.is_active != Some(false)
    }
}

impl ContentSchema for HeroConfig {
    const KIND: ContentKind = ContentKind::Hero;

    fn default_config() -> Self {
        Self {
            slides: vec![
                HeroSlide {
                    id: "default-smile".to_string(),
                    title: "Healthy smiles start here".to_string(),
                    subtitle: "Modern dental care for the whole family".to_string(),
                    image: "/images/hero/smile.jpg".to_string(),
                    image_alt: "Smiling patient".to_string(),
                    cta_label: "Book an appointment".to_string(),
                    cta_href: "/contact".to_string(),
                    order: 1,
                    is_active: Some(true),
                },
                HeroSlide {
                    id: "default-team".to_string(),
                    title: "An experienced team".to_string(),
                    subtitle: "Specialists in every field of dentistry".to_string(),
                    image: "/images/hero/team.jpg".to_string(),
                    image_alt: "Clinic team".to_string(),
                    cta_label: "Meet the team".to_string(),
                    cta_href: "/about/team".to_string(),
                    order: 2,
                    is_active: Some(true),
                },
            ],
            autoplay: true,
            interval_ms: DEFAULT_INTERVAL_MS,
            show_indicators: true,
        }
    }

    /// A hero without any active slide cannot render, so an empty slide list
    /// replaces the whole configuration with the default rather than merging.
    fn validate(raw: &Value) -> Self {
        let default = Self::default_config();
        let fields = Fields::new(raw);

        let slides = fields.list("slides", &default.slides);
        if slides.is_empty() {
            warn!(
                kind = %Self::KIND,
                "hero payload has no active slides, using default configuration"
            );
            return default;
        }

        let interval_ms = match fields.u64("intervalMs", default.interval_ms) {
            0 => default.interval_ms,
            value => value,
        };

        Self {
            slides,
            autoplay: fields.bool("autoplay", default.autoplay),
            interval_ms,
            show_indicators: fields.bool("showIndicators", default.show_indicators),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn all_inactive_slides_yield_full_default() {
        let raw = json!({
            "slides": [
                {"id": "s1", "title": "One", "image": "/1.jpg", "isActive": false},
                {"id": "s2", "title": "Two", "image": "/2.jpg", "isActive": false}
            ],
            "autoplay": false,
            "intervalMs": 1500
        });

        let config = HeroConfig::validate(&raw);
        assert_eq!(config, HeroConfig::default_config());
        assert!(!config.slides.is_empty());
    }

    #[test]
    fn empty_slide_array_yields_full_default() {
        let raw = json!({"slides": [], "autoplay": false});
        assert_eq!(HeroConfig::validate(&raw), HeroConfig::default_config());
    }

    #[test]
    fn active_slides_merge_with_scalar_fields() {
        let raw = json!({
            "slides": [
                {"id": "late", "title": "Late", "image": "/l.jpg", "order": 9},
                {"id": "off", "title": "Off", "image": "/o.jpg", "order": 0, "isActive": false},
                {"id": "early", "title": "Early", "image": "/e.jpg", "order": 1}
            ],
            "autoplay": false
        });

        let config = HeroConfig::validate(&raw);
        let ids: Vec<&str> = config.slides.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["early", "late"]);
        assert!(!config.autoplay);
        assert_eq!(config.interval_ms, DEFAULT_INTERVAL_MS);
        assert!(config.show_indicators);
    }

    #[test]
    fn zero_interval_falls_back() {
        let raw = json!({"intervalMs": 0});
        assert_eq!(HeroConfig::validate(&raw).interval_ms, DEFAULT_INTERVAL_MS);
    }
}
