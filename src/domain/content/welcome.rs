use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::merge::{Fields, Ordered};
use super::{CallToAction, ContentSchema, ImageRef};
use crate::domain::types::ContentKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeConfig {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub image: ImageRef,
    pub highlights: Vec<Highlight>,
    pub cta: CallToAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Highlight {
    fn new(id: &str, text: &str, order: i64) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            order,
            is_active: Some(true),
        }
    }
}

impl Ordered for Highlight {
    fn order(&self) -> i64 {
        self.order
    }

    fn is_active(&self) -> bool {
        self.is_active != Some(false)
    }
}

impl ContentSchema for WelcomeConfig {
    const KIND: ContentKind = ContentKind::Welcome;

    fn default_config() -> Self {
        Self {
            title: "Welcome to our clinic".to_string(),
            subtitle: "Care you can trust".to_string(),
            description: "We combine experienced specialists with modern equipment to offer \
                          comfortable, transparent treatment."
                .to_string(),
            image: ImageRef::new("/images/welcome.jpg", "Clinic reception"),
            highlights: vec![
                Highlight::new("experience", "Over 20 years of experience", 1),
                Highlight::new("technology", "Digital diagnostics", 2),
                Highlight::new("comfort", "Patient-first approach", 3),
            ],
            cta: CallToAction::new("About us", "/about"),
        }
    }

    fn validate(raw: &Value) -> Self {
        let default = Self::default_config();
        let fields = Fields::new(raw);

        Self {
            title: fields.string("title", &default.title),
            subtitle: fields.string("subtitle", &default.subtitle),
            description: fields.string("description", &default.description),
            image: ImageRef::merge(fields.object("image"), &default.image),
            highlights: fields.list("highlights", &default.highlights),
            cta: CallToAction::merge(fields.object("cta"), &default.cta),
        }
    }
}
