use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::merge::{Fields, Ordered};
use super::{CallToAction, ContentSchema};
use crate::domain::types::ContentKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentsConfig {
    pub title: String,
    pub subtitle: String,
    pub items: Vec<Treatment>,
    pub view_all: CallToAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub href: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Treatment {
    fn new(id: &str, title: &str, description: &str, icon: &str, order: i64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            href: format!("/treatments/{id}"),
            order,
            is_active: Some(true),
        }
    }
}

impl Ordered for Treatment {
    fn order(&self) -> i64 {
        self.order
    }

    fn is_active(&self) -> bool {
        self.is_active != Some(false)
    }
}

impl ContentSchema for TreatmentsConfig {
    const KIND: ContentKind = ContentKind::Treatments;

    fn default_config() -> Self {
        Self {
            title: "Our Treatments".to_string(),
            subtitle: "Comprehensive care under one roof".to_string(),
            items: vec![
                Treatment::new(
                    "implants",
                    "Dental Implants",
                    "Permanent replacements for missing teeth.",
                    "implant",
                    1,
                ),
                Treatment::new(
                    "orthodontics",
                    "Orthodontics",
                    "Braces and clear aligners for every age.",
                    "aligner",
                    2,
                ),
                Treatment::new(
                    "whitening",
                    "Teeth Whitening",
                    "Safe, professional whitening.",
                    "sparkle",
                    3,
                ),
            ],
            view_all: CallToAction::new("View all treatments", "/treatments"),
        }
    }

    fn validate(raw: &Value) -> Self {
        let default = Self::default_config();
        let fields = Fields::new(raw);

        Self {
            title: fields.string("title", &default.title),
            subtitle: fields.string("subtitle", &default.subtitle),
            items: fields.list("items", &default.items),
            view_all: CallToAction::merge(fields.object("viewAll"), &default.view_all),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn items_keep_backend_order_for_ties() {
        let raw = json!({
            "items": [
                {"id": "b", "title": "B", "href": "/b", "order": 1},
                {"id": "a", "title": "A", "href": "/a", "order": 1},
                {"id": "c", "title": "C", "href": "/c", "order": 0}
            ]
        });

        let config = TreatmentsConfig::validate(&raw);
        let ids: Vec<&str> = config.items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }

    #[test]
    fn view_all_merges_per_field() {
        let raw = json!({"viewAll": {"href": "/tedaviler"}});
        let config = TreatmentsConfig::validate(&raw);
        assert_eq!(config.view_all.href, "/tedaviler");
        assert_eq!(config.view_all.label, "View all treatments");
    }
}
