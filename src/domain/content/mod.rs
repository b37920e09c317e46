//! Typed configuration for every content kind, with its default value and
//! the rules that reconcile a backend payload against that default.

mod contact_map;
mod footer;
mod hero;
pub mod merge;
mod navbar;
mod treatments;
mod welcome;

pub use contact_map::{ContactMapConfig, MapLocation, WorkingHours};
pub use footer::{FooterColumn, FooterConfig, FooterContact, SocialLink};
pub use hero::{HeroConfig, HeroSlide};
pub use navbar::{NavContact, NavGroup, NavLogo, NavbarConfig};
pub use treatments::{Treatment, TreatmentsConfig};
pub use welcome::{Highlight, WelcomeConfig};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::ContentKind;
use merge::{Fields, Ordered};

/// Schema of one content kind.
///
/// `validate` must always produce a value satisfying the list invariants
/// (active entries only, ascending stable `order`), whatever the payload.
pub trait ContentSchema: Clone + Send + Sync + Serialize + 'static {
    const KIND: ContentKind;

    /// Literal fallback used whenever resolution fails.
    fn default_config() -> Self;

    /// Reconcile a possibly partial payload with [`ContentSchema::default_config`].
    fn validate(raw: &Value) -> Self;
}

/// A navigation link shared by the navbar and footer columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavLink {
    pub id: String,
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl NavLink {
    pub fn new(id: &str, label: &str, href: &str, order: i64) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            href: href.to_string(),
            order,
            is_active: Some(true),
        }
    }
}

impl Ordered for NavLink {
    fn order(&self) -> i64 {
        self.order
    }

    fn is_active(&self) -> bool {
        self.is_active != Some(false)
    }
}

/// An image reference with alternative text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub src: String,
    pub alt: String,
}

impl ImageRef {
    pub fn new(src: &str, alt: &str) -> Self {
        Self {
            src: src.to_string(),
            alt: alt.to_string(),
        }
    }

    fn merge(fields: Fields<'_>, default: &ImageRef) -> Self {
        Self {
            src: fields.string("src", &default.src),
            alt: fields.string("alt", &default.alt),
        }
    }
}

/// A labelled call-to-action link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToAction {
    pub label: String,
    pub href: String,
}

impl CallToAction {
    pub fn new(label: &str, href: &str) -> Self {
        Self {
            label: label.to_string(),
            href: href.to_string(),
        }
    }

    fn merge(fields: Fields<'_>, default: &CallToAction) -> Self {
        Self {
            label: fields.string("label", &default.label),
            href: fields.string("href", &default.href),
        }
    }
}
