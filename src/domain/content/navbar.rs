use serde::Serialize;
use serde_json::Value;

use super::merge::Fields;
use super::{ContentSchema, ImageRef, NavLink};
use crate::domain::types::ContentKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavbarConfig {
    pub logo: NavLogo,
    pub about: NavGroup,
    pub treatments: NavGroup,
    pub links: Vec<NavLink>,
    pub contact: NavContact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavLogo {
    #[serde(flatten)]
    pub image: ImageRef,
    pub href: String,
}

/// A labelled dropdown of links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavGroup {
    pub label: String,
    pub items: Vec<NavLink>,
}

impl NavGroup {
    fn merge(fields: Fields<'_>, default: &NavGroup) -> Self {
        Self {
            label: fields.string("label", &default.label),
            items: fields.list("items", &default.items),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavContact {
    pub phone: String,
    pub email: String,
    pub cta_label: String,
    pub cta_href: String,
}

impl ContentSchema for NavbarConfig {
    const KIND: ContentKind = ContentKind::Navbar;

    fn default_config() -> Self {
        Self {
            logo: NavLogo {
                image: ImageRef::new("/images/logo.svg", "Clinic logo"),
                href: "/".to_string(),
            },
            about: NavGroup {
                label: "About".to_string(),
                items: vec![
                    NavLink::new("about-clinic", "Our Clinic", "/about", 1),
                    NavLink::new("about-team", "Our Team", "/about/team", 2),
                ],
            },
            treatments: NavGroup {
                label: "Treatments".to_string(),
                items: vec![NavLink::new(
                    "treatments-all",
                    "All Treatments",
                    "/treatments",
                    1,
                )],
            },
            links: vec![
                NavLink::new("home", "Home", "/", 1),
                NavLink::new("blog", "Blog", "/blog", 2),
                NavLink::new("contact", "Contact", "/contact", 3),
            ],
            contact: NavContact {
                phone: "+90 212 000 00 00".to_string(),
                email: "info@example.com".to_string(),
                cta_label: "Book an appointment".to_string(),
                cta_href: "/contact".to_string(),
            },
        }
    }

    fn validate(raw: &Value) -> Self {
        let default = Self::default_config();
        let fields = Fields::new(raw);
        let logo = fields.object("logo");
        let contact = fields.object("contact");

        Self {
            logo: NavLogo {
                image: ImageRef::merge(logo, &default.logo.image),
                href: logo.string("href", &default.logo.href),
            },
            about: NavGroup::merge(fields.object("about"), &default.about),
            treatments: NavGroup::merge(fields.object("treatments"), &default.treatments),
            links: fields.list("links", &default.links),
            contact: NavContact {
                phone: contact.string("phone", &default.contact.phone),
                email: contact.string("email", &default.contact.email),
                cta_label: contact.string("ctaLabel", &default.contact.cta_label),
                cta_href: contact.string("ctaHref", &default.contact.cta_href),
            },
        }
    }
}
