use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::merge::{Fields, Ordered, active_sorted, parse_entry};
use super::{ContentSchema, NavLink};
use crate::domain::types::ContentKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterConfig {
    pub description: String,
    pub columns: Vec<FooterColumn>,
    pub social: Vec<SocialLink>,
    pub contact: FooterContact,
    pub copyright: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterColumn {
    pub id: String,
    pub title: String,
    /// Filled from the payload link by link after the column itself parses.
    #[serde(default, skip_deserializing)]
    pub links: Vec<NavLink>,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Ordered for FooterColumn {
    fn order(&self) -> i64 {
        self.order
    }

    fn is_active(&self) -> bool {
        self.is_active != Some(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    pub id: String,
    pub platform: String,
    pub href: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl SocialLink {
    fn new(platform: &str, href: &str, order: i64) -> Self {
        Self {
            id: platform.to_string(),
            platform: platform.to_string(),
            href: href.to_string(),
            order,
            is_active: Some(true),
        }
    }
}

impl Ordered for SocialLink {
    fn order(&self) -> i64 {
        self.order
    }

    fn is_active(&self) -> bool {
        self.is_active != Some(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterContact {
    pub address: String,
    pub phone: String,
    pub email: String,
}

impl ContentSchema for FooterConfig {
    const KIND: ContentKind = ContentKind::Footer;

    fn default_config() -> Self {
        Self {
            description: "Modern dental care in the heart of the city.".to_string(),
            columns: vec![
                FooterColumn {
                    id: "clinic".to_string(),
                    title: "Clinic".to_string(),
                    links: vec![
                        NavLink::new("footer-about", "About", "/about", 1),
                        NavLink::new("footer-team", "Our Team", "/about/team", 2),
                        NavLink::new("footer-blog", "Blog", "/blog", 3),
                    ],
                    order: 1,
                    is_active: Some(true),
                },
                FooterColumn {
                    id: "treatments".to_string(),
                    title: "Treatments".to_string(),
                    links: vec![
                        NavLink::new("footer-implants", "Implants", "/treatments/implants", 1),
                        NavLink::new(
                            "footer-orthodontics",
                            "Orthodontics",
                            "/treatments/orthodontics",
                            2,
                        ),
                    ],
                    order: 2,
                    is_active: Some(true),
                },
            ],
            social: vec![
                SocialLink::new("instagram", "https://instagram.com/", 1),
                SocialLink::new("facebook", "https://facebook.com/", 2),
            ],
            contact: FooterContact {
                address: "Example Street 1, Istanbul".to_string(),
                phone: "+90 212 000 00 00".to_string(),
                email: "info@example.com".to_string(),
            },
            copyright: "© Clinic. All rights reserved.".to_string(),
        }
    }

    fn validate(raw: &Value) -> Self {
        let default = Self::default_config();
        let fields = Fields::new(raw);
        let contact = fields.object("contact");

        let columns = match fields.entries("columns") {
            Some(items) => active_sorted(items.iter().enumerate().filter_map(|(index, item)| {
                let mut column: FooterColumn = parse_entry("columns", index, item)?;
                column.links = Fields::new(item).list("links", &[]);
                Some(column)
            })),
            None => default.columns.clone(),
        };

        Self {
            description: fields.string("description", &default.description),
            columns,
            social: fields.list("social", &default.social),
            contact: FooterContact {
                address: contact.string("address", &default.contact.address),
                phone: contact.string("phone", &default.contact.phone),
                email: contact.string("email", &default.contact.email),
            },
            copyright: fields.string("copyright", &default.copyright),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn column_links_are_filtered_and_sorted() {
        let raw = json!({
            "columns": [
                {
                    "id": "second",
                    "title": "Second",
                    "order": 2,
                    "links": [
                        {"id": "z", "label": "Z", "href": "/z", "order": 2},
                        {"id": "gone", "label": "G", "href": "/g", "order": 1, "isActive": false},
                        {"id": "y", "label": "Y", "href": "/y", "order": 1}
                    ]
                },
                {"id": "first", "title": "First", "order": 1},
                {"id": "hidden", "title": "Hidden", "order": 0, "isActive": false}
            ]
        });

        let config = FooterConfig::validate(&raw);
        let columns: Vec<&str> = config.columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(columns, ["first", "second"]);

        let links: Vec<&str> = config.columns[1]
            .links
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(links, ["y", "z"]);
        assert!(config.columns[0].links.is_empty());
    }

    #[test]
    fn malformed_column_link_drops_only_that_link() {
        let raw = json!({
            "columns": [
                {
                    "id": "clinic",
                    "title": "Clinic",
                    "order": 1,
                    "links": [
                        {"id": "team", "label": "Team", "href": "/team", "order": 2},
                        {"label": "missing id"},
                        {"id": "about", "label": "About", "href": "/about", "order": 1}
                    ]
                },
                {"id": "good", "title": "Good", "order": 2, "links": "not a list"},
                {"title": "no id"}
            ]
        });

        let config = FooterConfig::validate(&raw);
        let columns: Vec<&str> = config.columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(columns, ["clinic", "good"]);

        let links: Vec<&str> = config.columns[0]
            .links
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(links, ["about", "team"]);
        assert!(config.columns[1].links.is_empty());
    }

    #[test]
    fn contact_and_copyright_merge_individually() {
        let raw = json!({"contact": {"email": "hello@klinik.test"}, "copyright": "© 2026"});
        let config = FooterConfig::validate(&raw);
        let default = FooterConfig::default_config();

        assert_eq!(config.contact.email, "hello@klinik.test");
        assert_eq!(config.contact.phone, default.contact.phone);
        assert_eq!(config.copyright, "© 2026");
        assert_eq!(config.social, default.social);
    }
}
