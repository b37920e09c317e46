use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::merge::{Fields, Ordered};
use super::ContentSchema;
use crate::domain::types::ContentKind;

const MAX_ZOOM: u64 = 21;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMapConfig {
    pub title: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub map: MapLocation,
    pub working_hours: Vec<WorkingHours>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLocation {
    pub embed_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u64,
}

impl MapLocation {
    /// Coordinates outside the valid ranges are treated as absent.
    fn merge(fields: Fields<'_>, default: &MapLocation) -> Self {
        let latitude = fields.f64("latitude", default.latitude);
        let longitude = fields.f64("longitude", default.longitude);
        let zoom = fields.u64("zoom", default.zoom);

        Self {
            embed_url: fields.string("embedUrl", &default.embed_url),
            latitude: if (-90.0..=90.0).contains(&latitude) {
                latitude
            } else {
                default.latitude
            },
            longitude: if (-180.0..=180.0).contains(&longitude) {
                longitude
            } else {
                default.longitude
            },
            zoom: if (1..=MAX_ZOOM).contains(&zoom) {
                zoom
            } else {
                default.zoom
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    pub id: String,
    pub day: String,
    pub hours: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl WorkingHours {
    fn new(id: &str, day: &str, hours: &str, order: i64) -> Self {
        Self {
            id: id.to_string(),
            day: day.to_string(),
            hours: hours.to_string(),
            order,
            is_active: Some(true),
        }
    }
}

impl Ordered for WorkingHours {
    fn order(&self) -> i64 {
        self.order
    }

    fn is_active(&self) -> bool {
        self.is_active != Some(false)
    }
}

impl ContentSchema for ContactMapConfig {
    const KIND: ContentKind = ContentKind::ContactMap;

    fn default_config() -> Self {
        Self {
            title: "Visit us".to_string(),
            address: "Example Street 1, Istanbul".to_string(),
            phone: "+90 212 000 00 00".to_string(),
            email: "info@example.com".to_string(),
            map: MapLocation {
                embed_url: "https://www.google.com/maps/embed?pb=".to_string(),
                latitude: 41.0082,
                longitude: 28.9784,
                zoom: 15,
            },
            working_hours: vec![
                WorkingHours::new("weekdays", "Monday - Friday", "09:00 - 19:00", 1),
                WorkingHours::new("saturday", "Saturday", "10:00 - 16:00", 2),
            ],
        }
    }

    fn validate(raw: &Value) -> Self {
        let default = Self::default_config();
        let fields = Fields::new(raw);

        Self {
            title: fields.string("title", &default.title),
            address: fields.string("address", &default.address),
            phone: fields.string("phone", &default.phone),
            email: fields.string("email", &default.email),
            map: MapLocation::merge(fields.object("map"), &default.map),
            working_hours: fields.list("workingHours", &default.working_hours),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn out_of_range_coordinates_fall_back() {
        let raw = json!({"map": {"latitude": 123.0, "longitude": 29.1, "zoom": 40}});
        let config = ContactMapConfig::validate(&raw);
        let default = ContactMapConfig::default_config();

        assert_eq!(config.map.latitude, default.map.latitude);
        assert_eq!(config.map.longitude, 29.1);
        assert_eq!(config.map.zoom, default.map.zoom);
        assert_eq!(config.map.embed_url, default.map.embed_url);
    }

    #[test]
    fn working_hours_follow_list_rules() {
        let raw = json!({
            "workingHours": [
                {"id": "sun", "day": "Sunday", "hours": "closed", "order": 3, "isActive": false},
                {"id": "sat", "day": "Saturday", "hours": "10-14", "order": 2},
                {"id": "wd", "day": "Weekdays", "hours": "9-18", "order": 1}
            ]
        });

        let config = ContactMapConfig::validate(&raw);
        let ids: Vec<&str> = config.working_hours.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, ["wd", "sat"]);
    }
}
