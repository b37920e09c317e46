//! Field-by-field reconciliation of a backend payload with a default value.
//!
//! Scalars and strings are taken from the payload only when present with the
//! expected JSON type. Lists are parsed entry by entry, dropping malformed and
//! inactive entries, then stably sorted by their `order` key.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

/// List entries that carry an explicit sort key and an optional active flag.
pub trait Ordered {
    /// Sort key; a missing `order` deserializes to `0`.
    fn order(&self) -> i64;

    /// Only an explicit `isActive: false` deactivates an entry.
    fn is_active(&self) -> bool;
}

/// Keep active entries and sort them ascending by `order`, preserving the
/// original relative position of entries with equal keys.
pub fn active_sorted<T: Ordered>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut items: Vec<T> = items.into_iter().filter(|item| item.is_active()).collect();
    items.sort_by_key(|item| item.order());
    items
}

/// Read-only view over one JSON object of the payload.
///
/// A non-object (or absent) value behaves like an empty object, so every
/// accessor falls back to its default.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    raw: Option<&'a Map<String, Value>>,
}

impl<'a> Fields<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self {
            raw: raw.as_object(),
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.raw.and_then(|map| map.get(key))
    }

    pub fn string(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(Value::String(value)) => value.clone(),
            _ => default.to_string(),
        }
    }

    pub fn bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn u64(&self, key: &str, default: u64) -> u64 {
        self.get(key).and_then(Value::as_u64).unwrap_or(default)
    }

    pub fn f64(&self, key: &str, default: f64) -> f64 {
        self.get(key)
            .and_then(Value::as_f64)
            .filter(|value| value.is_finite())
            .unwrap_or(default)
    }

    /// Nested object; missing or mistyped values yield an empty view.
    pub fn object(&self, key: &str) -> Fields<'a> {
        Fields {
            raw: self.get(key).and_then(Value::as_object),
        }
    }

    /// Raw array entries under `key`, if the payload carries an array there.
    pub fn entries(&self, key: &str) -> Option<&'a [Value]> {
        match self.get(key) {
            Some(Value::Array(items)) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Parse the list under `key`, or reuse `default` when the payload has no
    /// array there. Either way the result is filtered and sorted.
    pub fn list<T>(&self, key: &str, default: &[T]) -> Vec<T>
    where
        T: Ordered + DeserializeOwned + Clone,
    {
        match self.entries(key) {
            Some(items) => active_sorted(parse_entries(key, items)),
            None => active_sorted(default.iter().cloned()),
        }
    }
}

/// Deserialize each entry on its own so one malformed entry does not discard
/// the rest of the list.
pub fn parse_entries<T: DeserializeOwned>(key: &str, items: &[Value]) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| parse_entry(key, index, item))
        .collect()
}

/// One list entry; `None` (logged) when it does not deserialize.
pub fn parse_entry<T: DeserializeOwned>(key: &str, index: usize, item: &Value) -> Option<T> {
    match T::deserialize(item) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            debug!(
                field = key,
                index,
                error = %err,
                "dropping malformed list entry"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Entry {
        id: String,
        #[serde(default)]
        order: i64,
        #[serde(default)]
        is_active: Option<bool>,
    }

    impl Ordered for Entry {
        fn order(&self) -> i64 {
            self.order
        }

        fn is_active(&self) -> bool {
            self.is_active != Some(false)
        }
    }

    fn ids(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.id.as_str()).collect()
    }

    #[test]
    fn inactive_entries_are_dropped_regardless_of_order() {
        let raw = json!({
            "items": [
                {"id": "a", "order": 2, "isActive": true},
                {"id": "b", "order": 1, "isActive": false},
                {"id": "c", "order": 1, "isActive": true}
            ]
        });

        let entries: Vec<Entry> = Fields::new(&raw).list("items", &[]);
        assert_eq!(ids(&entries), ["c", "a"]);
    }

    #[test]
    fn equal_orders_keep_their_original_sequence() {
        let raw = json!({
            "items": [
                {"id": "first", "order": 5},
                {"id": "second", "order": 5},
                {"id": "early"},
                {"id": "third", "order": 5}
            ]
        });

        let entries: Vec<Entry> = Fields::new(&raw).list("items", &[]);
        assert_eq!(ids(&entries), ["early", "first", "second", "third"]);
    }

    #[test]
    fn missing_list_uses_default() {
        let default = vec![Entry {
            id: "fallback".to_string(),
            order: 0,
            is_active: None,
        }];

        let entries: Vec<Entry> = Fields::new(&json!({})).list("items", &default);
        assert_eq!(entries, default);

        let entries: Vec<Entry> =
            Fields::new(&json!({"items": "not-a-list"})).list("items", &default);
        assert_eq!(entries, default);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let raw = json!({"items": [{"order": 1}, {"id": "ok", "order": 2}, 7]});
        let entries: Vec<Entry> = Fields::new(&raw).list("items", &[]);
        assert_eq!(ids(&entries), ["ok"]);
    }

    #[test]
    fn scalars_fall_back_on_wrong_type() {
        let raw = json!({"title": 42, "enabled": "yes", "zoom": 12, "ratio": "x"});
        let fields = Fields::new(&raw);
        assert_eq!(fields.string("title", "Default"), "Default");
        assert!(fields.bool("enabled", true));
        assert_eq!(fields.u64("zoom", 3), 12);
        assert_eq!(fields.f64("ratio", 1.5), 1.5);
    }

    #[test]
    fn non_object_payload_behaves_like_empty_object() {
        let raw = json!(["unexpected"]);
        let fields = Fields::new(&raw);
        assert_eq!(fields.string("title", "Default"), "Default");
        assert_eq!(fields.object("nested").string("label", "x"), "x");
    }
}
