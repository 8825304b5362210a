use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::item::ResourceItem;

/// Filter selections made on a list screen.
///
/// A field is either present with a non-blank value or absent; setting a
/// blank value removes it.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct FilterState {
    values: BTreeMap<String, String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `value` for `field`, or clears the field when the value is
    /// missing or blank.
    pub fn set(&mut self, field: impl Into<String>, value: Option<String>) {
        let field = field.into();
        match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            Some(v) => {
                self.values.insert(field, v);
            }
            None => {
                self.values.remove(&field);
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keeps only the fields accepted by `keep`.
    pub fn retain(&self, mut keep: impl FnMut(&str) -> bool) -> FilterState {
        FilterState {
            values: self
                .values
                .iter()
                .filter(|(k, _)| keep(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// In-memory predicate: every selected field must equal the item's value,
    /// compared case-insensitively on the rendered text.
    pub fn matches(&self, item: &ResourceItem) -> bool {
        self.values.iter().all(|(field, expected)| {
            let actual = if field == "id" {
                item.id.as_str().to_string()
            } else {
                item.text(field)
            };
            actual.trim().eq_ignore_ascii_case(expected)
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut state = FilterState::new();
        for (k, v) in iter {
            state.set(k, Some(v.into()));
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: serde_json::Value) -> ResourceItem {
        ResourceItem::from_json(value).unwrap()
    }

    #[test]
    fn blank_values_clear_the_field() {
        let mut filters = FilterState::new();
        filters.set("client_id", Some("3".to_string()));
        filters.set("status", Some("   ".to_string()));
        assert_eq!(filters.get("client_id"), Some("3"));
        assert_eq!(filters.get("status"), None);

        filters.set("client_id", None);
        assert!(filters.is_empty());
    }

    #[test]
    fn matches_compares_rendered_values() {
        let filters: FilterState = [("member_status", "Active"), ("id", "4")]
            .into_iter()
            .collect();

        assert!(filters.matches(&item(json!({"id": 4, "member_status": "active"}))));
        assert!(!filters.matches(&item(json!({"id": 5, "member_status": "active"}))));
        assert!(FilterState::new().matches(&item(json!({"id": 1}))));
    }

    #[test]
    fn retain_keeps_selected_fields() {
        let filters: FilterState = [("a", "1"), ("b", "2")].into_iter().collect();
        let kept = filters.retain(|field| field == "b");
        assert_eq!(kept.iter().collect::<Vec<_>>(), vec![("b", "2")]);
    }
}
