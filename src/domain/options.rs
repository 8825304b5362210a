use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::item::value_to_text;

/// One choice of a select or filter.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    /// Accepts `{value, label}`, `{id, name}` and bare scalars.
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                let value = map
                    .get("value")
                    .or_else(|| map.get("id"))
                    .map(value_to_text)
                    .filter(|v| !v.is_empty())?;
                let label = ["label", "name", "title", "order_number"]
                    .iter()
                    .find_map(|key| map.get(*key))
                    .map(value_to_text)
                    .unwrap_or_else(|| value.clone());
                Some(Self { value, label })
            }
            Value::Null | Value::Array(_) => None,
            scalar => {
                let text = value_to_text(scalar);
                Some(Self {
                    value: text.clone(),
                    label: text,
                })
            }
        }
    }
}

/// Option lists keyed by the name the filter-data endpoint gives them
/// (`client_list`, `order_status_list`, ...).
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct FilterOptions {
    lists: BTreeMap<String, Vec<SelectOption>>,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every array of the `data` object as an option list.
    pub fn from_data(data: &Map<String, Value>) -> Self {
        let lists = data
            .iter()
            .filter_map(|(key, value)| {
                let entries = value.as_array()?;
                Some((
                    key.clone(),
                    entries.iter().filter_map(SelectOption::from_json).collect(),
                ))
            })
            .collect();
        Self { lists }
    }

    /// Folds `other` in; lists already present are kept.
    pub fn merge(&mut self, other: FilterOptions) {
        for (key, list) in other.lists {
            self.lists.entry(key).or_insert(list);
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, list: Vec<SelectOption>) {
        self.lists.insert(key.into(), list);
    }

    pub fn get(&self, key: &str) -> &[SelectOption] {
        self.lists.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Label shown for a stored value, falling back to the value itself.
    pub fn label_for<'a>(&'a self, key: &str, value: &'a str) -> &'a str {
        self.get(key)
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.label.as_str())
            .unwrap_or(value)
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}
