use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};

use crate::domain::types::ResourceId;

/// A record of any resource, cached read-only from the last fetch.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ResourceItem {
    pub id: ResourceId,
    /// Every other attribute the API returned, keyed by its wire name.
    pub fields: Map<String, Value>,
}

impl ResourceItem {
    pub fn new(id: ResourceId, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    /// Splits a JSON object into the id and the remaining attributes.
    pub fn from_json(value: Value) -> Result<Self, String> {
        let Value::Object(mut fields) = value else {
            return Err("record is not a JSON object".to_string());
        };
        let raw_id = fields
            .remove("id")
            .ok_or_else(|| "record has no id".to_string())?;
        let id = ResourceId::from_json(&raw_id).map_err(|e| e.to_string())?;
        Ok(Self { id, fields })
    }

    /// Looks a field up, following dots into nested objects
    /// (`client.name`).
    pub fn field(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.fields.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Field rendered as plain text; absent and null fields render empty.
    pub fn text(&self, path: &str) -> String {
        self.field(path).map(value_to_text).unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for ResourceItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ResourceItem::from_json(value).map_err(de::Error::custom)
    }
}

/// Renders a JSON value the way an operator expects to read it. Lists of
/// related records (`roles`) render as their names.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(values) => values
            .iter()
            .map(|v| match v {
                Value::Object(map) => map
                    .get("name")
                    .or_else(|| map.get("label"))
                    .map(value_to_text)
                    .unwrap_or_else(|| v.to_string()),
                other => value_to_text(other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}
