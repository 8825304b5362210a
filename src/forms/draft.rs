//! Working copy of a create/update form.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use validator::{ValidateEmail, ValidateUrl};

use crate::domain::item::{ResourceItem, value_to_text};
use crate::domain::types::ResourceId;
use crate::forms::FormError;
use crate::resources::{FieldKind, FieldSpec, ResourceDescriptor};

/// Unsaved edits of one record. A draft without an id creates a record.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct DraftState {
    pub id: Option<ResourceId>,
    values: BTreeMap<String, String>,
    failed_uploads: BTreeSet<String>,
}

impl DraftState {
    /// Blank draft for the create form.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Draft pre-filled from a cached record. File references go through
    /// `file_url` so the form can show the current file directly.
    pub fn from_item(
        item: &ResourceItem,
        descriptor: &ResourceDescriptor,
        file_url: impl Fn(&str) -> String,
    ) -> Self {
        let mut draft = DraftState {
            id: Some(item.id.clone()),
            ..DraftState::default()
        };

        for spec in descriptor.form_fields() {
            if spec.kind == FieldKind::Password {
                continue;
            }
            let value = match spec.kind {
                FieldKind::MultiSelect => multi_select_value(item, spec.name),
                FieldKind::File => {
                    let raw = item.text(spec.name);
                    if raw.trim().is_empty() {
                        raw
                    } else {
                        file_url(raw.trim())
                    }
                }
                FieldKind::Date => date_part(&item.text(spec.name)).to_string(),
                _ => item.text(spec.name),
            };
            draft.set(spec.name, value);
        }

        draft
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        self.failed_uploads.remove(&field);
        self.values.insert(field, value.into());
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Remembers that the file picked for `field` never reached the server.
    pub fn mark_upload_failed(&mut self, field: impl Into<String>) {
        self.failed_uploads.insert(field.into());
    }

    pub fn has_failed_upload(&self) -> bool {
        !self.failed_uploads.is_empty()
    }

    /// Parses a numeric field; blank values are `None`.
    pub fn number(&self, field: &str) -> Result<Option<f64>, FormError> {
        match self.get(field).map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Some)
                .ok_or_else(|| FormError::InvalidNumber(field.to_string())),
        }
    }

    fn filled(&self, field: &str) -> Option<&str> {
        self.get(field).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Checks required fields and value syntax against the descriptor.
    pub fn validate(&self, descriptor: &ResourceDescriptor) -> Result<(), FormError> {
        if let Some(field) = self.failed_uploads.iter().next() {
            return Err(FormError::UploadFailed(field.clone()));
        }

        for spec in descriptor.form_fields() {
            let Some(value) = self.filled(spec.name) else {
                if spec.is_required(self.is_new()) {
                    return Err(FormError::MissingField(spec.label.to_string()));
                }
                continue;
            };

            match spec.kind {
                FieldKind::Number => {
                    self.number(spec.name)
                        .map_err(|_| FormError::InvalidNumber(spec.label.to_string()))?;
                }
                FieldKind::Date => {
                    NaiveDate::parse_from_str(value, "%Y-%m-%d")
                        .map_err(|_| FormError::InvalidDate(spec.label.to_string()))?;
                }
                FieldKind::Email if !value.validate_email() => {
                    return Err(FormError::InvalidEmail(spec.label.to_string()));
                }
                FieldKind::Url if !value.validate_url() => {
                    return Err(FormError::InvalidUrl(spec.label.to_string()));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Typed JSON payload for the create/update call. The id is not part of
    /// it; the gateway adds it for updates.
    pub fn into_payload(self, descriptor: &ResourceDescriptor) -> Map<String, Value> {
        let creating = self.is_new();
        let mut payload = Map::new();
        let mut values = self.values;

        for spec in descriptor.form_fields() {
            let raw = values.remove(spec.name).unwrap_or_default();
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                if !creating && spec.kind != FieldKind::Password && spec.editable {
                    payload.insert(spec.name.to_string(), Value::Null);
                }
                continue;
            }

            payload.insert(spec.name.to_string(), typed_value(spec, trimmed));
        }

        // Values a preparation hook derived outside the field schema.
        for (name, raw) in values {
            if descriptor.field(&name).is_some_and(|spec| spec.form) {
                continue;
            }
            payload.insert(name, scalar(raw.trim()));
        }

        payload
    }
}

fn typed_value(spec: &FieldSpec, raw: &str) -> Value {
    match spec.kind {
        FieldKind::Number | FieldKind::Select => scalar(raw),
        FieldKind::MultiSelect => Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(scalar)
                .collect(),
        ),
        FieldKind::TextArea => Value::String(ammonia::clean(raw)),
        _ => Value::String(raw.to_string()),
    }
}

/// Numbers stay numbers on the wire; anything else is sent as text.
fn scalar(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => Value::from(n),
        _ => Value::String(raw.to_string()),
    }
}

/// `role_ids` may be absent from the row while `roles` carries the records.
fn multi_select_value(item: &ResourceItem, name: &str) -> String {
    let related = name.strip_suffix("_ids").map(|stem| format!("{stem}s"));
    let value = item
        .field(name)
        .or_else(|| related.as_deref().and_then(|r| item.field(r)));

    match value {
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| match v {
                Value::Object(map) => map.get("id").map(value_to_text).unwrap_or_default(),
                other => value_to_text(other),
            })
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(","),
        Some(other) => value_to_text(other),
        None => String::new(),
    }
}

/// `2024-05-01 10:00:00` and `2024-05-01T10:00:00Z` both become `2024-05-01`.
fn date_part(raw: &str) -> &str {
    let raw = raw.trim();
    match raw.get(..10) {
        Some(date) if raw.len() > 10 && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok() => {
            date
        }
        _ => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::catalog::{EVENTS, ORDERS, USERS};
    use serde_json::json;

    fn event_item() -> ResourceItem {
        ResourceItem::from_json(json!({
            "id": 5,
            "title": "Spring concert",
            "artist": "Band",
            "date": "2024-05-01 18:00:00",
            "file_path": "uploads/modules/events/poster.png",
        }))
        .unwrap()
    }

    #[test]
    fn from_item_rewrites_files_and_dates() {
        let draft = DraftState::from_item(&event_item(), &EVENTS, |path| {
            format!("https://api.example.com/{path}")
        });

        assert_eq!(draft.id.as_ref().map(ResourceId::as_str), Some("5"));
        assert_eq!(draft.get("date"), Some("2024-05-01"));
        assert_eq!(
            draft.get("file_path"),
            Some("https://api.example.com/uploads/modules/events/poster.png")
        );
        assert_eq!(draft.get("location"), Some(""));
    }

    #[test]
    fn from_item_collects_related_ids_for_multi_selects() {
        let user = ResourceItem::from_json(json!({
            "id": 2,
            "name": "Karim",
            "email": "karim@example.com",
            "roles": [{"id": 1, "name": "Admin"}, {"id": 4, "name": "Editor"}],
        }))
        .unwrap();

        let draft = DraftState::from_item(&user, &USERS, str::to_string);

        assert_eq!(draft.get("role_ids"), Some("1,4"));
        assert_eq!(draft.get("password"), None);
    }

    #[test]
    fn validate_reports_missing_required_field() {
        let mut draft = DraftState::empty();
        draft.set("title", "Concert");

        assert!(matches!(
            draft.validate(&EVENTS),
            Err(FormError::MissingField(field)) if field == "Date"
        ));
    }

    #[test]
    fn validate_checks_value_syntax() {
        let mut draft = DraftState::empty();
        draft.set("title", "Concert");
        draft.set("date", "01/05/2024");
        assert!(matches!(draft.validate(&EVENTS), Err(FormError::InvalidDate(_))));

        let mut user = DraftState::empty();
        user.set("name", "Karim");
        user.set("email", "not-an-email");
        user.set("password", "secret");
        assert!(matches!(user.validate(&USERS), Err(FormError::InvalidEmail(_))));
    }

    #[test]
    fn password_is_only_required_on_create() {
        let mut draft = DraftState::empty();
        draft.set("name", "Karim");
        draft.set("email", "karim@example.com");
        assert!(matches!(
            draft.validate(&USERS),
            Err(FormError::MissingField(field)) if field == "Password"
        ));

        draft.id = Some(ResourceId::new("2").unwrap());
        assert!(draft.validate(&USERS).is_ok());
    }

    #[test]
    fn failed_upload_blocks_validation_until_replaced() {
        let mut draft = DraftState::from_item(&event_item(), &EVENTS, str::to_string);
        draft.mark_upload_failed("file_path");
        assert!(matches!(draft.validate(&EVENTS), Err(FormError::UploadFailed(_))));

        draft.set("file_path", "uploads/modules/events/new.png");
        assert!(draft.validate(&EVENTS).is_ok());
    }

    #[test]
    fn payload_is_typed_per_field_kind() {
        let mut draft = DraftState::empty();
        draft.set("name", " Karim ");
        draft.set("email", "karim@example.com");
        draft.set("role_ids", "1, 4");
        draft.set("status", "1");
        draft.set("password", "secret");

        let payload = draft.into_payload(&USERS);

        assert_eq!(payload["name"], json!("Karim"));
        assert_eq!(payload["role_ids"], json!([1, 4]));
        assert_eq!(payload["status"], json!(1));
        assert!(!payload.contains_key("roles"));
    }

    #[test]
    fn update_payload_nulls_cleared_fields_but_keeps_derived_values() {
        let mut draft = DraftState {
            id: Some(ResourceId::new("9").unwrap()),
            ..DraftState::default()
        };
        draft.set("sub_total", "400");
        draft.set("paid_amount", "400");
        draft.set("order_status_id", "2");
        draft.set("due", "0");

        let payload = draft.into_payload(&ORDERS);

        assert_eq!(payload["delivery_charge"], Value::Null);
        assert_eq!(payload["due"], json!(0));
        assert_eq!(payload["paid_amount"], json!(400));
        assert!(!payload.contains_key("order_number"));
    }
}
