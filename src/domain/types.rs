//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (e.g., non-empty identifiers) so
//! that once a value reaches the domain layer it can be treated as trusted.
use std::fmt::{Display, Formatter};

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Opaque identifier of a remote record.
///
/// The remote API hands out numeric ids for most resources but nothing in
/// the console relies on that, so the id is kept as its textual form.
#[derive(Clone, Debug, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(String);

impl ResourceId {
    /// Creates a new identifier ensuring it is not blank.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            Err(TypeConstraintError::EmptyString)
        } else {
            Ok(Self(value))
        }
    }

    /// Builds an identifier from a JSON scalar (number or string).
    pub fn from_json(value: &serde_json::Value) -> Result<Self, TypeConstraintError> {
        match value {
            serde_json::Value::String(s) => Self::new(s.as_str()),
            serde_json::Value::Number(n) => Self::new(n.to_string()),
            other => Err(TypeConstraintError::InvalidValue(other.to_string())),
        }
    }

    /// Borrow the identifier as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier as it should travel in a JSON payload: numeric ids stay
    /// numbers so the remote API sees the same type it handed out.
    pub fn to_json(&self) -> serde_json::Value {
        match self.0.parse::<i64>() {
            Ok(n) => serde_json::Value::from(n),
            Err(_) => serde_json::Value::String(self.0.clone()),
        }
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ResourceId {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ResourceId {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        ResourceId::from_json(&value).map_err(de::Error::custom)
    }
}

/// Reference to a file stored by the remote API.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredFile {
    /// Path relative to the API root, without a leading slash.
    pub path: String,
    /// Absolute, directly fetchable URL of the file.
    pub url: String,
}

/// File picked by the operator, waiting to be uploaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// File name without its extension; the upload endpoint expects this as
    /// the `file_name` parameter.
    pub fn stem(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.file_name,
        }
    }
}

/// Deserializes an optional count that the API sometimes sends as a string.
pub(crate) fn lenient_usize<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientUsize;

    impl<'de> Visitor<'de> for LenientUsize {
        type Value = Option<usize>;

        fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str("a non-negative integer, a numeric string or null")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(usize::try_from(v).ok())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(usize::try_from(v).ok())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            if v.is_finite() && v >= 0.0 {
                Ok(Some(v as usize))
            } else {
                Ok(None)
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.trim().parse::<usize>().ok())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_option(LenientUsize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_id_rejects_blank_values() {
        assert_eq!(ResourceId::new("  "), Err(TypeConstraintError::EmptyString));
        assert_eq!(ResourceId::new(" 12 ").unwrap().as_str(), "12");
    }

    #[test]
    fn resource_id_accepts_numbers_and_strings() {
        let numeric: ResourceId = serde_json::from_value(json!(42)).unwrap();
        let textual: ResourceId = serde_json::from_value(json!("abc")).unwrap();

        assert_eq!(numeric.to_json(), json!(42));
        assert_eq!(textual.to_json(), json!("abc"));
        assert!(serde_json::from_value::<ResourceId>(json!(null)).is_err());
    }

    #[test]
    fn upload_file_stem_strips_last_extension() {
        let file = UploadFile {
            file_name: "banner.final.png".to_string(),
            content_type: None,
            bytes: vec![],
        };
        assert_eq!(file.stem(), "banner.final");

        let dotfile = UploadFile {
            file_name: ".env".to_string(),
            content_type: None,
            bytes: vec![],
        };
        assert_eq!(dotfile.stem(), ".env");
    }
}
