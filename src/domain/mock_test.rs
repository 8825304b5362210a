use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::ResourceId;

/// A single mock test with the questions attached to it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MockTestDetail {
    pub id: ResourceId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub no_of_ques: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default, rename = "mock_test_ques")]
    pub questions: Vec<Question>,
}

/// One question row; option columns vary between imports so they are kept
/// as-is.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: ResourceId,
    #[serde(default, alias = "ques")]
    pub question: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_detail_with_questions() {
        let detail: MockTestDetail = serde_json::from_value(json!({
            "id": 3,
            "title": "BCS Preliminary",
            "desc": null,
            "mock_test_ques": [
                {"id": 11, "ques": "Capital of Bangladesh?", "option_a": "Dhaka"}
            ]
        }))
        .unwrap();

        assert_eq!(detail.id.as_str(), "3");
        assert_eq!(detail.questions.len(), 1);
        assert_eq!(
            detail.questions[0].question.as_deref(),
            Some("Capital of Bangladesh?")
        );
        assert_eq!(detail.questions[0].extra["option_a"], json!("Dhaka"));
    }
}
