//! Test case model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Test case database model
///
/// Test cases run in `(execution_order, id)` order. Hidden cases are
/// redacted in every user-facing payload.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestCase {
    pub id: i64,
    pub problem_id: i64,
    pub input_text: String,
    pub expected_output: String,
    pub is_hidden: bool,
    pub execution_order: i32,
}

/// Test case as exposed on the public problem payload.
///
/// Hidden cases carry only their id and order; input and expected output
/// are stripped before serialization.
#[derive(Debug, Clone, Serialize)]
pub struct TestCaseView {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    pub is_hidden: bool,
    pub execution_order: i32,
}

impl From<&TestCase> for TestCaseView {
    fn from(tc: &TestCase) -> Self {
        if tc.is_hidden {
            Self {
                id: tc.id,
                input_text: None,
                expected_output: None,
                is_hidden: true,
                execution_order: tc.execution_order,
            }
        } else {
            Self {
                id: tc.id,
                input_text: Some(tc.input_text.clone()),
                expected_output: Some(tc.expected_output.clone()),
                is_hidden: false,
                execution_order: tc.execution_order,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(hidden: bool) -> TestCase {
        TestCase {
            id: 7,
            problem_id: 1,
            input_text: "secret in".to_string(),
            expected_output: "secret out".to_string(),
            is_hidden: hidden,
            execution_order: 2,
        }
    }

    #[test]
    fn test_hidden_case_strips_payload() {
        let view = TestCaseView::from(&case(true));
        assert_eq!(view.id, 7);
        assert!(view.input_text.is_none());
        assert!(view.expected_output.is_none());

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_visible_case_keeps_payload() {
        let view = TestCaseView::from(&case(false));
        assert_eq!(view.input_text.as_deref(), Some("secret in"));
        assert_eq!(view.expected_output.as_deref(), Some("secret out"));
    }
}
