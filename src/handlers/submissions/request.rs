//! Run and submission request types

use std::collections::BTreeMap;

use serde::Deserialize;

fn default_language() -> String {
    "java".to_string()
}

/// `/api/run` payload: ephemeral execution, optionally against a problem's
/// test cases
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub files: BTreeMap<String, String>,

    #[serde(default)]
    pub stdin: String,

    pub problem_slug: Option<String>,
}

/// `/api/submit` payload: graded, persisted submission
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub files: BTreeMap<String, String>,

    pub problem_slug: Option<String>,
}

/// Query parameters for the submission history
#[derive(Debug, Deserialize)]
pub struct ListSubmissionsQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}
