//! Run and submission response types

use serde::Serialize;

use crate::{
    judge::GradedSubmission,
    models::{SubmissionSummary, Verdict},
};

/// `/api/run` response: either a single execution or a per-test report
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RunResponse {
    Single(RunSingleResponse),
    Tests(GradedSubmission),
}

/// Response for a single ephemeral run (stdin mode, or no problem slug)
#[derive(Debug, Serialize)]
pub struct RunSingleResponse {
    pub compiled: bool,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub verdict: Verdict,
    pub execution_time: f64,
}

/// Paginated submission history
#[derive(Debug, Serialize)]
pub struct SubmissionsListResponse {
    pub submissions: Vec<SubmissionSummary>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}
