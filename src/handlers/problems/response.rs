//! Problem response types

use serde::Serialize;

use crate::models::{ProblemSummary, ProblemView};

/// Paginated problem list
#[derive(Debug, Serialize)]
pub struct ProblemsListResponse {
    pub problems: Vec<ProblemSummary>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// Single problem payload
#[derive(Debug, Serialize)]
pub struct ProblemResponse {
    pub problem: ProblemView,
}
