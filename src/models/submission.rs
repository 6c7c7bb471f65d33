//! Submission models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Submission database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub user_id: i64,
    pub problem_id: i64,
    /// JSON-serialized filename -> source mapping, exactly as graded
    #[serde(skip_serializing)]
    pub code: String,
    pub language: String,
    pub verdict: String,
    pub passed: i32,
    pub total: i32,
    pub execution_time: f64,
    pub memory_used: i64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Submission row for the paginated user history (joined with its problem)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub id: i64,
    pub problem_id: i64,
    pub title: String,
    pub slug: String,
    pub difficulty: Option<String>,
    pub language: String,
    pub verdict: String,
    pub passed: i32,
    pub total: i32,
    pub execution_time: f64,
    pub created_at: DateTime<Utc>,
}

/// Per-test row persisted alongside a submission
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SubmissionTestCase {
    pub id: i64,
    pub submission_id: i64,
    pub testcase_id: i64,
    pub status: String,
    pub execution_time: f64,
    pub memory_used: i64,
    pub output: Option<String>,
    pub error_message: Option<String>,
}

/// Submission detail (joined with problem title/slug and per-test rows)
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionDetail {
    pub id: i64,
    pub user_id: i64,
    pub problem_id: i64,
    pub title: String,
    pub slug: String,
    pub code: String,
    pub language: String,
    pub verdict: String,
    pub passed: i32,
    pub total: i32,
    pub execution_time: f64,
    pub memory_used: i64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub testcases: Vec<SubmissionTestCase>,
}
