//! Problem model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::test_case::{TestCase, TestCaseView};

/// Problem database model
///
/// `examples` and `constraints` are JSON-encoded strings in the database;
/// the repository decodes them before the problem leaves the data layer.
#[derive(Debug, Clone, FromRow)]
pub struct Problem {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub statement: String,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub template_java: Option<String>,
    pub template_python: Option<String>,
    pub template_c: Option<String>,
    pub template_cpp: Option<String>,
    pub template_javascript: Option<String>,
    pub template_csharp: Option<String>,
    pub examples: Option<String>,
    pub constraints: Option<String>,
    /// Per-problem wall-clock override in seconds
    pub time_limit: Option<i32>,
    /// Per-problem memory override (docker-style size string)
    pub memory_limit: Option<String>,
    pub is_public: bool,
}

/// Problem row for the paginated list
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProblemSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub difficulty: Option<String>,
}

/// A public problem together with its ordered test cases and decoded
/// examples/constraints
#[derive(Debug, Clone)]
pub struct ProblemDetail {
    pub problem: Problem,
    pub examples: Vec<serde_json::Value>,
    pub constraints: Vec<serde_json::Value>,
    pub testcases: Vec<TestCase>,
}

impl ProblemDetail {
    /// Wall-clock limit for this problem, falling back to the service default
    pub fn time_limit(&self, default_seconds: u64) -> u64 {
        match self.problem.time_limit {
            Some(t) if t > 0 => t as u64,
            _ => default_seconds,
        }
    }

    /// Memory limit for this problem, falling back to the service default
    pub fn memory_limit<'a>(&'a self, default_limit: &'a str) -> &'a str {
        match self.problem.memory_limit.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => default_limit,
        }
    }
}

/// Problem payload returned by `GET /api/problem/{slug}`
#[derive(Debug, Serialize)]
pub struct ProblemView {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub statement: String,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub template_java: Option<String>,
    pub template_python: Option<String>,
    pub template_c: Option<String>,
    pub template_cpp: Option<String>,
    pub template_javascript: Option<String>,
    pub template_csharp: Option<String>,
    pub examples: Vec<serde_json::Value>,
    pub constraints: Vec<serde_json::Value>,
    pub time_limit: Option<i32>,
    pub memory_limit: Option<String>,
    pub testcases: Vec<TestCaseView>,
}

impl From<&ProblemDetail> for ProblemView {
    fn from(detail: &ProblemDetail) -> Self {
        let p = &detail.problem;
        Self {
            id: p.id,
            slug: p.slug.clone(),
            title: p.title.clone(),
            statement: p.statement.clone(),
            description: p.description.clone(),
            difficulty: p.difficulty.clone(),
            template_java: p.template_java.clone(),
            template_python: p.template_python.clone(),
            template_c: p.template_c.clone(),
            template_cpp: p.template_cpp.clone(),
            template_javascript: p.template_javascript.clone(),
            template_csharp: p.template_csharp.clone(),
            examples: detail.examples.clone(),
            constraints: detail.constraints.clone(),
            time_limit: p.time_limit,
            memory_limit: p.memory_limit.clone(),
            testcases: detail.testcases.iter().map(TestCaseView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(time_limit: Option<i32>, memory_limit: Option<&str>) -> ProblemDetail {
        ProblemDetail {
            problem: Problem {
                id: 1,
                slug: "two-sum".to_string(),
                title: "Two Sum".to_string(),
                statement: "".to_string(),
                description: None,
                difficulty: Some("easy".to_string()),
                template_java: None,
                template_python: None,
                template_c: None,
                template_cpp: None,
                template_javascript: None,
                template_csharp: None,
                examples: None,
                constraints: None,
                time_limit,
                memory_limit: memory_limit.map(String::from),
                is_public: true,
            },
            examples: vec![],
            constraints: vec![],
            testcases: vec![],
        }
    }

    #[test]
    fn test_limit_overrides() {
        assert_eq!(detail(Some(2), None).time_limit(15), 2);
        assert_eq!(detail(None, None).time_limit(15), 15);
        assert_eq!(detail(Some(0), None).time_limit(15), 15);

        let d = detail(None, Some("256m"));
        assert_eq!(d.memory_limit("512m"), "256m");
        assert_eq!(detail(None, None).memory_limit("512m"), "512m");
    }
}
