//! Problem repository

use sqlx::PgPool;

use crate::{
    constants::MAX_PAGE_SIZE,
    error::AppResult,
    models::{Problem, ProblemDetail, ProblemSummary, TestCase},
};

/// Repository for problem database operations
pub struct ProblemRepository;

impl ProblemRepository {
    /// Fetch a public problem by slug, with its test cases attached in
    /// `(execution_order, id)` order.
    pub async fn fetch_problem_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> AppResult<Option<ProblemDetail>> {
        let problem = sqlx::query_as::<_, Problem>(
            r#"SELECT * FROM problems WHERE slug = $1 AND is_public = TRUE"#,
        )
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        let Some(problem) = problem else {
            return Ok(None);
        };

        let testcases = sqlx::query_as::<_, TestCase>(
            r#"
            SELECT id, problem_id, input_text, expected_output, is_hidden, execution_order
            FROM testcases
            WHERE problem_id = $1
            ORDER BY execution_order, id
            "#,
        )
        .bind(problem.id)
        .fetch_all(pool)
        .await?;

        let examples = decode_json_list(problem.id, "examples", problem.examples.as_deref());
        let constraints =
            decode_json_list(problem.id, "constraints", problem.constraints.as_deref());

        Ok(Some(ProblemDetail {
            problem,
            examples,
            constraints,
            testcases,
        }))
    }

    /// Paginated list of public problems, optionally filtered by
    /// difficulty and a title/slug search term.
    pub async fn fetch_problems_page(
        pool: &PgPool,
        page: i64,
        page_size: i64,
        difficulty: Option<&str>,
        search: Option<&str>,
    ) -> AppResult<(Vec<ProblemSummary>, i64)> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1) * page_size;
        let search_pattern = search
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let problems = sqlx::query_as::<_, ProblemSummary>(
            r#"
            SELECT id, title, slug, difficulty FROM problems
            WHERE is_public = TRUE
                AND ($1::text IS NULL OR difficulty = $1)
                AND ($2::text IS NULL OR title ILIKE $2 OR slug ILIKE $2)
            ORDER BY id
            OFFSET $3 LIMIT $4
            "#,
        )
        .bind(difficulty)
        .bind(&search_pattern)
        .bind(offset)
        .bind(page_size)
        .fetch_all(pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM problems
            WHERE is_public = TRUE
                AND ($1::text IS NULL OR difficulty = $1)
                AND ($2::text IS NULL OR title ILIKE $2 OR slug ILIKE $2)
            "#,
        )
        .bind(difficulty)
        .bind(&search_pattern)
        .fetch_one(pool)
        .await?;

        Ok((problems, total))
    }
}

/// Decode a JSON-encoded list column, substituting `[]` for anything
/// malformed so one bad row can't break the problem endpoint.
fn decode_json_list(problem_id: i64, field: &str, raw: Option<&str>) -> Vec<serde_json::Value> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(_) | Err(_) => {
            tracing::warn!(problem_id, field, "could not decode JSON list; substituting []");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_json_list_valid() {
        let items = decode_json_list(1, "examples", Some(r#"[{"input":"1"},{"input":"2"}]"#));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["input"], "1");
    }

    #[test]
    fn test_decode_json_list_tolerates_malformed() {
        assert!(decode_json_list(1, "examples", Some("{not json")).is_empty());
        assert!(decode_json_list(1, "examples", Some(r#"{"a":1}"#)).is_empty());
        assert!(decode_json_list(1, "examples", Some("")).is_empty());
        assert!(decode_json_list(1, "examples", None).is_empty());
    }
}
