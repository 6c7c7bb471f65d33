//! Submission repository

use sqlx::{PgExecutor, PgPool};

use crate::{
    constants::MAX_PAGE_SIZE,
    error::AppResult,
    models::{Submission, SubmissionDetail, SubmissionSummary, SubmissionTestCase},
};

/// Repository for submission database operations
pub struct SubmissionRepository;

impl SubmissionRepository {
    /// Insert the submission summary row and return its id.
    ///
    /// Takes any executor so the grader can run it inside the same
    /// transaction as the per-test rows.
    #[allow(clippy::too_many_arguments)]
    pub async fn store_submission<'e>(
        executor: impl PgExecutor<'e>,
        user_id: i64,
        problem_id: i64,
        code: &str,
        language: &str,
        verdict: &str,
        passed: i32,
        total: i32,
        execution_time: f64,
        memory_used: i64,
        error_message: Option<&str>,
    ) -> AppResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO submissions
                (user_id, problem_id, code, language, verdict, passed, total,
                 execution_time, memory_used, error_message)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(problem_id)
        .bind(code)
        .bind(language)
        .bind(verdict)
        .bind(passed)
        .bind(total)
        .bind(execution_time)
        .bind(memory_used)
        .bind(error_message)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    /// Insert one per-test row for a stored submission
    #[allow(clippy::too_many_arguments)]
    pub async fn store_submission_testcase<'e>(
        executor: impl PgExecutor<'e>,
        submission_id: i64,
        testcase_id: i64,
        status: &str,
        execution_time: f64,
        memory_used: i64,
        output: &str,
        error_message: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO submission_testcases
                (submission_id, testcase_id, status, execution_time, memory_used,
                 output, error_message)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(submission_id)
        .bind(testcase_id)
        .bind(status)
        .bind(execution_time)
        .bind(memory_used)
        .bind(output)
        .bind(error_message)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Paginated submission history for one user, newest first
    pub async fn get_user_submissions(
        pool: &PgPool,
        user_id: i64,
        page: i64,
        page_size: i64,
    ) -> AppResult<(Vec<SubmissionSummary>, i64)> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1) * page_size;

        let submissions = sqlx::query_as::<_, SubmissionSummary>(
            r#"
            SELECT s.id, s.problem_id, p.title, p.slug, p.difficulty,
                   s.language, s.verdict, s.passed, s.total, s.execution_time, s.created_at
            FROM submissions s
            JOIN problems p ON s.problem_id = p.id
            WHERE s.user_id = $1
            ORDER BY s.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page_size)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM submissions WHERE user_id = $1"#)
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok((submissions, total))
    }

    /// Fetch one submission with its per-test rows in insertion order.
    /// When `user_id` is given, only that user's submission matches.
    pub async fn get_submission_detail(
        pool: &PgPool,
        submission_id: i64,
        user_id: Option<i64>,
    ) -> AppResult<Option<SubmissionDetail>> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            SELECT s.* FROM submissions s
            WHERE s.id = $1 AND ($2::bigint IS NULL OR s.user_id = $2)
            "#,
        )
        .bind(submission_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        let Some(submission) = submission else {
            return Ok(None);
        };

        let (title, slug): (String, String) =
            sqlx::query_as(r#"SELECT title, slug FROM problems WHERE id = $1"#)
                .bind(submission.problem_id)
                .fetch_one(pool)
                .await?;

        let testcases = sqlx::query_as::<_, SubmissionTestCase>(
            r#"
            SELECT * FROM submission_testcases
            WHERE submission_id = $1
            ORDER BY id
            "#,
        )
        .bind(submission_id)
        .fetch_all(pool)
        .await?;

        Ok(Some(SubmissionDetail {
            id: submission.id,
            user_id: submission.user_id,
            problem_id: submission.problem_id,
            title,
            slug,
            code: submission.code,
            language: submission.language,
            verdict: submission.verdict,
            passed: submission.passed,
            total: submission.total,
            execution_time: submission.execution_time,
            memory_used: submission.memory_used,
            error_message: submission.error_message,
            created_at: submission.created_at,
            testcases,
        }))
    }
}
