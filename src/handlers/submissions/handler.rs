//! Run and submission handler implementations
//!
//! `/api/run` executes without persisting anything; `/api/submit` is the
//! full graded pipeline. Both validate the file set here, before any
//! sandbox exists.

use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    constants::{languages, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    db::repositories::{ProblemRepository, SubmissionRepository},
    error::{AppError, AppResult},
    judge::{GradedSubmission, SubmissionGrader},
    middleware::auth::{AuthenticatedUser, OptionalAuth},
    models::{ExecutionResult, SubmissionDetail, Verdict},
    state::AppState,
    utils::validation::{sanitize_input, truncate_sources, validate_files},
};

use super::{
    request::{ListSubmissionsQuery, RunRequest, SubmitRequest},
    response::{RunResponse, RunSingleResponse, SubmissionsListResponse},
};

/// Run code without persistence.
///
/// With stdin (or without a problem slug) this is a single engine call;
/// with a slug and no stdin it runs the problem's test cases using the
/// same comparison logic as grading.
pub async fn run_code(
    State(state): State<AppState>,
    OptionalAuth(_auth_user): OptionalAuth,
    Json(payload): Json<RunRequest>,
) -> AppResult<Json<RunResponse>> {
    let started = Instant::now();

    if !languages::ALL.contains(&payload.language.as_str()) {
        return Err(AppError::Validation("Unsupported language".to_string()));
    }
    validate_files(
        &payload.files,
        state.config().limits.max_file_size,
        state.config().limits.max_total_files_size,
    )
    .map_err(AppError::Validation)?;

    let files = truncate_sources(&payload.files);
    let stdin = sanitize_input(&payload.stdin);

    let mut wall_clock = state.config().execution.run_timeout_seconds;
    let mut memory_limit = state.config().execution.memory_limit.clone();

    let problem = match payload.problem_slug.as_deref() {
        Some(slug) => {
            let problem = ProblemRepository::fetch_problem_by_slug(state.db(), slug).await?;
            if let Some(problem) = &problem {
                wall_clock = problem.time_limit(wall_clock);
                memory_limit = problem.memory_limit(&memory_limit).to_string();
            }
            problem
        }
        None => None,
    };

    if !stdin.is_empty() {
        let result = state
            .engine()
            .run(&files, &payload.language, &stdin, wall_clock, &memory_limit)
            .await;
        return Ok(Json(single_run_response(&result, elapsed(started))));
    }

    if let Some(problem) = problem {
        let grader = SubmissionGrader::new(state.engine(), state.db(), state.config());
        let mut result = grader.run_tests(&problem, &files, &payload.language).await;
        result.execution_time = elapsed(started);
        return Ok(Json(RunResponse::Tests(result)));
    }

    let result = state
        .engine()
        .run(&files, &payload.language, "", wall_clock, &memory_limit)
        .await;
    Ok(Json(single_run_response(&result, elapsed(started))))
}

/// Grade and persist a submission (auth required)
pub async fn submit(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<SubmitRequest>,
) -> AppResult<Json<GradedSubmission>> {
    let started = Instant::now();

    if !languages::ALL.contains(&payload.language.as_str()) {
        tracing::warn!(language = %payload.language, "submit rejected: unsupported language");
        return Err(AppError::Validation("Unsupported language".to_string()));
    }
    let Some(slug) = payload.problem_slug.as_deref().filter(|s| !s.is_empty()) else {
        return Err(AppError::Validation("Problem slug is required".to_string()));
    };
    validate_files(
        &payload.files,
        state.config().limits.max_file_size,
        state.config().limits.max_total_files_size,
    )
    .map_err(AppError::Validation)?;

    let problem = ProblemRepository::fetch_problem_by_slug(state.db(), slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Problem not found".to_string()))?;

    let files = truncate_sources(&payload.files);

    let grader = SubmissionGrader::new(state.engine(), state.db(), state.config());
    let mut result = grader
        .grade(auth_user.id, &problem, &files, &payload.language)
        .await?;
    result.execution_time = elapsed(started);

    Ok(Json(result))
}

/// Paginated submission history for the authenticated user
pub async fn list_submissions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListSubmissionsQuery>,
) -> AppResult<Json<SubmissionsListResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let (submissions, total) =
        SubmissionRepository::get_user_submissions(state.db(), auth_user.id, page, page_size)
            .await?;

    Ok(Json(SubmissionsListResponse {
        submissions,
        total,
        page,
        page_size,
        total_pages: (total + page_size - 1) / page_size,
    }))
}

/// Fetch one of the authenticated user's submissions with per-test rows
pub async fn get_submission(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<SubmissionDetail>> {
    let detail = SubmissionRepository::get_submission_detail(state.db(), id, Some(auth_user.id))
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

    Ok(Json(detail))
}

/// Shape a single engine result for the `/api/run` response
fn single_run_response(result: &ExecutionResult, execution_time: f64) -> RunResponse {
    let verdict = if result.is_internal() {
        Verdict::InternalError
    } else if result.error_message().is_some() {
        Verdict::RuntimeError
    } else {
        Verdict::Accepted
    };

    RunResponse::Single(RunSingleResponse {
        compiled: result.compiled,
        output: result.output().to_string(),
        error: result.error_message(),
        verdict,
        execution_time,
    })
}

fn elapsed(started: Instant) -> f64 {
    (started.elapsed().as_secs_f64() * 1000.0).round() / 1000.0
}
