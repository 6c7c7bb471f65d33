//! Problem handler implementations

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    db::repositories::ProblemRepository,
    error::{AppError, AppResult},
    models::ProblemView,
    state::AppState,
};

use super::{
    request::ListProblemsQuery,
    response::{ProblemResponse, ProblemsListResponse},
};

/// List public problems (paginated)
pub async fn list_problems(
    State(state): State<AppState>,
    Query(query): Query<ListProblemsQuery>,
) -> AppResult<Json<ProblemsListResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let (problems, total) = ProblemRepository::fetch_problems_page(
        state.db(),
        page,
        page_size,
        query.difficulty.as_deref(),
        query.search.as_deref().map(str::trim),
    )
    .await?;

    Ok(Json(ProblemsListResponse {
        problems,
        total,
        page,
        page_size,
        total_pages: (total + page_size - 1) / page_size,
    }))
}

/// Fetch one public problem with its test cases.
///
/// Hidden test cases carry only their id and order; their input and
/// expected output never leave the server.
pub async fn get_problem(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ProblemResponse>> {
    let detail = ProblemRepository::fetch_problem_by_slug(state.db(), &slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Problem not found".to_string()))?;

    Ok(Json(ProblemResponse {
        problem: ProblemView::from(&detail),
    }))
}
