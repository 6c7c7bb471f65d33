//! Problem request types

use serde::Deserialize;

/// Query parameters for the paginated problem list
#[derive(Debug, Deserialize)]
pub struct ListProblemsQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub difficulty: Option<String>,
    pub search: Option<String>,
}
