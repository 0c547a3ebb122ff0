use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use shared::models::SearchResponse;

use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct SearchParams {
    #[serde(default)]
    q: String,
}

pub(super) async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let results = state.search.search(&params.q).await;

    (
        StatusCode::OK,
        Json(SearchResponse {
            query: params.q.trim().to_string(),
            results,
        }),
    )
}
