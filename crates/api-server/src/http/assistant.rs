use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::conversation::SUGGESTED_QUESTIONS;
use shared::models::{
    AssistantStatusResponse, BlogGenerateRequest, BlogGenerateResponse, SuggestedQuestionsResponse,
};
use tracing::info;

use super::AppState;
use super::errors::bad_request_response;

pub(super) async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(AssistantStatusResponse {
            configured: state.api_key_status.configured,
            api_key: state.api_key_status,
        }),
    )
}

pub(super) async fn list_suggestions() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(SuggestedQuestionsResponse {
            questions: SUGGESTED_QUESTIONS
                .iter()
                .map(|question| question.to_string())
                .collect(),
        }),
    )
}

pub(super) async fn generate_blog(
    State(state): State<AppState>,
    Json(req): Json<BlogGenerateRequest>,
) -> Response {
    let topic = req.topic.trim();
    if topic.is_empty() {
        return bad_request_response("invalid_topic", "Topic must not be empty");
    }

    info!(topic, "generating blog content");
    let content = state.assistant.generate_blog_content(topic).await;

    (
        StatusCode::OK,
        Json(BlogGenerateResponse {
            topic: topic.to_string(),
            content,
        }),
    )
        .into_response()
}
