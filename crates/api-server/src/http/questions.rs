use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{
    CreateAnswerRequest, CreateQuestionRequest, MarkBestAnswerRequest, NewAnswer, NewQuestion,
    QuestionFilter, QuestionStatus, UpvoteAnswerRequest,
};
use shared::repos::RecordStore;
use uuid::Uuid;

use super::AppState;
use super::errors::{bad_request_response, community_unavailable_response, store_error_response};

fn require_store(state: &AppState) -> Result<Arc<dyn RecordStore>, Response> {
    state
        .store
        .clone()
        .ok_or_else(community_unavailable_response)
}

pub(super) async fn list_questions(
    State(state): State<AppState>,
    Query(filter): Query<QuestionFilter>,
) -> Response {
    let store = match require_store(&state) {
        Ok(store) => store,
        Err(response) => return response,
    };

    match store.list_questions(&filter).await {
        Ok(questions) => (StatusCode::OK, Json(questions)).into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn get_question(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
) -> Response {
    let store = match require_store(&state) {
        Ok(store) => store,
        Err(response) => return response,
    };

    match store.get_question(question_id).await {
        Ok(question) => (StatusCode::OK, Json(question)).into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn create_question(
    State(state): State<AppState>,
    Json(req): Json<CreateQuestionRequest>,
) -> Response {
    let store = match require_store(&state) {
        Ok(store) => store,
        Err(response) => return response,
    };

    let title = req.title.trim();
    let content = req.content.trim();
    let category = req.category.trim();
    if title.is_empty() || content.is_empty() || category.is_empty() {
        return bad_request_response(
            "invalid_question",
            "Title, content and category are required",
        );
    }

    let new_question = NewQuestion {
        user_id: req.user_id,
        title: title.to_string(),
        content: content.to_string(),
        category: category.to_string(),
        status: QuestionStatus::Open,
    };
    match store.insert_question(new_question).await {
        Ok(question) => (StatusCode::CREATED, Json(question)).into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn list_answers(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
) -> Response {
    let store = match require_store(&state) {
        Ok(store) => store,
        Err(response) => return response,
    };

    match store.list_answers(question_id).await {
        Ok(answers) => (StatusCode::OK, Json(answers)).into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn create_answer(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
    Json(req): Json<CreateAnswerRequest>,
) -> Response {
    let store = match require_store(&state) {
        Ok(store) => store,
        Err(response) => return response,
    };

    if req.content.trim().is_empty() {
        return bad_request_response("invalid_answer", "Answer content is required");
    }

    let new_answer = NewAnswer {
        question_id,
        user_id: req.user_id,
        content: req.content,
    };
    match store.insert_answer(new_answer).await {
        Ok(answer) => (StatusCode::CREATED, Json(answer)).into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn upvote_answer(
    State(state): State<AppState>,
    Path(answer_id): Path<Uuid>,
    Json(req): Json<UpvoteAnswerRequest>,
) -> Response {
    let store = match require_store(&state) {
        Ok(store) => store,
        Err(response) => return response,
    };

    match store.upvote_answer(answer_id, req.current_upvotes).await {
        Ok(answer) => (StatusCode::OK, Json(answer)).into_response(),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn mark_best_answer(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
    Json(req): Json<MarkBestAnswerRequest>,
) -> Response {
    let store = match require_store(&state) {
        Ok(store) => store,
        Err(response) => return response,
    };

    match store.mark_best_answer(question_id, req.answer_id).await {
        Ok(answer) => (StatusCode::OK, Json(answer)).into_response(),
        Err(err) => store_error_response(err),
    }
}
