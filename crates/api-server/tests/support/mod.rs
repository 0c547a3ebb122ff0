#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use api_server::http::{AppState, build_router};
use axum::body::{Body, to_bytes};
use axum::extract::State;
use axum::http::{Method, Request, StatusCode, header};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{Value, json};
use shared::assistant::GeminiAssistant;
use shared::config::ApiKeyStatus;
use shared::llm::{GeminiGatewayConfig, RetryPolicy};
use shared::models::{
    Answer, NewAnswer, NewQuestion, Question, QuestionFilter, QuestionSort, QuestionStatus,
};
use shared::repos::{RecordStore, StoreError, StoreFuture};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, Notify, oneshot};
use tower::ServiceExt;
use uuid::Uuid;

pub struct JsonResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub async fn send_json(app: &Router, request: Request<Body>) -> JsonResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should succeed");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should read");
    let body = serde_json::from_slice::<Value>(&body).unwrap_or_else(|_| json!({}));

    JsonResponse { status, body }
}

pub fn request(method: Method, uri: &str, json_body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match json_body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    }
}

pub fn error_code(body: &Value) -> Option<&str> {
    body.get("error")
        .and_then(|error| error.get("code"))
        .and_then(Value::as_str)
}

pub fn unconfigured_router(store: Option<Arc<dyn RecordStore>>) -> Router {
    let assistant = GeminiAssistant::from_config(None).expect("assistant should build");
    build_router(AppState::new(
        Arc::new(assistant),
        ApiKeyStatus::from_value(Some("your_gemini_api_key_here")),
        store,
    ))
}

pub fn configured_router(gemini_base_url: String) -> Router {
    let assistant = GeminiAssistant::from_config(Some(GeminiGatewayConfig {
        api_base_url: gemini_base_url,
        api_key: "test-gemini-key".to_string(),
        model: "gemini-1.5-flash".to_string(),
        timeout_ms: 5_000,
    }))
    .expect("assistant should build")
    .with_retry_policy(RetryPolicy {
        max_attempts: 6,
        base_delay: std::time::Duration::from_millis(1),
    });

    build_router(AppState::new(
        Arc::new(assistant),
        ApiKeyStatus::from_value(Some("test-gemini-key")),
        None,
    ))
}

#[derive(Clone)]
pub struct MockGemini {
    replies: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    pub calls: Arc<Mutex<usize>>,
    pub gate: Option<Arc<Notify>>,
}

impl MockGemini {
    pub fn with_replies(replies: Vec<(StatusCode, Value)>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            calls: Arc::new(Mutex::new(0)),
            gate: None,
        }
    }

    pub fn gated(replies: Vec<(StatusCode, Value)>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::with_replies(replies)
        }
    }

    pub async fn call_count(&self) -> usize {
        *self.calls.lock().await
    }
}

pub fn gemini_text_reply(text: &str) -> (StatusCode, Value) {
    (
        StatusCode::OK,
        json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }],
            "modelVersion": "gemini-1.5-flash-002"
        }),
    )
}

pub fn gemini_error_reply(status: StatusCode, message: &str) -> (StatusCode, Value) {
    (
        status,
        json!({ "error": { "code": status.as_u16(), "message": message } }),
    )
}

pub async fn spawn_mock_gemini(
    mock: MockGemini,
) -> (String, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .fallback(mock_generate_content_handler)
        .with_state(mock);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let local_addr = listener
        .local_addr()
        .expect("listener address should resolve");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server_task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });

        server.await.expect("mock gemini should run");
    });

    (format!("http://{local_addr}/v1beta"), shutdown_tx, server_task)
}

async fn mock_generate_content_handler(
    State(mock): State<MockGemini>,
) -> (StatusCode, Json<Value>) {
    *mock.calls.lock().await += 1;
    if let Some(gate) = mock.gate.as_ref() {
        gate.notified().await;
    }

    let (status, body) = mock.replies.lock().await.pop_front().unwrap_or_else(|| {
        gemini_error_reply(StatusCode::INTERNAL_SERVER_ERROR, "no mock reply queued")
    });
    (status, Json(body))
}

/// In-memory record store mirroring the ordering rules of the hosted tables.
#[derive(Default)]
pub struct MemoryStore {
    questions: std::sync::Mutex<Vec<Question>>,
    answers: std::sync::Mutex<Vec<Answer>>,
}

impl MemoryStore {
    pub fn seed_question(&self, title: &str, content: &str, category: &str) -> Question {
        let question = Question {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            status: QuestionStatus::Open,
            upvotes: 0,
            created_at: Utc::now(),
        };
        self.questions
            .lock()
            .expect("questions lock")
            .push(question.clone());
        question
    }
}

impl RecordStore for MemoryStore {
    fn search_questions<'a>(
        &'a self,
        query: &'a str,
        limit: usize,
    ) -> StoreFuture<'a, Vec<Question>> {
        Box::pin(async move {
            let needle = query.to_lowercase();
            Ok(self
                .questions
                .lock()
                .expect("questions lock")
                .iter()
                .filter(|question| {
                    question.title.to_lowercase().contains(&needle)
                        || question.content.to_lowercase().contains(&needle)
                })
                .take(limit)
                .cloned()
                .collect())
        })
    }

    fn list_questions<'a>(&'a self, filter: &'a QuestionFilter) -> StoreFuture<'a, Vec<Question>> {
        Box::pin(async move {
            let mut questions = self
                .questions
                .lock()
                .expect("questions lock")
                .iter()
                .filter(|question| match filter.category.as_deref() {
                    Some(category) if !category.is_empty() && category != "all" => {
                        question.category == category
                    }
                    _ => true,
                })
                .filter(|question| {
                    filter.sort != QuestionSort::Unanswered
                        || question.status == QuestionStatus::Open
                })
                .cloned()
                .collect::<Vec<_>>();
            match filter.sort {
                QuestionSort::Popular => questions.sort_by(|a, b| b.upvotes.cmp(&a.upvotes)),
                _ => questions.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            }
            questions.truncate(20);
            Ok(questions)
        })
    }

    fn get_question<'a>(&'a self, question_id: Uuid) -> StoreFuture<'a, Question> {
        Box::pin(async move {
            self.questions
                .lock()
                .expect("questions lock")
                .iter()
                .find(|question| question.id == question_id)
                .cloned()
                .ok_or(StoreError::NotFound)
        })
    }

    fn insert_question<'a>(&'a self, question: NewQuestion) -> StoreFuture<'a, Question> {
        Box::pin(async move {
            let stored = Question {
                id: Uuid::new_v4(),
                user_id: question.user_id,
                title: question.title,
                content: question.content,
                category: question.category,
                status: question.status,
                upvotes: 0,
                created_at: Utc::now(),
            };
            self.questions
                .lock()
                .expect("questions lock")
                .push(stored.clone());
            Ok(stored)
        })
    }

    fn list_answers<'a>(&'a self, question_id: Uuid) -> StoreFuture<'a, Vec<Answer>> {
        Box::pin(async move {
            let mut answers = self
                .answers
                .lock()
                .expect("answers lock")
                .iter()
                .filter(|answer| answer.question_id == question_id)
                .cloned()
                .collect::<Vec<_>>();
            answers.sort_by(|a, b| {
                b.is_best_answer
                    .cmp(&a.is_best_answer)
                    .then(b.upvotes.cmp(&a.upvotes))
            });
            Ok(answers)
        })
    }

    fn insert_answer<'a>(&'a self, answer: NewAnswer) -> StoreFuture<'a, Answer> {
        Box::pin(async move {
            let stored = Answer {
                id: Uuid::new_v4(),
                question_id: answer.question_id,
                user_id: answer.user_id,
                content: answer.content.trim().to_string(),
                upvotes: 0,
                is_best_answer: false,
                created_at: Utc::now(),
            };
            self.answers
                .lock()
                .expect("answers lock")
                .push(stored.clone());
            Ok(stored)
        })
    }

    fn upvote_answer<'a>(
        &'a self,
        answer_id: Uuid,
        current_upvotes: i64,
    ) -> StoreFuture<'a, Answer> {
        Box::pin(async move {
            let mut answers = self.answers.lock().expect("answers lock");
            let answer = answers
                .iter_mut()
                .find(|answer| answer.id == answer_id)
                .ok_or(StoreError::NotFound)?;
            answer.upvotes = current_upvotes + 1;
            Ok(answer.clone())
        })
    }

    fn mark_best_answer<'a>(
        &'a self,
        question_id: Uuid,
        answer_id: Uuid,
    ) -> StoreFuture<'a, Answer> {
        Box::pin(async move {
            let mut answers = self.answers.lock().expect("answers lock");
            for answer in answers
                .iter_mut()
                .filter(|answer| answer.question_id == question_id)
            {
                answer.is_best_answer = answer.id == answer_id;
            }
            answers
                .iter()
                .find(|answer| answer.id == answer_id && answer.question_id == question_id)
                .cloned()
                .ok_or(StoreError::NotFound)
        })
    }
}
