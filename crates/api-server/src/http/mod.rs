use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use shared::assistant::{GeminiAssistant, ResponseGenerator};
use shared::config::{ApiKeyStatus, ConfigurationStatus};
use shared::repos::RecordStore;
use shared::search::SearchAggregator;

mod assistant;
mod conversations;
mod errors;
mod health;
mod questions;
mod search;

pub use conversations::ConversationRegistry;

#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<GeminiAssistant>,
    pub api_key_status: ApiKeyStatus,
    pub conversations: ConversationRegistry,
    pub search: SearchAggregator,
    pub store: Option<Arc<dyn RecordStore>>,
}

impl AppState {
    /// Wires the shared pieces together. The configuration gate is taken from the API key
    /// status once, here, and handed to every conversation.
    pub fn new(
        assistant: Arc<GeminiAssistant>,
        api_key_status: ApiKeyStatus,
        store: Option<Arc<dyn RecordStore>>,
    ) -> Self {
        let configuration = ConfigurationStatus::from(api_key_status);
        let generator: Arc<dyn ResponseGenerator> = assistant.clone();

        Self {
            assistant,
            api_key_status,
            conversations: ConversationRegistry::new(generator, configuration),
            search: SearchAggregator::new(store.clone()),
            store,
        }
    }
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/v1/assistant/status", get(assistant::get_status))
        .route("/v1/assistant/suggestions", get(assistant::list_suggestions))
        .route("/v1/blog/generate", post(assistant::generate_blog))
        .route(
            "/v1/conversations",
            post(conversations::create_conversation),
        )
        .route(
            "/v1/conversations/{conversation_id}",
            get(conversations::get_conversation),
        )
        .route(
            "/v1/conversations/{conversation_id}/messages",
            post(conversations::submit_message),
        )
        .route("/v1/search", get(search::search))
        .route(
            "/v1/questions",
            get(questions::list_questions).post(questions::create_question),
        )
        .route("/v1/questions/{question_id}", get(questions::get_question))
        .route(
            "/v1/questions/{question_id}/answers",
            get(questions::list_answers).post(questions::create_answer),
        )
        .route(
            "/v1/questions/{question_id}/best-answer",
            post(questions::mark_best_answer),
        )
        .route(
            "/v1/answers/{answer_id}/upvote",
            post(questions::upvote_answer),
        )
        .with_state(app_state)
}
