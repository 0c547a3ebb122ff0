use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::assistant::ResponseGenerator;
use shared::config::ConfigurationStatus;
use shared::conversation::{ConversationOrchestrator, SubmitOutcome};
use shared::models::{ConversationResponse, SubmitMessageRequest};
use tracing::{debug, error};
use uuid::Uuid;

use super::AppState;
use super::errors::{
    bad_request_response, conflict_response, internal_error_response, not_found_response,
};

/// Process-local conversations keyed by id. Entries are never evicted.
#[derive(Clone)]
pub struct ConversationRegistry {
    generator: Arc<dyn ResponseGenerator>,
    configuration: ConfigurationStatus,
    conversations: Arc<Mutex<HashMap<Uuid, Arc<ConversationOrchestrator>>>>,
}

impl ConversationRegistry {
    pub fn new(generator: Arc<dyn ResponseGenerator>, configuration: ConfigurationStatus) -> Self {
        Self {
            generator,
            configuration,
            conversations: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn open(&self) -> (Uuid, Arc<ConversationOrchestrator>) {
        let conversation_id = Uuid::new_v4();
        let conversation = Arc::new(ConversationOrchestrator::new(
            self.generator.clone(),
            self.configuration,
        ));
        self.lock().insert(conversation_id, conversation.clone());
        (conversation_id, conversation)
    }

    pub fn get(&self, conversation_id: Uuid) -> Option<Arc<ConversationOrchestrator>> {
        self.lock().get(&conversation_id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Arc<ConversationOrchestrator>>> {
        match self.conversations.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

pub(super) async fn create_conversation(State(state): State<AppState>) -> Response {
    let (conversation_id, conversation) = state.conversations.open();
    debug!(%conversation_id, "conversation opened");

    (
        StatusCode::CREATED,
        Json(ConversationResponse {
            conversation_id,
            conversation: conversation.snapshot(),
        }),
    )
        .into_response()
}

pub(super) async fn get_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
) -> Response {
    let Some(conversation) = state.conversations.get(conversation_id) else {
        return conversation_not_found();
    };

    (
        StatusCode::OK,
        Json(ConversationResponse {
            conversation_id,
            conversation: conversation.snapshot(),
        }),
    )
        .into_response()
}

pub(super) async fn submit_message(
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
    Json(req): Json<SubmitMessageRequest>,
) -> Response {
    let Some(conversation) = state.conversations.get(conversation_id) else {
        return conversation_not_found();
    };

    // Detached so a client disconnect cannot cut the exchange short.
    let submission = tokio::spawn({
        let conversation = conversation.clone();
        async move { conversation.submit(&req.text).await }
    });
    let outcome = match submission.await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(%conversation_id, "conversation submit task failed: {err}");
            return internal_error_response();
        }
    };

    match outcome {
        SubmitOutcome::IgnoredEmpty => {
            bad_request_response("empty_message", "Message text must not be empty")
        }
        SubmitOutcome::IgnoredBusy => conflict_response(
            "conversation_busy",
            "A reply is still being generated for this conversation",
        ),
        SubmitOutcome::Unavailable | SubmitOutcome::Answered | SubmitOutcome::Failed(_) => (
            StatusCode::OK,
            Json(ConversationResponse {
                conversation_id,
                conversation: conversation.snapshot(),
            }),
        )
            .into_response(),
    }
}

fn conversation_not_found() -> Response {
    not_found_response("conversation_not_found", "Conversation not found")
}
