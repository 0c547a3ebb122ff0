use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::state::{ConversationSnapshot, ConversationState};
use crate::assistant::{AssistantError, ResponseGenerator};
use crate::config::ConfigurationStatus;
use crate::llm::ErrorKind;

pub const SUGGESTED_QUESTIONS: [&str; 8] = [
    "What is the minimum attendance required at SRM?",
    "How is the GPA calculated in SRM?",
    "When do cycle tests happen?",
    "What are the hostel rules and facilities?",
    "How do I join clubs at SRM?",
    "What is the exam pattern for B.Tech?",
    "How to prepare for placements at SRM?",
    "What is the credit system in SRM?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    IgnoredEmpty,
    IgnoredBusy,
    Unavailable,
    Answered,
    Failed(ErrorKind),
}

/// Drives one conversation: optimistic placeholder, assistant call, reconciliation.
///
/// The state lock is never held across the assistant call. A submission that arrives
/// while another is in flight is dropped.
pub struct ConversationOrchestrator {
    generator: Arc<dyn ResponseGenerator>,
    configuration: ConfigurationStatus,
    state: Mutex<ConversationState>,
}

impl ConversationOrchestrator {
    pub fn new(generator: Arc<dyn ResponseGenerator>, configuration: ConfigurationStatus) -> Self {
        Self::with_state(
            generator,
            configuration,
            ConversationState::with_greeting(Utc::now()),
        )
    }

    pub fn with_state(
        generator: Arc<dyn ResponseGenerator>,
        configuration: ConfigurationStatus,
        state: ConversationState,
    ) -> Self {
        Self {
            generator,
            configuration,
            state: Mutex::new(state),
        }
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        self.lock_state().snapshot()
    }

    pub fn state(&self) -> ConversationState {
        self.lock_state().clone()
    }

    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::IgnoredEmpty;
        }

        let placeholder_id = {
            let mut state = self.lock_state();
            if state.busy() {
                debug!("conversation busy, dropping submission");
                return SubmitOutcome::IgnoredBusy;
            }

            if !self.configuration.configured {
                info!("assistant not configured, answering with unavailable notice");
                *state = state.with_unavailable_exchange(text, Utc::now());
                return SubmitOutcome::Unavailable;
            }

            let (next, placeholder_id) = state.with_pending_exchange(text, Utc::now());
            *state = next;
            placeholder_id
        };

        let _release = BusyRelease {
            state: &self.state,
            placeholder_id,
        };
        let outcome = self.generator.generate_response(text).await;

        let submit_outcome = match &outcome {
            Ok(_) => SubmitOutcome::Answered,
            Err(err) => {
                warn!(kind = err.kind.as_str(), "assistant reply failed");
                SubmitOutcome::Failed(err.kind)
            }
        };

        let mut state = self.lock_state();
        *state = state.with_resolved_placeholder(placeholder_id, &outcome);
        submit_outcome
    }

    fn lock_state(&self) -> MutexGuard<'_, ConversationState> {
        lock_recovering(&self.state)
    }
}

fn lock_recovering(state: &Mutex<ConversationState>) -> MutexGuard<'_, ConversationState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Clears the busy flag when the submission finishes. If the submit future is dropped
/// before the reply arrives, the placeholder is resolved as an unknown failure so no
/// pending message outlives its request.
struct BusyRelease<'a> {
    state: &'a Mutex<ConversationState>,
    placeholder_id: u64,
}

impl Drop for BusyRelease<'_> {
    fn drop(&mut self) {
        let mut state = lock_recovering(self.state);
        if !state.busy() {
            return;
        }

        let abandoned = state
            .pending_message()
            .is_some_and(|message| message.id == self.placeholder_id);
        *state = if abandoned {
            state.with_resolved_placeholder(
                self.placeholder_id,
                &Err(AssistantError::new(ErrorKind::Unknown)),
            )
        } else {
            state.released()
        };
    }
}
