mod orchestrator;
mod state;

pub use orchestrator::{ConversationOrchestrator, SUGGESTED_QUESTIONS, SubmitOutcome};
pub use state::{
    ConversationSnapshot, ConversationState, GREETING_TEXT, Message, Sender, THINKING_TEXT,
    UNAVAILABLE_TEXT,
};
