use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assistant::AssistantError;

pub const THINKING_TEXT: &str = "Thinking…";

pub const GREETING_TEXT: &str = "Hello! I'm your SRM Guide AI Assistant. I'm here to help you with any questions about SRM University. Ask me about academics, exams, attendance, hostel life, or anything else related to college life at SRM!";

pub const UNAVAILABLE_TEXT: &str = "I'm sorry, but the AI Assistant is currently unavailable. The API key hasn't been configured yet. Please check our comprehensive FAQ section for answers to common questions about SRM University, or contact support for assistance.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub created_at: DateTime<Utc>,
    pub pending: bool,
}

/// What the UI renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    pub messages: Vec<Message>,
    pub busy: bool,
    pub last_error: Option<String>,
}

/// Conversation state as a value. Every transition returns a new state and leaves the
/// receiver untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    messages: Vec<Message>,
    busy: bool,
    last_error: Option<String>,
    next_id: u64,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            busy: false,
            last_error: None,
            next_id: 1,
        }
    }
}

impl ConversationState {
    pub fn with_greeting(now: DateTime<Utc>) -> Self {
        Self::default().with_message(Sender::Assistant, GREETING_TEXT, now, false)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn pending_message(&self) -> Option<&Message> {
        self.messages.iter().find(|message| message.pending)
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.messages.clone(),
            busy: self.busy,
            last_error: self.last_error.clone(),
        }
    }

    /// User turn answered immediately with the fixed "assistant unavailable" reply.
    pub fn with_unavailable_exchange(&self, user_text: &str, now: DateTime<Utc>) -> Self {
        self.with_message(Sender::User, user_text, now, false)
            .with_message(Sender::Assistant, UNAVAILABLE_TEXT, now, false)
    }

    /// Appends the user turn and its pending placeholder in one step, marks the
    /// conversation busy and clears the previous failure. Returns the placeholder id.
    pub fn with_pending_exchange(&self, user_text: &str, now: DateTime<Utc>) -> (Self, u64) {
        let with_user = self.with_message(Sender::User, user_text, now, false);
        let placeholder_id = with_user.next_id;
        let mut next = with_user.with_message(Sender::Assistant, THINKING_TEXT, now, true);
        next.busy = true;
        next.last_error = None;
        (next, placeholder_id)
    }

    /// Replaces the placeholder with the final reply or the failure explanation and
    /// releases the busy flag.
    pub fn with_resolved_placeholder(
        &self,
        placeholder_id: u64,
        outcome: &Result<String, AssistantError>,
    ) -> Self {
        let (text, last_error) = match outcome {
            Ok(text) => (text.as_str(), None),
            Err(err) => (err.message.as_str(), Some(err.message.clone())),
        };

        Self {
            messages: self
                .messages
                .iter()
                .map(|message| {
                    if message.id == placeholder_id {
                        Message {
                            text: text.to_string(),
                            pending: false,
                            ..message.clone()
                        }
                    } else {
                        message.clone()
                    }
                })
                .collect(),
            busy: false,
            last_error,
            next_id: self.next_id,
        }
    }

    pub fn released(&self) -> Self {
        Self {
            busy: false,
            ..self.clone()
        }
    }

    fn with_message(&self, sender: Sender, text: &str, now: DateTime<Utc>, pending: bool) -> Self {
        let mut messages = self.messages.clone();
        messages.push(Message {
            id: self.next_id,
            text: text.to_string(),
            sender,
            created_at: now,
            pending,
        });

        Self {
            messages,
            busy: self.busy,
            last_error: self.last_error.clone(),
            next_id: self.next_id.saturating_add(1),
        }
    }
}
