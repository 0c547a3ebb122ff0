//! Mapping from raw provider failure text to a user-facing error kind.
//!
//! The provider does not expose a stable error contract to this client, so classification
//! sniffs the rendered failure message. All matching rules live here.

use serde::{Deserialize, Serialize};

const TRANSIENT_MARKERS: [&str; 3] = ["overloaded", "503", "temporarily unavailable"];
const CREDENTIAL_MARKERS: [&str; 2] = ["api key", "api_key"];
const QUOTA_MARKERS: [&str; 3] = ["quota", "limit", "429"];
const OVERLOAD_MARKERS: [&str; 3] = ["overloaded", "503", "temporarily unavailable"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotConfigured,
    InvalidCredential,
    QuotaExceeded,
    Overloaded,
    EmptyResponse,
    Unknown,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::InvalidCredential => "invalid_credential",
            Self::QuotaExceeded => "quota_exceeded",
            Self::Overloaded => "overloaded",
            Self::EmptyResponse => "empty_response",
            Self::Unknown => "unknown",
        }
    }

    pub const fn explanation(self) -> &'static str {
        match self {
            Self::NotConfigured => {
                "AI Assistant is currently unavailable. Please check our FAQ section for common questions about SRM University, or contact support for help."
            }
            Self::InvalidCredential => {
                "I'm sorry, but there seems to be an issue with the API configuration. Please check our FAQ section for common questions."
            }
            Self::QuotaExceeded => {
                "The AI Assistant has exceeded its daily usage quota. Please try again tomorrow or check our FAQ section for common questions about SRM University."
            }
            Self::Overloaded => {
                "I'm currently experiencing high traffic. Please try again in a moment, or check our FAQ section for common questions."
            }
            Self::EmptyResponse => {
                "I couldn't come up with an answer to that just now. Please try rephrasing your question or browse our FAQ section."
            }
            Self::Unknown => {
                "I'm sorry, I'm having trouble processing your request right now. Please try again later or browse our FAQ section for common questions about SRM University."
            }
        }
    }
}

/// True when the failure is expected to clear without any client-side change.
pub fn is_transient_failure(signal: &str) -> bool {
    contains_any(&signal.to_ascii_lowercase(), &TRANSIENT_MARKERS)
}

pub fn classify_failure(signal: &str) -> ErrorKind {
    let normalized = signal.to_ascii_lowercase();

    if contains_any(&normalized, &CREDENTIAL_MARKERS) {
        ErrorKind::InvalidCredential
    } else if contains_any(&normalized, &QUOTA_MARKERS) {
        ErrorKind::QuotaExceeded
    } else if contains_any(&normalized, &OVERLOAD_MARKERS) {
        ErrorKind::Overloaded
    } else {
        ErrorKind::Unknown
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
