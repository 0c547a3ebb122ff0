use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

pub type LlmGatewayFuture<'a> =
    Pin<Box<dyn Future<Output = Result<LlmGatewayResponse, LlmGatewayError>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmGatewayRequest {
    pub prompt: String,
}

impl LlmGatewayRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmGatewayResponse {
    pub model: String,
    pub text: String,
}

/// Raw failure from the text-generation provider. The rendered message is the only
/// signal callers get about the failure cause, so implementations keep upstream status
/// codes and messages in it verbatim.
#[derive(Debug, Error)]
pub enum LlmGatewayError {
    #[error("llm provider request timed out")]
    Timeout,
    #[error("llm provider request failed: {0}")]
    ProviderFailure(String),
    #[error("llm provider returned an invalid payload: {0}")]
    InvalidProviderPayload(String),
}

/// Single-prompt text generation. One call is one upstream attempt; retry policy lives
/// with the caller.
pub trait LlmGateway: Send + Sync {
    fn generate<'a>(&'a self, request: LlmGatewayRequest) -> LlmGatewayFuture<'a>;
}
