//! Campus assistant client: prompt composition, bounded retry and failure classification
//! on top of an [`LlmGateway`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use crate::config::ConfigError;
use crate::llm::{
    ErrorKind, GeminiGateway, GeminiGatewayConfig, LlmGateway, LlmGatewayRequest, RetryPolicy,
    blog_post_prompt, campus_assistant_prompt, classify_failure, is_transient_failure,
};

pub const DEFAULT_OVERALL_DEADLINE: Duration = Duration::from_secs(120);

const BLOG_UNAVAILABLE_TEXT: &str =
    "AI content generation is currently unavailable. Please check back later.";
const BLOG_FAILED_TEXT: &str = "Unable to generate content at this time. Please try again later.";

pub type AssistantFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, AssistantError>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AssistantError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AssistantError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.explanation().to_string(),
        }
    }
}

impl From<ErrorKind> for AssistantError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// The seam the conversation orchestrator calls through.
pub trait ResponseGenerator: Send + Sync {
    fn generate_response<'a>(&'a self, user_message: &'a str) -> AssistantFuture<'a>;
}

pub type GeminiAssistant = CampusAssistant<GeminiGateway>;

#[derive(Clone)]
pub struct CampusAssistant<G>
where
    G: LlmGateway,
{
    gateway: Option<G>,
    retry_policy: RetryPolicy,
    overall_deadline: Duration,
}

impl<G> CampusAssistant<G>
where
    G: LlmGateway,
{
    /// `None` builds an assistant that reports [`ErrorKind::NotConfigured`] on every call.
    pub fn new(gateway: Option<G>) -> Self {
        Self {
            gateway,
            retry_policy: RetryPolicy::default(),
            overall_deadline: DEFAULT_OVERALL_DEADLINE,
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_overall_deadline(mut self, overall_deadline: Duration) -> Self {
        self.overall_deadline = overall_deadline;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.gateway.is_some()
    }

    pub async fn generate(&self, user_message: &str) -> Result<String, AssistantError> {
        let Some(gateway) = self.gateway.as_ref() else {
            info!("assistant request skipped: backend not configured");
            return Err(ErrorKind::NotConfigured.into());
        };

        let trimmed = user_message.trim();
        if trimmed.is_empty() {
            warn!("assistant request rejected: empty user message");
            return Err(ErrorKind::Unknown.into());
        }

        let request = LlmGatewayRequest::new(campus_assistant_prompt(trimmed));
        match timeout(self.overall_deadline, self.generate_with_retry(gateway, request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    deadline_ms = self.overall_deadline.as_millis() as u64,
                    "assistant request exceeded overall deadline"
                );
                Err(ErrorKind::Overloaded.into())
            }
        }
    }

    async fn generate_with_retry(
        &self,
        gateway: &G,
        request: LlmGatewayRequest,
    ) -> Result<String, AssistantError> {
        let mut retry_state = self.retry_policy.start();

        loop {
            let attempt = retry_state.attempt();
            let err = match gateway.generate(request.clone()).await {
                Ok(response) => {
                    if response.text.trim().is_empty() {
                        warn!(attempt, model = %response.model, "assistant provider returned empty text");
                        return Err(ErrorKind::EmptyResponse.into());
                    }
                    return Ok(response.text);
                }
                Err(err) => err,
            };

            let signal = err.to_string();
            if !is_transient_failure(&signal) {
                let kind = classify_failure(&signal);
                warn!(attempt, kind = kind.as_str(), "assistant provider request failed: {signal}");
                return Err(kind.into());
            }

            match retry_state.next_backoff() {
                Some(delay) => {
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "assistant provider transiently unavailable, retrying: {signal}"
                    );
                    sleep(delay).await;
                }
                None => {
                    warn!(attempt, "assistant provider still unavailable after final attempt: {signal}");
                    return Err(ErrorKind::Overloaded.into());
                }
            }
        }
    }

    /// Single-shot article generation. Failures degrade to a fixed notice instead of an
    /// error.
    pub async fn generate_blog_content(&self, topic: &str) -> String {
        let Some(gateway) = self.gateway.as_ref() else {
            return BLOG_UNAVAILABLE_TEXT.to_string();
        };

        let request = LlmGatewayRequest::new(blog_post_prompt(topic));
        match timeout(self.overall_deadline, gateway.generate(request)).await {
            Ok(Ok(response)) if !response.text.trim().is_empty() => response.text,
            Ok(Ok(_)) => {
                warn!("blog generation returned empty text");
                BLOG_FAILED_TEXT.to_string()
            }
            Ok(Err(err)) => {
                warn!("blog generation failed: {err}");
                BLOG_FAILED_TEXT.to_string()
            }
            Err(_) => {
                warn!("blog generation exceeded overall deadline");
                BLOG_FAILED_TEXT.to_string()
            }
        }
    }
}

impl GeminiAssistant {
    pub fn from_config(config: Option<GeminiGatewayConfig>) -> Result<Self, ConfigError> {
        let gateway = config.map(GeminiGateway::new).transpose()?;
        Ok(Self::new(gateway))
    }
}

impl<G> ResponseGenerator for CampusAssistant<G>
where
    G: LlmGateway,
{
    fn generate_response<'a>(&'a self, user_message: &'a str) -> AssistantFuture<'a> {
        Box::pin(self.generate(user_message))
    }
}
