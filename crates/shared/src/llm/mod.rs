pub mod classify;
pub mod gateway;
pub mod gemini;
pub mod prompts;
pub mod retry;

pub use classify::{ErrorKind, classify_failure, is_transient_failure};
pub use gateway::{
    LlmGateway, LlmGatewayError, LlmGatewayFuture, LlmGatewayRequest, LlmGatewayResponse,
};
pub use gemini::{GeminiGateway, GeminiGatewayConfig};
pub use prompts::{blog_post_prompt, campus_assistant_prompt};
pub use retry::{RetryPolicy, RetryState};
