//! Completion service integration

pub mod openai;
pub mod retry;
pub mod traits;

pub use openai::OpenAiClient;
pub use retry::RetryConfig;
pub use traits::{CompletionClient, CompletionError};
