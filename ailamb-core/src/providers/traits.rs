//! Completion client trait and error definitions

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

/// Failure of a completion call, by kind.
///
/// These errors are recovered locally at every call site: the narrative
/// stages substitute deterministic fallback text rather than aborting the
/// pipeline, so none of these variants ever reaches the process exit code.
#[derive(Debug, Error, Diagnostic)]
pub enum CompletionError {
    #[error("Authentication failed: {0}")]
    #[diagnostic(code(ailamb::completion::auth))]
    AuthenticationFailed(String),

    #[error("Rate limited: {0}")]
    #[diagnostic(code(ailamb::completion::rate_limit))]
    RateLimited(String),

    #[error("Network failure: {0}")]
    #[diagnostic(code(ailamb::completion::network))]
    NetworkFailure(String),

    #[error("Malformed response: {0}")]
    #[diagnostic(code(ailamb::completion::response))]
    MalformedResponse(String),
}

impl CompletionError {
    /// Transient failures are worth one retry; auth and decode failures are
    /// permanent for the duration of a run.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited(_) | CompletionError::NetworkFailure(_)
        )
    }

    /// Stable kind label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::AuthenticationFailed(_) => "authentication_failed",
            CompletionError::RateLimited(_) => "rate_limited",
            CompletionError::NetworkFailure(_) => "network_failure",
            CompletionError::MalformedResponse(_) => "malformed_response",
        }
    }
}

/// A narrow adapter over an external text-completion service.
///
/// Implementations are stateless and safe to share across pipeline stages.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Client name for logging
    fn name(&self) -> &str;

    /// Request a completion for `prompt` under the given role context.
    async fn complete(
        &self,
        prompt: &str,
        role_context: &str,
        max_tokens: u32,
    ) -> Result<String, CompletionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retriable_kinds() {
        assert!(CompletionError::RateLimited("429".into()).is_retriable());
        assert!(CompletionError::NetworkFailure("timeout".into()).is_retriable());
        assert!(!CompletionError::AuthenticationFailed("401".into()).is_retriable());
        assert!(!CompletionError::MalformedResponse("empty".into()).is_retriable());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(
            CompletionError::NetworkFailure(String::new()).kind(),
            "network_failure"
        );
        assert_eq!(
            CompletionError::AuthenticationFailed(String::new()).kind(),
            "authentication_failed"
        );
    }
}
