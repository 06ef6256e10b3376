// ABOUTME: Defines the ChatBackend trait that every provider adapter implements.
// ABOUTME: Also defines AgentError, covering backend, credential, subprocess, and timeout failures.

use std::time::Duration;

use async_trait::async_trait;

use roundtable_core::Message;

/// Errors that can occur while asking a backend for a reply.
///
/// None of these are retried: the orchestrator aborts the run on the first one.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("{provider} request failed: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} rejected the request as unauthorized: check {credential}")]
    Unauthorized {
        provider: &'static str,
        credential: &'static str,
    },

    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },

    #[error("{0} not set")]
    MissingCredential(&'static str),

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    ProcessFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("`{program}` timed out after {}s", timeout.as_secs())]
    Timeout { program: String, timeout: Duration },

    #[error("no backend registered for provider '{0}'")]
    Unregistered(String),
}

impl AgentError {
    /// True for the local CLI exceeding its wall-clock bound.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AgentError::Timeout { .. })
    }

    pub(crate) fn invalid_response(provider: &'static str, message: impl Into<String>) -> Self {
        AgentError::InvalidResponse {
            provider,
            message: message.into(),
        }
    }
}

/// Trait that all provider adapters implement. Each one maps a system prompt
/// plus an ordered message list into its backend's native request and pulls
/// the single reply text back out.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one request and return the reply text.
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<String, AgentError>;

    /// Provider tag for logging and display (e.g. "anthropic", "claude-code").
    fn provider_name(&self) -> &str;
}
