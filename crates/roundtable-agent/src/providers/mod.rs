// ABOUTME: Provider module aggregating all backend adapters.
// ABOUTME: Hosts the HTTP status handling and env helpers shared by the hosted API runtimes.

pub mod anthropic;
pub mod claude_code;
pub mod gemini;
pub mod openai;

pub use anthropic::AnthropicRuntime;
pub use claude_code::ClaudeCodeRuntime;
pub use gemini::GeminiRuntime;
pub use openai::OpenAIRuntime;

use serde_json::Value;

use roundtable_core::Message;

use crate::runtime::AgentError;

/// Read an env var and return `Some(value)` only if it is non-empty after trimming.
pub(crate) fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|v| {
        let trimmed = v.trim().to_string();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    })
}

/// Send a prepared request and decode the JSON body, mapping HTTP failures
/// onto `AgentError`. `credential` names the env var to blame on 401/403.
pub(crate) async fn send_json(
    request: reqwest::RequestBuilder,
    provider: &'static str,
    credential: &'static str,
) -> Result<Value, AgentError> {
    let response = request.send().await.map_err(|e| AgentError::Transport {
        provider,
        message: e.to_string(),
    })?;

    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(AgentError::Unauthorized {
            provider,
            credential,
        });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AgentError::Api {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| AgentError::invalid_response(provider, format!("failed to parse JSON: {}", e)))
}

/// Coalesce consecutive messages with the same role into single messages,
/// joining their text with a blank line. Anthropic and Gemini both expect
/// alternating roles, while the transcript is mostly back-to-back user turns.
pub(crate) fn coalesce_messages(messages: &[Message]) -> Vec<Message> {
    let mut result: Vec<Message> = Vec::with_capacity(messages.len());

    for msg in messages {
        if let Some(last) = result.last_mut()
            && last.role == msg.role
        {
            last.content = format!("{}\n\n{}", last.content, msg.content);
            continue;
        }
        result.push(msg.clone());
    }

    result
}
