// ABOUTME: Anthropic Claude API adapter implementing the ChatBackend trait.
// ABOUTME: Sends the system prompt as the dedicated `system` field of a Messages API call.

use async_trait::async_trait;
use serde_json::{Value, json};

use roundtable_core::Message;

use crate::providers::{coalesce_messages, non_empty_env, send_json};
use crate::runtime::{AgentError, ChatBackend};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;
const PROVIDER: &str = "anthropic";
const CREDENTIAL: &str = "ANTHROPIC_API_KEY";

/// Anthropic Claude runtime adapter. Calls the Messages API and returns the
/// first text block of the reply.
pub struct AnthropicRuntime {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicRuntime {
    /// Create a new AnthropicRuntime reading configuration from environment variables.
    /// Required: `ANTHROPIC_API_KEY`
    /// Optional: `ANTHROPIC_BASE_URL` (defaults to https://api.anthropic.com)
    pub fn from_env() -> Result<Self, AgentError> {
        let api_key = non_empty_env(CREDENTIAL).ok_or(AgentError::MissingCredential(CREDENTIAL))?;

        let base_url =
            non_empty_env("ANTHROPIC_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self::new(api_key, base_url))
    }

    /// Create a new AnthropicRuntime with explicit configuration.
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    /// Build the JSON request body for the Anthropic Messages API.
    pub fn build_request_body(model: &str, system_prompt: &str, messages: &[Message]) -> Value {
        // Ensure messages alternate roles (Anthropic API requirement)
        let messages: Vec<Value> = coalesce_messages(messages)
            .into_iter()
            .map(|m| {
                json!({
                    "role": m.role.as_str(),
                    "content": m.content
                })
            })
            .collect();

        json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "system": system_prompt,
            "messages": messages
        })
    }

    /// Pull the reply text out of an Anthropic Messages API response.
    pub fn parse_response(response_body: &Value) -> Result<String, AgentError> {
        let content = response_body
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                AgentError::invalid_response(PROVIDER, "missing content array in response")
            })?;

        content
            .iter()
            .find(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
            .and_then(|block| block.get("text").and_then(|t| t.as_str()))
            .map(String::from)
            .ok_or_else(|| AgentError::invalid_response(PROVIDER, "no text block in response"))
    }
}

#[async_trait]
impl ChatBackend for AnthropicRuntime {
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<String, AgentError> {
        let body = Self::build_request_body(model, system_prompt, messages);
        let url = format!("{}/v1/messages", self.base_url);

        let request = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let response_body = send_json(request, PROVIDER, CREDENTIAL).await?;
        Self::parse_response(&response_body)
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}
