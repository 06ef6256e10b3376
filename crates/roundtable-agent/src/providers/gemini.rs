// ABOUTME: Google Gemini API adapter implementing the ChatBackend trait.
// ABOUTME: Supplies the system prompt through `system_instruction` and maps assistant turns to `model`.

use async_trait::async_trait;
use serde_json::{Value, json};

use roundtable_core::{Message, Role};

use crate::providers::{coalesce_messages, non_empty_env, send_json};
use crate::runtime::{AgentError, ChatBackend};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const PROVIDER: &str = "gemini";
const CREDENTIAL: &str = "GEMINI_API_KEY";
const FALLBACK_CREDENTIAL: &str = "GOOGLE_API_KEY";

/// Google Gemini runtime adapter. Calls the generateContent API and returns
/// the text of the first candidate.
pub struct GeminiRuntime {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiRuntime {
    /// Create a new GeminiRuntime reading configuration from environment variables.
    /// Required: `GEMINI_API_KEY` (or `GOOGLE_API_KEY`)
    /// Optional: `GEMINI_BASE_URL` (defaults to https://generativelanguage.googleapis.com)
    pub fn from_env() -> Result<Self, AgentError> {
        let api_key = non_empty_env(CREDENTIAL)
            .or_else(|| non_empty_env(FALLBACK_CREDENTIAL))
            .ok_or(AgentError::MissingCredential(CREDENTIAL))?;

        let base_url =
            non_empty_env("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self::new(api_key, base_url))
    }

    /// Create a new GeminiRuntime with explicit configuration.
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    /// Build the JSON request body for the Gemini generateContent API.
    pub fn build_request_body(system_prompt: &str, messages: &[Message]) -> Value {
        // Gemini requires alternating roles as well
        let contents: Vec<Value> = coalesce_messages(messages)
            .into_iter()
            .map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                json!({
                    "role": role,
                    "parts": [{"text": m.content}]
                })
            })
            .collect();

        json!({
            "system_instruction": {
                "parts": [{"text": system_prompt}]
            },
            "contents": contents
        })
    }

    /// Pull the reply text out of a generateContent response.
    pub fn parse_response(response_body: &Value) -> Result<String, AgentError> {
        let candidates = response_body
            .get("candidates")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                AgentError::invalid_response(PROVIDER, "missing candidates array in response")
            })?;

        let candidate = candidates
            .first()
            .ok_or_else(|| AgentError::invalid_response(PROVIDER, "empty candidates array"))?;

        let parts = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .ok_or_else(|| AgentError::invalid_response(PROVIDER, "missing parts in candidate"))?;

        let texts: Vec<&str> = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();

        if texts.is_empty() {
            return Err(AgentError::invalid_response(
                PROVIDER,
                "candidate has no text parts",
            ));
        }

        Ok(texts.concat())
    }
}

#[async_trait]
impl ChatBackend for GeminiRuntime {
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<String, AgentError> {
        let body = Self::build_request_body(system_prompt, messages);
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);

        let request = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&body);

        let response_body = send_json(request, PROVIDER, CREDENTIAL).await?;
        Self::parse_response(&response_body)
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}
