// ABOUTME: OpenAI Chat Completions adapter implementing the ChatBackend trait.
// ABOUTME: Prepends the system prompt as a synthetic `system` message ahead of the history.

use async_trait::async_trait;
use serde_json::{Value, json};

use roundtable_core::Message;

use crate::providers::{non_empty_env, send_json};
use crate::runtime::{AgentError, ChatBackend};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const PROVIDER: &str = "openai";
const CREDENTIAL: &str = "OPENAI_API_KEY";

/// OpenAI runtime adapter. Calls the Chat Completions API and returns the
/// first choice's message content.
pub struct OpenAIRuntime {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAIRuntime {
    /// Create a new OpenAIRuntime reading configuration from environment variables.
    /// Required: `OPENAI_API_KEY`
    /// Optional: `OPENAI_BASE_URL` (defaults to https://api.openai.com)
    pub fn from_env() -> Result<Self, AgentError> {
        let api_key = non_empty_env(CREDENTIAL).ok_or(AgentError::MissingCredential(CREDENTIAL))?;

        let base_url =
            non_empty_env("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self::new(api_key, base_url))
    }

    /// Create a new OpenAIRuntime with explicit configuration.
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    /// Build the JSON request body for the OpenAI Chat Completions API.
    pub fn build_request_body(model: &str, system_prompt: &str, messages: &[Message]) -> Value {
        let mut sent = Vec::with_capacity(messages.len() + 1);
        sent.push(json!({
            "role": "system",
            "content": system_prompt
        }));
        sent.extend(messages.iter().map(|m| {
            json!({
                "role": m.role.as_str(),
                "content": m.content
            })
        }));

        json!({
            "model": model,
            "messages": sent
        })
    }

    /// Pull the reply text out of a Chat Completions response.
    pub fn parse_response(response_body: &Value) -> Result<String, AgentError> {
        let choices = response_body
            .get("choices")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                AgentError::invalid_response(PROVIDER, "missing choices array in response")
            })?;

        let choice = choices
            .first()
            .ok_or_else(|| AgentError::invalid_response(PROVIDER, "empty choices array"))?;

        let message = choice
            .get("message")
            .ok_or_else(|| AgentError::invalid_response(PROVIDER, "missing message in choice"))?;

        message
            .get("content")
            .and_then(|c| c.as_str())
            .map(String::from)
            .ok_or_else(|| AgentError::invalid_response(PROVIDER, "message has no text content"))
    }
}

#[async_trait]
impl ChatBackend for OpenAIRuntime {
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<String, AgentError> {
        let body = Self::build_request_body(model, system_prompt, messages);
        let url = format!("{}/v1/chat/completions", self.base_url);

        let request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body);

        let response_body = send_json(request, PROVIDER, CREDENTIAL).await?;
        Self::parse_response(&response_body)
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn openai_builds_request_body() {
        let messages = vec![
            Message::user("Build a todo API"),
            Message::user("[Architect]: Use REST."),
        ];

        let body = OpenAIRuntime::build_request_body("gpt-4o", "You plan.", &messages);

        assert_eq!(body["model"], "gpt-4o");
        assert!(body.get("tools").is_none());

        let sent = body["messages"].as_array().unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0], json!({"role": "system", "content": "You plan."}));
        assert_eq!(sent[1]["content"], "Build a todo API");
        assert_eq!(sent[2]["role"], "user");
    }

    #[test]
    fn openai_parses_text_response() {
        let response = json!({
            "id": "chatcmpl-123",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Ship the MVP first."},
                "finish_reason": "stop"
            }]
        });

        let reply = OpenAIRuntime::parse_response(&response).unwrap();
        assert_eq!(reply, "Ship the MVP first.");
    }

    #[test]
    fn openai_rejects_malformed_responses() {
        for response in [
            json!({}),
            json!({"choices": []}),
            json!({"choices": [{"finish_reason": "stop"}]}),
            json!({"choices": [{"message": {"role": "assistant", "content": null}}]}),
        ] {
            let result = OpenAIRuntime::parse_response(&response);
            assert!(
                matches!(result, Err(AgentError::InvalidResponse { .. })),
                "expected InvalidResponse for {}",
                response
            );
        }
    }

    #[tokio::test]
    async fn openai_round_trips_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Agreed."}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let runtime = OpenAIRuntime::new("sk-test".to_string(), server.uri());
        let reply = runtime
            .complete("gpt-4o", "Be brief.", &[Message::user("hi")])
            .await
            .unwrap();

        assert_eq!(reply, "Agreed.");
    }

    #[tokio::test]
    async fn openai_rate_limit_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .expect(1)
            .mount(&server)
            .await;

        let err = OpenAIRuntime::new("sk-test".to_string(), server.uri())
            .complete("gpt-4o", "s", &[Message::user("hi")])
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Api { status: 429, .. }));
    }

    #[tokio::test]
    #[cfg(feature = "live-test")]
    async fn openai_adapter_basic() {
        let runtime = {
            let _lock = crate::lock_env();
            OpenAIRuntime::from_env().expect("OPENAI_API_KEY must be set")
        };
        let result = runtime
            .complete(
                "gpt-4o",
                "Answer in one word.",
                &[Message::user("What colour is the sky?")],
            )
            .await;
        assert!(result.is_ok(), "live test failed: {:?}", result.err());
    }
}
