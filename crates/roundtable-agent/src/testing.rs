// ABOUTME: Test utilities for roundtable-agent, including stub and failing backends.
// ABOUTME: Used in tests to drive the orchestrator without real API calls or subprocesses.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use roundtable_core::Message;

use crate::runtime::{AgentError, ChatBackend};

/// Everything a backend was asked in one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub model: String,
    pub system_prompt: String,
    pub messages: Vec<Message>,
}

/// A stub backend that returns canned text and records every request.
///
/// With `numbered`, each reply is suffixed with its 1-based call number so
/// tests can tell successive replies apart.
#[derive(Debug, Default)]
pub struct StubBackend {
    response_text: String,
    numbered: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubBackend {
    /// Create a stub backend that always returns the given text.
    pub fn new(response_text: &str) -> Self {
        Self {
            response_text: response_text.to_owned(),
            ..Self::default()
        }
    }

    /// Create a stub backend that returns `"{prefix} {n}"` for the n-th call.
    pub fn numbered(prefix: &str) -> Self {
        Self {
            response_text: prefix.to_owned(),
            numbered: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl ChatBackend for StubBackend {
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<String, AgentError> {
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls.push(RecordedCall {
            model: model.to_owned(),
            system_prompt: system_prompt.to_owned(),
            messages: messages.to_vec(),
        });

        if self.numbered {
            Ok(format!("{} {}", self.response_text, calls.len()))
        } else {
            Ok(self.response_text.clone())
        }
    }

    fn provider_name(&self) -> &str {
        "stub"
    }
}

/// A backend whose every call fails with a non-zero CLI exit.
#[derive(Debug, Default)]
pub struct FailingBackend {
    stderr: String,
    calls: AtomicUsize,
}

impl FailingBackend {
    pub fn new(stderr: &str) -> Self {
        Self {
            stderr: stderr.to_owned(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatBackend for FailingBackend {
    async fn complete(
        &self,
        _model: &str,
        _system_prompt: &str,
        _messages: &[Message],
    ) -> Result<String, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AgentError::ProcessFailed {
            program: "claude".to_owned(),
            status: "exit status: 1".to_owned(),
            stderr: self.stderr.clone(),
        })
    }

    fn provider_name(&self) -> &str {
        "failing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_new_returns_configured_response_text() {
        let backend = StubBackend::new("Hello, world!");
        let reply = backend
            .complete("m", "s", &[Message::user("hi")])
            .await
            .unwrap();

        assert_eq!(reply, "Hello, world!");
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn stub_numbered_counts_calls() {
        let backend = StubBackend::numbered("reply");
        backend.complete("m", "s", &[]).await.unwrap();
        let second = backend.complete("m", "s", &[]).await.unwrap();

        assert_eq!(second, "reply 2");
    }

    #[tokio::test]
    async fn stub_records_request() {
        let backend = StubBackend::new("ok");
        backend
            .complete("gpt-4o", "You plan.", &[Message::user("X")])
            .await
            .unwrap();

        let calls = backend.calls();
        assert_eq!(
            calls[0],
            RecordedCall {
                model: "gpt-4o".to_owned(),
                system_prompt: "You plan.".to_owned(),
                messages: vec![Message::user("X")],
            }
        );
    }

    #[tokio::test]
    async fn failing_backend_reports_stderr() {
        let backend = FailingBackend::new("quota exceeded");
        let err = backend.complete("m", "s", &[]).await.unwrap_err();

        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(backend.call_count(), 1);
    }
}
