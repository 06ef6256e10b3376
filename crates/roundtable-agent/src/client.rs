// ABOUTME: Dispatch table from provider tag to the backend that serves it.
// ABOUTME: Builds one runtime per provider a panel uses and routes every agent call through it.

use std::collections::HashMap;
use std::sync::Arc;

use roundtable_core::{Message, ProviderKind};

use crate::providers::{AnthropicRuntime, ClaudeCodeRuntime, GeminiRuntime, OpenAIRuntime};
use crate::runtime::{AgentError, ChatBackend};

/// Create the runtime for a provider, reading its credentials from the environment.
pub fn create_backend(kind: ProviderKind) -> Result<Arc<dyn ChatBackend>, AgentError> {
    let backend: Arc<dyn ChatBackend> = match kind {
        ProviderKind::ClaudeCode => Arc::new(ClaudeCodeRuntime::from_env()),
        ProviderKind::Anthropic => Arc::new(AnthropicRuntime::from_env()?),
        ProviderKind::OpenAi => Arc::new(OpenAIRuntime::from_env()?),
        ProviderKind::Gemini => Arc::new(GeminiRuntime::from_env()?),
    };
    Ok(backend)
}

/// The backends available to one run, keyed by provider.
#[derive(Clone, Default)]
pub struct ProviderSet {
    backends: HashMap<ProviderKind, Arc<dyn ChatBackend>>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a backend for each listed provider. Providers a panel does not
    /// use are never constructed, so their credentials are not required.
    pub fn from_env(kinds: &[ProviderKind]) -> Result<Self, AgentError> {
        let mut set = Self::new();
        for &kind in kinds {
            if set.backends.contains_key(&kind) {
                continue;
            }
            tracing::debug!(provider = %kind, "creating backend");
            set.backends.insert(kind, create_backend(kind)?);
        }
        Ok(set)
    }

    /// Register (or replace) the backend serving `kind`.
    pub fn with_backend(mut self, kind: ProviderKind, backend: Arc<dyn ChatBackend>) -> Self {
        self.backends.insert(kind, backend);
        self
    }

    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.backends.contains_key(&kind)
    }

    /// Send one request to the backend registered for `kind`.
    pub async fn invoke(
        &self,
        kind: ProviderKind,
        model: &str,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<String, AgentError> {
        let backend = self
            .backends
            .get(&kind)
            .ok_or_else(|| AgentError::Unregistered(kind.to_string()))?;

        backend.complete(model, system_prompt, messages).await
    }
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.backends.keys().collect();
        kinds.sort();
        f.debug_struct("ProviderSet").field("providers", &kinds).finish()
    }
}
