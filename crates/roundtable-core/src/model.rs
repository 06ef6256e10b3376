// ABOUTME: Defines agents, provider tags, and the append-only transcript shared during a run.
// ABOUTME: Every agent reads the whole transcript; only the orchestrator appends to it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// The closed set of model backends an agent can be wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProviderKind {
    /// The locally installed `claude` command-line tool.
    ClaudeCode,
    Anthropic,
    OpenAi,
    Gemini,
}

impl ProviderKind {
    /// Every registered provider, in the order they are listed to users.
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::ClaudeCode,
        ProviderKind::Anthropic,
        ProviderKind::OpenAi,
        ProviderKind::Gemini,
    ];

    /// The case-sensitive tag used in config files.
    pub fn tag(&self) -> &'static str {
        match self {
            ProviderKind::ClaudeCode => "claude-code",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// One-line note on how the provider authenticates, for help output.
    pub fn description(&self) -> &'static str {
        match self {
            ProviderKind::ClaudeCode => "uses the claude CLI (its own login, no API key needed)",
            ProviderKind::Anthropic => "uses ANTHROPIC_API_KEY",
            ProviderKind::OpenAi => "uses OPENAI_API_KEY",
            ProviderKind::Gemini => "uses GEMINI_API_KEY or GOOGLE_API_KEY",
        }
    }

    /// Comma-separated list of every valid tag.
    pub fn valid_tags() -> String {
        Self::ALL
            .iter()
            .map(|p| p.tag())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.tag() == s)
            .ok_or_else(|| ConfigError::UnknownProvider {
                tag: s.to_string(),
                valid: Self::valid_tags(),
            })
    }
}

impl TryFrom<String> for ProviderKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProviderKind> for String {
    fn from(kind: ProviderKind) -> Self {
        kind.tag().to_string()
    }
}

/// A configured persona taking part in the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub name: String,
    pub provider: ProviderKind,
    pub model: String,
    pub system_prompt: String,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        provider: ProviderKind,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            model: model.into(),
            system_prompt: system_prompt.into(),
        }
    }
}

/// Who a message is attributed to when it is sent to a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered, append-only conversation history for one run.
///
/// There is deliberately no way to remove or reorder entries: the order of
/// messages is the only record of who said what and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Start a transcript holding only the user's initial prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(prompt)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false: a transcript starts with the initial prompt.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Copy of the history with one extra user message on the end.
    /// The transcript itself is left untouched.
    pub fn with_instruction(&self, instruction: impl Into<String>) -> Vec<Message> {
        let mut turn = Vec::with_capacity(self.messages.len() + 1);
        turn.extend_from_slice(&self.messages);
        turn.push(Message::user(instruction));
        turn
    }
}
