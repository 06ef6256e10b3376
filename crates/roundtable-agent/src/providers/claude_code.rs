// ABOUTME: Local CLI adapter that shells out to the `claude` command-line tool.
// ABOUTME: Flattens the conversation into one prompt and bounds each subprocess with a timeout.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use roundtable_core::Message;

use crate::providers::non_empty_env;
use crate::runtime::{AgentError, ChatBackend};

const DEFAULT_PROGRAM: &str = "claude";
const PROVIDER: &str = "claude-code";

/// Wall-clock bound for a single CLI invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Runs `<program> [args..] -p <prompt> --model <model>` and returns its stdout.
pub struct ClaudeCodeRuntime {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ClaudeCodeRuntime {
    /// Create a runtime using `CLAUDE_CODE_BIN` (defaults to `claude` on PATH)
    /// and the default 300 second timeout.
    pub fn from_env() -> Self {
        let program = non_empty_env("CLAUDE_CODE_BIN").unwrap_or_else(|| DEFAULT_PROGRAM.to_string());
        Self::new(program, DEFAULT_TIMEOUT)
    }

    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout,
        }
    }

    /// Arguments placed before `-p`, for wrappers such as `npx claude`.
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Flatten the system prompt and every message into the single prompt
    /// string the CLI takes.
    pub fn build_prompt(system_prompt: &str, messages: &[Message]) -> String {
        let conversation = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("{}\n\n---\n\n{}", system_prompt, conversation)
    }
}

#[async_trait]
impl ChatBackend for ClaudeCodeRuntime {
    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<String, AgentError> {
        let prompt = Self::build_prompt(system_prompt, messages);

        tracing::debug!(
            program = %self.program,
            model,
            prompt_chars = prompt.len(),
            "spawning claude CLI"
        );

        // kill_on_drop reaps the child when the timeout drops the wait future
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg("-p")
            .arg(&prompt)
            .arg("--model")
            .arg(model)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AgentError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| AgentError::Timeout {
                program: self.program.clone(),
                timeout: self.timeout,
            })?
            .map_err(|source| AgentError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(AgentError::ProcessFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}
