// ABOUTME: Orchestrator drives the panel through numbered rounds, then asks the last agent to summarize.
// ABOUTME: Turns run strictly one at a time; any backend failure aborts the whole run.

use std::fmt;

use ulid::Ulid;

use roundtable_core::{Agent, Message, ProviderKind, RunConfig, Transcript};

use crate::client::ProviderSet;
use crate::prompts::{CONSOLIDATION_INSTRUCTION, attributed_reply, turn_instruction};
use crate::runtime::AgentError;

/// Where in a run a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Round(u32),
    Summary,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Round(n) => write!(f, "round {}", n),
            Phase::Summary => f.write_str("summary"),
        }
    }
}

/// A backend failure, tagged with the phase and agent it interrupted.
#[derive(Debug, thiserror::Error)]
#[error("{phase} failed for agent '{agent}' ({provider}): {source}")]
pub struct RunError {
    pub phase: Phase,
    pub agent: String,
    pub provider: ProviderKind,
    #[source]
    pub source: AgentError,
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: Ulid,
    /// Final transcript, ending with the consolidation request.
    pub transcript: Transcript,
    pub summary: String,
    /// Backend calls made, including the summary call.
    pub invocations: usize,
}

/// Callbacks for following a run as it happens. Every method defaults to a no-op.
pub trait RunObserver: Send + Sync {
    fn on_run_start(&self, _config: &RunConfig, _prompt: &str) {}
    fn on_round_start(&self, _round: u32, _max_rounds: u32) {}
    fn on_turn_start(&self, _agent: &Agent) {}
    fn on_reply(&self, _agent: &Agent, _reply: &str) {}
    fn on_summary_start(&self, _agent: &Agent) {}
    fn on_summary(&self, _agent: &Agent, _summary: &str) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Runs one panel discussion. Owns its config and backends; each call to
/// `run` starts from a fresh transcript.
#[derive(Debug)]
pub struct Orchestrator {
    config: RunConfig,
    providers: ProviderSet,
}

impl Orchestrator {
    pub fn new(config: RunConfig, providers: ProviderSet) -> Self {
        Self { config, providers }
    }

    /// Run every round in order, then the summary. Stops at the first error.
    pub async fn run(
        &self,
        prompt: &str,
        observer: &dyn RunObserver,
    ) -> Result<RunOutcome, RunError> {
        let run_id = Ulid::new();
        let max_rounds = self.config.max_rounds;
        let mut transcript = Transcript::new(prompt);
        let mut invocations = 0;

        tracing::info!(
            %run_id,
            agents = self.config.agents.len(),
            max_rounds,
            "starting run"
        );
        observer.on_run_start(&self.config, prompt);

        for round in 1..=max_rounds {
            tracing::info!(%run_id, round, max_rounds, "round started");
            observer.on_round_start(round, max_rounds);

            for agent in &self.config.agents {
                observer.on_turn_start(agent);

                let instruction = turn_instruction(&agent.name, round, max_rounds);
                let turn_messages = transcript.with_instruction(instruction);
                let reply = self
                    .call(run_id, Phase::Round(round), agent, &turn_messages)
                    .await?;
                invocations += 1;

                observer.on_reply(agent, &reply);
                transcript.push(Message::user(attributed_reply(&agent.name, &reply)));
            }
        }

        let last = self.config.last_agent();
        observer.on_summary_start(last);

        transcript.push(Message::user(CONSOLIDATION_INSTRUCTION));
        let summary = self
            .call(run_id, Phase::Summary, last, transcript.messages())
            .await?;
        invocations += 1;

        observer.on_summary(last, &summary);
        tracing::info!(%run_id, invocations, "run complete");

        Ok(RunOutcome {
            run_id,
            transcript,
            summary,
            invocations,
        })
    }

    async fn call(
        &self,
        run_id: Ulid,
        phase: Phase,
        agent: &Agent,
        messages: &[Message],
    ) -> Result<String, RunError> {
        tracing::info!(
            %run_id,
            %phase,
            agent = %agent.name,
            provider = %agent.provider,
            model = %agent.model,
            messages = messages.len(),
            "invoking agent"
        );

        self.providers
            .invoke(agent.provider, &agent.model, &agent.system_prompt, messages)
            .await
            .map_err(|source| {
                tracing::error!(
                    %run_id,
                    %phase,
                    agent = %agent.name,
                    provider = %agent.provider,
                    error = %source,
                    "agent call failed, aborting run"
                );
                RunError {
                    phase,
                    agent: agent.name.clone(),
                    provider: agent.provider,
                    source,
                }
            })
    }
}
