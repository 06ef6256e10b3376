// ABOUTME: Human-readable progress banners printed to stdout while a run is in progress.
// ABOUTME: Implements RunObserver so the orchestrator stays free of console I/O.

use roundtable_agent::RunObserver;
use roundtable_core::{Agent, RunConfig};

const WIDTH: usize = 60;
const PROMPT_PREVIEW_CHARS: usize = 80;

/// Prints run, round, and agent headers along with each reply.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl RunObserver for ConsoleReporter {
    fn on_run_start(&self, config: &RunConfig, prompt: &str) {
        let names: Vec<&str> = config.agents.iter().map(|a| a.name.as_str()).collect();
        println!("\n{}", "=".repeat(WIDTH));
        println!("  MULTI-AGENT COLLABORATION");
        println!("  Agents: {}", names.join(", "));
        println!("  Rounds: {}", config.max_rounds);
        println!("  Prompt: {}", prompt_preview(prompt));
        println!("{}", "=".repeat(WIDTH));
    }

    fn on_round_start(&self, round: u32, max_rounds: u32) {
        println!("\n{}", "─".repeat(WIDTH));
        println!("  ROUND {}/{}", round, max_rounds);
        println!("{}", "─".repeat(WIDTH));
    }

    fn on_turn_start(&self, agent: &Agent) {
        println!("\n{}\n", agent_header(agent));
    }

    fn on_reply(&self, _agent: &Agent, reply: &str) {
        println!("{}", reply);
    }

    fn on_summary_start(&self, agent: &Agent) {
        println!("\n{}", "=".repeat(WIDTH));
        println!("  FINAL SUMMARY (by {})", agent.name);
        println!("{}\n", "=".repeat(WIDTH));
    }

    fn on_summary(&self, _agent: &Agent, summary: &str) {
        println!("{}", summary);
    }
}

fn agent_header(agent: &Agent) -> String {
    format!(">>> {} ({}/{})", agent.name, agent.provider, agent.model)
}

/// First 80 characters of the prompt, with `...` when it was cut.
fn prompt_preview(prompt: &str) -> String {
    let mut chars = prompt.chars();
    let head: String = chars.by_ref().take(PROMPT_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
