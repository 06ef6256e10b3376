// ABOUTME: Entry point for the roundtable binary.
// ABOUTME: Parses CLI arguments, initializes tracing, loads the panel config, and runs the discussion.

mod console;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};

use roundtable_agent::{Orchestrator, ProviderSet};
use roundtable_core::{ProviderKind, RunConfig};

use crate::console::ConsoleReporter;

/// Run a multi-round discussion between LLM agents, then have the last agent summarize it.
#[derive(Debug, Parser)]
#[command(name = "roundtable", version, about, after_help = extra_help())]
struct Cli {
    /// Panel config file (JSON, or YAML with a .yaml/.yml extension)
    #[arg(long, value_name = "PATH", default_value = "config.json")]
    config: PathBuf,

    /// The requirement to discuss; remaining words are joined with spaces
    #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
    prompt: Vec<String>,
}

impl Cli {
    /// Pull a `--config <path>` or `--config=<path>` that appears after the
    /// first prompt word back out of the prompt. The last one given wins.
    fn take_trailing_config(&mut self) {
        let mut words = Vec::with_capacity(self.prompt.len());
        let mut rest = std::mem::take(&mut self.prompt).into_iter();
        while let Some(word) = rest.next() {
            if word == "--config" {
                if let Some(path) = rest.next() {
                    self.config = PathBuf::from(path);
                }
            } else if let Some(path) = word.strip_prefix("--config=") {
                self.config = PathBuf::from(path);
            } else {
                words.push(word);
            }
        }
        self.prompt = words;
    }
}

fn extra_help() -> String {
    let mut help = String::from(
        "Examples:\n  \
         roundtable \"design an authentication screen for a new system\"\n  \
         roundtable --config my-config.json \"build a REST API for todo app\"\n\n\
         Providers:\n",
    );
    for kind in ProviderKind::ALL {
        help.push_str(&format!("  {:<11} - {}\n", kind.tag(), kind.description()));
    }
    help
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Best effort, like the usage output below
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    cli.take_trailing_config();
    let prompt = cli.prompt.join(" ");

    if prompt.trim().is_empty() {
        // Best effort: a broken stdout should not change the exit status
        let _ = Cli::command().print_help();
        return ExitCode::FAILURE;
    }

    match run(&cli.config, &prompt).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(config_path: &Path, prompt: &str) -> anyhow::Result<()> {
    let config = RunConfig::load(config_path)?;
    tracing::info!(
        config = %config_path.display(),
        agents = config.agents.len(),
        max_rounds = config.max_rounds,
        "config loaded"
    );

    let providers = ProviderSet::from_env(&config.active_providers())
        .context("failed to set up provider backends")?;

    Orchestrator::new(config, providers)
        .run(prompt, &ConsoleReporter)
        .await?;

    Ok(())
}
