// ABOUTME: Loads the run configuration file and each agent's system prompt from disk.
// ABOUTME: Validates provider tags and agent names so a bad config fails before any backend is called.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::model::{Agent, ProviderKind};

/// Errors that can occur while loading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("cannot read system prompt for agent '{agent}' at {}: {source}", path.display())]
    PromptFile {
        agent: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unknown provider '{tag}'. Available: {valid}")]
    UnknownProvider { tag: String, valid: String },

    #[error("config must list at least one agent")]
    NoAgents,

    #[error("agent name '{0}' is used more than once")]
    DuplicateAgent(String),
}

/// On-disk shape of the config file.
#[derive(Debug, Deserialize)]
struct FileConfig {
    max_rounds: u32,
    agents: Vec<AgentEntry>,
}

#[derive(Debug, Deserialize)]
struct AgentEntry {
    name: String,
    provider: String,
    model: String,
    /// System prompt path, relative to the config file's directory.
    file: PathBuf,
}

/// Everything a run needs: how many rounds, and who speaks in what order.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub max_rounds: u32,
    pub agents: Vec<Agent>,
}

impl RunConfig {
    /// Build a config from already-loaded agents, enforcing that the panel is
    /// non-empty and that agent names are unique.
    pub fn new(max_rounds: u32, agents: Vec<Agent>) -> Result<Self, ConfigError> {
        if agents.is_empty() {
            return Err(ConfigError::NoAgents);
        }

        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.name.as_str()) {
                return Err(ConfigError::DuplicateAgent(agent.name.clone()));
            }
        }

        Ok(Self { max_rounds, agents })
    }

    /// Load a config file and the system prompt file of every agent it lists.
    ///
    /// Files ending in `.yaml` or `.yml` are parsed as YAML, anything else as
    /// JSON. Provider tags are checked before any prompt file is opened.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let file = parse_file(path, &raw)?;

        let providers = file
            .agents
            .iter()
            .map(|entry| entry.provider.parse::<ProviderKind>())
            .collect::<Result<Vec<_>, _>>()?;

        let base_dir = config_dir(path);
        let mut agents = Vec::with_capacity(file.agents.len());
        for (entry, provider) in file.agents.into_iter().zip(providers) {
            let prompt_path = base_dir.join(&entry.file);
            let system_prompt =
                std::fs::read_to_string(&prompt_path).map_err(|source| {
                    ConfigError::PromptFile {
                        agent: entry.name.clone(),
                        path: prompt_path.clone(),
                        source,
                    }
                })?;

            tracing::debug!(
                agent = %entry.name,
                provider = %provider,
                model = %entry.model,
                prompt_path = %prompt_path.display(),
                "loaded agent"
            );

            agents.push(Agent::new(
                entry.name,
                provider,
                entry.model,
                system_prompt.trim(),
            ));
        }

        Self::new(file.max_rounds, agents)
    }

    /// The agent that writes the final summary.
    pub fn last_agent(&self) -> &Agent {
        // `new` rejects empty panels, so there is always a last agent.
        &self.agents[self.agents.len() - 1]
    }

    /// Distinct providers used by this panel, in first-use order.
    pub fn providers(&self) -> Vec<ProviderKind> {
        let mut kinds = Vec::new();
        for agent in &self.agents {
            if !kinds.contains(&agent.provider) {
                kinds.push(agent.provider);
            }
        }
        kinds
    }

    /// Providers a run will actually call. With zero rounds only the
    /// summarizer speaks, so the other agents' providers are left out.
    pub fn active_providers(&self) -> Vec<ProviderKind> {
        if self.max_rounds == 0 {
            vec![self.last_agent().provider]
        } else {
            self.providers()
        }
    }
}

fn parse_file(path: &Path, raw: &str) -> Result<FileConfig, ConfigError> {
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    let parsed = if is_yaml {
        serde_yaml::from_str(raw).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(raw).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Directory that relative prompt paths are resolved against.
fn config_dir(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
