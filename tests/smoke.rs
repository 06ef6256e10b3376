// ABOUTME: End-to-end smoke test for the full roundtable flow with stubbed backends.
// ABOUTME: Covers config loading from disk, round ordering, summary delegation, and fail-fast behaviour.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use roundtable_agent::testing::StubBackend;
use roundtable_agent::{AgentError, NoopObserver, Orchestrator, Phase, ProviderSet};
use roundtable_core::{ConfigError, Message, ProviderKind, RunConfig};

/// Helper to lay out a config file plus one prompt file per agent.
fn write_panel(dir: &Path, agents: &[(&str, &str)], max_rounds: u32) -> PathBuf {
    fs::create_dir_all(dir.join("agents")).unwrap();
    let entries: Vec<serde_json::Value> = agents
        .iter()
        .map(|(name, provider)| {
            let file = format!("agents/{}.md", name.to_lowercase());
            fs::write(dir.join(&file), format!("You are the {} persona.\n", name)).unwrap();
            serde_json::json!({
                "name": name,
                "provider": provider,
                "model": format!("{}-model", name.to_lowercase()),
                "file": file,
            })
        })
        .collect();

    let config_path = dir.join("config.json");
    let config = serde_json::json!({ "max_rounds": max_rounds, "agents": entries });
    fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    config_path
}

#[tokio::test]
async fn smoke_test_full_run() {
    let dir = tempfile::TempDir::new().unwrap();
    let config_path = write_panel(dir.path(), &[("A", "anthropic"), ("B", "gemini")], 2);

    let config = RunConfig::load(&config_path).unwrap();
    assert_eq!(config.providers(), vec![ProviderKind::Anthropic, ProviderKind::Gemini]);

    let a = Arc::new(StubBackend::numbered("a-reply"));
    let b = Arc::new(StubBackend::numbered("b-reply"));
    let providers = ProviderSet::new()
        .with_backend(ProviderKind::Anthropic, a.clone())
        .with_backend(ProviderKind::Gemini, b.clone());

    let outcome = Orchestrator::new(config, providers)
        .run("X", &NoopObserver)
        .await
        .unwrap();

    // Rounds: A, B, A, B. Summary: B.
    assert_eq!(a.call_count(), 2);
    assert_eq!(b.call_count(), 3);
    assert_eq!(outcome.invocations, 5);
    assert_eq!(outcome.summary, "b-reply 3");

    let a_calls = a.calls();
    assert_eq!(a_calls[0].system_prompt, "You are the A persona.");
    assert_eq!(a_calls[0].model, "a-model");
    assert_eq!(a_calls[0].messages.len(), 2);

    // A's second turn sees both round-1 replies
    assert_eq!(
        &a_calls[1].messages[..3],
        &[
            Message::user("X"),
            Message::user("[A]: a-reply 1"),
            Message::user("[B]: b-reply 1"),
        ]
    );

    // Summary call receives the persisted transcript, not a turn instruction
    let summary_call = &b.calls()[2];
    assert_eq!(summary_call.messages, outcome.transcript.messages());
    assert_eq!(outcome.transcript.len(), 1 + 2 * 2 + 1);
}

#[test]
fn unknown_provider_is_rejected_at_load() {
    let dir = tempfile::TempDir::new().unwrap();
    let config_path = write_panel(dir.path(), &[("A", "anthropic"), ("B", "bard")], 1);

    let err = RunConfig::load(&config_path).unwrap_err();

    match err {
        ConfigError::UnknownProvider { tag, valid } => {
            assert_eq!(tag, "bard");
            assert!(valid.contains("claude-code"));
        }
        other => panic!("expected UnknownProvider, got {:?}", other),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn failing_cli_aborts_the_run() {
    use roundtable_agent::providers::ClaudeCodeRuntime;
    use std::time::Duration;

    let dir = tempfile::TempDir::new().unwrap();
    let config_path = write_panel(dir.path(), &[("A", "claude-code"), ("B", "openai")], 2);
    let config = RunConfig::load(&config_path).unwrap();

    let cli = ClaudeCodeRuntime::new("sh", Duration::from_secs(30))
        .with_args(["-c", "echo 'session expired' >&2; exit 1", "claude"]);
    let after = Arc::new(StubBackend::new("never"));
    let providers = ProviderSet::new()
        .with_backend(ProviderKind::ClaudeCode, Arc::new(cli))
        .with_backend(ProviderKind::OpenAi, after.clone());

    let err = Orchestrator::new(config, providers)
        .run("X", &NoopObserver)
        .await
        .unwrap_err();

    assert_eq!(err.phase, Phase::Round(1));
    assert_eq!(err.agent, "A");
    match &err.source {
        AgentError::ProcessFailed { stderr, .. } => assert_eq!(stderr, "session expired"),
        other => panic!("expected ProcessFailed, got {:?}", other),
    }
    assert_eq!(after.call_count(), 0);
}
