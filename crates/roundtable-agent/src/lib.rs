// ABOUTME: Agent system for roundtable: provider adapters plus the round-based orchestrator.
// ABOUTME: Each provider implements ChatBackend; the Orchestrator drives turns through a ProviderSet.

pub mod client;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod runtime;
pub mod testing;

pub use client::ProviderSet;
pub use orchestrator::{NoopObserver, Orchestrator, Phase, RunError, RunObserver, RunOutcome};
pub use runtime::{AgentError, ChatBackend};

/// Serializes every test in this crate that reads or writes env vars.
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Lock `ENV_MUTEX`, recovering from a poisoned lock left by a failed test.
#[cfg(test)]
pub(crate) fn lock_env() -> std::sync::MutexGuard<'static, ()> {
    ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
}
