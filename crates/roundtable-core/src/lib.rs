// ABOUTME: Core library for roundtable, containing the agent, message, and transcript types.
// ABOUTME: Also loads and validates the run configuration file shared by every other crate.

pub mod config;
pub mod model;

pub use config::{ConfigError, RunConfig};
pub use model::{Agent, Message, ProviderKind, Role, Transcript};
