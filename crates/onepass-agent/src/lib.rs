#![doc = include_str!("../README.md")]

mod client;
pub use client::{connect_or_start, AgentClient};
mod error;
pub use error::AgentError;
mod protocol;
pub use protocol::{binary_version, AgentInfo, Request, Response, WireErrorKind};
mod server;
pub use server::Agent;

use std::path::PathBuf;
use std::time::Duration;

/// Subcommand used to re-invoke the current binary as the agent daemon.
pub const AGENT_SUBCOMMAND: &str = "agent";

/// How long unlocked keys are kept after the most recent client activity.
pub const DEFAULT_UNLOCK_DELAY: Duration = Duration::from_secs(2 * 60);

/// The agent's socket path: `~/.1pass.sock`.
pub fn default_socket_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".1pass.sock")
}
