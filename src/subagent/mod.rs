//! Background subagents: spawn, run, track, report.

pub mod config;
pub mod manager;
pub mod runner;
pub mod tracker;
pub mod types;

pub use config::{SubagentProfile, SUBAGENT_TOOLS};
pub use manager::SubagentManager;
pub use runner::{SubagentError, SubagentRunner, NO_FINAL_RESPONSE};
pub use tracker::SubagentTracker;
pub use types::{Origin, Outcome, Phase, SubagentRecord, SubagentStatus};
