use chrono::{DateTime, Local};
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::activity::format_tool_status;

/// Result and error text kept on a record is cut to this many chars.
pub const RESULT_PREVIEW_CHARS: usize = 200;

/// Where a subagent's announcement is routed back to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub channel: String,
    pub chat_id: String,
}

impl Origin {
    pub fn new(channel: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            chat_id: chat_id.into(),
        }
    }

    /// `channel:chat_id`, the routing key used on the bus
    pub fn route(&self) -> String {
        format!("{}:{}", self.channel, self.chat_id)
    }
}

/// What the runner is doing right now
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Starting,
    Thinking,
    ToolRunning { tool_name: String, arguments: Value },
    Done,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Starting => "starting",
            Phase::Thinking => "thinking",
            Phase::ToolRunning { .. } => "tool_running",
            Phase::Done => "done",
        }
    }
}

/// Lifecycle status. Terminal variants carry their end time and exactly one
/// of summary/error.
#[derive(Debug, Clone, PartialEq)]
pub enum SubagentStatus {
    Running,
    Completed { result_summary: String, ended_at: Instant },
    Errored { error_message: String, ended_at: Instant },
}

impl SubagentStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, SubagentStatus::Running)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubagentStatus::Running => "running",
            SubagentStatus::Completed { .. } => "completed",
            SubagentStatus::Errored { .. } => "error",
        }
    }
}

/// How a runner finished, as handed to `SubagentTracker::mark_completed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(String),
    Errored(String),
}

/// Snapshot of one subagent's lifecycle state
#[derive(Debug, Clone)]
pub struct SubagentRecord {
    pub id: String,
    pub task: String,
    pub label: String,
    pub origin: Origin,
    pub status: SubagentStatus,
    pub iteration: u32,
    pub max_iterations: u32,
    pub phase: Phase,
    pub tools_used: Vec<String>,
    pub started_at: Instant,
    pub spawned_at: DateTime<Local>,
}

impl SubagentRecord {
    /// Fresh `Running`/`Starting` record
    pub fn new(
        id: impl Into<String>,
        task: impl Into<String>,
        label: impl Into<String>,
        origin: Origin,
        max_iterations: u32,
    ) -> Self {
        Self {
            id: id.into(),
            task: task.into(),
            label: label.into(),
            origin,
            status: SubagentStatus::Running,
            iteration: 0,
            max_iterations,
            phase: Phase::Starting,
            tools_used: Vec::new(),
            started_at: Instant::now(),
            spawned_at: Local::now(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    pub fn ended_at(&self) -> Option<Instant> {
        match &self.status {
            SubagentStatus::Running => None,
            SubagentStatus::Completed { ended_at, .. } | SubagentStatus::Errored { ended_at, .. } => {
                Some(*ended_at)
            }
        }
    }

    pub fn result_summary(&self) -> Option<&str> {
        match &self.status {
            SubagentStatus::Completed { result_summary, .. } => Some(result_summary),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            SubagentStatus::Errored { error_message, .. } => Some(error_message),
            _ => None,
        }
    }

    pub fn current_tool(&self) -> Option<(&str, &Value)> {
        match &self.phase {
            Phase::ToolRunning { tool_name, arguments } => Some((tool_name, arguments)),
            _ => None,
        }
    }

    /// Time since start, frozen at `ended_at` once terminal.
    pub fn elapsed(&self) -> Duration {
        let end = self.ended_at().unwrap_or_else(Instant::now);
        end.saturating_duration_since(self.started_at)
    }

    /// One-line status, e.g. `thinking (step 2/15)` or `completed (3.1s)`
    pub fn display_status(&self) -> String {
        if !self.is_running() {
            return format!("{} ({:.1}s)", self.status.label(), self.elapsed().as_secs_f64());
        }
        let step = format!("(step {}/{})", self.iteration, self.max_iterations);
        match &self.phase {
            Phase::ToolRunning { tool_name, arguments } => {
                format!("{} {step}", format_tool_status(tool_name, arguments))
            }
            other => format!("{} {step}", other.name()),
        }
    }
}

/// First `max` chars of `text`.
pub(crate) fn preview(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> SubagentRecord {
        SubagentRecord::new("ab12cd34", "count files", "count files", Origin::new("cli", "direct"), 15)
    }

    #[test]
    fn test_new_record_is_running_and_starting() {
        let r = record();
        assert!(r.is_running());
        assert_eq!(r.phase, Phase::Starting);
        assert_eq!(r.iteration, 0);
        assert!(r.ended_at().is_none());
        assert!(r.result_summary().is_none());
        assert!(r.error_message().is_none());
        assert_eq!(r.display_status(), "starting (step 0/15)");
    }

    #[test]
    fn test_display_status_tool_running() {
        let mut r = record();
        r.iteration = 2;
        r.phase = Phase::ToolRunning {
            tool_name: "exec".into(),
            arguments: json!({"command": "ls -la"}),
        };
        assert_eq!(r.display_status(), "Running `ls -la` (step 2/15)");
        assert_eq!(r.current_tool().map(|(n, _)| n), Some("exec"));
    }

    #[test]
    fn test_display_status_terminal() {
        let mut r = record();
        r.status = SubagentStatus::Errored {
            error_message: "boom".into(),
            ended_at: r.started_at + Duration::from_millis(1500),
        };
        assert_eq!(r.display_status(), "error (1.5s)");
        assert_eq!(r.error_message(), Some("boom"));
        assert_eq!(r.elapsed(), Duration::from_millis(1500));
    }

    #[test]
    fn test_origin_route() {
        assert_eq!(Origin::new("telegram", "42").route(), "telegram:42");
    }

    #[test]
    fn test_preview_counts_chars() {
        assert_eq!(preview("héllo", 2), "hé");
        assert_eq!(preview("short", 200), "short");
    }
}
