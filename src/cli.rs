use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::activity::indicator::{ActivityEvent, ActivityIndicator};
use crate::bus::{InboundMessage, MessageBus};
use crate::config;
use crate::llm::anthropic::AnthropicClient;
use crate::llm::LlmProvider;
use crate::logging;
use crate::subagent::{Phase, SubagentManager, SubagentRecord};

const REFRESH: Duration = Duration::from_millis(150);

#[derive(Parser, Debug)]
#[command(name = "fleet", version, about = "Run tasks as background subagents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Spawn one subagent per TASK and wait for their reports
    Run {
        /// Display label (suffixed with #n when several tasks are given)
        #[arg(short, long)]
        label: Option<String>,

        /// Channel the announcements are routed to
        #[arg(long, default_value = "cli")]
        channel: String,

        /// Chat id the announcements are routed to
        #[arg(long, default_value = "direct")]
        chat_id: String,

        /// Workspace directory (overrides [subagents].workspace)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Write debug logs to a file
        #[arg(long)]
        debug: bool,

        /// Task descriptions
        #[arg(required = true)]
        tasks: Vec<String>,
    },
    /// Print the config file location
    ConfigPath,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::ConfigPath => {
            println!("{}", config::config_path()?.display());
            Ok(())
        }
        Commands::Run {
            label,
            channel,
            chat_id,
            workspace,
            debug,
            tasks,
        } => {
            validate_tasks(&tasks)?;

            let mut config = config::load_or_create_config()?;
            config.debug |= debug;
            if workspace.is_some() {
                config.subagents.workspace = workspace;
            }
            let _log_guard = logging::init(&config)?;

            let station = config
                .active_station()
                .cloned()
                .context("No station configured; add one to config.toml")?;
            tracing::info!(station = %station.id, model = %station.model, "fleet starting");

            let provider: Arc<dyn LlmProvider> = Arc::new(AnthropicClient::new(station));
            let bus = Arc::new(MessageBus::new());
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            let manager = SubagentManager::new(
                provider,
                Arc::clone(&bus),
                &config.subagents,
                &config.tools,
                cwd,
            );

            let many = tasks.len() > 1;
            for (idx, task) in tasks.iter().enumerate() {
                let label = label.as_ref().map(|l| {
                    if many {
                        format!("{l}#{}", idx + 1)
                    } else {
                        l.clone()
                    }
                });
                match manager.spawn(task, label.as_deref(), &channel, &chat_id) {
                    Ok(ack) => eprintln!("{ack}"),
                    Err(e) => {
                        tracing::warn!(task_index = idx + 1, error = %e, "task rejected");
                        eprintln!("Task #{} rejected: {e}", idx + 1);
                    }
                }
            }

            let announcements = watch(&manager, &bus).await?;
            for msg in announcements {
                println!("{}\n", msg.content);
            }
            Ok(())
        }
    }
}

/// Reject the whole batch before anything is spawned.
fn validate_tasks(tasks: &[String]) -> Result<()> {
    if let Some(idx) = tasks.iter().position(|t| t.trim().is_empty()) {
        anyhow::bail!("Task #{} is empty; nothing was started", idx + 1);
    }
    Ok(())
}

/// Redraw progress until every runner has announced, then return the
/// announcements in arrival order.
async fn watch(manager: &SubagentManager, bus: &MessageBus) -> Result<Vec<InboundMessage>> {
    let tracker = manager.tracker();
    let mut indicator = ActivityIndicator::stderr("fleet");
    indicator.start()?;

    let mut received = Vec::new();
    let mut ticker = tokio::time::interval(REFRESH);

    loop {
        tokio::select! {
            msg = bus.consume_inbound() => match msg {
                Some(msg) => received.push(msg),
                None => break,
            },
            _ = ticker.tick() => {
                if manager.live_task_count() == 0 {
                    while let Some(msg) = bus.try_consume_inbound().await {
                        received.push(msg);
                    }
                    break;
                }
                let running = tracker.get_running();
                match running.as_slice() {
                    [only] => indicator.on_event(event_for(only))?,
                    _ => indicator.update(summary_line(&running))?,
                }
            }
        }
    }

    indicator.finish()?;
    Ok(received)
}

fn event_for(record: &SubagentRecord) -> ActivityEvent {
    match &record.phase {
        Phase::Starting | Phase::Thinking => ActivityEvent::Thinking {
            iteration: record.iteration.max(1),
        },
        Phase::ToolRunning { tool_name, arguments } => ActivityEvent::ToolStart {
            name: tool_name.clone(),
            arguments: arguments.clone(),
        },
        Phase::Done => ActivityEvent::Done,
    }
}

/// `[label] status | [label] status` for several runners
fn summary_line(running: &[SubagentRecord]) -> String {
    if running.is_empty() {
        return "finishing...".to_string();
    }
    running
        .iter()
        .map(|r| format!("[{}] {}", r.label, r.display_status()))
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subagent::Origin;
    use serde_json::json;

    fn record(label: &str) -> SubagentRecord {
        SubagentRecord::new("id", "task", label, Origin::new("cli", "direct"), 15)
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from(["fleet", "run", "--label", "docs", "summarize README"]).unwrap();
        match cli.command {
            Commands::Run { label, channel, chat_id, tasks, debug, .. } => {
                assert_eq!(label.as_deref(), Some("docs"));
                assert_eq!(channel, "cli");
                assert_eq!(chat_id, "direct");
                assert_eq!(tasks, vec!["summarize README"]);
                assert!(!debug);
            }
            Commands::ConfigPath => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_requires_a_task() {
        assert!(Cli::try_parse_from(["fleet", "run"]).is_err());
    }

    #[test]
    fn test_validate_tasks_rejects_any_empty_task() {
        let ok = vec!["first".to_string(), "second".to_string()];
        assert!(validate_tasks(&ok).is_ok());

        let bad = vec!["first".to_string(), "  ".to_string(), "third".to_string()];
        let err = validate_tasks(&bad).unwrap_err();
        assert!(err.to_string().contains("Task #2 is empty"));
    }

    #[test]
    fn test_event_for_phase() {
        let mut r = record("a");
        assert!(matches!(event_for(&r), ActivityEvent::Thinking { iteration: 1 }));
        r.phase = Phase::ToolRunning {
            tool_name: "web_search".into(),
            arguments: json!({"query": "rust"}),
        };
        assert!(matches!(event_for(&r), ActivityEvent::ToolStart { ref name, .. } if name == "web_search"));
    }

    #[test]
    fn test_summary_line() {
        let mut a = record("a");
        a.phase = Phase::Thinking;
        a.iteration = 2;
        let b = record("b");
        assert_eq!(
            summary_line(&[a, b]),
            "[a] thinking (step 2/15) | [b] starting (step 0/15)"
        );
        assert_eq!(summary_line(&[]), "finishing...");
    }
}
