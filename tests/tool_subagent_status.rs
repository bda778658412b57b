//! Integration tests for the subagent_status and spawn tools

mod common;

use common::{answer, call, manager_with, MockProvider, TestFixture};
use fleet::config::SubagentSettings;
use fleet::subagent::{Origin, Outcome, Phase, SubagentRecord, SubagentTracker};
use fleet::tool::base::{Tool, ToolError};
use fleet::tool::spawn::SpawnTool;
use fleet::tool::subagent_status::SubagentStatusTool;
use serde_json::json;
use std::sync::Arc;

fn record(id: &str, label: &str) -> SubagentRecord {
    SubagentRecord::new(id, format!("do {label}"), label, Origin::new("cli", "direct"), 15)
}

async fn status(tool: &SubagentStatusTool, params: serde_json::Value) -> String {
    let fixture = TestFixture::new();
    tool.execute(params, &fixture.context()).await.unwrap().output
}

#[tokio::test]
async fn test_list_empty() {
    let tool = SubagentStatusTool::new(Arc::new(SubagentTracker::new(20)));
    assert_eq!(status(&tool, json!({"action": "list"})).await, "No subagents currently running.");
    assert_eq!(status(&tool, json!({"action": "all"})).await, "No subagents tracked.");
}

#[tokio::test]
async fn test_list_running() {
    let tracker = Arc::new(SubagentTracker::new(20));
    tracker.register(record("aaaa1111", "docs"));
    tracker.update_phase(
        "aaaa1111",
        Phase::ToolRunning {
            tool_name: "read_file".into(),
            arguments: json!({"path": "README.md"}),
        },
        Some(2),
    );
    tracker.register(record("bbbb2222", "done"));
    tracker.mark_completed("bbbb2222", Outcome::Completed("ok".into()));

    let tool = SubagentStatusTool::new(tracker);
    let out = status(&tool, json!({"action": "list"})).await;
    let mut lines = out.lines();
    assert_eq!(lines.next(), Some("1 running subagent(s):"));
    let line = lines.next().unwrap();
    assert!(line.starts_with("- [aaaa1111] docs | Reading README.md (step 2/15) | "));
    assert!(line.ends_with("s elapsed"));
    assert!(lines.next().is_none());
}

#[tokio::test]
async fn test_detail() {
    let tracker = Arc::new(SubagentTracker::new(20));
    tracker.register(SubagentRecord::new(
        "cccc3333",
        "x".repeat(150),
        "long",
        Origin::new("cli", "direct"),
        15,
    ));
    tracker.update_phase(
        "cccc3333",
        Phase::ToolRunning {
            tool_name: "exec".into(),
            arguments: json!({"command": "cargo fmt"}),
        },
        Some(1),
    );
    let tool = SubagentStatusTool::new(Arc::clone(&tracker));

    let out = status(&tool, json!({"action": "detail", "task_id": "cccc3333"})).await;
    assert!(out.starts_with("Subagent [cccc3333]: long\n"));
    assert!(out.contains("  Status: Running `cargo fmt` (step 1/15)"));
    assert!(out.contains(&format!("  Task: {}...", "x".repeat(100))));
    assert!(out.contains("  Iteration: 1/15"));
    assert!(out.contains("  Tools used: exec"));
    assert!(out.contains("  Currently: Running `cargo fmt`"));
    assert!(out.contains("  Started: "));
    assert!(!out.contains("Result:"));

    tracker.mark_completed("cccc3333", Outcome::Errored("exploded".into()));
    let out = status(&tool, json!({"action": "detail", "task_id": "cccc3333"})).await;
    assert!(out.contains("  Error: exploded"));
    assert!(!out.contains("Currently:"));
}

#[tokio::test]
async fn test_detail_missing_or_unknown() {
    let tool = SubagentStatusTool::new(Arc::new(SubagentTracker::new(20)));
    assert_eq!(
        status(&tool, json!({"action": "detail"})).await,
        "Error: task_id is required for 'detail' action."
    );
    assert_eq!(
        status(&tool, json!({"action": "detail", "task_id": "nope"})).await,
        "No subagent found with ID 'nope'."
    );
}

#[tokio::test]
async fn test_all_groups_running_and_completed() {
    let tracker = Arc::new(SubagentTracker::new(20));
    tracker.register(record("r1", "live"));
    tracker.register(record("c1", "good"));
    tracker.mark_completed("c1", Outcome::Completed("fine".into()));
    tracker.register(record("e1", "bad"));
    tracker.mark_completed("e1", Outcome::Errored("broken".into()));

    let tool = SubagentStatusTool::new(tracker);
    let out = status(&tool, json!({"action": "all"})).await;
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Running (1):");
    assert_eq!(lines[1], "  - [r1] live | starting (step 0/15)");
    assert_eq!(lines[2], "Completed (2):");
    assert!(lines[3].starts_with("  - [c1] good | ok | "));
    assert!(lines[4].starts_with("  - [e1] bad | ERR | "));
}

#[tokio::test]
async fn test_unknown_action_and_bad_params() {
    let tool = SubagentStatusTool::new(Arc::new(SubagentTracker::new(20)));
    assert_eq!(status(&tool, json!({"action": "cancel"})).await, "Unknown action: cancel");

    let fixture = TestFixture::new();
    let err = tool.execute(json!({}), &fixture.context()).await.unwrap_err();
    assert!(matches!(err, ToolError::InvalidParams(_)));
}

#[tokio::test]
async fn test_spawn_tool_routes_to_context() {
    let fixture = TestFixture::new();
    let provider = Arc::new(MockProvider::new(vec![
        call("toolu_1", "list_dir", json!({"path": "."})),
        answer("listed"),
    ]));
    let (manager, bus) = manager_with(provider, SubagentSettings::default(), fixture.path());

    let spawn = SpawnTool::new(Arc::clone(&manager));
    spawn.set_context("discord", "chan-7");
    let result = spawn
        .execute(json!({"task": "list the workspace", "label": "ls"}), &fixture.context())
        .await
        .unwrap();
    assert!(result.output.starts_with("Subagent [ls] started (id: "));

    let status_tool = SubagentStatusTool::new(manager.tracker());
    manager.wait_idle().await;

    let msg = bus.try_consume_inbound().await.unwrap();
    assert_eq!(msg.chat_id, "discord:chan-7");
    let out = status(&status_tool, json!({"action": "all"})).await;
    assert!(out.contains("] ls | ok | "));
}

#[tokio::test]
async fn test_spawn_tool_rejects_empty_task() {
    let fixture = TestFixture::new();
    let provider = Arc::new(MockProvider::new(vec![]));
    let (manager, _bus) = manager_with(provider, SubagentSettings::default(), fixture.path());

    let err = SpawnTool::new(manager)
        .execute(json!({"task": "  "}), &fixture.context())
        .await
        .unwrap_err();
    assert!(err.is_recoverable());
}
