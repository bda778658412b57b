//! Lifecycle tracker properties

use fleet::subagent::{Origin, Outcome, Phase, SubagentRecord, SubagentStatus, SubagentTracker};
use serde_json::json;

fn record(id: &str) -> SubagentRecord {
    SubagentRecord::new(id, format!("task {id}"), id, Origin::new("cli", "direct"), 15)
}

fn tool(name: &str) -> Phase {
    Phase::ToolRunning {
        tool_name: name.to_string(),
        arguments: json!({}),
    }
}

fn ids(records: &[SubagentRecord]) -> Vec<String> {
    records.iter().map(|r| r.id.clone()).collect()
}

#[test]
fn test_mark_completed_sets_terminal_fields() {
    let tracker = SubagentTracker::new(20);
    tracker.register(record("a"));
    tracker.update_phase("a", tool("exec"), Some(1));
    tracker.mark_completed("a", Outcome::Completed("all good".into()));

    let r = tracker.get("a").unwrap();
    assert!(matches!(r.status, SubagentStatus::Completed { .. }));
    assert!(r.ended_at().is_some());
    assert!(r.current_tool().is_none());
    assert_eq!(r.result_summary(), Some("all good"));
    assert_eq!(r.display_status().split(' ').next(), Some("completed"));
}

#[test]
fn test_tools_used_keeps_order_and_duplicates() {
    let tracker = SubagentTracker::new(20);
    tracker.register(record("a"));
    let sequence = ["read_file", "exec", "read_file", "web_fetch", "exec"];
    for (i, name) in sequence.iter().enumerate() {
        tracker.update_phase("a", tool(name), Some(i as u32 + 1));
        tracker.update_phase("a", Phase::Thinking, None);
    }
    assert_eq!(tracker.get("a").unwrap().tools_used, sequence);
}

#[test]
fn test_pruning_keeps_most_recent_k() {
    let k = 3;
    let tracker = SubagentTracker::new(k);
    let all: Vec<String> = (0..7).map(|i| format!("c{i}")).collect();
    for id in &all {
        tracker.register(record(id));
        tracker.mark_completed(id, Outcome::Completed("done".into()));
    }

    let kept = ids(&tracker.get_all());
    assert_eq!(kept.len(), k);
    assert_eq!(kept, all[4..].to_vec());
}

#[test]
fn test_pruning_never_evicts_running() {
    let k = 2;
    let tracker = SubagentTracker::new(k);
    tracker.register(record("oldest-running"));
    for i in 0..k + 3 {
        let id = format!("c{i}");
        tracker.register(record(&id));
        tracker.mark_completed(&id, Outcome::Errored("nope".into()));
    }

    assert_eq!(tracker.len(), k + 1);
    assert!(tracker.get("oldest-running").unwrap().is_running());
    assert_eq!(ids(&tracker.get_running()), vec!["oldest-running"]);
}

#[test]
fn test_unknown_id_leaves_others_untouched() {
    let tracker = SubagentTracker::new(20);
    tracker.register(record("a"));
    tracker.update_phase("a", Phase::Thinking, Some(2));
    let before = tracker.get("a").unwrap();

    tracker.update_phase("ghost", tool("exec"), Some(9));
    tracker.mark_completed("ghost", Outcome::Errored("x".into()));

    let after = tracker.get("a").unwrap();
    assert_eq!(tracker.len(), 1);
    assert_eq!(after.iteration, before.iteration);
    assert_eq!(after.phase, before.phase);
    assert_eq!(after.status, before.status);
    assert!(after.tools_used.is_empty());
}

#[test]
fn test_reads_are_idempotent() {
    let tracker = SubagentTracker::new(20);
    tracker.register(record("a"));
    tracker.register(record("b"));
    tracker.mark_completed("b", Outcome::Completed("done".into()));

    let first = ids(&tracker.get_all());
    for _ in 0..3 {
        assert_eq!(ids(&tracker.get_all()), first);
        assert_eq!(ids(&tracker.get_running()), vec!["a"]);
        assert_eq!(tracker.get("b").unwrap().result_summary(), Some("done"));
    }
    assert_eq!(tracker.get_running_count(), 1);
    assert_eq!(tracker.len(), 2);
}

#[test]
fn test_concurrent_updates_are_consistent() {
    use std::sync::Arc;
    use std::thread;

    let tracker = Arc::new(SubagentTracker::new(100));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                let id = format!("t{t}");
                tracker.register(record(&id));
                for step in 1..=10 {
                    tracker.update_phase(&id, tool("exec"), Some(step));
                }
                tracker.mark_completed(&id, Outcome::Completed(id.clone()));
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(tracker.len(), 8);
    assert_eq!(tracker.get_running_count(), 0);
    for r in tracker.get_all() {
        assert_eq!(r.tools_used.len(), 10);
        assert_eq!(r.iteration, 10);
    }
}
