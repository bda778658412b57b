//! The supervisor and subagent tool sets

mod common;

use common::{manager_with, MockProvider, TestFixture};
use fleet::config::SubagentSettings;
use fleet::subagent::SUBAGENT_TOOLS;
use fleet::tool::spawn::SpawnTool;
use fleet::tool::subagent_status::SubagentStatusTool;
use fleet::tool::ToolRegistry;
use std::sync::Arc;

#[test]
fn test_empty_registry() {
    let registry = ToolRegistry::new();
    assert!(registry.is_empty());
    assert!(registry.list_tool_definitions().is_empty());
}

#[tokio::test]
async fn test_subagent_registry_excludes_supervisor_tools() {
    let fixture = TestFixture::new();
    let (manager, _bus) = manager_with(
        Arc::new(MockProvider::new(vec![])),
        SubagentSettings::default(),
        fixture.path(),
    );

    let registry = manager.profile().build_tool_registry();
    assert_eq!(registry.len(), SUBAGENT_TOOLS.len());
    for name in SUBAGENT_TOOLS {
        let tool = registry.get(name).unwrap_or_else(|| panic!("{name} should be registered"));
        assert_eq!(tool.id(), *name);
    }
    assert!(registry.get("spawn").is_none());
    assert!(registry.get("subagent_status").is_none());
    assert!(registry.get("message").is_none());
}

#[tokio::test]
async fn test_supervisor_registry() {
    let fixture = TestFixture::new();
    let (manager, _bus) = manager_with(
        Arc::new(MockProvider::new(vec![])),
        SubagentSettings::default(),
        fixture.path(),
    );

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SpawnTool::new(Arc::clone(&manager))));
    registry.register(Arc::new(SubagentStatusTool::new(manager.tracker())));

    assert_eq!(registry.list_names(), vec!["spawn", "subagent_status"]);
    for def in registry.list_tool_definitions() {
        assert!(def["description"].as_str().is_some_and(|d| !d.is_empty()));
        assert_eq!(def["input_schema"]["type"], "object");
    }
}
