//! Common test utilities: temp-dir fixture and a scripted LLM provider

#![allow(dead_code)]

use async_trait::async_trait;
use fleet::bus::MessageBus;
use fleet::config::{SubagentSettings, ToolSettings};
use fleet::llm::{ChatRequest, LlmProvider, LlmResponse, ToolUse};
use fleet::subagent::SubagentManager;
use fleet::tool::base::ToolContext;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::Semaphore;

/// Test fixture for file operations
pub struct TestFixture {
    /// Temporary directory that gets cleaned up automatically
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    /// Create a test file with given content
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let filepath = self.path().join(name);
        if let Some(parent) = filepath.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&filepath, content).expect("Failed to write test file");
        filepath
    }

    pub fn create_dir(&self, name: &str) -> PathBuf {
        let dirpath = self.path().join(name);
        std::fs::create_dir_all(&dirpath).expect("Failed to create test dir");
        dirpath
    }

    /// Create a binary file (for testing binary detection)
    pub fn create_binary_file(&self, name: &str) -> PathBuf {
        let filepath = self.path().join(name);
        std::fs::write(&filepath, [0x00u8, 0x01, 0x02, 0xFF, 0xFE, 0xFD])
            .expect("Failed to write binary file");
        filepath
    }

    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.path().join(name)).expect("Failed to read test file")
    }

    pub fn file_exists(&self, name: &str) -> bool {
        self.path().join(name).exists()
    }

    /// Tool context rooted at the fixture directory
    pub fn context(&self) -> ToolContext {
        ToolContext::new("test_session", "test_msg", "test_agent", self.path())
    }

    /// Same, but confined to the fixture directory
    pub fn restricted_context(&self) -> ToolContext {
        self.context().with_allowed_dir(Some(self.path()))
    }
}

/// One scripted provider reply
pub enum Step {
    Respond(LlmResponse),
    Fail(String),
    Panic,
}

pub fn answer(text: &str) -> Step {
    Step::Respond(LlmResponse::text(text))
}

pub fn call(id: &str, name: &str, input: Value) -> Step {
    Step::Respond(LlmResponse::with_tool_calls(vec![ToolUse {
        id: id.to_string(),
        name: name.to_string(),
        input,
    }]))
}

/// LLM provider that replays a script and records every request.
///
/// When gated, each `chat` call waits for a permit from [`MockProvider::release`]
/// so tests can observe runners mid-flight.
pub struct MockProvider {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<ChatRequest>>,
    gate: Option<Semaphore>,
}

impl MockProvider {
    pub fn new(script: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn gated(script: Vec<Step>) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(script)
        }
    }

    /// Let `n` pending or future `chat` calls proceed.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn chat(&self, request: ChatRequest) -> anyhow::Result<LlmResponse> {
        self.requests.lock().unwrap().push(request);
        if let Some(gate) = &self.gate {
            gate.acquire().await?.forget();
        }
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Respond(response)) => Ok(response),
            Some(Step::Fail(message)) => Err(anyhow::anyhow!(message)),
            Some(Step::Panic) => panic!("scripted provider panic"),
            None => Ok(LlmResponse::text("script exhausted")),
        }
    }

    fn default_model(&self) -> String {
        "mock-model".to_string()
    }
}

/// Manager wired to a mock provider and a fresh bus, working in `workspace`
pub fn manager_with(
    provider: Arc<MockProvider>,
    settings: SubagentSettings,
    workspace: PathBuf,
) -> (Arc<SubagentManager>, Arc<MessageBus>) {
    let bus = Arc::new(MessageBus::new());
    let manager = SubagentManager::new(
        provider,
        Arc::clone(&bus),
        &settings,
        &ToolSettings::default(),
        workspace,
    );
    (Arc::new(manager), bus)
}
