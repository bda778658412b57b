use anyhow::{bail, Result};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::bus::{InboundMessage, MessageBus};
use crate::config::station::{SubagentSettings, ToolSettings};
use crate::llm::LlmProvider;
use crate::subagent::config::SubagentProfile;
use crate::subagent::runner::SubagentRunner;
use crate::subagent::tracker::SubagentTracker;
use crate::subagent::types::{Origin, Outcome, SubagentRecord};

const LABEL_CHARS: usize = 30;

type LiveTasks = Arc<Mutex<HashMap<String, JoinHandle<()>>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Spawns background subagents and reports their results on the bus.
///
/// Each subagent is a tokio task running a [`SubagentRunner`]. Its lifecycle
/// is visible through [`SubagentManager::tracker`] and its outcome arrives as
/// a `system` message on the [`MessageBus`].
pub struct SubagentManager {
    provider: Arc<dyn LlmProvider>,
    bus: Arc<MessageBus>,
    tracker: Arc<SubagentTracker>,
    profile: SubagentProfile,
    max_concurrent: Option<usize>,
    live: LiveTasks,
    /// Held from the capacity check until the record is registered
    admission: Mutex<()>,
    issued: Mutex<HashSet<String>>,
    idle: Arc<Notify>,
}

impl SubagentManager {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        bus: Arc<MessageBus>,
        settings: &SubagentSettings,
        tools: &ToolSettings,
        workspace: PathBuf,
    ) -> Self {
        let profile =
            SubagentProfile::resolve(settings, tools, provider.default_model(), workspace);
        Self {
            provider,
            bus,
            tracker: Arc::new(SubagentTracker::new(settings.max_completed)),
            profile,
            max_concurrent: settings.max_concurrent,
            live: Arc::new(Mutex::new(HashMap::new())),
            admission: Mutex::new(()),
            issued: Mutex::new(HashSet::new()),
            idle: Arc::new(Notify::new()),
        }
    }

    pub fn tracker(&self) -> Arc<SubagentTracker> {
        Arc::clone(&self.tracker)
    }

    pub fn profile(&self) -> &SubagentProfile {
        &self.profile
    }

    pub fn get_running_count(&self) -> usize {
        self.tracker.get_running_count()
    }

    /// Runner tasks that have not finished announcing yet
    pub fn live_task_count(&self) -> usize {
        lock(&self.live).len()
    }

    /// Start `task` in the background and return an acknowledgement at once.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        &self,
        task: &str,
        label: Option<&str>,
        origin_channel: &str,
        origin_chat_id: &str,
    ) -> Result<String> {
        let task = task.trim();
        if task.is_empty() {
            bail!("task must not be empty");
        }

        let admission = lock(&self.admission);
        if let Some(max) = self.max_concurrent {
            let running = self.tracker.get_running_count();
            if running >= max {
                tracing::warn!(running, max, "subagent spawn refused, at capacity");
                return Ok(format!(
                    "Cannot start another subagent: {running} already running (limit {max}). \
                     Try again once one finishes."
                ));
            }
        }

        let id = self.fresh_id();
        let label = display_label(task, label);
        let origin = Origin::new(origin_channel, origin_chat_id);

        self.tracker.register(SubagentRecord::new(
            id.clone(),
            task,
            label.clone(),
            origin.clone(),
            self.profile.max_iterations,
        ));
        drop(admission);

        let job = Job {
            id: id.clone(),
            task: task.to_string(),
            label: label.clone(),
            origin,
            runner: SubagentRunner::new(
                id.clone(),
                task,
                Arc::clone(&self.provider),
                Arc::clone(&self.tracker),
                self.profile.clone(),
            ),
            tracker: Arc::clone(&self.tracker),
            bus: Arc::clone(&self.bus),
            guard: LiveGuard {
                id: id.clone(),
                live: Arc::clone(&self.live),
                idle: Arc::clone(&self.idle),
            },
        };

        // Held across spawn+insert so the guard cannot remove the entry first.
        let mut live = lock(&self.live);
        let handle = tokio::spawn(run_subagent(job));
        live.insert(id.clone(), handle);
        drop(live);

        tracing::info!(agent_id = %id, label = %label, "spawned subagent");
        Ok(format!(
            "Subagent [{label}] started (id: {id}). I'll notify you when it completes."
        ))
    }

    /// Wait until every spawned runner has finished and announced.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if lock(&self.live).is_empty() {
                return;
            }
            notified.await;
        }
    }

    fn fresh_id(&self) -> String {
        let mut issued = lock(&self.issued);
        loop {
            let id: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
            if !issued.contains(&id) && !self.tracker.contains(&id) {
                issued.insert(id.clone());
                return id;
            }
            tracing::debug!(id = %id, "subagent id collision, regenerating");
        }
    }
}

/// Explicit label, else the first 30 chars of the task.
fn display_label(task: &str, label: Option<&str>) -> String {
    if let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) {
        return label.to_string();
    }
    if task.chars().count() > LABEL_CHARS {
        format!("{}...", task.chars().take(LABEL_CHARS).collect::<String>())
    } else {
        task.to_string()
    }
}

/// Everything a background runner task owns
struct Job {
    id: String,
    task: String,
    label: String,
    origin: Origin,
    runner: SubagentRunner,
    tracker: Arc<SubagentTracker>,
    bus: Arc<MessageBus>,
    guard: LiveGuard,
}

/// Removes the live-task entry when the runner task ends, however it ends.
struct LiveGuard {
    id: String,
    live: LiveTasks,
    idle: Arc<Notify>,
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        lock(&self.live).remove(&self.id);
        self.idle.notify_waiters();
    }
}

/// Single exit point: every runner ends here exactly once.
async fn run_subagent(job: Job) {
    let Job {
        id,
        task,
        label,
        origin,
        runner,
        tracker,
        bus,
        guard: _guard,
    } = job;

    tracing::info!(agent_id = %id, label = %label, "subagent starting");

    let outcome = match tokio::spawn(async move { runner.run().await }).await {
        Ok(Ok(result)) => {
            tracing::info!(agent_id = %id, "subagent completed");
            Outcome::Completed(result)
        }
        Ok(Err(e)) => {
            tracing::error!(agent_id = %id, error = %e, "subagent failed");
            Outcome::Errored(e.to_string())
        }
        Err(join_error) => {
            tracing::error!(agent_id = %id, error = %join_error, "subagent task aborted");
            Outcome::Errored(format!("subagent task aborted: {join_error}"))
        }
    };

    tracker.mark_completed(&id, outcome.clone());
    bus.publish_inbound(announcement(&label, &task, &origin, &outcome)).await;
    tracing::debug!(agent_id = %id, route = %origin.route(), "subagent announced result");
}

/// `system` message telling the supervising agent how a subagent ended
pub fn announcement(label: &str, task: &str, origin: &Origin, outcome: &Outcome) -> InboundMessage {
    let (status_text, result) = match outcome {
        Outcome::Completed(text) => ("completed successfully", text.clone()),
        Outcome::Errored(message) => ("failed", format!("Error: {message}")),
    };

    let content = format!(
        "[Subagent '{label}' {status_text}]\n\n\
         Task: {task}\n\n\
         Result:\n{result}\n\n\
         Summarize this naturally for the user. Keep it brief (1-2 sentences). \
         Do not mention technical details like \"subagent\" or task IDs."
    );

    InboundMessage {
        channel: "system".to_string(),
        sender_id: "subagent".to_string(),
        chat_id: origin.route(),
        content,
    }
}
