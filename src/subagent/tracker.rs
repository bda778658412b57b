use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use super::types::{preview, Outcome, Phase, SubagentRecord, SubagentStatus, RESULT_PREVIEW_CHARS};

/// In-memory registry of subagent lifecycle state.
///
/// Every operation takes the lock for its whole duration and never across an
/// `.await`, so reads always see a consistent record. Readers get clones.
pub struct SubagentTracker {
    records: Mutex<HashMap<String, SubagentRecord>>,
    max_completed: usize,
}

impl SubagentTracker {
    pub fn new(max_completed: usize) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            max_completed,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SubagentRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a record, replacing any record with the same id.
    pub fn register(&self, record: SubagentRecord) {
        tracing::debug!(agent_id = %record.id, label = %record.label, "tracker register");
        self.lock().insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<SubagentRecord> {
        self.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    /// Move a running record to `phase`. Entering `ToolRunning` appends the
    /// tool to `tools_used`. Iteration only ever moves forward and is capped at
    /// `max_iterations`. Unknown ids and terminal records are left alone.
    pub fn update_phase(&self, id: &str, phase: Phase, iteration: Option<u32>) {
        let mut records = self.lock();
        let Some(record) = records.get_mut(id) else {
            return;
        };
        if !record.is_running() {
            return;
        }

        if let Some(i) = iteration {
            record.iteration = record.iteration.max(i.min(record.max_iterations));
        }
        if let Phase::ToolRunning { tool_name, .. } = &phase {
            record.tools_used.push(tool_name.clone());
        }
        record.phase = phase;
    }

    /// Finalize a running record, then prune old terminal records.
    pub fn mark_completed(&self, id: &str, outcome: Outcome) {
        let mut records = self.lock();
        let Some(record) = records.get_mut(id) else {
            return;
        };
        if !record.is_running() {
            tracing::debug!(agent_id = %id, "mark_completed on terminal record ignored");
            return;
        }

        let ended_at = Instant::now();
        record.status = match outcome {
            Outcome::Completed(text) => SubagentStatus::Completed {
                result_summary: preview(&text, RESULT_PREVIEW_CHARS),
                ended_at,
            },
            Outcome::Errored(text) => SubagentStatus::Errored {
                error_message: preview(&text, RESULT_PREVIEW_CHARS),
                ended_at,
            },
        };
        record.phase = Phase::Done;

        Self::prune(&mut records, self.max_completed);
    }

    /// Drop the oldest terminal records until at most `max_completed` remain.
    fn prune(records: &mut HashMap<String, SubagentRecord>, max_completed: usize) {
        let mut finished: Vec<(Instant, Instant, String)> = records
            .values()
            .filter_map(|r| r.ended_at().map(|end| (end, r.started_at, r.id.clone())))
            .collect();
        if finished.len() <= max_completed {
            return;
        }

        finished.sort();
        let excess = finished.len() - max_completed;
        for (_, _, id) in finished.into_iter().take(excess) {
            records.remove(&id);
        }
        tracing::debug!(evicted = excess, "pruned finished subagents");
    }

    /// Running records, oldest first
    pub fn get_running(&self) -> Vec<SubagentRecord> {
        let mut running: Vec<SubagentRecord> =
            self.lock().values().filter(|r| r.is_running()).cloned().collect();
        sort_by_start(&mut running);
        running
    }

    /// Every retained record, oldest first
    pub fn get_all(&self) -> Vec<SubagentRecord> {
        let mut all: Vec<SubagentRecord> = self.lock().values().cloned().collect();
        sort_by_start(&mut all);
        all
    }

    pub fn get_running_count(&self) -> usize {
        self.lock().values().filter(|r| r.is_running()).count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for SubagentTracker {
    fn default() -> Self {
        Self::new(20)
    }
}

fn sort_by_start(records: &mut [SubagentRecord]) {
    records.sort_by(|a, b| a.started_at.cmp(&b.started_at).then_with(|| a.id.cmp(&b.id)));
}
