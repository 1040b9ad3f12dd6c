//! Durable pipeline state: one JSON file per workspace.
//!
//! The state communicates "last activity", not "currently running": the
//! phase keeps the last pipeline label until the next run overwrites it.
//! Loads degrade to defaults, but the caller can observe whether the file
//! was absent, corrupt, or valid; writes are unconditional overwrites and
//! propagate failures.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Phase label for a workspace with no recorded pipeline activity.
pub const PHASE_IDLE: &str = "IDLE";

/// Singleton-per-workspace run state, serialized as `state.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    /// Free-form phase label: "IDLE" or "PIPELINE:<category>".
    pub current_phase: String,
    pub active_task: Option<String>,
    pub active_agents: Vec<String>,
    /// Part of the persisted shape; not consulted by current logic.
    #[serde(default)]
    pub history: Vec<serde_json::Value>,
    /// ISO-8601, refreshed on every save.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_pipeline: Option<LastPipeline>,
}

/// Condensed summary of the most recent run, folded into the state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastPipeline {
    pub task_type: String,
    pub agents: Vec<String>,
    /// ISO-8601 completion time.
    pub timestamp: String,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            current_phase: PHASE_IDLE.to_string(),
            active_task: None,
            active_agents: Vec::new(),
            history: Vec::new(),
            timestamp: chrono::Local::now().to_rfc3339(),
            last_pipeline: None,
        }
    }
}

/// What `StateStore::load` found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateLoad {
    Valid,
    /// No state file yet; defaults substituted.
    Absent,
    /// Unreadable or unparseable file; defaults substituted and a warning logged.
    Corrupt,
}

/// Reads and rewrites the workspace state file.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state, substituting defaults when the file is absent or
    /// corrupt. Corruption is reported, not raised.
    pub fn load(&self) -> (PipelineState, StateLoad) {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return (PipelineState::default(), StateLoad::Absent);
            }
            Err(e) => {
                log::warn!(
                    "state file unreadable at {}, using defaults: {}",
                    self.path.display(),
                    e
                );
                return (PipelineState::default(), StateLoad::Corrupt);
            }
        };
        match serde_json::from_str(&content) {
            Ok(state) => (state, StateLoad::Valid),
            Err(e) => {
                log::warn!(
                    "state file corrupt at {}, using defaults: {}",
                    self.path.display(),
                    e
                );
                (PipelineState::default(), StateLoad::Corrupt)
            }
        }
    }

    /// Refresh the timestamp and overwrite the whole file. Write failures
    /// propagate; state writes are assumed to succeed in normal operation.
    pub fn save(&self, state: &mut PipelineState) -> anyhow::Result<()> {
        use anyhow::Context;

        state.timestamp = chrono::Local::now().to_rfc3339();
        let json = serde_json::to_string_pretty(state).context("serializing pipeline state")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing state to {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_state_path() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("maestro-state-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir.join("state.json")
    }

    #[test]
    fn absent_file_yields_defaults() {
        let store = StateStore::new(temp_state_path());
        let (state, load) = store.load();
        assert_eq!(load, StateLoad::Absent);
        assert_eq!(state.current_phase, PHASE_IDLE);
        assert!(state.active_task.is_none());
        assert!(state.active_agents.is_empty());
        assert!(state.history.is_empty());
    }

    #[test]
    fn corrupt_file_yields_defaults_without_panicking() {
        let path = temp_state_path();
        std::fs::write(&path, "{ this is not json").unwrap();
        let store = StateStore::new(&path);
        let (state, load) = store.load();
        assert_eq!(load, StateLoad::Corrupt);
        assert_eq!(state.current_phase, PHASE_IDLE);
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = temp_state_path();
        let store = StateStore::new(&path);
        let mut state = PipelineState::default();
        state.current_phase = "PIPELINE:feature".to_string();
        state.active_task = Some("build the thing".to_string());
        state.last_pipeline = Some(LastPipeline {
            task_type: "feature".to_string(),
            agents: vec!["architect".to_string()],
            timestamp: chrono::Local::now().to_rfc3339(),
        });
        store.save(&mut state).unwrap();

        let (loaded, load) = store.load();
        assert_eq!(load, StateLoad::Valid);
        assert_eq!(loaded.current_phase, "PIPELINE:feature");
        assert_eq!(loaded.active_task.as_deref(), Some("build the thing"));
        let last = loaded.last_pipeline.unwrap();
        assert_eq!(last.task_type, "feature");
        // A real timestamp, not a placeholder path.
        assert!(chrono::DateTime::parse_from_rfc3339(&last.timestamp).is_ok());
    }
}
