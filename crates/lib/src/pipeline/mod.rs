//! Pipeline coordination: sequence role steps, select skills per step,
//! assemble bounded context, and record run state.
//!
//! The executor seam is deliberately pluggable: the default implementation
//! only simulates execution (context is assembled but no engine is invoked),
//! and a real generative engine can be injected without touching the
//! coordinator.

pub mod context;
pub mod coordinator;

pub use coordinator::{PipelineCoordinator, Status};

use serde::Serialize;

/// Everything one step hands to the execution engine.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub agent_id: String,
    pub agent_name: String,
    pub query: String,
    /// The fully assembled layered context document.
    pub context: String,
}

/// Outcome of executing (or simulating) one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Context was assembled but no execution engine was invoked.
    Simulated,
    /// The injected engine ran the step to completion.
    Completed,
    /// The injected engine reported a failure.
    Failed(String),
}

impl StepStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StepStatus::Simulated => "simulated",
            StepStatus::Completed => "completed",
            StepStatus::Failed(_) => "failed",
        }
    }
}

/// Executes one step given its assembled context.
pub trait StepExecutor {
    fn execute(&self, ctx: &StepContext) -> StepStatus;
}

/// Default executor: prepare context only, never invoke an engine.
#[derive(Debug, Default)]
pub struct SimulatedExecutor;

impl StepExecutor for SimulatedExecutor {
    fn execute(&self, ctx: &StepContext) -> StepStatus {
        log::debug!(
            "simulated step for agent {} ({} context chars)",
            ctx.agent_id,
            ctx.context.chars().count()
        );
        StepStatus::Simulated
    }
}

/// Per-role record produced during a run. Never mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub agent_id: String,
    pub agent_name: String,
    pub skills_used: Vec<String>,
    /// Character count of the assembled context document.
    pub context_size: usize,
    pub status: StepStatus,
}

/// Aggregate of a single coordinator invocation. Owned by the caller once
/// returned; the coordinator keeps only a condensed summary in state.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub run_id: String,
    pub task_type: String,
    pub query: String,
    pub steps: Vec<StepResult>,
    /// True iff every role resolved and no step reported failure. Tracks
    /// pipeline wiring, not actual task completion.
    pub success: bool,
    pub errors: Vec<String>,
}

/// What `process_request` produced: a finished run, or a user cancellation
/// (which is explicitly not a failure).
#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunResult),
    Cancelled { task: String },
}

/// Fatal pipeline failures. Degradable conditions (missing roles, empty
/// catalog, corrupt state on load) never surface here.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("persisting run state: {0:#}")]
    State(anyhow::Error),

    #[error("writing session log: {0:#}")]
    SessionLog(anyhow::Error),
}
