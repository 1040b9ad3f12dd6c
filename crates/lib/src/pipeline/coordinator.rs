//! The pipeline coordinator: owns run state for one workspace, iterates an
//! ordered role list, selects skills per step, assembles context, and
//! implements the partial-failure continuation policy.
//!
//! Single-threaded by design: one role at a time, in list order. The
//! workspace state dir is guarded by an advisory file lock so two
//! coordinators never share the state file or session log.

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::agents::AgentRegistry;
use crate::intent::{ApprovalGate, IntentClassifier, TaskParams};
use crate::session::SessionLog;
use crate::skills::{select_skills, SelectOptions, SkillCatalog, ScoringTable};
use crate::state::{LastPipeline, PipelineState, StateLoad, StateStore};

use super::context;
use super::{
    PipelineError, RunOutcome, RunResult, SimulatedExecutor, StepContext, StepExecutor,
    StepResult, StepStatus,
};

/// Subdirectory of the workspace holding state, lock, and session log.
const STATE_DIR: &str = ".maestro";

/// Current coordinator status, for `maestro status`.
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub phase: String,
    pub active_task: Option<String>,
    pub agents_registered: usize,
    pub skills_available: usize,
    pub last_update: String,
}

/// Coordinates role-specialized agents over one workspace.
pub struct PipelineCoordinator {
    catalog: SkillCatalog,
    scoring: ScoringTable,
    agents: AgentRegistry,
    options: SelectOptions,
    orchestrator_instructions: String,
    state: PipelineState,
    state_load: StateLoad,
    state_store: StateStore,
    session_log: SessionLog,
    executor: Box<dyn StepExecutor>,
    /// Held for the coordinator's lifetime; enforces one writer per workspace.
    _lock_file: std::fs::File,
}

impl PipelineCoordinator {
    /// Build a coordinator for `workspace`. Creates the state dir, takes the
    /// writer lock, and loads prior state (absent or corrupt state degrades
    /// to defaults; see [`StateLoad`]).
    pub fn new(
        workspace: &Path,
        catalog: SkillCatalog,
        scoring: ScoringTable,
        agents: AgentRegistry,
        options: SelectOptions,
    ) -> Result<Self> {
        let state_dir = workspace.join(STATE_DIR);
        std::fs::create_dir_all(&state_dir)
            .with_context(|| format!("creating state dir {}", state_dir.display()))?;

        let lock_path = state_dir.join("lock");
        let lock_file = std::fs::File::create(&lock_path)
            .with_context(|| format!("creating lock file {}", lock_path.display()))?;
        lock_file.try_lock_exclusive().with_context(|| {
            format!(
                "workspace {} is in use by another coordinator",
                workspace.display()
            )
        })?;

        let state_store = StateStore::new(state_dir.join("state.json"));
        let (mut state, state_load) = state_store.load();
        if state_load == StateLoad::Absent {
            // First run in this workspace: persist the defaults immediately.
            state_store.save(&mut state)?;
        }

        let orchestrator_instructions = context::load_orchestrator_instructions(workspace);

        Ok(Self {
            catalog,
            scoring,
            agents,
            options,
            orchestrator_instructions,
            state,
            state_load,
            state_store,
            session_log: SessionLog::new(state_dir.join("session_context.md")),
            executor: Box::new(SimulatedExecutor),
            _lock_file: lock_file,
        })
    }

    /// Replace the default simulated executor with a real one.
    pub fn with_executor(mut self, executor: Box<dyn StepExecutor>) -> Self {
        self.executor = executor;
        self
    }

    /// How the prior state file loaded (valid, absent, or corrupt).
    pub fn state_load(&self) -> StateLoad {
        self.state_load
    }

    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    pub fn catalog(&self) -> &SkillCatalog {
        &self.catalog
    }

    /// Caller-facing entry point: classify the request, pass the approval
    /// gate when the category requires it, then run the pipeline. A negative
    /// approval short-circuits with a cancellation outcome; `run` is never
    /// invoked.
    pub fn process_request(
        &mut self,
        input: &str,
        classifier: &dyn IntentClassifier,
        approval: &dyn ApprovalGate,
    ) -> std::result::Result<RunOutcome, PipelineError> {
        let intent = classifier.classify(input);
        log::info!(
            "task {} -> pipeline [{}]",
            intent.category,
            intent.agents.join(" -> ")
        );
        if intent.requires_approval {
            let task = intent
                .params
                .description
                .clone()
                .unwrap_or_else(|| input.to_string());
            if !approval.confirm(&task) {
                log::info!("task cancelled by user: {}", task);
                return Ok(RunOutcome::Cancelled { task });
            }
        }
        let result = self.run(&intent.category, &intent.agents, &intent.params)?;
        Ok(RunOutcome::Completed(result))
    }

    /// Run the pipeline: one step per role id, in order. A missing role is
    /// recorded as an error and skipped; the run continues. State is
    /// persisted before the first step (crash-safety checkpoint) and again
    /// after the last.
    pub fn run(
        &mut self,
        category: &str,
        role_ids: &[String],
        params: &TaskParams,
    ) -> std::result::Result<RunResult, PipelineError> {
        self.state.current_phase = format!("PIPELINE:{}", category);
        self.state.active_task = Some(
            params
                .description
                .clone()
                .unwrap_or_else(|| category.to_string()),
        );
        self.state.active_agents = role_ids.to_vec();
        self.state_store
            .save(&mut self.state)
            .map_err(PipelineError::State)?;

        let query = params.description.clone().unwrap_or_default();
        let mut result = RunResult {
            run_id: format!("run-{}", uuid::Uuid::new_v4()),
            task_type: category.to_string(),
            query: query.clone(),
            steps: Vec::new(),
            success: true,
            errors: Vec::new(),
        };

        for (i, role_id) in role_ids.iter().enumerate() {
            log::info!("step {}/{}: agent {}", i + 1, role_ids.len(), role_id);

            let Some(agent) = self.agents.get(role_id) else {
                let msg = format!("agent {} not found", role_id);
                log::warn!("{}", msg);
                result.errors.push(msg);
                result.success = false;
                continue;
            };

            let selected = select_skills(
                &self.catalog,
                &self.scoring,
                &query,
                Some(role_id),
                self.options,
            );
            let skill_names: Vec<String> =
                selected.iter().map(|(s, _)| s.name.clone()).collect();
            if skill_names.is_empty() {
                log::debug!("no skills over threshold for agent {}", role_id);
            }

            let skills: Vec<&crate::skills::Skill> = selected.iter().map(|(s, _)| *s).collect();
            let document = context::build_step_context(
                &self.orchestrator_instructions,
                agent,
                &query,
                params,
                &skills,
                &result.steps,
            );

            self.session_log
                .record_step(role_id, &query, &skill_names)
                .map_err(PipelineError::SessionLog)?;

            let ctx = StepContext {
                agent_id: role_id.clone(),
                agent_name: agent.name.clone(),
                query: query.clone(),
                context: document,
            };
            let status = self.executor.execute(&ctx);
            if let StepStatus::Failed(ref e) = status {
                result.errors.push(format!("agent {} failed: {}", role_id, e));
                result.success = false;
            }

            result.steps.push(StepResult {
                agent_id: role_id.clone(),
                agent_name: agent.name.clone(),
                skills_used: skill_names,
                context_size: ctx.context.chars().count(),
                status,
            });
        }

        // Phase intentionally keeps the pipeline label; state records last
        // activity, not "currently running".
        self.state.last_pipeline = Some(LastPipeline {
            task_type: category.to_string(),
            agents: role_ids.to_vec(),
            timestamp: chrono::Local::now().to_rfc3339(),
        });
        self.state_store
            .save(&mut self.state)
            .map_err(PipelineError::State)?;

        log::info!(
            "pipeline {} complete: {} steps, {} errors",
            category,
            result.steps.len(),
            result.errors.len()
        );
        Ok(result)
    }

    pub fn status(&self) -> Status {
        Status {
            phase: self.state.current_phase.clone(),
            active_task: self.state.active_task.clone(),
            agents_registered: self.agents.len(),
            skills_available: self.catalog.len(),
            last_update: self.state.timestamp.clone(),
        }
    }

    /// The workspace state dir for a given workspace root.
    pub fn state_dir(workspace: &Path) -> PathBuf {
        workspace.join(STATE_DIR)
    }
}
