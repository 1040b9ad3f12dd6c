//! Layered context assembly for one pipeline step.
//!
//! Layer order: system orchestration instructions, the agent's own
//! instructions, each selected skill's full document, the task (query +
//! raw parameters), and a condensed summary of prior steps for cross-step
//! continuity within the run.

use std::path::Path;

use crate::agents::AgentSpec;
use crate::intent::TaskParams;
use crate::skills::Skill;

use super::StepResult;

static DEFAULT_ORCHESTRATOR_INSTRUCTIONS: &str = include_str!("../../config/orchestrator.md");

const SECTION_RULE: &str = "============================================================";
const SKILL_RULE: &str = "----------------------------------------";

/// Load orchestration instructions: a workspace `ORCHESTRATOR.md` override
/// when present and non-empty, otherwise the bundled default.
pub fn load_orchestrator_instructions(workspace: &Path) -> String {
    let path = workspace.join("ORCHESTRATOR.md");
    match std::fs::read_to_string(&path) {
        Ok(s) if !s.trim().is_empty() => {
            log::debug!("using orchestration instructions from {}", path.display());
            s
        }
        _ => DEFAULT_ORCHESTRATOR_INSTRUCTIONS.to_string(),
    }
}

/// Assemble the full context document for one step.
pub fn build_step_context(
    orchestration: &str,
    agent: &AgentSpec,
    query: &str,
    params: &TaskParams,
    skills: &[&Skill],
    previous: &[StepResult],
) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push("# SYSTEM ORCHESTRATION".to_string());
    parts.push(orchestration.trim_end().to_string());
    parts.push(SECTION_RULE.to_string());

    parts.push(format!("# AGENT: {}", agent.name));
    parts.push(agent.instructions.trim_end().to_string());
    parts.push(SECTION_RULE.to_string());

    if !skills.is_empty() {
        parts.push("# SELECTED SKILLS".to_string());
        for skill in skills {
            parts.push(format!("## Skill: {}", skill.name));
            parts.push(skill.content.trim_end().to_string());
            parts.push(SKILL_RULE.to_string());
        }
    }

    parts.push("# CURRENT TASK".to_string());
    parts.push(format!("Query: {}", query));
    parts.push(format!(
        "Parameters: {}",
        serde_json::to_string(params).unwrap_or_default()
    ));
    parts.push(SECTION_RULE.to_string());

    if !previous.is_empty() {
        parts.push("# PREVIOUS STEPS".to_string());
        for step in previous {
            parts.push(format!("- {}: {}", step.agent_name, step.status.as_str()));
            if !step.skills_used.is_empty() {
                parts.push(format!("  Skills: {}", step.skills_used.join(", ")));
            }
        }
        parts.push(SECTION_RULE.to_string());
    }

    parts.join("\n")
}
