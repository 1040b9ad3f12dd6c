//! Integration tests: full pipeline runs over a temp workspace with a real
//! skill catalog and agent registry on disk. No engine is invoked; the
//! default executor simulates every step.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lib::agents::AgentRegistry;
use lib::intent::{FixedApproval, KeywordClassifier, TaskParams};
use lib::pipeline::{PipelineCoordinator, RunOutcome, StepStatus};
use lib::skills::{ScoringTable, SelectOptions, SkillCatalog};
use lib::state::StateLoad;

struct TestWorkspace {
    root: PathBuf,
    skills: PathBuf,
    agents: PathBuf,
}

fn temp_workspace() -> TestWorkspace {
    let root = std::env::temp_dir().join(format!("maestro-pipeline-test-{}", uuid::Uuid::new_v4()));
    let skills = root.join("skills");
    let agents = root.join("agents");
    std::fs::create_dir_all(&skills).expect("create skills dir");
    std::fs::create_dir_all(&agents).expect("create agents dir");
    TestWorkspace {
        root,
        skills,
        agents,
    }
}

fn write_skill(dir: &Path, name: &str, body: &str) {
    let skill_dir = dir.join(name);
    std::fs::create_dir_all(&skill_dir).expect("create skill dir");
    std::fs::write(skill_dir.join("SKILL.md"), body).expect("write SKILL.md");
}

fn write_agent(dir: &Path, id: &str, name: &str) {
    std::fs::write(
        dir.join(format!("{}.md", id)),
        format!("---\nname: {}\n---\nDo the {} work.", name, id),
    )
    .expect("write agent file");
}

fn scoring_with_affinity(role: &str, skills: &[&str]) -> ScoringTable {
    let mut affinity = HashMap::new();
    affinity.insert(role.to_string(), skills.iter().map(|s| s.to_string()).collect());
    ScoringTable {
        vocabulary: Vec::new(),
        affinity,
    }
}

fn coordinator(ws: &TestWorkspace, scoring: ScoringTable) -> PipelineCoordinator {
    let catalog = SkillCatalog::load(&ws.skills, &scoring.vocabulary);
    let agents = AgentRegistry::load(&ws.agents);
    PipelineCoordinator::new(&ws.root, catalog, scoring, agents, SelectOptions::default())
        .expect("build coordinator")
}

#[test]
fn payment_skill_selected_by_name_and_affinity() {
    let ws = temp_workspace();
    write_skill(
        &ws.skills,
        "payment-integration",
        "---\ndescription: stripe checkout\n---\nUse the sandbox first.",
    );
    write_agent(&ws.agents, "implementer", "Implementation Agent");

    let scoring = scoring_with_affinity("implementer", &["payment-integration"]);
    let mut coord = coordinator(&ws, scoring);

    let params = TaskParams::from_description("create a payment integration with stripe");
    let result = coord
        .run("feature", &["implementer".to_string()], &params)
        .unwrap();

    assert!(result.success);
    assert_eq!(result.steps.len(), 1);
    let step = &result.steps[0];
    assert_eq!(step.agent_name, "Implementation Agent");
    assert_eq!(step.skills_used, vec!["payment-integration"]);
    assert_eq!(step.status, StepStatus::Simulated);
    assert!(step.context_size > 0);
}

#[test]
fn missing_role_is_skipped_but_run_continues() {
    let ws = temp_workspace();
    write_agent(&ws.agents, "implementer", "Implementation Agent");

    let mut coord = coordinator(&ws, ScoringTable::default());
    let params = TaskParams::from_description("do something");
    let result = coord
        .run(
            "feature",
            &["implementer".to_string(), "ghost".to_string()],
            &params,
        )
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.steps.len(), 1);
    assert_eq!(result.steps[0].agent_id, "implementer");
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("ghost"));
}

#[test]
fn missing_role_in_the_middle_still_runs_later_roles() {
    let ws = temp_workspace();
    write_agent(&ws.agents, "architect", "Architecture Agent");
    write_agent(&ws.agents, "reviewer", "Review Agent");

    let mut coord = coordinator(&ws, ScoringTable::default());
    let params = TaskParams::from_description("plan and review");
    let roles = vec![
        "architect".to_string(),
        "ghost".to_string(),
        "reviewer".to_string(),
    ];
    let result = coord.run("planning", &roles, &params).unwrap();

    assert!(!result.success);
    let ids: Vec<_> = result.steps.iter().map(|s| s.agent_id.as_str()).collect();
    assert_eq!(ids, vec!["architect", "reviewer"]);
    assert_eq!(result.errors.len(), 1);
}

#[test]
fn empty_skills_root_runs_without_skills() {
    let ws = temp_workspace();
    write_agent(&ws.agents, "implementer", "Implementation Agent");

    let mut coord = coordinator(&ws, ScoringTable::default());
    let params = TaskParams::from_description("anything");
    let result = coord
        .run("feature", &["implementer".to_string()], &params)
        .unwrap();

    assert!(result.success);
    assert!(result.steps[0].skills_used.is_empty());
}

#[test]
fn run_persists_state_and_session_log() {
    let ws = temp_workspace();
    write_agent(&ws.agents, "implementer", "Implementation Agent");

    let mut coord = coordinator(&ws, ScoringTable::default());
    assert_eq!(coord.state_load(), StateLoad::Absent);
    let params = TaskParams::from_description("build the widget");
    coord
        .run("feature", &["implementer".to_string()], &params)
        .unwrap();

    let state_dir = PipelineCoordinator::state_dir(&ws.root);
    let state: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(state_dir.join("state.json")).unwrap())
            .unwrap();
    assert_eq!(
        state.get("current_phase").and_then(|v| v.as_str()),
        Some("PIPELINE:feature")
    );
    assert_eq!(
        state.get("active_task").and_then(|v| v.as_str()),
        Some("build the widget")
    );
    let last = state.get("last_pipeline").expect("last_pipeline recorded");
    assert_eq!(last.get("task_type").and_then(|v| v.as_str()), Some("feature"));
    let ts = last.get("timestamp").and_then(|v| v.as_str()).unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());

    let log = std::fs::read_to_string(state_dir.join("session_context.md")).unwrap();
    assert!(log.starts_with("# Maestro Session Log"));
    assert!(log.contains("Agent implementer"));
    assert!(log.contains("**Query:** build the widget"));
}

#[test]
fn corrupt_state_file_degrades_to_defaults() {
    let ws = temp_workspace();
    let state_dir = PipelineCoordinator::state_dir(&ws.root);
    std::fs::create_dir_all(&state_dir).unwrap();
    std::fs::write(state_dir.join("state.json"), "not json at all").unwrap();

    let coord = coordinator(&ws, ScoringTable::default());
    assert_eq!(coord.state_load(), StateLoad::Corrupt);
    assert_eq!(coord.status().phase, "IDLE");
}

#[test]
fn declined_approval_cancels_without_running() {
    let ws = temp_workspace();
    write_agent(&ws.agents, "devops", "DevOps Agent");

    let mut coord = coordinator(&ws, ScoringTable::default());
    // "deploy" is a flagged category in the default classifier.
    let outcome = coord
        .process_request("deploy to production", &KeywordClassifier, &FixedApproval(false))
        .unwrap();

    match outcome {
        RunOutcome::Cancelled { task } => assert_eq!(task, "deploy to production"),
        RunOutcome::Completed(_) => panic!("declined approval must not run the pipeline"),
    }
    // run() was never invoked, so the phase never left IDLE.
    assert_eq!(coord.status().phase, "IDLE");
}

#[test]
fn granted_approval_runs_the_classified_pipeline() {
    let ws = temp_workspace();
    write_agent(&ws.agents, "devops", "DevOps Agent");

    let mut coord = coordinator(&ws, ScoringTable::default());
    let outcome = coord
        .process_request("deploy to production", &KeywordClassifier, &FixedApproval(true))
        .unwrap();

    match outcome {
        RunOutcome::Completed(result) => {
            assert!(result.success);
            assert_eq!(result.task_type, "deploy");
            assert_eq!(result.steps.len(), 1);
            assert_eq!(result.steps[0].agent_id, "devops");
        }
        RunOutcome::Cancelled { .. } => panic!("granted approval must run the pipeline"),
    }
}

#[test]
fn workspace_lock_rejects_second_coordinator() {
    let ws = temp_workspace();
    let scoring = ScoringTable::default();
    let first = coordinator(&ws, scoring);

    let catalog = SkillCatalog::load(&ws.skills, &[]);
    let agents = AgentRegistry::load(&ws.agents);
    let second = PipelineCoordinator::new(
        &ws.root,
        catalog,
        ScoringTable::default(),
        agents,
        SelectOptions::default(),
    );
    assert!(second.is_err());
    drop(first);
}
