//! Intent classification and approval ports.
//!
//! The coordinator consumes intent as an opaque mapping from free text to a
//! task category plus an ordered role pipeline; approval is an injected
//! capability so the pipeline is testable without an interactive terminal.
//! `KeywordClassifier` is the default substring-based implementation.

use serde::{Deserialize, Serialize};

/// Parameters attached to a classified task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskParams {
    /// Free-text task description; the skill-selection query.
    pub description: Option<String>,
    /// Anything else the classifier wants to pass through verbatim.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub extra: serde_json::Value,
}

impl TaskParams {
    pub fn from_description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            extra: serde_json::Value::Null,
        }
    }
}

/// Result of classifying one user request.
#[derive(Debug, Clone)]
pub struct Intent {
    /// Task category label (free-form, e.g. "feature" or "bugfix").
    pub category: String,
    /// Ordered role ids to run, first to last.
    pub agents: Vec<String>,
    pub params: TaskParams,
    /// When true the caller must confirm via the approval gate before `run`.
    pub requires_approval: bool,
}

/// Maps free-text user input to a task category and role pipeline.
pub trait IntentClassifier {
    fn classify(&self, input: &str) -> Intent;
}

/// Asks for an explicit go-ahead before a flagged task runs. Blocks until a
/// decision is available; there is no timeout in the current design.
pub trait ApprovalGate {
    fn confirm(&self, task: &str) -> bool;
}

/// Approval gate that always answers the same way. Useful for tests and for
/// the CLI's `--yes` flag.
pub struct FixedApproval(pub bool);

impl ApprovalGate for FixedApproval {
    fn confirm(&self, _task: &str) -> bool {
        self.0
    }
}

/// Substring-based classifier with a fixed rule list, checked in order.
/// First matching rule wins; anything else is a "feature" build.
#[derive(Debug, Default)]
pub struct KeywordClassifier;

struct Rule {
    category: &'static str,
    triggers: &'static [&'static str],
    agents: &'static [&'static str],
    requires_approval: bool,
}

const RULES: &[Rule] = &[
    Rule {
        category: "deploy",
        triggers: &["deploy", "release", "ship to"],
        agents: &["devops"],
        requires_approval: true,
    },
    Rule {
        category: "bugfix",
        triggers: &["fix", "bug", "debug", "crash", "broken"],
        agents: &["debugger", "implementer", "reviewer"],
        requires_approval: false,
    },
    Rule {
        category: "review",
        triggers: &["review", "audit"],
        agents: &["reviewer"],
        requires_approval: false,
    },
    Rule {
        category: "planning",
        triggers: &["plan", "architecture", "roadmap"],
        agents: &["architect"],
        requires_approval: false,
    },
    Rule {
        category: "testing",
        triggers: &["test"],
        agents: &["tester", "reviewer"],
        requires_approval: false,
    },
];

const FALLBACK_AGENTS: &[&str] = &["architect", "implementer", "reviewer"];

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, input: &str) -> Intent {
        let lower = input.to_lowercase();
        for rule in RULES {
            if rule.triggers.iter().any(|t| lower.contains(t)) {
                return Intent {
                    category: rule.category.to_string(),
                    agents: rule.agents.iter().map(|s| s.to_string()).collect(),
                    params: TaskParams::from_description(input),
                    requires_approval: rule.requires_approval,
                };
            }
        }
        Intent {
            category: "feature".to_string(),
            agents: FALLBACK_AGENTS.iter().map(|s| s.to_string()).collect(),
            params: TaskParams::from_description(input),
            requires_approval: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deploy_requests_require_approval() {
        let intent = KeywordClassifier.classify("deploy to production with docker");
        assert_eq!(intent.category, "deploy");
        assert_eq!(intent.agents, vec!["devops"]);
        assert!(intent.requires_approval);
    }

    #[test]
    fn bugfix_pipeline_starts_with_debugger() {
        let intent = KeywordClassifier.classify("fix the null reference bug");
        assert_eq!(intent.category, "bugfix");
        assert_eq!(intent.agents[0], "debugger");
        assert!(!intent.requires_approval);
    }

    #[test]
    fn unmatched_input_falls_back_to_feature() {
        let intent = KeywordClassifier.classify("add a dashboard page");
        assert_eq!(intent.category, "feature");
        assert_eq!(intent.agents, FALLBACK_AGENTS.to_vec());
        assert!(intent.requires_approval);
        assert_eq!(
            intent.params.description.as_deref(),
            Some("add a dashboard page")
        );
    }
}
