//! Relevance scoring: rank a skill against a free-text query and an optional
//! role id.
//!
//! Four additive signals with fixed weights, clamped to [0, 1]: name match,
//! description word overlap, keyword containment, and role affinity. The
//! heuristics are deliberately cheap substring/word-set checks so scores are
//! deterministic and explainable. Vocabulary and affinity are operator data
//! loaded from a JSON table, not compiled-in constants; a bundled default
//! table backs missing or unreadable files.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::catalog::Skill;

/// Added when the skill's name (separators as spaces) appears in the query.
const NAME_WEIGHT: f32 = 0.5;
/// Scales the description/query word-overlap ratio.
const DESCRIPTION_WEIGHT: f32 = 0.3;
/// Added per keyword contained in the query.
const KEYWORD_WEIGHT: f32 = 0.15;
/// Added when the role's affinity set lists the skill.
const AFFINITY_WEIGHT: f32 = 0.2;

static BUNDLED_TABLE: &str = include_str!("../../config/scoring.json");

/// Scoring vocabulary and role→skill affinity, loaded from a JSON file.
///
/// The vocabulary drives keyword derivation for skills without an explicit
/// keyword list; the affinity map lets operators hand-tune which skills a
/// role prefers without touching the scoring math. Role ids are opaque
/// strings, never validated against an enum.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringTable {
    #[serde(default)]
    pub vocabulary: Vec<String>,
    #[serde(default)]
    pub affinity: HashMap<String, Vec<String>>,
}

impl ScoringTable {
    /// Load the table from `path`. A missing file uses the bundled default;
    /// an unreadable or malformed file logs a warning and does the same.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => {
                log::debug!(
                    "scoring table not found at {}, using bundled default",
                    path.display()
                );
                return Self::bundled();
            }
        };
        match serde_json::from_str(&content) {
            Ok(table) => table,
            Err(e) => {
                log::warn!(
                    "malformed scoring table at {}, using bundled default: {}",
                    path.display(),
                    e
                );
                Self::bundled()
            }
        }
    }

    /// The default table compiled into the binary (seeded to the config dir
    /// by `maestro init`).
    pub fn bundled() -> Self {
        serde_json::from_str(BUNDLED_TABLE).unwrap_or_else(|e| {
            log::error!("bundled scoring table is invalid: {}", e);
            Self::default()
        })
    }

    /// Score `skill` against `query` for an optional `role`. Pure and
    /// deterministic; identical inputs always yield the identical score.
    pub fn score(&self, skill: &Skill, query: &str, role: Option<&str>) -> f32 {
        let query_lower = query.to_lowercase();
        let mut score = 0.0f32;

        // 1. Direct skill name match (strongest signal).
        let spaced_name = skill.name.replace(['-', '_'], " ").to_lowercase();
        if !spaced_name.is_empty() && query_lower.contains(&spaced_name) {
            score += NAME_WEIGHT;
        }

        // 2. Description word overlap, normalized by query word count.
        if !skill.description.is_empty() {
            let desc_lower = skill.description.to_lowercase();
            let desc_words: HashSet<&str> = desc_lower.split_whitespace().collect();
            let query_words: HashSet<&str> = query_lower.split_whitespace().collect();
            let common = desc_words.intersection(&query_words).count();
            if common > 0 {
                score += DESCRIPTION_WEIGHT * common as f32 / query_words.len().max(1) as f32;
            }
        }

        // 3. Keyword containment, unbounded count.
        for keyword in &skill.keywords {
            if !keyword.is_empty() && query_lower.contains(keyword.as_str()) {
                score += KEYWORD_WEIGHT;
            }
        }

        // 4. Role affinity boost.
        if let Some(role) = role {
            let listed = self
                .affinity
                .get(role)
                .map(|names| names.iter().any(|n| n == &skill.name))
                .unwrap_or(false);
            if listed {
                score += AFFINITY_WEIGHT;
            }
        }

        score.min(1.0)
    }
}
