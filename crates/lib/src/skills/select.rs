//! Skill selection: score the whole catalog, keep entries over the
//! threshold, and return the top few for one pipeline step.

use super::catalog::{Skill, SkillCatalog};
use super::scoring::ScoringTable;

/// Selection bounds. Defaults match the coordinator's per-step call.
#[derive(Debug, Clone, Copy)]
pub struct SelectOptions {
    /// Truncate the result to this many skills.
    pub max_skills: usize,
    /// Drop entries scoring below this.
    pub min_score: f32,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            max_skills: 3,
            min_score: 0.1,
        }
    }
}

/// Score every catalog entry against `query` (and `role`, when given),
/// filter by `min_score`, sort descending, truncate to `max_skills`.
///
/// The sort is stable: equal scores keep the catalog's deterministic
/// iteration order. An empty result is valid and means "no context needed".
pub fn select_skills<'a>(
    catalog: &'a SkillCatalog,
    table: &ScoringTable,
    query: &str,
    role: Option<&str>,
    options: SelectOptions,
) -> Vec<(&'a Skill, f32)> {
    let mut scored: Vec<(&Skill, f32)> = catalog
        .iter()
        .map(|skill| (skill, table.score(skill, query, role)))
        .filter(|(_, score)| *score >= options.min_score)
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(options.max_skills);
    scored
}
