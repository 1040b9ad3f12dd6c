//! Skill catalog, relevance scoring, and per-step skill selection.

pub mod catalog;
pub mod scoring;
pub mod select;

pub use catalog::{Skill, SkillCatalog};
pub use scoring::ScoringTable;
pub use select::{select_skills, SelectOptions};
