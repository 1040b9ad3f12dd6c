//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.maestro/config.json`).
//! Sections cover skill/agent load paths, the scoring table path, and
//! pipeline bounds. Missing file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Skill catalog load path.
    #[serde(default)]
    pub skills: SkillsConfig,

    /// Agent spec load path.
    #[serde(default)]
    pub agents: AgentsConfig,

    /// Scoring table (vocabulary + affinity) override.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Pipeline bounds and workspace.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Skill load config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsConfig {
    /// Override the default skill root (`skills` next to the config file).
    /// Relative paths are resolved against the config file's parent.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Agent load config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentsConfig {
    /// Override the default agents dir (`agents` next to the config file).
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Scoring table config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    /// Override the default table path (`scoring.json` next to the config
    /// file). Missing or malformed tables fall back to the bundled default.
    #[serde(default)]
    pub table: Option<PathBuf>,
}

/// Pipeline bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Max skills injected per step (default 3).
    #[serde(default = "default_max_skills")]
    pub max_skills: usize,

    /// Minimum relevance score a skill needs to be selected (default 0.1).
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Workspace root whose `.maestro` subdirectory holds run state and the
    /// session log. Default: the current directory at run time.
    pub workspace: Option<PathBuf>,
}

fn default_max_skills() -> usize {
    3
}

fn default_min_score() -> f32 {
    0.1
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_skills: default_max_skills(),
            min_score: default_min_score(),
            workspace: None,
        }
    }
}

/// Resolve config path from env or default (`~/.maestro/config.json`).
pub fn default_config_path() -> PathBuf {
    std::env::var("MAESTRO_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".maestro").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the default path (or MAESTRO_CONFIG_PATH). Missing file
/// => default config. Returns the config and the path that was used (for
/// resolving sibling directories).
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

fn config_parent(config_path: &Path) -> &Path {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn resolve_sibling(
    override_path: &Option<PathBuf>,
    config_path: &Path,
    default_name: &str,
) -> PathBuf {
    let parent = config_parent(config_path);
    match override_path {
        Some(p) if !p.as_os_str().is_empty() => {
            if p.is_absolute() {
                p.clone()
            } else {
                parent.join(p)
            }
        }
        _ => parent.join(default_name),
    }
}

/// Primary skill root: `config.skills.directory` when set (relative paths
/// resolved against the config file's parent), else `skills` next to the
/// config file.
pub fn resolve_skills_dir(config: &Config, config_path: &Path) -> PathBuf {
    resolve_sibling(&config.skills.directory, config_path, "skills")
}

/// Agents dir: `config.agents.directory` when set, else `agents` next to the
/// config file.
pub fn resolve_agents_dir(config: &Config, config_path: &Path) -> PathBuf {
    resolve_sibling(&config.agents.directory, config_path, "agents")
}

/// Scoring table path: `config.scoring.table` when set, else `scoring.json`
/// next to the config file.
pub fn resolve_scoring_table(config: &Config, config_path: &Path) -> PathBuf {
    resolve_sibling(&config.scoring.table, config_path, "scoring.json")
}

/// Workspace root: `config.pipeline.workspace` when set, else the current
/// directory.
pub fn resolve_workspace_dir(config: &Config) -> PathBuf {
    config
        .pipeline
        .workspace
        .clone()
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_defaults() {
        let p = PipelineConfig::default();
        assert_eq!(p.max_skills, 3);
        assert!((p.min_score - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn resolve_skills_dir_default() {
        let config = Config::default();
        let path = Path::new("/home/user/.maestro/config.json");
        assert_eq!(
            resolve_skills_dir(&config, path),
            PathBuf::from("/home/user/.maestro/skills")
        );
    }

    #[test]
    fn resolve_skills_dir_override_relative() {
        let mut config = Config::default();
        config.skills.directory = Some(PathBuf::from("custom/skills"));
        let path = Path::new("/home/user/.maestro/config.json");
        assert_eq!(
            resolve_skills_dir(&config, path),
            PathBuf::from("/home/user/.maestro/custom/skills")
        );
    }

    #[test]
    fn resolve_scoring_table_override_absolute() {
        let mut config = Config::default();
        config.scoring.table = Some(PathBuf::from("/etc/maestro/scoring.json"));
        let path = Path::new("/home/user/.maestro/config.json");
        assert_eq!(
            resolve_scoring_table(&config, path),
            PathBuf::from("/etc/maestro/scoring.json")
        );
    }

    #[test]
    fn partial_config_parses_with_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"pipeline": {"maxSkills": 5}}"#).unwrap();
        assert_eq!(config.pipeline.max_skills, 5);
        assert!((config.pipeline.min_score - 0.1).abs() < f32::EPSILON);
        assert!(config.skills.directory.is_none());
    }
}
