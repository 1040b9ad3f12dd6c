//! Initialize the configuration directory: create ~/.maestro, default
//! config, scoring table, bundled agents, and starter skills.
//!
//! Layout mirrors `crates/lib/config/`: `config/skills/` → `~/.maestro/skills/`,
//! `config/agents/` → `~/.maestro/agents/`, `config/scoring.json` →
//! `~/.maestro/scoring.json`.

use anyhow::{Context, Result};
use include_dir::{include_dir, Dir};
use std::path::{Path, PathBuf};

use crate::config;

static BUNDLED_SKILLS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/config/skills");
static BUNDLED_AGENTS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/config/agents");
static DEFAULT_SCORING: &str = include_str!("../config/scoring.json");

/// Ensure the configuration directory has been initialized (config file and
/// skills directory exist).
pub fn require_initialized(config_path: &Path, config: &config::Config) -> Result<()> {
    if !config_path.exists() {
        anyhow::bail!(
            "configuration not initialized; run `maestro init` first (config file not found: {})",
            config_path.display()
        );
    }
    let skills_dir = config::resolve_skills_dir(config, config_path);
    if !skills_dir.exists() {
        anyhow::bail!(
            "configuration not initialized; run `maestro init` first (skills directory not found: {})",
            skills_dir.display()
        );
    }
    Ok(())
}

/// Create the config directory and default files if they do not exist.
/// - Writes `config.json` with `{}` if missing.
/// - Writes the default `scoring.json` (vocabulary + affinity) if missing.
/// - Extracts bundled agents into `agents` if it does not exist.
/// - Extracts starter skills into `skills` if it does not exist.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        std::fs::write(config_path, b"{}")
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    }

    let scoring_path = config_dir.join("scoring.json");
    if !scoring_path.exists() {
        std::fs::write(&scoring_path, DEFAULT_SCORING)
            .with_context(|| format!("writing scoring table to {}", scoring_path.display()))?;
        log::info!("wrote default scoring table to {}", scoring_path.display());
    }

    let agents_dir = config_dir.join("agents");
    if !agents_dir.exists() {
        std::fs::create_dir_all(&agents_dir)
            .with_context(|| format!("creating agents directory {}", agents_dir.display()))?;
        if let Err(e) = BUNDLED_AGENTS.extract(&agents_dir) {
            anyhow::bail!("extracting bundled agents to {}: {}", agents_dir.display(), e);
        }
        log::info!("extracted bundled agents to {}", agents_dir.display());
    }

    let skills_dir = config_dir.join("skills");
    if !skills_dir.exists() {
        std::fs::create_dir_all(&skills_dir)
            .with_context(|| format!("creating skills directory {}", skills_dir.display()))?;
        if let Err(e) = BUNDLED_SKILLS.extract(&skills_dir) {
            anyhow::bail!("extracting bundled skills to {}: {}", skills_dir.display(), e);
        }
        log::info!("extracted bundled skills to {}", skills_dir.display());
    } else {
        log::debug!(
            "skills directory already exists at {}, skipping",
            skills_dir.display()
        );
    }

    Ok(config_dir.to_path_buf())
}
