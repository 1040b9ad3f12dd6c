//! Append-only, human-readable session log for pipeline runs.
//!
//! Each step appends a small Markdown block (timestamp heading, query line,
//! skills line). The file is never rewritten; the first write also emits a
//! one-line header.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

const FILE_HEADER: &str = "# Maestro Session Log\n";

/// Appends per-step execution entries to `session_context.md`.
#[derive(Debug)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one step entry. Writes the file header first when the log does
    /// not exist yet.
    pub fn record_step(&self, agent_id: &str, query: &str, skill_names: &[String]) -> Result<()> {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let skills = if skill_names.is_empty() {
            "None".to_string()
        } else {
            skill_names.join(", ")
        };
        let entry = format!(
            "\n## [{}] Agent {}\n**Query:** {}\n**Skills:** {}\n---\n",
            timestamp, agent_id, query, skills
        );

        let is_new = !self.path.exists();
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening session log {}", self.path.display()))?;
        if is_new {
            file.write_all(FILE_HEADER.as_bytes())
                .with_context(|| format!("writing session log header {}", self.path.display()))?;
        }
        file.write_all(entry.as_bytes())
            .with_context(|| format!("appending to session log {}", self.path.display()))?;
        Ok(())
    }
}
