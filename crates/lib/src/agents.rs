//! Agent registry: role-specialized agent specs loaded from a directory of
//! markdown files.
//!
//! Each `<id>.md` file is one agent: the file stem is the role id, an
//! optional YAML frontmatter supplies a display name, and the whole document
//! is the agent's instruction text. The coordinator treats the registry as a
//! read-only lookup table.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// One role-specialized agent (immutable once loaded).
#[derive(Debug, Clone)]
pub struct AgentSpec {
    /// Opaque role id (file stem, e.g. "implementer").
    pub id: String,
    /// Human display name; falls back to the id.
    pub name: String,
    /// Full instruction text handed to the execution engine as-is.
    pub instructions: String,
}

#[derive(Debug, Default, Deserialize)]
struct AgentFrontmatter {
    name: Option<String>,
}

/// Lookup table of agents by role id.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: HashMap<String, AgentSpec>,
}

impl AgentRegistry {
    /// Load every `*.md` file in `dir` as an agent spec. A missing or
    /// unreadable directory yields an empty registry, same degradation as a
    /// missing skills root.
    pub fn load(dir: &Path) -> Self {
        let mut agents = HashMap::new();
        let read_dir = match std::fs::read_dir(dir) {
            Ok(d) => d,
            Err(_) => {
                log::debug!("agents dir not readable, registry is empty: {}", dir.display());
                return Self { agents };
            }
        };
        for entry in read_dir.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
                continue;
            };
            let instructions = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(_) => continue,
            };
            let name = parse_display_name(&instructions).unwrap_or_else(|| id.clone());
            agents.insert(
                id.clone(),
                AgentSpec {
                    id,
                    name,
                    instructions,
                },
            );
        }
        log::info!("loaded {} agents from {}", agents.len(), dir.display());
        Self { agents }
    }

    pub fn register(&mut self, agent: AgentSpec) {
        self.agents.insert(agent.id.clone(), agent);
    }

    pub fn get(&self, id: &str) -> Option<&AgentSpec> {
        self.agents.get(id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Pull `name:` out of a leading `---` frontmatter block, if any.
fn parse_display_name(content: &str) -> Option<String> {
    let yaml = crate::skills::catalog::frontmatter_block(content)?;
    serde_yaml::from_str::<AgentFrontmatter>(yaml)
        .ok()
        .and_then(|fm| fm.name)
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}
