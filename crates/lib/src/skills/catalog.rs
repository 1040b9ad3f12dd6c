//! Load skills from a directory tree: each skill is a subdirectory with a
//! SKILL.md (YAML frontmatter + markdown body).
//!
//! Frontmatter is optional. When it carries no explicit `keywords` list,
//! keywords are derived by scanning the description and the start of the
//! document against the scoring vocabulary.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// How many characters of the document body participate in keyword derivation.
const KEYWORD_SCAN_CHARS: usize = 500;

/// Maximum number of derived keywords kept per skill.
const MAX_KEYWORDS: usize = 10;

/// A loaded skill. Immutable after catalog construction.
#[derive(Debug, Clone)]
pub struct Skill {
    /// Catalog-unique name, taken from the skill's directory name.
    pub name: String,
    pub description: String,
    /// Lowercase keywords, either explicit from frontmatter or vocabulary-derived.
    pub keywords: Vec<String>,
    /// Raw SKILL.md content, handed to the agent verbatim when selected.
    pub content: String,
    pub path: PathBuf,
}

/// Frontmatter parsed from SKILL.md (minimal).
#[derive(Debug, Default, Deserialize)]
struct SkillFrontmatter {
    description: Option<String>,
    keywords: Option<Vec<String>>,
}

/// All skills known to one coordinator instance, in deterministic order.
#[derive(Debug, Default)]
pub struct SkillCatalog {
    skills: Vec<Skill>,
}

impl SkillCatalog {
    /// Scan the immediate subdirectories of `root`; each one containing a
    /// SKILL.md becomes a skill. A missing root yields an empty catalog, and
    /// subdirectories without SKILL.md are skipped; neither is an error.
    ///
    /// Entries are sorted by directory name so iteration order (and the
    /// selection tie-break that relies on it) is stable across loads.
    pub fn load(root: &Path, vocabulary: &[String]) -> Self {
        let mut skills = Vec::new();
        let read_dir = match std::fs::read_dir(root) {
            Ok(d) => d,
            Err(_) => {
                log::debug!("skills root not readable, catalog is empty: {}", root.display());
                return Self { skills };
            }
        };

        let mut dirs: Vec<PathBuf> = read_dir
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();

        for dir in dirs {
            let skill_md = dir.join("SKILL.md");
            let content = match std::fs::read_to_string(&skill_md) {
                Ok(c) => c,
                Err(_) => continue,
            };
            let name = dir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string();
            let (description, explicit_keywords) = parse_frontmatter(&content);
            let keywords = match explicit_keywords {
                Some(kw) if !kw.is_empty() => {
                    kw.into_iter().map(|k| k.trim().to_lowercase()).collect()
                }
                _ => derive_keywords(&description, &content, vocabulary),
            };
            skills.push(Skill {
                name,
                description,
                keywords,
                content,
                path: dir,
            });
        }

        log::info!("loaded {} skills from {}", skills.len(), root.display());
        Self { skills }
    }

    pub fn get(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.name == name)
    }

    /// Skills in deterministic (directory-name) order.
    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

/// Extract the YAML text between `---` delimiters. Both delimiters must sit
/// on their own lines; a `---` embedded inside a value does not close the
/// block. Returns None when there is no complete frontmatter block.
pub(crate) fn frontmatter_block(content: &str) -> Option<&str> {
    let rest = content.strip_prefix("---")?;
    let opening_end = rest.find('\n')?;
    if !rest[..opening_end].trim().is_empty() {
        return None;
    }
    let rest = &rest[opening_end + 1..];
    for (idx, _) in rest.match_indices("\n---") {
        let tail = &rest[idx + 4..];
        let line_end = tail.find('\n').unwrap_or(tail.len());
        if tail[..line_end].trim().is_empty() {
            return Some(rest[..idx].trim());
        }
    }
    None
}

/// Extract (description, explicit keywords) from a leading `---` frontmatter
/// block. Malformed YAML degrades to (empty, None); the caller falls back to
/// vocabulary-derived keywords.
fn parse_frontmatter(content: &str) -> (String, Option<Vec<String>>) {
    let Some(yaml) = frontmatter_block(content) else {
        return (String::new(), None);
    };
    match serde_yaml::from_str::<SkillFrontmatter>(yaml) {
        Ok(fm) => (
            fm.description.map(|d| d.trim().to_string()).unwrap_or_default(),
            fm.keywords,
        ),
        Err(e) => {
            log::warn!("malformed SKILL.md frontmatter, deriving keywords: {}", e);
            (String::new(), None)
        }
    }
}

/// Scan description + start of the document for vocabulary terms, retaining
/// hits in vocabulary order (not match-position order), capped at
/// `MAX_KEYWORDS`.
fn derive_keywords(description: &str, content: &str, vocabulary: &[String]) -> Vec<String> {
    let head: String = content.chars().take(KEYWORD_SCAN_CHARS).collect();
    let text = format!("{} {}", description, head).to_lowercase();
    vocabulary
        .iter()
        .filter(|term| text.contains(term.to_lowercase().as_str()))
        .take(MAX_KEYWORDS)
        .map(|term| term.to_lowercase())
        .collect()
}
