//! Markdown knowledge base backing the voice agent's company answers.
//!
//! Each article is an `.mdx` file with YAML frontmatter (`title`, `topic`,
//! `tags`, `created`, `updated`) and a markdown body. The file stem is the
//! entry id. Reads go straight to disk so edits made while the server runs
//! are picked up on the next query.

mod entry;
mod error;
pub mod frontmatter;
pub mod search;

pub use entry::KnowledgeEntry;
pub use error::KnowledgeError;

use serde_yaml::{Mapping, Value};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Default directory holding the `.mdx` articles.
pub const DEFAULT_KB_DIR: &str = "knowledgebase/mdx";

const EXTENSION: &str = "mdx";

/// Changes to apply in [`KnowledgeBase::update`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub title: Option<String>,
    pub topic: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Handle to a directory of `.mdx` articles.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    dir: PathBuf,
}

impl KnowledgeBase {
    /// Opens `dir`, creating it when missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, KnowledgeError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, EXTENSION))
    }

    fn mdx_files(&self) -> Result<Vec<PathBuf>, KnowledgeError> {
        let mut files = Vec::new();
        for dir_entry in std::fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == EXTENSION) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Parses every article, sorted by filename. Unreadable files are
    /// skipped with a warning.
    pub fn read_all(&self) -> Result<Vec<KnowledgeEntry>, KnowledgeError> {
        let mut entries = Vec::new();
        for path in self.mdx_files()? {
            match std::fs::read_to_string(&path) {
                Ok(content) => entries.push(KnowledgeEntry::parse(&path, &content)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable knowledge base file");
                }
            }
        }
        Ok(entries)
    }

    /// Finds articles relevant to a spoken query. See [`search::search`].
    pub fn search(&self, query: &str) -> Result<Vec<KnowledgeEntry>, KnowledgeError> {
        let entries = self.read_all()?;
        let hits = search::search(&entries, query);
        tracing::debug!(query, hits = hits.len(), "knowledge base search");
        Ok(hits)
    }

    /// Sorted, unique, non-empty topics.
    pub fn topics(&self) -> Result<Vec<String>, KnowledgeError> {
        let topics: BTreeSet<String> = self
            .read_all()?
            .into_iter()
            .map(|entry| entry.topic)
            .filter(|topic| !topic.is_empty())
            .collect();
        Ok(topics.into_iter().collect())
    }

    /// Sorted, unique tags across all articles.
    pub fn tags(&self) -> Result<Vec<String>, KnowledgeError> {
        let tags: BTreeSet<String> = self
            .read_all()?
            .into_iter()
            .flat_map(|entry| entry.tags)
            .collect();
        Ok(tags.into_iter().collect())
    }

    pub fn get(&self, id: &str) -> Result<Option<KnowledgeEntry>, KnowledgeError> {
        let path = self.path_for(id);
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(Some(KnowledgeEntry::parse(&path, &content)))
    }

    /// Writes a new article and returns its id.
    pub fn add(
        &self,
        title: &str,
        topic: &str,
        content: &str,
        tags: &[String],
    ) -> Result<String, KnowledgeError> {
        let id = self.unique_id(title)?;
        let today = today();

        let mut meta = Mapping::new();
        meta.insert("title".into(), title.into());
        meta.insert("topic".into(), topic.into());
        meta.insert("tags".into(), tags_value(tags));
        meta.insert("created".into(), today.as_str().into());
        meta.insert("updated".into(), today.as_str().into());

        std::fs::write(self.path_for(&id), frontmatter::render(&meta, content)?)?;
        tracing::info!(id = %id, "added knowledge base entry");
        Ok(id)
    }

    /// Rewrites the given fields of an article, keeping any other
    /// frontmatter keys, and stamps `updated` with today's date.
    pub fn update(&self, id: &str, changes: EntryUpdate) -> Result<(), KnowledgeError> {
        let path = self.path_for(id);
        if !path.is_file() {
            return Err(KnowledgeError::NotFound(id.to_string()));
        }
        let existing = std::fs::read_to_string(&path)?;
        let parsed = frontmatter::split(&existing);
        let mut meta = parsed.meta.clone();

        if let Some(title) = changes.title {
            meta.insert("title".into(), title.into());
        }
        if let Some(topic) = changes.topic {
            meta.insert("topic".into(), topic.into());
        }
        if let Some(tags) = &changes.tags {
            meta.insert("tags".into(), tags_value(tags));
        }
        meta.insert("updated".into(), today().into());

        let body = changes.content.as_deref().unwrap_or(parsed.body);
        std::fs::write(&path, frontmatter::render(&meta, body)?)?;
        tracing::info!(id, "updated knowledge base entry");
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<(), KnowledgeError> {
        let path = self.path_for(id);
        if !path.is_file() {
            return Err(KnowledgeError::NotFound(id.to_string()));
        }
        std::fs::remove_file(path)?;
        tracing::info!(id, "deleted knowledge base entry");
        Ok(())
    }

    /// Slugifies `title` and appends `-1`, `-2`, ... until no file has the name.
    fn unique_id(&self, title: &str) -> Result<String, KnowledgeError> {
        let base = slugify(title);
        if base.is_empty() {
            return Err(KnowledgeError::EmptyTitle);
        }
        let mut candidate = base.clone();
        let mut counter = 1;
        while self.path_for(&candidate).exists() {
            candidate = format!("{}-{}", base, counter);
            counter += 1;
        }
        Ok(candidate)
    }
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

fn tags_value(tags: &[String]) -> Value {
    Value::Sequence(tags.iter().map(|tag| tag.as_str().into()).collect())
}

/// Lower-cases, keeps `[a-z0-9 -]`, and joins whitespace runs with `-`.
pub fn slugify(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_strips_punctuation_and_spaces() {
        assert_eq!(slugify("  Why Choose Us? "), "why-choose-us");
        assert_eq!(slugify("AI & ML  -- services"), "ai-ml----services");
        assert_eq!(slugify("!!!"), "");
    }
}
