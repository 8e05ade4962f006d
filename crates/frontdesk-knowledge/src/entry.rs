use crate::frontmatter;
use serde::Serialize;
use std::path::Path;

/// One knowledge-base article, parsed from an `.mdx` file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeEntry {
    /// File stem, used as the entry id.
    pub id: String,
    pub title: String,
    pub topic: String,
    pub tags: Vec<String>,
    pub created: String,
    pub updated: String,
    pub filename: String,
    pub filepath: String,
    /// Markdown body without frontmatter.
    pub content_raw: String,
    pub content_html: String,
}

impl KnowledgeEntry {
    /// Builds an entry from file content. Missing metadata falls back to
    /// the file stem for the title and empty values elsewhere.
    pub fn parse(path: &Path, content: &str) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let fm = frontmatter::split(content);

        Self {
            title: fm.get_str("title").unwrap_or_else(|| stem.clone()),
            topic: fm.get_str("topic").unwrap_or_default(),
            tags: fm.get_string_list("tags"),
            created: fm.get_str("created").unwrap_or_default(),
            updated: fm.get_str("updated").unwrap_or_default(),
            filename: path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            filepath: path.display().to_string(),
            content_raw: fm.body.to_string(),
            content_html: render_html(fm.body),
            id: stem,
        }
    }

    /// Lower-cased title, topic, body and tags joined for substring search.
    pub(crate) fn searchable_text(&self) -> String {
        [
            self.title.as_str(),
            self.topic.as_str(),
            self.content_raw.as_str(),
            self.tags.join(" ").as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }
}

fn render_html(markdown: &str) -> String {
    let parser = pulldown_cmark::Parser::new(markdown);
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fills_defaults_from_filename() {
        let entry = KnowledgeEntry::parse(Path::new("kb/faqs.mdx"), "Plain **body**");
        assert_eq!(entry.id, "faqs");
        assert_eq!(entry.title, "faqs");
        assert_eq!(entry.filename, "faqs.mdx");
        assert!(entry.topic.is_empty());
        assert!(entry.tags.is_empty());
        assert_eq!(entry.content_html.trim(), "<p>Plain <strong>body</strong></p>");
    }

    #[test]
    fn parse_reads_frontmatter() {
        let content = "---\ntitle: Key Services\ntopic: services\ntags: [data, ai]\ncreated: 2024-01-05\n---\n\nWe label data.";
        let entry = KnowledgeEntry::parse(Path::new("key_services.mdx"), content);
        assert_eq!(entry.title, "Key Services");
        assert_eq!(entry.topic, "services");
        assert_eq!(entry.tags, ["data", "ai"]);
        assert_eq!(entry.created, "2024-01-05");
        assert_eq!(entry.content_raw, "We label data.");
        assert!(entry.searchable_text().contains("key services services we label data. data ai"));
    }
}
