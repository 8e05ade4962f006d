//! YAML frontmatter splitting for `.mdx` entries.
//!
//! ```text
//! ---
//! title: Company Overview
//! topic: company
//! tags:
//!   - about
//! ---
//!
//! Body text.
//! ```

use serde_yaml::{Mapping, Value};

/// Frontmatter metadata and the body that follows it.
#[derive(Debug, Clone, Default)]
pub struct Frontmatter<'a> {
    /// Parsed metadata. Empty when the file has none or it is not valid YAML.
    pub meta: Mapping,
    pub body: &'a str,
}

impl Frontmatter<'_> {
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.meta.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// String items of a sequence field; empty when missing or not a list.
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        self.meta
            .get(key)
            .and_then(Value::as_sequence)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Splits `content` into frontmatter and body.
///
/// The opening `---` must start the file and the closing delimiter is the
/// next line that is `---` after trimming. Without a closing delimiter the
/// whole file is body. Invalid YAML yields empty metadata and the body after
/// the closing delimiter. A single blank line after the delimiter is dropped.
pub fn split(content: &str) -> Frontmatter<'_> {
    let without = Frontmatter {
        meta: Mapping::new(),
        body: content,
    };

    if !content.starts_with("---") {
        return without;
    }
    let Some(first_newline) = content.find('\n') else {
        return without;
    };

    let rest = &content[first_newline + 1..];
    let mut offset = 0;
    let mut closing = None;
    for line in rest.split_inclusive('\n') {
        if line.trim() == "---" {
            closing = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let Some((yaml_end, body_start)) = closing else {
        return without;
    };

    let yaml = &rest[..yaml_end];
    let mut body = &rest[body_start..];
    body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);

    let meta = match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(map)) => map,
        Ok(Value::Null) => Mapping::new(),
        Ok(_) => {
            tracing::warn!("frontmatter is not a mapping, ignoring it");
            Mapping::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse frontmatter YAML");
            Mapping::new()
        }
    };

    Frontmatter { meta, body }
}

/// Renders metadata and body back into file content.
pub fn render(meta: &Mapping, body: &str) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(meta)?;
    Ok(format!("---\n{}---\n\n{}", yaml, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_metadata_and_body() {
        let content = "---\ntitle: Hello\ntags:\n  - a\n  - 3\n---\n\n# Body\n";
        let fm = split(content);
        assert_eq!(fm.get_str("title").as_deref(), Some("Hello"));
        assert_eq!(fm.get_string_list("tags"), ["a"]);
        assert_eq!(fm.body, "# Body\n");
    }

    #[test]
    fn no_opening_delimiter_means_all_body() {
        let fm = split("# Just markdown");
        assert!(fm.meta.is_empty());
        assert_eq!(fm.body, "# Just markdown");
    }

    #[test]
    fn unclosed_frontmatter_is_body() {
        let content = "---\ntitle: Oops\n\nno closing";
        let fm = split(content);
        assert!(fm.meta.is_empty());
        assert_eq!(fm.body, content);
    }

    #[test]
    fn invalid_yaml_keeps_body() {
        let fm = split("---\ntitle: [unclosed\n---\nBody");
        assert!(fm.meta.is_empty());
        assert_eq!(fm.body, "Body");
    }

    #[test]
    fn render_then_split() {
        let mut meta = Mapping::new();
        meta.insert("title".into(), "Round".into());
        let content = render(&meta, "Text").unwrap();
        assert!(content.starts_with("---\ntitle: Round\n---\n\n"));
        let fm = split(&content);
        assert_eq!(fm.get_str("title").as_deref(), Some("Round"));
        assert_eq!(fm.body, "Text");
    }
}
