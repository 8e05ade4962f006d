use thiserror::Error;

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("knowledge base I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Entry {0} not found")]
    NotFound(String),

    #[error("title must contain at least one letter or digit")]
    EmptyTitle,
}
