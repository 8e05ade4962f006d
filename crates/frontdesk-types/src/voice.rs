//! Voice model definitions.
//!
//! A voice model is identified by its canonical name (for example
//! `aura-2-thalia-en`). The agent speaks with that model, and the persona
//! takes its spoken name from it unless one is given explicitly.

use serde::{Deserialize, Serialize};

/// Voice model used when the browser does not pick one.
pub const DEFAULT_VOICE_MODEL: &str = "aura-2-thalia-en";

/// A text-to-speech model offered by the hosted agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtsModel {
    /// Canonical model name, passed as `speak.provider.model`.
    pub name: String,
    /// Human-readable voice name.
    pub display_name: String,
    /// Model family, e.g. `aura-2`.
    pub architecture: String,
    /// Supported language codes.
    pub languages: Vec<String>,
    /// Accent descriptor, empty if unknown.
    pub accent: String,
    /// Descriptive tags such as `professional`.
    pub tags: Vec<String>,
}

/// Derives a persona name from a voice model's canonical name.
///
/// `aura-2-thalia-en` becomes `Thalia`; `aura-asteria-en` becomes `Asteria`.
pub fn voice_name_from_model(model: &str) -> String {
    let stripped = model.replace("aura-2-", "").replace("aura-", "");
    let first = stripped.split('-').next().unwrap_or_default();
    capitalize(first)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
