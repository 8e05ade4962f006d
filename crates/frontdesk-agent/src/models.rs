//! Catalogue of hosted text-to-speech voices.

use frontdesk_types::voice::TtsModel;
use serde::Deserialize;

use crate::error::AgentError;

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    tts: Vec<RawTtsModel>,
}

#[derive(Debug, Deserialize)]
struct RawTtsModel {
    #[serde(default)]
    name: String,
    #[serde(default)]
    canonical_name: String,
    #[serde(default)]
    architecture: String,
    #[serde(default)]
    languages: Vec<String>,
    #[serde(default)]
    metadata: RawMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    accent: String,
    #[serde(default)]
    tags: Vec<String>,
}

impl From<RawTtsModel> for TtsModel {
    fn from(raw: RawTtsModel) -> Self {
        TtsModel {
            name: raw.canonical_name,
            display_name: raw.name,
            architecture: raw.architecture,
            languages: raw.languages,
            accent: raw.metadata.accent,
            tags: raw.metadata.tags,
        }
    }
}

/// Fetches the TTS voices offered to `api_key`.
pub async fn list_tts_models(
    client: &reqwest::Client,
    models_url: &str,
    api_key: &str,
) -> Result<Vec<TtsModel>, AgentError> {
    let response = client
        .get(models_url)
        .header("Authorization", format!("Token {}", api_key))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AgentError::UpstreamStatus {
            status: status.as_u16(),
            body,
        });
    }

    let models: ModelsResponse = response.json().await?;
    tracing::debug!(count = models.tts.len(), "fetched tts models");
    Ok(models.tts.into_iter().map(TtsModel::from).collect())
}
