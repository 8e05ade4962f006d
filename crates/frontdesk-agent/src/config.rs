use serde::{Deserialize, Serialize};
use std::fmt;

use crate::settings::{
    LISTEN_MODEL, THINK_MODEL, THINK_PROVIDER, THINK_TEMPERATURE, VOICE_AGENT_URL,
};

/// Endpoint for the hosted model catalogue.
pub const DEFAULT_MODELS_URL: &str = "https://api.deepgram.com/v1/models";

fn default_url() -> String {
    VOICE_AGENT_URL.to_string()
}

fn default_models_url() -> String {
    DEFAULT_MODELS_URL.to_string()
}

fn default_voice_model() -> String {
    frontdesk_types::voice::DEFAULT_VOICE_MODEL.to_string()
}

fn default_listen_model() -> String {
    LISTEN_MODEL.to_string()
}

fn default_think_provider() -> String {
    THINK_PROVIDER.to_string()
}

fn default_think_model() -> String {
    THINK_MODEL.to_string()
}

fn default_temperature() -> f64 {
    THINK_TEMPERATURE
}

fn default_language() -> String {
    "en".to_string()
}

fn default_company() -> String {
    crate::templates::DEFAULT_COMPANY.to_string()
}

fn default_keepalive_secs() -> u64 {
    5
}

fn default_close_timeout_ms() -> u64 {
    2000
}

fn default_close_grace_ms() -> u64 {
    1000
}

/// Connection and model settings for the hosted voice agent.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Agent WebSocket endpoint.
    pub url: String,
    pub models_url: String,
    /// Credential sent as `Authorization: Token <key>`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub default_voice_model: String,
    pub listen_model: String,
    pub think_provider: String,
    pub think_model: String,
    pub temperature: f64,
    pub language: String,
    pub company: String,
    /// Interval between `KeepAlive` messages.
    pub keepalive_secs: u64,
    /// Upper bound on waiting for the upstream close handshake.
    pub close_timeout_ms: u64,
    /// Delay between the farewell and closing the browser session, so the
    /// goodbye audio can finish playing.
    pub close_grace_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            models_url: default_models_url(),
            api_key: None,
            default_voice_model: default_voice_model(),
            listen_model: default_listen_model(),
            think_provider: default_think_provider(),
            think_model: default_think_model(),
            temperature: default_temperature(),
            language: default_language(),
            company: default_company(),
            keepalive_secs: default_keepalive_secs(),
            close_timeout_ms: default_close_timeout_ms(),
            close_grace_ms: default_close_grace_ms(),
        }
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("url", &self.url)
            .field("models_url", &self.models_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("default_voice_model", &self.default_voice_model)
            .field("listen_model", &self.listen_model)
            .field("think_provider", &self.think_provider)
            .field("think_model", &self.think_model)
            .field("temperature", &self.temperature)
            .field("language", &self.language)
            .field("company", &self.company)
            .field("keepalive_secs", &self.keepalive_secs)
            .field("close_timeout_ms", &self.close_timeout_ms)
            .field("close_grace_ms", &self.close_grace_ms)
            .finish()
    }
}

impl AgentConfig {
    /// The API key, if one is configured and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }
}
