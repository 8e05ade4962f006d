//! The `Settings` message that configures a voice-agent session.
//!
//! Audio formats are fixed: the browser captures 48 kHz linear16 and plays
//! back raw 16 kHz linear16, so those values are constants rather than
//! config. The control page is rendered with the same constants.

use serde::Serialize;
use serde_json::Value;

use crate::config::AgentConfig;
use crate::templates::AgentTemplates;

pub const VOICE_AGENT_URL: &str = "wss://agent.deepgram.com/v1/agent/converse";

pub const AUDIO_ENCODING: &str = "linear16";
pub const USER_AUDIO_SAMPLE_RATE: u32 = 48_000;
/// Length of one microphone chunk sent by the control page.
pub const USER_AUDIO_CHUNK_MS: u32 = 50;
pub const USER_AUDIO_SAMPLES_PER_CHUNK: u32 = USER_AUDIO_SAMPLE_RATE * USER_AUDIO_CHUNK_MS / 1000;
pub const AGENT_AUDIO_SAMPLE_RATE: u32 = 16_000;

pub const LISTEN_MODEL: &str = "nova-3";
pub const THINK_PROVIDER: &str = "open_ai";
pub const THINK_MODEL: &str = "gpt-4o-mini";
pub const THINK_TEMPERATURE: f64 = 0.7;

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub audio: AudioSettings,
    pub agent: AgentSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct AudioSettings {
    pub input: AudioFormat,
    pub output: AudioFormat,
}

#[derive(Debug, Clone, Serialize)]
pub struct AudioFormat {
    pub encoding: &'static str,
    pub sample_rate: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentSettings {
    pub language: String,
    pub listen: ListenSettings,
    pub think: ThinkSettings,
    pub speak: SpeakSettings,
    pub greeting: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListenSettings {
    pub provider: Provider,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThinkSettings {
    pub provider: Provider,
    pub prompt: String,
    pub functions: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeakSettings {
    pub provider: Provider,
}

#[derive(Debug, Clone, Serialize)]
pub struct Provider {
    #[serde(rename = "type")]
    pub kind: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl Settings {
    /// Assembles the session settings from config and rendered templates.
    pub fn new(config: &AgentConfig, templates: &AgentTemplates) -> Self {
        Self {
            kind: "Settings",
            audio: AudioSettings {
                input: AudioFormat {
                    encoding: AUDIO_ENCODING,
                    sample_rate: USER_AUDIO_SAMPLE_RATE,
                    container: None,
                },
                output: AudioFormat {
                    encoding: AUDIO_ENCODING,
                    sample_rate: AGENT_AUDIO_SAMPLE_RATE,
                    container: Some("none"),
                },
            },
            agent: AgentSettings {
                language: config.language.clone(),
                listen: ListenSettings {
                    provider: Provider {
                        kind: "deepgram".to_string(),
                        model: config.listen_model.clone(),
                        temperature: None,
                    },
                },
                think: ThinkSettings {
                    provider: Provider {
                        kind: config.think_provider.clone(),
                        model: config.think_model.clone(),
                        temperature: Some(config.temperature),
                    },
                    prompt: templates.prompt.clone(),
                    functions: crate::definitions::function_definitions(),
                },
                speak: SpeakSettings {
                    provider: Provider {
                        kind: "deepgram".to_string(),
                        model: templates.voice_model.clone(),
                        temperature: None,
                    },
                },
                greeting: templates.greeting.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::PromptContext;

    #[test]
    fn microphone_chunks_hold_fifty_milliseconds() {
        assert_eq!(USER_AUDIO_SAMPLES_PER_CHUNK, 2_400);
    }

    #[test]
    fn settings_serialize_to_agent_shape() {
        let config = AgentConfig::default();
        let context = PromptContext::new("IndiVillage Tech Solutions", &[]);
        let templates = AgentTemplates::new("indivillage", "aura-2-orion-en", "", &context);
        let json = serde_json::to_value(Settings::new(&config, &templates)).unwrap();

        assert_eq!(json["type"], "Settings");
        assert_eq!(json["audio"]["input"]["sample_rate"], 48000);
        assert!(json["audio"]["input"].get("container").is_none());
        assert_eq!(json["audio"]["output"]["container"], "none");
        assert_eq!(json["agent"]["listen"]["provider"]["model"], "nova-3");
        assert!(json["agent"]["listen"]["provider"].get("temperature").is_none());
        assert_eq!(json["agent"]["think"]["provider"]["type"], "open_ai");
        assert_eq!(json["agent"]["think"]["provider"]["temperature"], 0.7);
        assert_eq!(json["agent"]["think"]["functions"].as_array().unwrap().len(), 14);
        assert_eq!(json["agent"]["speak"]["provider"]["model"], "aura-2-orion-en");
        assert_eq!(
            json["agent"]["greeting"],
            "Hey! I'm IndiVillage Tech Solutions voice assistant, How may I assist you today?"
        );
    }
}
