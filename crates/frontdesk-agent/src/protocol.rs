//! Messages exchanged with the hosted agent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A function the agent wants invoked.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FunctionCall {
    pub id: String,
    pub name: String,
    /// JSON-encoded argument object.
    #[serde(default)]
    pub arguments: String,
    /// `false` when the agent runs the function itself.
    #[serde(default = "default_client_side")]
    pub client_side: bool,
}

fn default_client_side() -> bool {
    true
}

/// A text frame received from the agent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum AgentEvent {
    Welcome {
        #[serde(default)]
        request_id: Option<String>,
    },
    SettingsApplied,
    ConversationText {
        role: String,
        content: String,
    },
    UserStartedSpeaking,
    AgentThinking {
        #[serde(default)]
        content: Option<String>,
    },
    AgentStartedSpeaking,
    AgentAudioDone,
    FunctionCallRequest {
        functions: Vec<FunctionCall>,
    },
    Error {
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        code: Option<String>,
    },
    Warning {
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        code: Option<String>,
    },
    #[serde(other)]
    Other,
}

impl AgentEvent {
    /// Decodes a text frame. Frames that are not JSON objects with a
    /// `type` field come back as [`AgentEvent::Other`].
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(error = %e, "unrecognised agent message");
                AgentEvent::Other
            }
        }
    }
}

/// A text frame sent to the agent. Settings go through
/// [`crate::settings::Settings`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    FunctionCallResponse {
        id: String,
        name: String,
        /// JSON-encoded function result.
        content: String,
    },
    InjectAgentMessage {
        message: String,
    },
    KeepAlive,
}

impl ClientMessage {
    pub fn function_response(call: &FunctionCall, result: &Value) -> Self {
        ClientMessage::FunctionCallResponse {
            id: call.id.clone(),
            name: call.name.clone(),
            content: result.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_function_call_request() {
        let text = r#"{"type":"FunctionCallRequest","functions":[
            {"id":"fc_1","name":"find_customer","arguments":"{\"phone\":\"+15550000000\"}","client_side":true},
            {"id":"fc_2","name":"server_thing","arguments":"{}","client_side":false}]}"#;
        let AgentEvent::FunctionCallRequest { functions } = AgentEvent::parse(text) else {
            panic!("expected function call request");
        };
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].name, "find_customer");
        assert!(functions[0].client_side);
        assert!(!functions[1].client_side);
    }

    #[test]
    fn client_side_defaults_to_true() {
        let call: FunctionCall =
            serde_json::from_str(r#"{"id":"a","name":"end_call"}"#).unwrap();
        assert!(call.client_side);
        assert_eq!(call.arguments, "");
    }

    #[test]
    fn unknown_and_malformed_frames_are_other() {
        assert_eq!(AgentEvent::parse(r#"{"type":"History"}"#), AgentEvent::Other);
        assert_eq!(AgentEvent::parse("not json"), AgentEvent::Other);
        assert_eq!(AgentEvent::parse(r#"{"type":"SettingsApplied"}"#), AgentEvent::SettingsApplied);
    }

    #[test]
    fn conversation_text_keeps_role() {
        let event = AgentEvent::parse(r#"{"type":"ConversationText","role":"user","content":"hi"}"#);
        assert_eq!(
            event,
            AgentEvent::ConversationText {
                role: "user".to_string(),
                content: "hi".to_string()
            }
        );
    }

    #[test]
    fn function_response_encodes_content_as_string() {
        let call = FunctionCall {
            id: "fc_1".to_string(),
            name: "get_orders".to_string(),
            arguments: String::new(),
            client_side: true,
        };
        let message = ClientMessage::function_response(&call, &json!({"orders": []}));
        let value: Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"type":"FunctionCallResponse","id":"fc_1","name":"get_orders","content":"{\"orders\":[]}"})
        );
        assert_eq!(
            ClientMessage::KeepAlive.to_json().unwrap(),
            r#"{"type":"KeepAlive"}"#
        );
    }
}
