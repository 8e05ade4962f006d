//! Client side of a hosted conversational voice agent.
//!
//! A session is one WebSocket to the agent. We open it with a
//! [`Settings`] message (audio formats, persona prompt, callable
//! functions), then stream microphone audio up and agent speech down. When
//! the agent wants business data it sends a `FunctionCallRequest`, which
//! [`FunctionRegistry`] answers from the mock store and the knowledge base.

pub mod config;
pub mod connection;
pub mod definitions;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod protocol;
pub mod settings;
pub mod templates;

pub use config::{AgentConfig, DEFAULT_MODELS_URL};
pub use connection::{AgentConnection, AgentFrame, AgentSink, AgentStream};
pub use definitions::function_definitions;
pub use dispatch::{FunctionOutcome, FunctionRegistry, FUNCTION_NAMES};
pub use error::AgentError;
pub use models::list_tts_models;
pub use protocol::{AgentEvent, ClientMessage, FunctionCall};
pub use settings::Settings;
pub use templates::{available_industries, AgentTemplates, PromptContext};
