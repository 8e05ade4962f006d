//! Browser session socket and the relay to the hosted voice agent.
//!
//! Each browser socket may drive at most one agent session at a time.
//! Microphone audio flows browser -> agent, speech audio and conversation
//! events flow agent -> browser, and function calls requested by the agent
//! are answered locally through the [`FunctionRegistry`].

use crate::AppState;
use axum::{
    extract::{
        ws::{Message as AxumMessage, WebSocket},
        Extension, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use frontdesk_agent::{
    AgentConnection, AgentEvent, AgentFrame, AgentSink, AgentStream, AgentTemplates,
    ClientMessage, FunctionCall, FunctionRegistry, PromptContext, Settings,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, RwLock},
    task::JoinHandle,
};
use uuid::Uuid;

/// Capacity of each browser's outbound queue.
const BROWSER_QUEUE: usize = 256;

/// Capacity of each agent session's upstream queue. Microphone audio is
/// dropped rather than queued past this.
const UPSTREAM_QUEUE: usize = 64;

/// Text frames accepted from the browser.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BrowserCommand {
    StartVoiceAgent {
        #[serde(default)]
        industry: String,
        #[serde(default, rename = "voiceModel")]
        voice_model: String,
        #[serde(default, rename = "voiceName")]
        voice_name: String,
    },
    StopVoiceAgent,
}

/// Text frames sent to the browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BrowserEvent {
    ConversationUpdate {
        role: String,
        content: String,
    },
    AgentStatus {
        status: &'static str,
    },
    FunctionCall {
        name: String,
        arguments: Value,
        result: Value,
    },
    Log {
        message: String,
    },
    Error {
        message: String,
    },
    Close,
}

/// Bookkeeping for one connected browser.
#[derive(Debug, Clone, Default)]
pub struct BrowserSession {
    /// The agent session currently driven by this browser.
    pub agent_session: Option<Uuid>,
}

/// Tracks connected browsers and their agent sessions.
#[derive(Clone, Default)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<Uuid, BrowserSession>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a browser and returns its id.
    pub async fn register(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(id, BrowserSession::default());
        id
    }

    pub async fn remove(&self, browser_id: Uuid) {
        self.sessions.write().await.remove(&browser_id);
    }

    /// Number of connected browsers.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Number of browsers with a running agent session.
    pub async fn active_agents(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|session| session.agent_session.is_some())
            .count()
    }

    pub async fn set_agent(&self, browser_id: Uuid, agent_id: Uuid) {
        if let Some(session) = self.sessions.write().await.get_mut(&browser_id) {
            session.agent_session = Some(agent_id);
        }
    }

    /// Clears the browser's agent session if it is still `agent_id`. A
    /// session that has already been replaced or cleared is left alone.
    /// Returns whether this call cleared it.
    pub async fn clear_agent(&self, browser_id: Uuid, agent_id: Uuid) -> bool {
        match self.sessions.write().await.get_mut(&browser_id) {
            Some(session) if session.agent_session == Some(agent_id) => {
                session.agent_session = None;
                true
            }
            _ => false,
        }
    }
}

/// Frames queued for the upstream writer.
#[derive(Debug)]
enum Upstream {
    Text(String),
    Audio(Vec<u8>),
    Close,
}

/// Queues `event` for the browser, waiting for room. Returns `false` once
/// the browser is gone.
async fn emit(browser: &mpsc::Sender<AxumMessage>, event: &BrowserEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(json) => browser.send(AxumMessage::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("failed to serialize browser event: {}", e);
            true
        }
    }
}

/// Sends an error to the browser without waiting.
fn send_ws_error(tx: &mpsc::Sender<AxumMessage>, message: String) {
    match serde_json::to_string(&BrowserEvent::Error { message }) {
        Ok(json) => {
            if let Err(e) = tx.try_send(AxumMessage::Text(json.into())) {
                tracing::warn!("failed to send WebSocket error to browser: {}", e);
            }
        }
        Err(e) => {
            tracing::error!("failed to serialize WebSocket error message: {}", e);
        }
    }
}

/// Maps the agent's status notifications onto browser statuses.
fn status_for(event: &AgentEvent) -> Option<&'static str> {
    match event {
        AgentEvent::SettingsApplied => Some("settings_applied"),
        AgentEvent::UserStartedSpeaking => Some("user_speaking"),
        AgentEvent::AgentThinking { .. } => Some("thinking"),
        AgentEvent::AgentStartedSpeaking => Some("speaking"),
        AgentEvent::AgentAudioDone => Some("audio_done"),
        _ => None,
    }
}

/// What the reader does after handling an event.
enum Flow {
    Continue,
    /// The conversation was ended by a function call.
    End,
}

/// State shared by an agent session's reader task.
struct Relay {
    session_id: Uuid,
    browser: mpsc::Sender<AxumMessage>,
    upstream: mpsc::Sender<Upstream>,
    registry: FunctionRegistry,
    close_grace: Duration,
}

impl Relay {
    async fn send_upstream(&self, message: &ClientMessage) -> bool {
        match message.to_json() {
            Ok(json) => self.upstream.send(Upstream::Text(json)).await.is_ok(),
            Err(e) => {
                tracing::error!("failed to serialize agent message: {}", e);
                true
            }
        }
    }

    async fn handle_event(&self, event: AgentEvent) -> Flow {
        if let Some(status) = status_for(&event) {
            emit(&self.browser, &BrowserEvent::AgentStatus { status }).await;
            return Flow::Continue;
        }

        match event {
            AgentEvent::Welcome { request_id } => {
                let message = match request_id {
                    Some(id) => format!("Voice agent session started (request {})", id),
                    None => "Voice agent session started".to_string(),
                };
                emit(&self.browser, &BrowserEvent::Log { message }).await;
            }
            AgentEvent::ConversationText { role, content } => {
                tracing::info!(session_id = %self.session_id, role = %role, "conversation update");
                emit(
                    &self.browser,
                    &BrowserEvent::ConversationUpdate { role, content },
                )
                .await;
            }
            AgentEvent::FunctionCallRequest { functions } => {
                for call in functions {
                    if let Flow::End = self.handle_function_call(call).await {
                        return Flow::End;
                    }
                }
            }
            AgentEvent::Error { description, code } => {
                tracing::warn!(session_id = %self.session_id, ?code, ?description, "voice agent error");
                let message = format!(
                    "Agent error: {}",
                    description.unwrap_or_else(|| "unknown error".to_string())
                );
                emit(&self.browser, &BrowserEvent::Error { message }).await;
            }
            AgentEvent::Warning { description, code } => {
                tracing::debug!(session_id = %self.session_id, ?code, ?description, "voice agent warning");
                let message = format!(
                    "Agent warning: {}",
                    description.unwrap_or_default()
                );
                emit(&self.browser, &BrowserEvent::Log { message }).await;
            }
            _ => {}
        }
        Flow::Continue
    }

    async fn handle_function_call(&self, call: FunctionCall) -> Flow {
        if !call.client_side {
            tracing::debug!(function = %call.name, "agent runs function server side");
            return Flow::Continue;
        }

        let outcome = self.registry.call(&call.name, &call.arguments).await;

        self.send_upstream(&ClientMessage::function_response(&call, &outcome.response))
            .await;

        let arguments = serde_json::from_str(&call.arguments)
            .unwrap_or_else(|_| Value::String(call.arguments.clone()));
        emit(
            &self.browser,
            &BrowserEvent::FunctionCall {
                name: call.name.clone(),
                arguments,
                result: outcome.response.clone(),
            },
        )
        .await;

        if let Some(message) = outcome.inject {
            self.send_upstream(&ClientMessage::InjectAgentMessage { message })
                .await;
        }

        if outcome.close {
            tokio::time::sleep(self.close_grace).await;
            emit(&self.browser, &BrowserEvent::Close).await;
            tracing::info!(session_id = %self.session_id, "call ended by agent");
            return Flow::End;
        }
        Flow::Continue
    }
}

async fn run_writer(mut sink: AgentSink, mut rx: mpsc::Receiver<Upstream>, close_timeout: Duration) {
    while let Some(frame) = rx.recv().await {
        let result = match frame {
            Upstream::Text(text) => sink.send_text(text).await,
            Upstream::Audio(audio) => sink.send_audio(audio).await,
            Upstream::Close => break,
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to write to voice agent");
            break;
        }
    }
    sink.close_with_timeout(close_timeout).await;
}

async fn run_reader(
    relay: Relay,
    mut stream: AgentStream,
    sessions: SessionManager,
    browser_id: Uuid,
) {
    let mut ended_by_function = false;

    while let Some(frame) = stream.next_frame().await {
        match frame {
            Ok(AgentFrame::Audio(audio)) => {
                if relay
                    .browser
                    .send(AxumMessage::Binary(audio.into()))
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Ok(AgentFrame::Event(event)) => {
                if let Flow::End = relay.handle_event(event).await {
                    ended_by_function = true;
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(session_id = %relay.session_id, error = %e, "voice agent connection failed");
                emit(
                    &relay.browser,
                    &BrowserEvent::Error {
                        message: format!("Voice agent connection error: {}", e),
                    },
                )
                .await;
                break;
            }
        }
    }

    // Whoever clears the session reports it, so a later stop stays silent.
    let cleared = sessions.clear_agent(browser_id, relay.session_id).await;
    if cleared && !ended_by_function {
        emit(&relay.browser, &BrowserEvent::AgentStatus { status: "stopped" }).await;
    }
    let _ = relay.upstream.send(Upstream::Close).await;
    tracing::info!(session_id = %relay.session_id, "voice agent session finished");
}

async fn run_keepalive(upstream: mpsc::Sender<Upstream>, period: Duration) {
    let keepalive = match ClientMessage::KeepAlive.to_json() {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("failed to serialize keepalive: {}", e);
            return;
        }
    };
    let mut ticker = tokio::time::interval(period);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        if upstream.send(Upstream::Text(keepalive.clone())).await.is_err() {
            break;
        }
    }
}

/// A running agent session: a writer, a reader and a keepalive ticker.
struct AgentSession {
    id: Uuid,
    upstream: mpsc::Sender<Upstream>,
    reader: JoinHandle<()>,
    keepalive: Option<JoinHandle<()>>,
}

impl AgentSession {
    /// Connects to the agent, sends the settings, and starts the relay tasks.
    /// Errors are messages for the browser.
    async fn start(
        state: &AppState,
        browser_id: Uuid,
        browser: mpsc::Sender<AxumMessage>,
        industry: &str,
        voice_model: &str,
        voice_name: &str,
    ) -> Result<Self, String> {
        let config = &state.agent;
        let api_key = config
            .api_key()
            .ok_or_else(|| "DEEPGRAM_API_KEY not set".to_string())?;

        let voice_model = if voice_model.is_empty() {
            config.default_voice_model.as_str()
        } else {
            voice_model
        };

        let context = match state.registry.knowledge_base().cloned() {
            Some(kb) => {
                let company = config.company.clone();
                tokio::task::spawn_blocking(move || PromptContext::from_knowledge_base(&company, &kb))
                    .await
                    .unwrap_or_else(|e| {
                        tracing::warn!("prompt context task failed: {}", e);
                        PromptContext::without_listing(&config.company)
                    })
            }
            None => PromptContext::without_listing(&config.company),
        };
        let templates = AgentTemplates::new(industry, voice_model, voice_name, &context);
        let settings = Settings::new(config, &templates);

        let mut connection = AgentConnection::connect(&config.url, api_key)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "failed to connect to voice agent");
                format!("Failed to connect to voice agent: {}", e)
            })?;
        connection.send_settings(&settings).await.map_err(|e| {
            tracing::warn!(error = %e, "failed to send agent settings");
            format!("Failed to configure voice agent: {}", e)
        })?;

        let id = Uuid::new_v4();
        tracing::info!(
            session_id = %id,
            browser_id = %browser_id,
            voice_model = %templates.voice_model,
            voice_name = %templates.voice_name,
            "voice agent session started"
        );
        state.sessions.set_agent(browser_id, id).await;
        emit(&browser, &BrowserEvent::AgentStatus { status: "connected" }).await;

        let (sink, stream) = connection.split();
        let (upstream, rx) = mpsc::channel(UPSTREAM_QUEUE);

        tokio::spawn(run_writer(
            sink,
            rx,
            Duration::from_millis(config.close_timeout_ms),
        ));

        let relay = Relay {
            session_id: id,
            browser,
            upstream: upstream.clone(),
            registry: state.registry.clone(),
            close_grace: Duration::from_millis(config.close_grace_ms),
        };
        let reader = tokio::spawn(run_reader(
            relay,
            stream,
            state.sessions.clone(),
            browser_id,
        ));

        let keepalive = (config.keepalive_secs > 0).then(|| {
            tokio::spawn(run_keepalive(
                upstream.clone(),
                Duration::from_secs(config.keepalive_secs),
            ))
        });

        Ok(Self {
            id,
            upstream,
            reader,
            keepalive,
        })
    }

    /// Forwards microphone audio. Returns `false` once the session has ended.
    fn forward_audio(&self, audio: Vec<u8>) -> bool {
        match self.upstream.try_send(Upstream::Audio(audio)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!(session_id = %self.id, "upstream queue full, dropping audio");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Stops the reader and keepalive and asks the writer to close the agent
    /// socket. Returns `false` when the session had already finished on its
    /// own.
    async fn shutdown(self, sessions: &SessionManager, browser_id: Uuid) -> bool {
        self.reader.abort();
        if let Some(keepalive) = self.keepalive {
            keepalive.abort();
        }
        let _ = self.upstream.send(Upstream::Close).await;
        let was_running = sessions.clear_agent(browser_id, self.id).await;
        tracing::info!(session_id = %self.id, was_running, "voice agent session stopped");
        was_running
    }
}

/// Handler for `GET /ws`.
pub async fn ws_handler(
    Extension(state): Extension<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<AxumMessage>(BROWSER_QUEUE);

    let browser_id = state.sessions.register().await;
    tracing::info!(browser_id = %browser_id, "browser connected");

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut session: Option<AgentSession> = None;

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            AxumMessage::Text(text) => match serde_json::from_str::<BrowserCommand>(text.as_str()) {
                Ok(BrowserCommand::StartVoiceAgent {
                    industry,
                    voice_model,
                    voice_name,
                }) => {
                    if let Some(previous) = session.take() {
                        previous.shutdown(&state.sessions, browser_id).await;
                    }
                    match AgentSession::start(
                        &state,
                        browser_id,
                        tx.clone(),
                        &industry,
                        &voice_model,
                        &voice_name,
                    )
                    .await
                    {
                        Ok(started) => session = Some(started),
                        Err(message) => send_ws_error(&tx, message),
                    }
                }
                Ok(BrowserCommand::StopVoiceAgent) => {
                    if let Some(previous) = session.take() {
                        if previous.shutdown(&state.sessions, browser_id).await {
                            emit(&tx, &BrowserEvent::AgentStatus { status: "stopped" }).await;
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "unrecognised browser message");
                    send_ws_error(&tx, format!("Invalid message: {}", e));
                }
            },
            AxumMessage::Binary(audio) => {
                let ended = match &session {
                    Some(active) => !active.forward_audio(audio.to_vec()),
                    None => false,
                };
                if ended {
                    session = None;
                }
            }
            AxumMessage::Close(_) => break,
            _ => {}
        }
    }

    if let Some(active) = session.take() {
        active.shutdown(&state.sessions, browser_id).await;
    }
    state.sessions.remove(browser_id).await;
    send_task.abort();
    tracing::info!(browser_id = %browser_id, "browser disconnected");
}
