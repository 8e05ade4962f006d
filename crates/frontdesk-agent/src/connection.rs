//! WebSocket client for the hosted voice agent.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::AgentError;
use crate::protocol::{AgentEvent, ClientMessage};
use crate::settings::Settings;

type AgentSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A frame received from the agent.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentFrame {
    Event(AgentEvent),
    /// Agent speech as raw linear16 samples.
    Audio(Vec<u8>),
}

/// An open agent socket, before it is split into halves.
pub struct AgentConnection {
    socket: AgentSocket,
}

impl AgentConnection {
    /// Opens the socket, authenticating with `Authorization: Token <api_key>`.
    pub async fn connect(url: &str, api_key: &str) -> Result<Self, AgentError> {
        let mut request = url.into_client_request()?;
        request.headers_mut().insert(
            "Authorization",
            HeaderValue::from_str(&format!("Token {}", api_key))?,
        );

        let (socket, response) = tokio_tungstenite::connect_async(request).await?;
        tracing::info!(url, status = %response.status(), "connected to voice agent");
        Ok(Self { socket })
    }

    /// Sends the `Settings` message that must precede any audio.
    pub async fn send_settings(&mut self, settings: &Settings) -> Result<(), AgentError> {
        let text = serde_json::to_string(settings)?;
        self.socket.send(Message::Text(text.into())).await?;
        tracing::debug!("sent agent settings");
        Ok(())
    }

    pub fn split(self) -> (AgentSink, AgentStream) {
        let (sink, stream) = self.socket.split();
        (AgentSink { inner: sink }, AgentStream { inner: stream })
    }
}

/// Write half of the agent socket.
pub struct AgentSink {
    inner: SplitSink<AgentSocket, Message>,
}

impl AgentSink {
    pub async fn send_message(&mut self, message: &ClientMessage) -> Result<(), AgentError> {
        self.send_text(message.to_json()?).await
    }

    pub async fn send_text(&mut self, text: String) -> Result<(), AgentError> {
        self.inner.send(Message::Text(text.into())).await?;
        Ok(())
    }

    /// Sends microphone audio (48 kHz linear16).
    pub async fn send_audio(&mut self, audio: Vec<u8>) -> Result<(), AgentError> {
        self.inner.send(Message::Binary(audio.into())).await?;
        Ok(())
    }

    /// Starts the close handshake and waits at most `timeout` for it.
    /// Failures are logged, never returned.
    pub async fn close_with_timeout(mut self, timeout: Duration) {
        match tokio::time::timeout(timeout, self.inner.close()).await {
            Ok(Ok(())) => tracing::debug!("agent socket closed"),
            Ok(Err(e)) => tracing::debug!(error = %e, "agent socket close failed"),
            Err(_) => tracing::warn!(?timeout, "timed out closing agent socket"),
        }
    }
}

/// Read half of the agent socket.
pub struct AgentStream {
    inner: SplitStream<AgentSocket>,
}

impl AgentStream {
    /// Next text event or audio frame. `None` once the agent has closed the
    /// socket.
    pub async fn next_frame(&mut self) -> Option<Result<AgentFrame, AgentError>> {
        while let Some(message) = self.inner.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    return Some(Ok(AgentFrame::Event(AgentEvent::parse(&text))));
                }
                Ok(Message::Binary(audio)) => return Some(Ok(AgentFrame::Audio(audio.to_vec()))),
                Ok(Message::Close(frame)) => {
                    tracing::info!(?frame, "voice agent closed the connection");
                    return None;
                }
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
        None
    }
}
