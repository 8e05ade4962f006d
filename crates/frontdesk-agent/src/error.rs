use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("DEEPGRAM_API_KEY not set")]
    MissingApiKey,

    #[error("invalid API key header: {0}")]
    InvalidHeader(#[from] tokio_tungstenite::tungstenite::http::header::InvalidHeaderValue),

    #[error("agent socket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("agent connection closed")]
    Closed,
}
