use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatilhoError>;

#[derive(Debug, Error)]
pub enum GatilhoError {
    /// The API answered 401. The session has already been cleared.
    #[error("session expired or invalid, please log in again")]
    Unauthorized,

    #[error("request failed ({status}): {detail}")]
    Http { status: u16, detail: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not logged in, run `gatilho login` first")]
    NotLoggedIn,

    #[error("{0}")]
    Validation(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GatilhoError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<handlebars::RenderError> for GatilhoError {
    fn from(e: handlebars::RenderError) -> Self {
        Self::Template(e.to_string())
    }
}

impl From<handlebars::TemplateError> for GatilhoError {
    fn from(e: handlebars::TemplateError) -> Self {
        Self::Template(e.to_string())
    }
}
