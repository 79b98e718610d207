use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Upstream chat-completion API answered with a non-success status
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, BotError>;
