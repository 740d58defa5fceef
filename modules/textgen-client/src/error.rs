use thiserror::Error;

pub type Result<T> = std::result::Result<T, TextgenError>;

#[derive(Debug, Error)]
pub enum TextgenError {
    #[error("Gemini API key is required for this operation")]
    MissingCredential,

    #[error("text provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unparseable model output: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for TextgenError {
    fn from(err: reqwest::Error) -> Self {
        TextgenError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for TextgenError {
    fn from(err: serde_json::Error) -> Self {
        TextgenError::Parse(err.to_string())
    }
}
