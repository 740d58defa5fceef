use tracing::debug;

use crate::error::{Result, TextgenError};
use crate::types::{RequestContent, RequestPart, TextRequest, TextResponse};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash-exp";

pub struct GeminiTextClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiTextClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: GEMINI_API_URL.to_string(),
            model: DEFAULT_TEXT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Send one prompt and return the concatenated text parts of the
    /// first candidate.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = TextRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!(model = %self.model, "Gemini text request");

        let response = self.http.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TextgenError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TextResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .into_iter()
            .take(1)
            .flat_map(|c| c.content.parts)
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(TextgenError::Parse("empty model response".into()));
        }
        Ok(text)
    }
}
