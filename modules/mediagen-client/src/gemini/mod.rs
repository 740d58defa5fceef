pub mod types;

use async_trait::async_trait;
use tracing::debug;

use reelforge_common::{GenerationRequest, MediaArtifact, ProviderError, ProviderId, ProviderProfile};

use crate::traits::MediaProvider;
use crate::util::{artifact_from_base64, net_error};
use types::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, RequestContent, RequestPart,
};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini multimodal image generation. One image per request; the payload
/// arrives as an inline-data part of a multimodal response. The model does
/// not accept explicit pixel dimensions, so the aspect ratio is carried in
/// the prompt and the output resolution is whatever the model chose.
pub struct GeminiImageClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl GeminiImageClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl MediaProvider for GeminiImageClient {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    async fn generate(
        &self,
        profile: &ProviderProfile,
        request: &GenerationRequest,
    ) -> Result<MediaArtifact, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, profile.model_id, self.api_key
        );
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: format!(
                        "Generate an image: {}. Aspect ratio: {}.",
                        request.prompt, request.aspect_ratio
                    ),
                }],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["Text".to_string(), "Image".to_string()],
            },
        };

        debug!(
            model = %profile.model_id,
            scene = request.scene_index,
            "Gemini image request"
        );

        let response = self
            .http
            .post(&url)
            .json(&body)
            .timeout(profile.max_timeout)
            .send()
            .await
            .map_err(|e| net_error(e, profile.max_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        // First inline-data part wins; text parts are commentary.
        let inline = parsed
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .find_map(|p| p.inline_data)
            .ok_or_else(|| {
                ProviderError::MalformedResponse(
                    "no inline image data in Gemini response".into(),
                )
            })?;

        Ok(artifact_from_base64(
            profile,
            request,
            &inline.mime_type,
            &inline.data,
            None,
        ))
    }
}
