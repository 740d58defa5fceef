pub mod types;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use reelforge_common::{
    AspectRatio, GenerationRequest, MediaArtifact, ProviderError, ProviderId, ProviderProfile,
};

use crate::traits::MediaProvider;
use crate::util::{artifact_from_bytes, content_type_or, net_error};
use types::{HfImageRequest, HfOptions, HfVideoParameters, HfVideoRequest};

const HF_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
const HF_ROUTER_URL: &str = "https://router.huggingface.co/hf-inference/models";

const VIDEO_PROMPT_SUFFIX: &str =
    "High quality cinematic motion, stable camera movement, clean details, no text, no watermark";
const VIDEO_NEGATIVE_PROMPT: &str =
    "blurry, low quality, artifacts, watermark, text, logo, flicker, distortion";

/// Frames per clip by orientation; the models only accept a few counts.
fn frames_for(aspect: AspectRatio) -> u32 {
    match aspect {
        AspectRatio::Portrait => 48,
        AspectRatio::Landscape => 72,
    }
}

fn optional_bearer(api_key: Option<&str>) -> Result<HeaderMap, ProviderError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(key) = api_key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|_| ProviderError::Auth("API token is not a valid header value".into()))?,
        );
    }
    Ok(headers)
}

/// Hugging Face reports auth failures with an HTML error page as often as
/// JSON; give those a message a user can act on.
fn refine_hf_error(status: u16, content_type: &str, body: String) -> ProviderError {
    if (status == 401 || status == 403) && content_type.contains("text/html") {
        return ProviderError::Auth(
            "Unauthorized by Hugging Face. Verify the token and its Inference permissions".into(),
        );
    }
    ProviderError::from_status(status, body)
}

// --- Image (hosted inference, SDXL) ---

/// Free-tier image inference. The model chooses the output resolution
/// (square for SDXL), so non-square requests come back degraded.
pub struct HuggingFaceImageClient {
    api_key: Option<String>,
    http: reqwest::Client,
    base_url: String,
}

impl HuggingFaceImageClient {
    pub fn new(api_key: Option<&str>) -> Self {
        Self {
            api_key: api_key.map(str::to_string),
            http: reqwest::Client::new(),
            base_url: HF_INFERENCE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl MediaProvider for HuggingFaceImageClient {
    fn id(&self) -> ProviderId {
        ProviderId::Huggingface
    }

    async fn generate(
        &self,
        profile: &ProviderProfile,
        request: &GenerationRequest,
    ) -> Result<MediaArtifact, ProviderError> {
        let url = format!("{}/{}", self.base_url, profile.model_id);
        let body = HfImageRequest {
            inputs: request.prompt.clone(),
        };

        debug!(
            model = %profile.model_id,
            scene = request.scene_index,
            "Hugging Face image request"
        );

        let response = self
            .http
            .post(&url)
            .headers(optional_bearer(self.api_key.as_deref())?)
            .json(&body)
            .timeout(profile.max_timeout)
            .send()
            .await
            .map_err(|e| net_error(e, profile.max_timeout))?;

        let status = response.status();
        let mime = content_type_or(&response, "image/jpeg");
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(refine_hf_error(status.as_u16(), &mime, text));
        }

        if mime.contains("application/json") {
            // Success status but a JSON body means the model is loading
            // or erroring without saying so in the status code.
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::MalformedResponse(format!(
                "image model returned JSON instead of image bytes: {text}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| net_error(e, profile.max_timeout))?;
        Ok(artifact_from_bytes(profile, request, &mime, &bytes))
    }
}

// --- Video (router inference, model per quality tier) ---

pub struct HuggingFaceVideoClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl HuggingFaceVideoClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: HF_ROUTER_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl MediaProvider for HuggingFaceVideoClient {
    fn id(&self) -> ProviderId {
        ProviderId::HuggingfaceVideo
    }

    async fn generate(
        &self,
        profile: &ProviderProfile,
        request: &GenerationRequest,
    ) -> Result<MediaArtifact, ProviderError> {
        let url = format!("{}/{}", self.base_url, profile.model_id);
        let body = HfVideoRequest {
            inputs: format!("{}. {VIDEO_PROMPT_SUFFIX}.", request.prompt),
            parameters: HfVideoParameters {
                negative_prompt: VIDEO_NEGATIVE_PROMPT.to_string(),
                num_frames: frames_for(request.aspect_ratio),
                num_inference_steps: profile.steps,
                guidance_scale: profile.cfg_scale,
            },
            options: HfOptions {
                wait_for_model: true,
                use_cache: false,
            },
        };

        debug!(model = %profile.model_id, "Hugging Face video request");

        let response = self
            .http
            .post(&url)
            .headers(optional_bearer(Some(&self.api_key))?)
            .json(&body)
            .timeout(profile.max_timeout)
            .send()
            .await
            .map_err(|e| net_error(e, profile.max_timeout))?;

        let status = response.status();
        let mime = content_type_or(&response, "video/mp4");
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(refine_hf_error(status.as_u16(), &mime, text));
        }

        // Some endpoints return JSON status payloads with a success code
        // while the model is loading or erroring.
        if mime.contains("application/json") {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| {
                    v.get("error")
                        .or_else(|| v.get("message"))
                        .and_then(|m| m.as_str().map(str::to_string))
                })
                .unwrap_or_else(|| "video model returned JSON instead of video bytes".to_string());
            return Err(ProviderError::MalformedResponse(message));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| net_error(e, profile.max_timeout))?;
        Ok(artifact_from_bytes(profile, request, &mime, &bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_follows_orientation() {
        assert_eq!(frames_for(AspectRatio::Portrait), 48);
        assert_eq!(frames_for(AspectRatio::Landscape), 72);
    }

    #[test]
    fn html_auth_failure_gets_actionable_message() {
        let err = refine_hf_error(401, "text/html", "<html>...</html>".into());
        match err {
            ProviderError::Auth(message) => assert!(message.contains("Hugging Face")),
            other => panic!("expected Auth, got {other:?}"),
        }
    }

    #[test]
    fn json_auth_failure_keeps_body() {
        let err = refine_hf_error(401, "application/json", "{\"error\":\"bad token\"}".into());
        assert!(matches!(err, ProviderError::Auth(_)));
    }
}
