pub mod types;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, info, warn};

use reelforge_common::{
    AsyncJobHandle, GenerationRequest, MediaArtifact, ProviderError, ProviderId, ProviderProfile,
};

use crate::poll::{poll_until_terminal, PollOutcome, PollTuning};
use crate::traits::MediaProvider;
use crate::util::{artifact_from_base64, artifact_from_bytes, content_type_or, net_error};
use types::{
    decode_video_result, extract_request_id, SdxlRequest, SdxlResponse, TextPrompt,
    VideoResult, VideoSubmitRequest,
};

const NVIDIA_GENAI_URL: &str = "https://ai.api.nvidia.com/v1/genai";
const NVIDIA_STATUS_URL: &str = "https://ai.api.nvidia.com/v1/status";

const IMAGE_NEGATIVE_PROMPT: &str =
    "blurry, low quality, distorted, watermark, text, ugly, deformed";
const VIDEO_NEGATIVE_PROMPT: &str =
    "blurry, low quality, artifacts, watermark, text, logo, flicker, distortion";

fn bearer_headers(api_key: &str) -> Result<HeaderMap, ProviderError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| ProviderError::Auth("API key is not a valid header value".into()))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// NVIDIA's credit errors come back as generic statuses with a telltale
/// body; rewrite them into the actionable message the user needs.
fn refine_nvidia_error(err: ProviderError) -> ProviderError {
    match err {
        ProviderError::QuotaExhausted(_) => ProviderError::QuotaExhausted(
            "NVIDIA credits are exhausted. Check your balance at build.nvidia.com".into(),
        ),
        other => other,
    }
}

// --- Image (Stable Diffusion XL) ---

pub struct NvidiaImageClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl NvidiaImageClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: NVIDIA_GENAI_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl MediaProvider for NvidiaImageClient {
    fn id(&self) -> ProviderId {
        ProviderId::NvidiaSdxl
    }

    async fn generate(
        &self,
        profile: &ProviderProfile,
        request: &GenerationRequest,
    ) -> Result<MediaArtifact, ProviderError> {
        let url = format!("{}/{}", self.base_url, profile.model_id);
        let body = SdxlRequest {
            text_prompts: vec![
                TextPrompt {
                    text: request.prompt.clone(),
                    weight: 1.0,
                },
                TextPrompt {
                    text: IMAGE_NEGATIVE_PROMPT.to_string(),
                    weight: -1.0,
                },
            ],
            cfg_scale: profile.cfg_scale,
            sampler: profile.sampler.clone(),
            seed: request.seed,
            steps: profile.steps,
            width: profile.width,
            height: profile.height,
        };

        debug!(
            model = %profile.model_id,
            scene = request.scene_index,
            "NVIDIA SDXL request"
        );

        let response = self
            .http
            .post(&url)
            .headers(bearer_headers(&self.api_key)?)
            .json(&body)
            .timeout(profile.max_timeout)
            .send()
            .await
            .map_err(|e| net_error(e, profile.max_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(refine_nvidia_error(ProviderError::from_status(
                status.as_u16(),
                text,
            )));
        }

        let parsed: SdxlResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        let artifact = parsed.artifacts.into_iter().next().ok_or_else(|| {
            ProviderError::MalformedResponse("empty artifact list in SDXL response".into())
        })?;

        Ok(artifact_from_base64(
            profile,
            request,
            "image/png",
            &artifact.base64,
            artifact.seed,
        ))
    }
}

// --- Video (gateway-routed, submit-then-poll) ---

pub struct NvidiaVideoClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    status_url: String,
    poll: PollTuning,
}

impl NvidiaVideoClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: NVIDIA_GENAI_URL.to_string(),
            status_url: NVIDIA_STATUS_URL.to_string(),
            poll: PollTuning::default(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_status_url(mut self, url: &str) -> Self {
        self.status_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_tuning(mut self, tuning: PollTuning) -> Self {
        self.poll = tuning;
        self
    }

    async fn poll_status(&self, request_id: String) -> Result<Value, ProviderError> {
        let url = format!("{}/{}", self.status_url, request_id);
        let response = self
            .http
            .get(&url)
            .headers(bearer_headers(&self.api_key)?)
            .timeout(self.poll.interval.max(std::time::Duration::from_secs(10)))
            .send()
            .await
            .map_err(|e| net_error(e, self.poll.interval))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), text));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))
    }

    /// Turn a terminal result body into an artifact, fetching the payload
    /// when the vendor only returned a URL.
    async fn resolve_result(
        &self,
        body: &Value,
        profile: &ProviderProfile,
        request: &GenerationRequest,
    ) -> Result<MediaArtifact, ProviderError> {
        match decode_video_result(body)? {
            VideoResult::InlineDataUri { data, mime } => Ok(MediaArtifact {
                id: uuid::Uuid::new_v4().to_string(),
                data,
                mime_type: mime,
                prompt: request.prompt.clone(),
                source: profile.provider,
                model: profile.model_id.clone(),
                seed: Some(request.seed),
                resolution_degraded: profile.resolution_degraded,
            }),
            VideoResult::InlineBase64 { base64, mime } => {
                Ok(artifact_from_base64(profile, request, &mime, &base64, None))
            }
            VideoResult::RemoteUrl { url } => {
                debug!(url = %url, "Fetching video result payload");
                let response = self
                    .http
                    .get(&url)
                    .timeout(profile.max_timeout)
                    .send()
                    .await
                    .map_err(|e| net_error(e, profile.max_timeout))?;
                let status = response.status();
                if !status.is_success() {
                    let text = response.text().await.unwrap_or_default();
                    return Err(ProviderError::from_status(status.as_u16(), text));
                }
                let mime = content_type_or(&response, "video/mp4");
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| net_error(e, profile.max_timeout))?;
                Ok(artifact_from_bytes(profile, request, &mime, &bytes))
            }
        }
    }
}

#[async_trait]
impl MediaProvider for NvidiaVideoClient {
    fn id(&self) -> ProviderId {
        ProviderId::NvidiaVideo
    }

    async fn generate(
        &self,
        profile: &ProviderProfile,
        request: &GenerationRequest,
    ) -> Result<MediaArtifact, ProviderError> {
        let url = format!("{}/{}", self.base_url, profile.model_id);
        let body = VideoSubmitRequest {
            prompt: request.prompt.clone(),
            negative_prompt: VIDEO_NEGATIVE_PROMPT.to_string(),
            seed: request.seed,
            guidance_scale: profile.cfg_scale,
            num_inference_steps: profile.steps,
        };

        debug!(model = %profile.model_id, "NVIDIA gateway video submit");

        let response = self
            .http
            .post(&url)
            .headers(bearer_headers(&self.api_key)?)
            .json(&body)
            .timeout(profile.max_timeout)
            .send()
            .await
            .map_err(|e| net_error(e, profile.max_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(refine_nvidia_error(ProviderError::from_status(
                status.as_u16(),
                text,
            )));
        }

        let submit: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        // Some responses skip the queue and return the result inline.
        let Some(request_id) = extract_request_id(&submit) else {
            return self.resolve_result(&submit, profile, request).await;
        };

        let mut handle = AsyncJobHandle::new(request_id);
        info!(
            model = %profile.model_id,
            request_id = %handle.request_id,
            "Video job submitted, polling for completion"
        );

        let outcome =
            poll_until_terminal(&mut handle, &self.poll, move |id| self.poll_status(id)).await;

        match outcome {
            PollOutcome::Completed(body) => {
                info!(
                    request_id = %handle.request_id,
                    polls = handle.poll_count,
                    "Video job completed"
                );
                self.resolve_result(&body, profile, request).await
            }
            PollOutcome::Failed(message) => {
                warn!(request_id = %handle.request_id, message = %message, "Video job failed");
                Err(ProviderError::Unavailable {
                    status: 500,
                    message: format!("video vendor reported failure: {message}"),
                })
            }
            PollOutcome::TimedOut => Err(ProviderError::Timeout(self.poll.budget())),
        }
    }
}
