use async_trait::async_trait;
use tracing::debug;
use url::Url;

use reelforge_common::{GenerationRequest, MediaArtifact, ProviderError, ProviderId, ProviderProfile};

use crate::traits::MediaProvider;
use crate::util::{artifact_from_bytes, content_type_or, net_error};

const POLLINATIONS_URL: &str = "https://image.pollinations.ai";

/// Free image provider; no credential, the prompt travels in the URL path
/// and the image comes back as the raw response body. Tolerates small
/// concurrent bursts, which the batch coordinator exploits.
pub struct PollinationsClient {
    http: reqwest::Client,
    base_url: String,
}

impl PollinationsClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: POLLINATIONS_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn request_url(
        &self,
        profile: &ProviderProfile,
        request: &GenerationRequest,
    ) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ProviderError::InvalidRequest(format!("bad base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidRequest("base url cannot be a base".into()))?
            .push("prompt")
            .push(&request.prompt);
        url.query_pairs_mut()
            .append_pair("width", &profile.width.to_string())
            .append_pair("height", &profile.height.to_string())
            .append_pair("seed", &request.seed.to_string())
            .append_pair("model", &profile.model_id)
            .append_pair("nologo", "true");
        Ok(url)
    }
}

impl Default for PollinationsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaProvider for PollinationsClient {
    fn id(&self) -> ProviderId {
        ProviderId::Pollinations
    }

    async fn generate(
        &self,
        profile: &ProviderProfile,
        request: &GenerationRequest,
    ) -> Result<MediaArtifact, ProviderError> {
        let url = self.request_url(profile, request)?;

        debug!(scene = request.scene_index, "Pollinations request");

        let response = self
            .http
            .get(url)
            .timeout(profile.max_timeout)
            .send()
            .await
            .map_err(|e| net_error(e, profile.max_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), text));
        }

        let mime = content_type_or(&response, "image/jpeg");
        if !mime.starts_with("image/") {
            return Err(ProviderError::MalformedResponse(format!(
                "expected image payload, got {mime}"
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| net_error(e, profile.max_timeout))?;
        if bytes.is_empty() {
            return Err(ProviderError::MalformedResponse("empty image body".into()));
        }

        Ok(artifact_from_bytes(profile, request, &mime, &bytes))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn profile() -> ProviderProfile {
        ProviderProfile {
            provider: ProviderId::Pollinations,
            model_id: "flux".into(),
            steps: 25,
            cfg_scale: 7.0,
            sampler: String::new(),
            width: 768,
            height: 1344,
            resolution_degraded: false,
            max_timeout: Duration::from_secs(30),
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            prompt: "sunrise over paddy fields, scene 1 of 3".into(),
            scene_index: 0,
            scene_count: 3,
            style: reelforge_common::StylePreset::Folk,
            aspect_ratio: reelforge_common::AspectRatio::Portrait,
            quality_tier: reelforge_common::QualityTier::Cheap,
            media_kind: reelforge_common::MediaKind::Image,
            seed: 7,
        }
    }

    #[test]
    fn prompt_is_percent_encoded_into_path() {
        let client = PollinationsClient::new();
        let url = client.request_url(&profile(), &request()).unwrap();
        let rendered = url.as_str();
        assert!(rendered.starts_with("https://image.pollinations.ai/prompt/"));
        // spaces and commas must not appear raw in the path
        assert!(!url.path().contains(' '));
        assert!(rendered.contains("width=768"));
        assert!(rendered.contains("height=1344"));
        assert!(rendered.contains("seed=7"));
        assert!(rendered.contains("nologo=true"));
    }
}
