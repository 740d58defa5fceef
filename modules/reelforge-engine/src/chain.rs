use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use mediagen_client::{
    GeminiImageClient, HuggingFaceImageClient, HuggingFaceVideoClient, MediaProvider,
    NvidiaImageClient, NvidiaVideoClient, PollinationsClient,
};
use reelforge_common::{
    AspectRatio, Config, GenerationAttempt, GenerationRequest, MediaArtifact, ProviderError,
    ProviderId, ProviderProfile, QualityTier,
};

use crate::profiles;
use crate::retry::{with_retry, RetryTuning};

/// One provider plus its resolved parameters within a fallback chain.
pub struct ChainEntry {
    pub provider: Arc<dyn MediaProvider>,
    pub profile: ProviderProfile,
}

/// An ordered list of providers tried in sequence until one succeeds.
/// Each entry gets its own full retry budget; a provider exhausting its
/// retries does not eat into the next provider's.
pub struct FallbackChain {
    entries: Vec<ChainEntry>,
    retry: RetryTuning,
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("no providers are configured for this media kind; set at least one provider API key")]
    NoProviders,

    #[error("all providers failed: {}", exhausted_message(.attempts))]
    Exhausted { attempts: Vec<GenerationAttempt> },
}

/// The first attempt's error is the primary user-facing message; the full
/// log travels alongside as detail.
fn exhausted_message(attempts: &[GenerationAttempt]) -> String {
    attempts
        .iter()
        .find_map(|a| a.error.as_ref())
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no attempts were made".to_string())
}

impl ChainError {
    pub fn primary_error(&self) -> Option<&ProviderError> {
        match self {
            ChainError::NoProviders => None,
            ChainError::Exhausted { attempts } => attempts.iter().find_map(|a| a.error.as_ref()),
        }
    }

    pub fn primary_provider(&self) -> Option<ProviderId> {
        match self {
            ChainError::NoProviders => None,
            ChainError::Exhausted { attempts } => attempts.first().map(|a| a.provider),
        }
    }

    pub fn attempts(&self) -> &[GenerationAttempt] {
        match self {
            ChainError::NoProviders => &[],
            ChainError::Exhausted { attempts } => attempts,
        }
    }
}

impl FallbackChain {
    pub fn new(entries: Vec<ChainEntry>, retry: RetryTuning) -> Self {
        Self { entries, retry }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Provider at the head of the priority order, if any. The batch
    /// coordinator uses this to pick its pacing policy.
    pub fn head(&self) -> Option<ProviderId> {
        self.entries.first().map(|e| e.profile.provider)
    }

    /// Generate one artifact, walking the chain in priority order and
    /// short-circuiting on the first success. On terminal failure the
    /// full attempt log is returned for diagnostics.
    pub async fn generate_one(
        &self,
        request: &GenerationRequest,
    ) -> Result<MediaArtifact, ChainError> {
        if self.entries.is_empty() {
            return Err(ChainError::NoProviders);
        }

        let mut attempts: Vec<GenerationAttempt> = Vec::new();
        for entry in &self.entries {
            let result = with_retry(
                &self.retry,
                entry.profile.provider,
                &entry.profile.model_id,
                &mut attempts,
                || entry.provider.generate(&entry.profile, request),
            )
            .await;

            match result {
                Ok(artifact) => {
                    info!(
                        provider = %entry.profile.provider,
                        model = %entry.profile.model_id,
                        scene = request.scene_index,
                        "Generation succeeded"
                    );
                    return Ok(artifact);
                }
                Err(e) => {
                    warn!(
                        provider = %entry.profile.provider,
                        scene = request.scene_index,
                        error = %e,
                        "Provider exhausted, trying next in chain"
                    );
                }
            }
        }

        Err(ChainError::Exhausted { attempts })
    }
}

/// Build the image fallback chain from configured credentials, ordered by
/// cost/reliability: the paid API first, then the free no-auth API, then
/// the LLM-based API, then free-tier hosted inference. A missing
/// credential removes the provider from the chain; it is never an error.
pub fn image_chain(
    config: &Config,
    retry: RetryTuning,
    tier: QualityTier,
    aspect: AspectRatio,
) -> FallbackChain {
    let mut entries: Vec<ChainEntry> = Vec::new();

    if let Some(key) = &config.nvidia_api_key {
        entries.push(ChainEntry {
            provider: Arc::new(NvidiaImageClient::new(key)),
            profile: profiles::resolve(ProviderId::NvidiaSdxl, tier, aspect),
        });
    }
    entries.push(ChainEntry {
        provider: Arc::new(PollinationsClient::new()),
        profile: profiles::resolve(ProviderId::Pollinations, tier, aspect),
    });
    if let Some(key) = &config.gemini_api_key {
        entries.push(ChainEntry {
            provider: Arc::new(GeminiImageClient::new(key)),
            profile: profiles::resolve(ProviderId::Gemini, tier, aspect),
        });
    }
    entries.push(ChainEntry {
        provider: Arc::new(HuggingFaceImageClient::new(
            config.huggingface_api_key.as_deref(),
        )),
        profile: profiles::resolve(ProviderId::Huggingface, tier, aspect),
    });

    FallbackChain::new(entries, retry)
}

/// Build the video fallback chain: both gateway-routed models first (the
/// async vendor), then direct Hugging Face inference for the tier.
pub fn video_chain(
    config: &Config,
    retry: RetryTuning,
    tier: QualityTier,
    aspect: AspectRatio,
) -> FallbackChain {
    let mut entries: Vec<ChainEntry> = Vec::new();

    if let Some(key) = &config.nvidia_api_key {
        for model in [
            profiles::GATEWAY_VIDEO_PRIMARY,
            profiles::GATEWAY_VIDEO_FALLBACK,
        ] {
            entries.push(ChainEntry {
                provider: Arc::new(NvidiaVideoClient::new(key)),
                profile: profiles::gateway_video_profile(model, tier, aspect),
            });
        }
    }
    if let Some(key) = &config.huggingface_api_key {
        entries.push(ChainEntry {
            provider: Arc::new(HuggingFaceVideoClient::new(key)),
            profile: profiles::resolve(ProviderId::HuggingfaceVideo, tier, aspect),
        });
    }

    FallbackChain::new(entries, retry)
}
