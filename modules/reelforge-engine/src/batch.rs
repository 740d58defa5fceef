use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

use reelforge_common::{
    AspectRatio, BatchResult, GenerationRequest, MediaArtifact, MediaKind, ProviderError,
    ProviderId, QualityTier, SceneError, StylePreset,
};

use crate::chain::{ChainError, FallbackChain};

/// Pacing policy for a batch. The inter-scene delay keeps strict per-key
/// rate limits happy; the group size applies only when the chain head is
/// the free no-auth provider, which tolerates parallel load.
#[derive(Debug, Clone)]
pub struct BatchTuning {
    pub scene_pacing: Duration,
    pub free_tier_group: usize,
}

impl Default for BatchTuning {
    fn default() -> Self {
        Self {
            scene_pacing: Duration::from_millis(300),
            free_tier_group: 3,
        }
    }
}

/// A caller-facing batch: one logical request expanded into `count`
/// independent scene generations.
#[derive(Debug, Clone)]
pub struct BatchSpec {
    pub prompt: String,
    pub count: usize,
    pub style: StylePreset,
    pub aspect_ratio: AspectRatio,
    pub quality_tier: QualityTier,
    pub media_kind: MediaKind,
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no providers are configured for this media kind; set at least one provider API key")]
    NoProviders,

    /// Zero successes across all scenes. The primary error is the most
    /// actionable one observed; the full per-scene list rides along.
    #[error("{primary}")]
    NoArtifacts {
        primary: ProviderError,
        scene_errors: Vec<SceneError>,
    },
}

/// Augment the caller's prompt for one scene: scene position for visual
/// continuity, the style guide phrase, and quality hints.
pub fn build_scene_prompt(
    prompt: &str,
    scene_index: usize,
    scene_count: usize,
    style: StylePreset,
) -> String {
    format!(
        "{prompt}, scene {} of {scene_count}, {}, high quality, detailed, 8k",
        scene_index + 1,
        style.guide()
    )
}

fn scene_request(spec: &BatchSpec, scene_index: usize) -> GenerationRequest {
    GenerationRequest {
        prompt: build_scene_prompt(&spec.prompt, scene_index, spec.count, spec.style),
        scene_index,
        scene_count: spec.count,
        style: spec.style,
        aspect_ratio: spec.aspect_ratio,
        quality_tier: spec.quality_tier,
        media_kind: spec.media_kind,
        seed: rand::rng().random::<u32>() as u64,
    }
}

fn record_outcome(
    request: &GenerationRequest,
    outcome: Result<MediaArtifact, ChainError>,
    head: ProviderId,
    artifacts: &mut Vec<MediaArtifact>,
    failures: &mut Vec<(SceneError, Option<ProviderError>)>,
) {
    match outcome {
        Ok(artifact) => artifacts.push(artifact),
        Err(err) => {
            warn!(
                scene = request.scene_index,
                error = %err,
                "Scene permanently failed, continuing batch"
            );
            let scene_error = SceneError {
                scene_index: request.scene_index,
                provider: err.primary_provider().unwrap_or(head),
                message: err
                    .primary_error()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| err.to_string()),
            };
            failures.push((scene_error, err.primary_error().cloned()));
        }
    }
}

/// Drive `count` independent scene generations through the fallback
/// chain, collecting partial results. A scene's failure never aborts the
/// batch; only zero successes overall is fatal.
pub async fn generate_batch(
    chain: &FallbackChain,
    tuning: &BatchTuning,
    spec: &BatchSpec,
) -> Result<BatchResult, BatchError> {
    let Some(head) = chain.head() else {
        return Err(BatchError::NoProviders);
    };

    let requests: Vec<GenerationRequest> =
        (0..spec.count).map(|i| scene_request(spec, i)).collect();

    let mut artifacts: Vec<MediaArtifact> = Vec::new();
    let mut failures: Vec<(SceneError, Option<ProviderError>)> = Vec::new();

    if head == ProviderId::Pollinations && tuning.free_tier_group > 1 {
        for (group_index, group) in requests.chunks(tuning.free_tier_group).enumerate() {
            if group_index > 0 {
                tokio::time::sleep(tuning.scene_pacing).await;
            }
            let outcomes =
                futures::future::join_all(group.iter().map(|r| chain.generate_one(r))).await;
            for (request, outcome) in group.iter().zip(outcomes) {
                record_outcome(request, outcome, head, &mut artifacts, &mut failures);
            }
        }
    } else {
        for (i, request) in requests.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(tuning.scene_pacing).await;
            }
            let outcome = chain.generate_one(request).await;
            record_outcome(request, outcome, head, &mut artifacts, &mut failures);
        }
    }

    info!(
        requested = spec.count,
        produced = artifacts.len(),
        failed = failures.len(),
        "Batch finished"
    );

    if artifacts.is_empty() {
        let primary = failures
            .iter()
            .filter_map(|(_, e)| e.as_ref())
            .min_by_key(|e| e.severity_rank())
            .cloned()
            .unwrap_or(ProviderError::Unavailable {
                status: 0,
                message: "no scenes were attempted".into(),
            });
        return Err(BatchError::NoArtifacts {
            primary,
            scene_errors: failures.into_iter().map(|(s, _)| s).collect(),
        });
    }

    Ok(BatchResult {
        artifacts,
        errors: failures.into_iter().map(|(s, _)| s).collect(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use async_trait::async_trait;

    use mediagen_client::MediaProvider;
    use reelforge_common::{GenerationRequest, ProviderProfile};

    use crate::chain::ChainEntry;
    use crate::retry::RetryTuning;

    use super::*;

    fn fast_tuning() -> BatchTuning {
        BatchTuning {
            scene_pacing: Duration::ZERO,
            free_tier_group: 3,
        }
    }

    fn fast_retry() -> RetryTuning {
        RetryTuning {
            max_attempts: 2,
            rate_limit_delay: Duration::ZERO,
            transient_delay: Duration::ZERO,
        }
    }

    fn spec(count: usize) -> BatchSpec {
        BatchSpec {
            prompt: "sunrise over paddy fields".into(),
            count,
            style: StylePreset::Folk,
            aspect_ratio: AspectRatio::Portrait,
            quality_tier: QualityTier::Cheap,
            media_kind: MediaKind::Image,
        }
    }

    fn test_profile(provider: ProviderId) -> ProviderProfile {
        ProviderProfile {
            provider,
            model_id: "test-model".into(),
            steps: 15,
            cfg_scale: 6.0,
            sampler: String::new(),
            width: 768,
            height: 1344,
            resolution_degraded: false,
            max_timeout: Duration::from_secs(30),
        }
    }

    /// Provider that fails scenes whose prompt matches a marker and
    /// succeeds otherwise.
    struct MarkerProvider {
        id: ProviderId,
        fail_marker: Option<String>,
        error: ProviderError,
    }

    #[async_trait]
    impl MediaProvider for MarkerProvider {
        fn id(&self) -> ProviderId {
            self.id
        }

        async fn generate(
            &self,
            profile: &ProviderProfile,
            request: &GenerationRequest,
        ) -> Result<MediaArtifact, ProviderError> {
            if let Some(marker) = &self.fail_marker {
                if request.prompt.contains(marker) {
                    return Err(self.error.clone());
                }
            }
            Ok(MediaArtifact {
                id: uuid::Uuid::new_v4().to_string(),
                data: "data:image/png;base64,AAAA".into(),
                mime_type: "image/png".into(),
                prompt: request.prompt.clone(),
                source: self.id,
                model: profile.model_id.clone(),
                seed: Some(request.seed),
                resolution_degraded: profile.resolution_degraded,
            })
        }
    }

    fn single_provider_chain(provider: MarkerProvider) -> FallbackChain {
        let profile = test_profile(provider.id);
        FallbackChain::new(
            vec![ChainEntry {
                provider: Arc::new(provider),
                profile,
            }],
            fast_retry(),
        )
    }

    #[test]
    fn scene_prompts_carry_position_and_style_guide() {
        for i in 0..3 {
            let prompt = build_scene_prompt("sunrise over paddy fields", i, 3, StylePreset::Folk);
            assert!(prompt.contains(&format!("scene {} of 3", i + 1)));
            assert!(prompt.contains(StylePreset::Folk.guide()));
            assert!(prompt.starts_with("sunrise over paddy fields"));
        }
    }

    #[tokio::test]
    async fn artifacts_and_errors_partition_the_scenes() {
        let chain = single_provider_chain(MarkerProvider {
            id: ProviderId::NvidiaSdxl,
            fail_marker: Some("scene 2 of 4".into()),
            error: ProviderError::InvalidRequest("rejected".into()),
        });

        let result = generate_batch(&chain, &fast_tuning(), &spec(4))
            .await
            .unwrap();

        assert_eq!(result.artifacts.len(), 3);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].scene_index, 1);

        // every scene index is accounted for exactly once
        let mut seen = HashSet::new();
        for artifact in &result.artifacts {
            // recover the index from the prompt position marker
            let idx = (1..=4)
                .find(|i| artifact.prompt.contains(&format!("scene {i} of 4")))
                .unwrap()
                - 1;
            assert!(seen.insert(idx));
        }
        for error in &result.errors {
            assert!(seen.insert(error.scene_index));
        }
        assert_eq!(seen, (0..4).collect::<HashSet<_>>());
    }

    #[tokio::test]
    async fn artifacts_preserve_scene_order() {
        let chain = single_provider_chain(MarkerProvider {
            id: ProviderId::NvidiaSdxl,
            fail_marker: None,
            error: ProviderError::InvalidRequest("unused".into()),
        });

        let result = generate_batch(&chain, &fast_tuning(), &spec(5))
            .await
            .unwrap();

        assert_eq!(result.artifacts.len(), 5);
        for (i, artifact) in result.artifacts.iter().enumerate() {
            assert!(artifact.prompt.contains(&format!("scene {} of 5", i + 1)));
        }
    }

    #[tokio::test]
    async fn all_auth_failures_surface_auth_as_primary() {
        let chain = single_provider_chain(MarkerProvider {
            id: ProviderId::NvidiaSdxl,
            fail_marker: Some("scene".into()),
            error: ProviderError::Auth("invalid API key".into()),
        });

        let err = generate_batch(&chain, &fast_tuning(), &spec(3))
            .await
            .unwrap_err();

        match err {
            BatchError::NoArtifacts {
                primary,
                scene_errors,
            } => {
                assert!(matches!(primary, ProviderError::Auth(_)));
                assert_eq!(scene_errors.len(), 3);
                for (i, scene_error) in scene_errors.iter().enumerate() {
                    assert_eq!(scene_error.scene_index, i);
                    assert!(scene_error.message.contains("invalid API key"));
                }
            }
            other => panic!("expected NoArtifacts, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn free_provider_head_runs_groups_and_keeps_order() {
        let chain = single_provider_chain(MarkerProvider {
            id: ProviderId::Pollinations,
            fail_marker: None,
            error: ProviderError::InvalidRequest("unused".into()),
        });

        let result = generate_batch(&chain, &fast_tuning(), &spec(7))
            .await
            .unwrap();

        assert_eq!(result.artifacts.len(), 7);
        for (i, artifact) in result.artifacts.iter().enumerate() {
            assert!(artifact.prompt.contains(&format!("scene {} of 7", i + 1)));
        }
    }

    #[tokio::test]
    async fn empty_chain_fails_before_any_scene() {
        let chain = FallbackChain::new(Vec::new(), fast_retry());
        let err = generate_batch(&chain, &fast_tuning(), &spec(3))
            .await
            .unwrap_err();
        assert!(matches!(err, BatchError::NoProviders));
    }
}
