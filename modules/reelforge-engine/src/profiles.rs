use std::time::Duration;

use reelforge_common::{AspectRatio, ProviderId, ProviderProfile, QualityTier};

// Model identifiers per provider.
pub const NVIDIA_SDXL_MODEL: &str = "stabilityai/stable-diffusion-xl";
pub const POLLINATIONS_MODEL: &str = "flux";
pub const GEMINI_IMAGE_MODEL: &str = "gemini-2.0-flash-exp";
pub const HF_IMAGE_MODEL: &str = "stabilityai/stable-diffusion-xl-base-1.0";
/// Gateway-routed video models, tried in this order.
pub const GATEWAY_VIDEO_PRIMARY: &str = "stabilityai/stable-video-diffusion";
pub const GATEWAY_VIDEO_FALLBACK: &str = "nvidia/cosmos-predict1-7b";

const IMAGE_TIMEOUT: Duration = Duration::from_secs(30);
/// Direct (synchronous) video generation holds the connection open while
/// the model renders.
const DIRECT_VIDEO_TIMEOUT: Duration = Duration::from_secs(180);
/// The submit-then-poll vendor answers the submit call quickly; the long
/// wait happens in the poll loop, under its own budget.
const VIDEO_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

struct SamplerParams {
    steps: u32,
    cfg_scale: f32,
    sampler: &'static str,
}

/// Sampling cost increases monotonically with the tier.
fn sampler_params(tier: QualityTier) -> SamplerParams {
    match tier {
        QualityTier::Cheap => SamplerParams {
            steps: 15,
            cfg_scale: 6.0,
            sampler: "K_EULER_ANCESTRAL",
        },
        QualityTier::Balanced => SamplerParams {
            steps: 25,
            cfg_scale: 7.0,
            sampler: "K_DPM_2_ANCESTRAL",
        },
        QualityTier::Best => SamplerParams {
            steps: 40,
            cfg_scale: 8.0,
            sampler: "K_DPMPP_2M",
        },
    }
}

/// Hugging Face video model routing per tier, with matching inference
/// parameters.
fn hf_video_params(tier: QualityTier) -> (&'static str, u32, f32) {
    match tier {
        QualityTier::Cheap => ("cerspense/zeroscope_v2_576w", 20, 6.0),
        QualityTier::Balanced => ("THUDM/CogVideoX-2b", 30, 7.0),
        QualityTier::Best => ("genmo/mochi-1-preview", 40, 8.0),
    }
}

/// Resolve concrete provider parameters for a request. Pure and total:
/// every (provider, tier, aspect) combination maps to a profile, and the
/// same inputs always yield the same output.
pub fn resolve(provider: ProviderId, tier: QualityTier, aspect: AspectRatio) -> ProviderProfile {
    let params = sampler_params(tier);
    match provider {
        // SDXL only accepts a fixed set of dimensions; there is no true
        // 9:16 option, so portrait requests get square output. Known
        // provider limitation, surfaced via the degraded flag.
        ProviderId::NvidiaSdxl => {
            let (width, height, degraded) = match aspect {
                AspectRatio::Landscape => (1344, 768, false),
                AspectRatio::Portrait => (1024, 1024, true),
            };
            ProviderProfile {
                provider,
                model_id: NVIDIA_SDXL_MODEL.to_string(),
                steps: params.steps,
                cfg_scale: params.cfg_scale,
                sampler: params.sampler.to_string(),
                width,
                height,
                resolution_degraded: degraded,
                max_timeout: IMAGE_TIMEOUT,
            }
        }
        ProviderId::Pollinations => {
            let (width, height) = match aspect {
                AspectRatio::Portrait => (768, 1344),
                AspectRatio::Landscape => (1344, 768),
            };
            ProviderProfile {
                provider,
                model_id: POLLINATIONS_MODEL.to_string(),
                steps: params.steps,
                cfg_scale: params.cfg_scale,
                sampler: String::new(),
                width,
                height,
                resolution_degraded: false,
                max_timeout: IMAGE_TIMEOUT,
            }
        }
        // Gemini picks its own resolution; the aspect ratio rides along
        // in the prompt, so the request is not considered degraded.
        ProviderId::Gemini => {
            let (width, height) = match aspect {
                AspectRatio::Portrait => (768, 1344),
                AspectRatio::Landscape => (1344, 768),
            };
            ProviderProfile {
                provider,
                model_id: GEMINI_IMAGE_MODEL.to_string(),
                steps: params.steps,
                cfg_scale: params.cfg_scale,
                sampler: String::new(),
                width,
                height,
                resolution_degraded: false,
                max_timeout: IMAGE_TIMEOUT,
            }
        }
        // Hosted SDXL ignores dimension hints and renders square.
        ProviderId::Huggingface => ProviderProfile {
            provider,
            model_id: HF_IMAGE_MODEL.to_string(),
            steps: params.steps,
            cfg_scale: params.cfg_scale,
            sampler: String::new(),
            width: 1024,
            height: 1024,
            resolution_degraded: true,
            max_timeout: IMAGE_TIMEOUT,
        },
        ProviderId::NvidiaVideo => {
            gateway_video_profile(GATEWAY_VIDEO_PRIMARY, tier, aspect)
        }
        ProviderId::HuggingfaceVideo => {
            let (model, steps, cfg_scale) = hf_video_params(tier);
            let (width, height) = nominal_video_dims(aspect);
            ProviderProfile {
                provider,
                model_id: model.to_string(),
                steps,
                cfg_scale,
                sampler: String::new(),
                width,
                height,
                resolution_degraded: false,
                max_timeout: DIRECT_VIDEO_TIMEOUT,
            }
        }
    }
}

/// Profile for a specific gateway-routed video model. The fallback chain
/// uses this to try more than one model behind the same vendor.
pub fn gateway_video_profile(
    model_id: &str,
    tier: QualityTier,
    aspect: AspectRatio,
) -> ProviderProfile {
    let params = sampler_params(tier);
    let (width, height) = nominal_video_dims(aspect);
    ProviderProfile {
        provider: ProviderId::NvidiaVideo,
        model_id: model_id.to_string(),
        steps: params.steps,
        cfg_scale: params.cfg_scale,
        sampler: String::new(),
        width,
        height,
        resolution_degraded: false,
        max_timeout: VIDEO_SUBMIT_TIMEOUT,
    }
}

fn nominal_video_dims(aspect: AspectRatio) -> (u32, u32) {
    match aspect {
        AspectRatio::Portrait => (576, 1024),
        AspectRatio::Landscape => (1024, 576),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_is_pure_and_idempotent() {
        let a = resolve(
            ProviderId::NvidiaSdxl,
            QualityTier::Balanced,
            AspectRatio::Portrait,
        );
        let b = resolve(
            ProviderId::NvidiaSdxl,
            QualityTier::Balanced,
            AspectRatio::Portrait,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn tier_cost_is_monotonic() {
        let cheap = sampler_params(QualityTier::Cheap);
        let balanced = sampler_params(QualityTier::Balanced);
        let best = sampler_params(QualityTier::Best);
        assert!(cheap.steps < balanced.steps && balanced.steps < best.steps);
        assert!(cheap.cfg_scale < balanced.cfg_scale && balanced.cfg_scale < best.cfg_scale);
    }

    #[test]
    fn sdxl_portrait_is_substituted_square_and_flagged() {
        let profile = resolve(
            ProviderId::NvidiaSdxl,
            QualityTier::Cheap,
            AspectRatio::Portrait,
        );
        assert_eq!((profile.width, profile.height), (1024, 1024));
        assert!(profile.resolution_degraded);

        let landscape = resolve(
            ProviderId::NvidiaSdxl,
            QualityTier::Cheap,
            AspectRatio::Landscape,
        );
        assert_eq!((landscape.width, landscape.height), (1344, 768));
        assert!(!landscape.resolution_degraded);
    }

    #[test]
    fn pollinations_honors_portrait() {
        let profile = resolve(
            ProviderId::Pollinations,
            QualityTier::Cheap,
            AspectRatio::Portrait,
        );
        assert_eq!((profile.width, profile.height), (768, 1344));
        assert!(!profile.resolution_degraded);
    }

    #[test]
    fn hf_video_model_follows_tier() {
        let cheap = resolve(
            ProviderId::HuggingfaceVideo,
            QualityTier::Cheap,
            AspectRatio::Portrait,
        );
        assert_eq!(cheap.model_id, "cerspense/zeroscope_v2_576w");
        assert_eq!(cheap.steps, 20);

        let best = resolve(
            ProviderId::HuggingfaceVideo,
            QualityTier::Best,
            AspectRatio::Portrait,
        );
        assert_eq!(best.model_id, "genmo/mochi-1-preview");
        assert_eq!(best.steps, 40);
    }

    #[test]
    fn gateway_models_share_tier_params() {
        let primary = gateway_video_profile(
            GATEWAY_VIDEO_PRIMARY,
            QualityTier::Balanced,
            AspectRatio::Portrait,
        );
        let fallback = gateway_video_profile(
            GATEWAY_VIDEO_FALLBACK,
            QualityTier::Balanced,
            AspectRatio::Portrait,
        );
        assert_ne!(primary.model_id, fallback.model_id);
        assert_eq!(primary.steps, fallback.steps);
        assert_eq!(primary.provider, ProviderId::NvidiaVideo);
    }
}
