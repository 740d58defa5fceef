use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

// --- Media Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "16:9")]
    Landscape,
}

impl AspectRatio {
    /// Parse the wire notation ("9:16"/"16:9"). Anything else falls back
    /// to portrait, the default for short-form video.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "16:9" => AspectRatio::Landscape,
            _ => AspectRatio::Portrait,
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AspectRatio::Portrait => write!(f, "9:16"),
            AspectRatio::Landscape => write!(f, "16:9"),
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Portrait
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Cheap,
    Balanced,
    Best,
}

impl QualityTier {
    /// Parse a tier keyword. Unknown input falls back to balanced rather
    /// than failing; tier selection is advisory, not a contract.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "cheap" => QualityTier::Cheap,
            "best" => QualityTier::Best,
            _ => QualityTier::Balanced,
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityTier::Cheap => write!(f, "cheap"),
            QualityTier::Balanced => write!(f, "balanced"),
            QualityTier::Best => write!(f, "best"),
        }
    }
}

impl Default for QualityTier {
    fn default() -> Self {
        QualityTier::Balanced
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StylePreset {
    Vibrant,
    Cinematic,
    Artistic,
    Realistic,
    Anime,
    Devotional,
    Folk,
}

impl StylePreset {
    /// Parse a style keyword. Unknown input falls back to vibrant.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "cinematic" => StylePreset::Cinematic,
            "artistic" => StylePreset::Artistic,
            "realistic" => StylePreset::Realistic,
            "anime" => StylePreset::Anime,
            "devotional" => StylePreset::Devotional,
            "folk" => StylePreset::Folk,
            _ => StylePreset::Vibrant,
        }
    }

    /// Fixed additive phrase appended to the user prompt for this style.
    pub fn guide(&self) -> &'static str {
        match self {
            StylePreset::Vibrant => {
                "ultra vibrant colors, high contrast, visually stunning, eye-catching, professional quality"
            }
            StylePreset::Cinematic => {
                "cinematic lighting, dramatic atmosphere, film quality, 4K resolution, movie poster style"
            }
            StylePreset::Artistic => {
                "digital art, beautiful illustration, trending on artstation, masterpiece quality"
            }
            StylePreset::Realistic => {
                "photorealistic, ultra HD, detailed, natural lighting, professional photography"
            }
            StylePreset::Anime => {
                "anime style, vibrant colors, detailed illustration, studio quality anime art"
            }
            StylePreset::Devotional => {
                "divine atmosphere, golden light, spiritual, sacred traditional art style"
            }
            StylePreset::Folk => {
                "traditional folk art style, colorful, rural aesthetics, earthy tones, cultural"
            }
        }
    }
}

impl std::fmt::Display for StylePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StylePreset::Vibrant => write!(f, "vibrant"),
            StylePreset::Cinematic => write!(f, "cinematic"),
            StylePreset::Artistic => write!(f, "artistic"),
            StylePreset::Realistic => write!(f, "realistic"),
            StylePreset::Anime => write!(f, "anime"),
            StylePreset::Devotional => write!(f, "devotional"),
            StylePreset::Folk => write!(f, "folk"),
        }
    }
}

impl Default for StylePreset {
    fn default() -> Self {
        StylePreset::Vibrant
    }
}

// --- Providers ---

/// Closed set of supported generation providers. Each variant is bound to
/// one adapter implementation; an unsupported provider is a compile error,
/// not a runtime fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderId {
    NvidiaSdxl,
    Pollinations,
    Gemini,
    Huggingface,
    NvidiaVideo,
    HuggingfaceVideo,
}

impl ProviderId {
    pub fn media_kind(&self) -> MediaKind {
        match self {
            ProviderId::NvidiaSdxl
            | ProviderId::Pollinations
            | ProviderId::Gemini
            | ProviderId::Huggingface => MediaKind::Image,
            ProviderId::NvidiaVideo | ProviderId::HuggingfaceVideo => MediaKind::Video,
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderId::NvidiaSdxl => write!(f, "nvidia-sdxl"),
            ProviderId::Pollinations => write!(f, "pollinations"),
            ProviderId::Gemini => write!(f, "gemini"),
            ProviderId::Huggingface => write!(f, "huggingface"),
            ProviderId::NvidiaVideo => write!(f, "nvidia-video"),
            ProviderId::HuggingfaceVideo => write!(f, "huggingface-video"),
        }
    }
}

// --- Generation Request / Profile ---

/// One unit of generation work: a single scene of a batch. Immutable once
/// built; the prompt already carries the scene and style augmentation.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub scene_index: usize,
    pub scene_count: usize,
    pub style: StylePreset,
    pub aspect_ratio: AspectRatio,
    pub quality_tier: QualityTier,
    pub media_kind: MediaKind,
    pub seed: u64,
}

/// Concrete provider parameters resolved from (provider, tier, aspect).
/// Computed per request, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderProfile {
    pub provider: ProviderId,
    pub model_id: String,
    pub steps: u32,
    pub cfg_scale: f32,
    pub sampler: String,
    pub width: u32,
    pub height: u32,
    /// True when the provider cannot honor the requested aspect ratio and
    /// a supported resolution was substituted instead.
    pub resolution_degraded: bool,
    pub max_timeout: Duration,
}

// --- Attempt Log ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    TransientFailure,
    PermanentFailure,
}

/// Record of one adapter invocation. Outcome is set exactly once; the log
/// lives only for the duration of the enclosing orchestration call.
#[derive(Debug, Clone)]
pub struct GenerationAttempt {
    pub provider: ProviderId,
    pub model_id: String,
    pub attempt_number: u32,
    pub started_at: DateTime<Utc>,
    pub outcome: AttemptOutcome,
    pub error: Option<ProviderError>,
}

// --- Results ---

/// A successfully generated media payload plus provenance. The payload is
/// carried as a self-describing `data:` URI so callers need no second
/// fetch to use it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaArtifact {
    pub id: String,
    pub data: String,
    pub mime_type: String,
    pub prompt: String,
    pub source: ProviderId,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub resolution_degraded: bool,
}

/// A scene that permanently failed, demoted to a diagnostic entry so the
/// rest of the batch can continue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneError {
    pub scene_index: usize,
    pub provider: ProviderId,
    pub message: String,
}

/// Outcome of a batch: artifacts in scene order, errors in attempt order.
/// Together they account for every scene index exactly once.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    pub artifacts: Vec<MediaArtifact>,
    pub errors: Vec<SceneError>,
}

// --- Async Jobs ---

/// Handle for a submitted asynchronous generation job on the one vendor
/// whose API is submit-then-poll.
#[derive(Debug, Clone)]
pub struct AsyncJobHandle {
    pub request_id: String,
    pub submitted_at: DateTime<Utc>,
    pub poll_count: u32,
}

impl AsyncJobHandle {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            submitted_at: Utc::now(),
            poll_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- parse fallback tests ---

    #[test]
    fn aspect_ratio_parses_known_values() {
        assert_eq!(AspectRatio::parse("9:16"), AspectRatio::Portrait);
        assert_eq!(AspectRatio::parse("16:9"), AspectRatio::Landscape);
    }

    #[test]
    fn aspect_ratio_falls_back_to_portrait() {
        assert_eq!(AspectRatio::parse("4:3"), AspectRatio::Portrait);
        assert_eq!(AspectRatio::parse(""), AspectRatio::Portrait);
    }

    #[test]
    fn quality_tier_falls_back_to_balanced() {
        assert_eq!(QualityTier::parse("cheap"), QualityTier::Cheap);
        assert_eq!(QualityTier::parse("best"), QualityTier::Best);
        assert_eq!(QualityTier::parse("ultra"), QualityTier::Balanced);
    }

    #[test]
    fn style_falls_back_to_vibrant() {
        assert_eq!(StylePreset::parse("folk"), StylePreset::Folk);
        assert_eq!(StylePreset::parse("vaporwave"), StylePreset::Vibrant);
    }

    #[test]
    fn style_guides_are_distinct() {
        let presets = [
            StylePreset::Vibrant,
            StylePreset::Cinematic,
            StylePreset::Artistic,
            StylePreset::Realistic,
            StylePreset::Anime,
            StylePreset::Devotional,
            StylePreset::Folk,
        ];
        for (i, a) in presets.iter().enumerate() {
            for b in &presets[i + 1..] {
                assert_ne!(a.guide(), b.guide());
            }
        }
    }

    #[test]
    fn aspect_ratio_wire_format_round_trips() {
        let json = serde_json::to_string(&AspectRatio::Portrait).unwrap();
        assert_eq!(json, "\"9:16\"");
        let back: AspectRatio = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AspectRatio::Portrait);
    }

    #[test]
    fn artifact_serializes_camel_case() {
        let artifact = MediaArtifact {
            id: "a1".into(),
            data: "data:image/png;base64,AAAA".into(),
            mime_type: "image/png".into(),
            prompt: "a sunrise".into(),
            source: ProviderId::NvidiaSdxl,
            model: "stabilityai/stable-diffusion-xl".into(),
            seed: Some(42),
            resolution_degraded: false,
        };
        let value = serde_json::to_value(&artifact).unwrap();
        assert_eq!(value["mimeType"], "image/png");
        assert_eq!(value["source"], "nvidia-sdxl");
        // degraded flag is omitted when false
        assert!(value.get("resolutionDegraded").is_none());
    }
}
