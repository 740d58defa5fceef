use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use reelforge_common::{AspectRatio, MediaKind, QualityTier, StylePreset};
use reelforge_engine::{generate_batch, image_chain, video_chain, BatchError, BatchSpec};

use super::{batch_status, provider_status};
use crate::AppState;

/// Upper bound on scenes per batch; keeps one request from monopolizing
/// upstream rate limits.
const MAX_SCENES: usize = 12;

fn default_count() -> usize {
    6
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImagesRequest {
    prompt: String,
    #[serde(default = "default_count")]
    count: usize,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    aspect_ratio: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

pub async fn generate_images(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateImagesRequest>,
) -> impl IntoResponse {
    let prompt = body.prompt.trim();
    if prompt.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Prompt is required"})),
        )
            .into_response();
    }
    if body.count == 0 || body.count > MAX_SCENES {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("count must be between 1 and {MAX_SCENES}")})),
        )
            .into_response();
    }

    let spec = BatchSpec {
        prompt: prompt.to_string(),
        count: body.count,
        style: StylePreset::parse(body.style.as_deref().unwrap_or_default()),
        aspect_ratio: AspectRatio::parse(body.aspect_ratio.as_deref().unwrap_or_default()),
        quality_tier: QualityTier::parse(body.model.as_deref().unwrap_or_default()),
        media_kind: MediaKind::Image,
    };

    info!(
        count = spec.count,
        style = %spec.style,
        tier = %spec.quality_tier,
        aspect = %spec.aspect_ratio,
        "Image batch requested"
    );

    let chain = image_chain(
        &state.config,
        state.retry.clone(),
        spec.quality_tier,
        spec.aspect_ratio,
    );

    match generate_batch(&chain, &state.batch, &spec).await {
        Ok(result) => {
            let mut payload = json!({ "success": true, "images": result.artifacts });
            if !result.errors.is_empty() {
                payload["details"] = serde_json::to_value(&result.errors).unwrap_or_default();
            }
            Json(payload).into_response()
        }
        Err(BatchError::NoArtifacts {
            primary,
            scene_errors,
        }) => (
            provider_status(&primary),
            Json(json!({ "error": primary.to_string(), "details": scene_errors })),
        )
            .into_response(),
        Err(err) => (
            batch_status(&err),
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoRequest {
    prompt: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    aspect_ratio: Option<String>,
    /// Requested clip length in seconds; advisory only, the selected
    /// model's frame budget decides the real duration.
    #[serde(default)]
    duration: Option<u32>,
}

pub async fn generate_video(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateVideoRequest>,
) -> impl IntoResponse {
    let prompt = body.prompt.trim();
    if prompt.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Prompt is required"})),
        )
            .into_response();
    }

    let spec = BatchSpec {
        prompt: prompt.to_string(),
        count: 1,
        style: StylePreset::default(),
        aspect_ratio: AspectRatio::parse(body.aspect_ratio.as_deref().unwrap_or_default()),
        quality_tier: QualityTier::parse(body.model.as_deref().unwrap_or_default()),
        media_kind: MediaKind::Video,
    };

    info!(
        tier = %spec.quality_tier,
        aspect = %spec.aspect_ratio,
        duration = body.duration,
        "Video generation requested"
    );

    let chain = video_chain(
        &state.config,
        state.retry.clone(),
        spec.quality_tier,
        spec.aspect_ratio,
    );

    match generate_batch(&chain, &state.batch, &spec).await {
        Ok(result) => match result.artifacts.into_iter().next() {
            Some(video) => Json(json!({
                "success": true,
                "video": {
                    "data": video.data,
                    "mimeType": video.mime_type,
                    "model": video.model,
                    "prompt": video.prompt,
                }
            }))
            .into_response(),
            None => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "video generation produced no artifact"})),
            )
                .into_response(),
        },
        Err(BatchError::NoArtifacts {
            primary,
            scene_errors,
        }) => (
            provider_status(&primary),
            Json(json!({ "error": primary.to_string(), "details": scene_errors })),
        )
            .into_response(),
        Err(err) => (
            batch_status(&err),
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}
