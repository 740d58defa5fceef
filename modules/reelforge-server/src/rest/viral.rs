use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;

use textgen_client::{self as textgen, TextgenError, VideoFormat};

use crate::AppState;

fn default_niche() -> String {
    "everyday life stories".to_string()
}

fn default_idea_count() -> usize {
    5
}

fn default_scene_count() -> usize {
    8
}

fn textgen_status(err: &TextgenError) -> StatusCode {
    match err {
        TextgenError::MissingCredential => StatusCode::BAD_REQUEST,
        TextgenError::Api { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        TextgenError::Network(_) | TextgenError::Parse(_) => StatusCode::BAD_GATEWAY,
    }
}

#[derive(Deserialize)]
pub struct IdeasRequest {
    #[serde(default = "default_niche")]
    niche: String,
    #[serde(default = "default_idea_count")]
    count: usize,
}

pub async fn ideas(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IdeasRequest>,
) -> impl IntoResponse {
    let ideas =
        textgen::viral_ideas(state.text.as_ref(), &body.niche, body.count.clamp(1, 10)).await;
    Json(json!({ "success": true, "ideas": ideas }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRequest {
    idea: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default = "default_scene_count")]
    image_count: usize,
}

pub async fn script(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScriptRequest>,
) -> impl IntoResponse {
    let idea = body.idea.trim();
    if idea.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Idea is required"})),
        )
            .into_response();
    }

    let format = VideoFormat::parse(body.format.as_deref().unwrap_or_default());
    match textgen::viral_script(
        state.text.as_ref(),
        idea,
        format,
        body.image_count.clamp(1, 16),
    )
    .await
    {
        Ok(script) => Json(json!({ "success": true, "script": script })).into_response(),
        Err(err) => (
            textgen_status(&err),
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
pub struct MetadataRequest {
    topic: String,
    #[serde(default)]
    format: Option<String>,
}

pub async fn metadata(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MetadataRequest>,
) -> impl IntoResponse {
    let topic = body.topic.trim();
    if topic.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Topic is required"})),
        )
            .into_response();
    }

    let format = VideoFormat::parse(body.format.as_deref().unwrap_or_default());
    let metadata = textgen::generate_metadata(state.text.as_ref(), topic, format).await;
    Json(json!({ "success": true, "metadata": metadata })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_is_a_client_error() {
        assert_eq!(
            textgen_status(&TextgenError::MissingCredential),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn provider_auth_status_passes_through() {
        let err = TextgenError::Api {
            status: 403,
            message: "forbidden".into(),
        };
        assert_eq!(textgen_status(&err), StatusCode::FORBIDDEN);
    }

    #[test]
    fn parse_failure_is_an_upstream_error() {
        assert_eq!(
            textgen_status(&TextgenError::Parse("not json".into())),
            StatusCode::BAD_GATEWAY
        );
    }
}
