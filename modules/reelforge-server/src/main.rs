use std::sync::Arc;

use anyhow::Result;
use axum::{
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use reelforge_common::Config;
use reelforge_engine::{BatchTuning, RetryTuning};
use textgen_client::GeminiTextClient;

mod rest;

pub struct AppState {
    pub config: Config,
    /// Text collaborator; absent when no Gemini credential is configured.
    pub text: Option<GeminiTextClient>,
    /// Shared client for plain passthrough calls (music catalog).
    pub http: reqwest::Client,
    pub retry: RetryTuning,
    pub batch: BatchTuning,
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    info!(
        nvidia = config.nvidia_api_key.is_some(),
        gemini = config.gemini_api_key.is_some(),
        huggingface = config.huggingface_api_key.is_some(),
        pixabay = config.pixabay_api_key.is_some(),
        "Provider credentials detected"
    );

    let text = config.gemini_api_key.as_deref().map(GeminiTextClient::new);
    let state = Arc::new(AppState {
        config: config.clone(),
        text,
        http: reqwest::Client::new(),
        retry: RetryTuning::default(),
        batch: BatchTuning::default(),
    });

    let app = Router::new()
        // Health check
        .route("/api/health", get(health))
        // Media generation
        .route("/api/generate-images", post(rest::generate::generate_images))
        .route("/api/generate-video", post(rest::generate::generate_video))
        // Text collaborator
        .route("/api/viral/ideas", post(rest::viral::ideas))
        .route("/api/viral/script", post(rest::viral::script))
        .route("/api/generate-metadata", post(rest::viral::metadata))
        // Music catalog
        .route("/api/music/search", get(rest::music::search))
        .route("/api/music/categories", get(rest::music::categories))
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Logging layer: method + path + status + latency only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!("ReelForge API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
