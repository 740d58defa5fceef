use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::AppState;

const PIXABAY_URL: &str = "https://pixabay.com/api/videos/music/";

#[derive(Debug, Clone, Serialize)]
pub struct MusicTrack {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub source: String,
}

fn default_query() -> String {
    "folk".to_string()
}

fn default_page() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct MusicQuery {
    #[serde(default = "default_query")]
    q: String,
    #[serde(default)]
    category: String,
    #[serde(default = "default_page")]
    page: u32,
}

#[derive(Deserialize)]
struct PixabayResponse {
    #[serde(default)]
    hits: Vec<PixabayHit>,
    #[serde(default, rename = "totalHits")]
    total_hits: u32,
}

#[derive(Deserialize)]
struct PixabayHit {
    id: u64,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    user: String,
    #[serde(default)]
    duration: u32,
    #[serde(default)]
    audio: Option<String>,
}

/// Royalty-free music search: a Pixabay passthrough when a key is
/// configured, a curated static list otherwise. Never an error — music is
/// decoration, not a hard dependency.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MusicQuery>,
) -> impl IntoResponse {
    let Some(key) = &state.config.pixabay_api_key else {
        return Json(json!({
            "success": true,
            "tracks": default_tracks(&query.q),
            "total": 0,
            "page": 1,
            "note": "Using curated suggestions. Add PIXABAY_API_KEY for full music search.",
        }));
    };

    match search_pixabay(&state.http, key, &query).await {
        Ok((tracks, total)) => Json(json!({
            "success": true,
            "tracks": tracks,
            "total": total,
            "page": query.page,
        })),
        Err(e) => {
            warn!(error = %e, "Pixabay search failed, using curated suggestions");
            Json(json!({
                "success": true,
                "tracks": default_tracks(&query.q),
                "total": 0,
                "page": 1,
                "note": "Music search is temporarily unavailable; showing curated suggestions.",
            }))
        }
    }
}

async fn search_pixabay(
    http: &reqwest::Client,
    key: &str,
    query: &MusicQuery,
) -> anyhow::Result<(Vec<MusicTrack>, u32)> {
    let page = query.page.to_string();
    let mut request = http.get(PIXABAY_URL).query(&[
        ("key", key),
        ("q", query.q.as_str()),
        ("per_page", "20"),
        ("page", page.as_str()),
        ("order", "popular"),
    ]);
    if !query.category.is_empty() {
        request = request.query(&[("category", query.category.as_str())]);
    }

    let response = request.send().await?;
    if !response.status().is_success() {
        anyhow::bail!("Pixabay returned status {}", response.status());
    }

    let parsed: PixabayResponse = response.json().await?;
    let tracks = parsed
        .hits
        .into_iter()
        .map(|hit| MusicTrack {
            id: format!("pixabay-{}", hit.id),
            title: if hit.tags.is_empty() {
                query.q.clone()
            } else {
                hit.tags.clone()
            },
            artist: (!hit.user.is_empty()).then_some(hit.user),
            genre: None,
            mood: None,
            duration: hit.duration,
            url: hit.audio,
            source: "pixabay".to_string(),
        })
        .collect();
    Ok((tracks, parsed.total_hits))
}

/// Curated default suggestions for common moods, filtered by query.
fn default_tracks(query: &str) -> Vec<MusicTrack> {
    let q = query.to_lowercase();

    let track = |id: &str, title: &str, genre: &str, mood: &str, duration: u32| MusicTrack {
        id: id.to_string(),
        title: title.to_string(),
        artist: None,
        genre: Some(genre.to_string()),
        mood: Some(mood.to_string()),
        duration,
        url: None,
        source: "curated".to_string(),
    };

    let tracks = vec![
        track("def-1", "Upbeat Folk Rhythm", "folk", "energetic", 180),
        track("def-2", "Traditional Drums", "folk", "rhythmic", 150),
        track("def-3", "Devotional Melody", "devotional", "spiritual", 200),
        track("def-4", "Classical Flute", "classical", "calm", 240),
        track("def-5", "Festive Celebration", "folk", "happy", 160),
        track("def-6", "Nature Ambient", "ambient", "peaceful", 300),
        track("def-7", "Cinematic Epic", "cinematic", "dramatic", 180),
        track("def-8", "Modern Dance Beat", "electronic", "upbeat", 200),
        track("def-9", "Romantic Strings", "classical", "romantic", 220),
        track("def-10", "Village Life", "folk", "nostalgic", 190),
    ];

    if q.contains("folk") {
        return tracks
            .into_iter()
            .filter(|t| t.genre.as_deref() == Some("folk"))
            .collect();
    }
    if q.contains("devotion") || q.contains("spiritual") {
        return tracks
            .into_iter()
            .filter(|t| {
                t.genre.as_deref() == Some("devotional") || t.mood.as_deref() == Some("spiritual")
            })
            .collect();
    }

    tracks
}

#[derive(Debug, Clone, Serialize)]
pub struct MusicCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub async fn categories() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "categories": [
            MusicCategory { id: "folk", name: "Folk", description: "Traditional folk music" },
            MusicCategory { id: "devotional", name: "Devotional", description: "Spiritual and sacred music" },
            MusicCategory { id: "classical", name: "Classical", description: "Classical instruments" },
            MusicCategory { id: "cinematic", name: "Cinematic", description: "Epic and dramatic soundtracks" },
            MusicCategory { id: "ambient", name: "Ambient", description: "Nature and peaceful sounds" },
            MusicCategory { id: "upbeat", name: "Upbeat", description: "Energetic and dance-worthy" },
            MusicCategory { id: "romantic", name: "Romantic", description: "Emotional melodies" },
            MusicCategory { id: "festival", name: "Festival", description: "Celebratory and festive tracks" },
        ],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folk_query_filters_to_folk_tracks() {
        let tracks = default_tracks("folk");
        assert!(!tracks.is_empty());
        assert!(tracks.iter().all(|t| t.genre.as_deref() == Some("folk")));
    }

    #[test]
    fn devotional_query_includes_spiritual_moods() {
        let tracks = default_tracks("spiritual songs");
        assert!(!tracks.is_empty());
        assert!(tracks.iter().all(|t| {
            t.genre.as_deref() == Some("devotional") || t.mood.as_deref() == Some("spiritual")
        }));
    }

    #[test]
    fn other_queries_return_the_full_list() {
        assert_eq!(default_tracks("synthwave").len(), 10);
    }
}
