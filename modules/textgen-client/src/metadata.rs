use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client::GeminiTextClient;
use crate::types::VideoFormat;
use crate::util::strip_code_blocks;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: String,
    pub thumbnail_text: String,
}

/// Generate publishing metadata (title, description, tags) for a topic.
/// Best effort: falls back to a templated default bundle when the model
/// is unavailable or returns garbage.
pub async fn generate_metadata(
    client: Option<&GeminiTextClient>,
    topic: &str,
    format: VideoFormat,
) -> VideoMetadata {
    let Some(client) = client else {
        return default_metadata(topic, format);
    };

    match client.generate(&metadata_prompt(topic, format)).await {
        Ok(text) => match serde_json::from_str::<VideoMetadata>(strip_code_blocks(&text)) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(topic, error = %e, "Metadata generation returned unparseable JSON, using defaults");
                default_metadata(topic, format)
            }
        },
        Err(e) => {
            warn!(topic, error = %e, "Metadata generation failed, using defaults");
            default_metadata(topic, format)
        }
    }
}

fn metadata_prompt(topic: &str, format: VideoFormat) -> String {
    let kind = match format {
        VideoFormat::Short => "short-form vertical video",
        VideoFormat::Long => "regular video",
    };
    format!(
        r#"You are a video SEO expert.
Generate optimized publishing metadata for a {kind}.

Topic: "{topic}"

Provide:
1. title: catchy, click-worthy, SEO optimized (max 100 chars)
2. description: 300-500 words; the first 2 lines are the hook; include relevant hashtags and a call-to-action; weave in related keywords naturally
3. tags: array of 20-30 tags mixing topic-specific, trending, and general viral tags
4. category: the best platform category (e.g. "Entertainment", "People & Blogs")
5. thumbnailText: short overlay text for the thumbnail (max 5 words)

Return as JSON with fields: title, description, tags, category, thumbnailText.
Return ONLY the JSON, no markdown formatting."#
    )
}

fn default_metadata(topic: &str, format: VideoFormat) -> VideoMetadata {
    let is_short = format == VideoFormat::Short;
    let suffix = if is_short { " #shorts" } else { "" };
    let compact_topic: String = topic.split_whitespace().collect::<Vec<_>>().join("");
    VideoMetadata {
        title: format!("{topic} | An Amazing Visual Story{suffix}"),
        description: format!(
            "{topic}\n\nIn this {}, we bring you a striking visual experience about {topic}.\n\n#{compact_topic} #viral #trending\n\nLike, subscribe and share for more!",
            if is_short { "short" } else { "video" },
        ),
        tags: vec![
            "viral".into(),
            "trending".into(),
            "shorts".into(),
            topic.to_lowercase(),
            "visual story".into(),
        ],
        category: "Entertainment".into(),
        thumbnail_text: topic
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_client_yields_template_defaults() {
        let metadata = generate_metadata(None, "Village Sunrise Rituals", VideoFormat::Short).await;
        assert!(metadata.title.contains("Village Sunrise Rituals"));
        assert!(metadata.title.contains("#shorts"));
        assert_eq!(metadata.thumbnail_text, "Village Sunrise Rituals");
        assert!(metadata.tags.contains(&"village sunrise rituals".to_string()));
    }

    #[tokio::test]
    async fn long_format_drops_shorts_tagline() {
        let metadata = generate_metadata(None, "Harvest", VideoFormat::Long).await;
        assert!(!metadata.title.contains("#shorts"));
    }
}
