use serde::{Deserialize, Serialize};

use crate::client::GeminiTextClient;
use crate::error::{Result, TextgenError};
use crate::types::VideoFormat;
use crate::util::strip_code_blocks;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneScript {
    pub scene_number: u32,
    /// Detailed prompt fed directly to image generation for this scene.
    pub image_prompt: String,
    #[serde(default)]
    pub narration: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub transition: Option<String>,
    #[serde(default)]
    pub music_intensity: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoScript {
    pub scenes: Vec<SceneScript>,
    pub overall_title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub suggested_music_mood: Option<String>,
    #[serde(default)]
    pub thumbnail_prompt: Option<String>,
}

/// Generate a scene-by-scene script for an idea. Unlike idea
/// brainstorming there is no useful static fallback here, so a missing
/// credential is a hard error.
pub async fn viral_script(
    client: Option<&GeminiTextClient>,
    idea: &str,
    format: VideoFormat,
    scene_count: usize,
) -> Result<VideoScript> {
    let client = client.ok_or(TextgenError::MissingCredential)?;

    let text = client.generate(&script_prompt(idea, format, scene_count)).await?;
    let script: VideoScript = serde_json::from_str(strip_code_blocks(&text))?;
    if script.scenes.is_empty() {
        return Err(TextgenError::Parse("script has no scenes".into()));
    }
    Ok(script)
}

fn script_prompt(idea: &str, format: VideoFormat, scene_count: usize) -> String {
    let total = format.duration_secs();
    let per_scene = total / scene_count.max(1) as u32;
    let length_label = match format {
        VideoFormat::Short => "short-form video (60 seconds)",
        VideoFormat::Long => "regular video (2-3 minutes)",
    };
    format!(
        r#"You are a visual storytelling expert. Create a {length_label} script.

Video idea: "{idea}"
Number of scenes/images: {scene_count}
Duration per scene: ~{per_scene} seconds

For each scene provide:
1. sceneNumber (1 to {scene_count})
2. imagePrompt (a detailed prompt for AI image generation - be very specific about visual elements, colors, composition, lighting; it will be used directly to generate an image)
3. narration (optional text overlay or voiceover)
4. duration (in seconds)
5. transition (fade/zoom/slide)
6. musicIntensity (low/medium/high)

Also provide:
- overallTitle (catchy video title)
- description (publishing description)
- tags (array of 15-20 relevant tags)
- suggestedMusicMood (overall mood for background music)
- thumbnailPrompt (detailed AI image prompt for a click-worthy thumbnail)

Return as JSON with fields: scenes (array), overallTitle, description, tags, suggestedMusicMood, thumbnailPrompt.
Return ONLY the JSON, no markdown formatting."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_client_is_a_hard_error() {
        let result = viral_script(None, "village sunrise", VideoFormat::Short, 8).await;
        assert!(matches!(result, Err(TextgenError::MissingCredential)));
    }

    #[test]
    fn script_parses_with_optional_fields_absent() {
        let json = r#"{
            "scenes": [{"sceneNumber": 1, "imagePrompt": "a sunrise"}],
            "overallTitle": "Sunrise",
            "description": "desc",
            "tags": ["sunrise"]
        }"#;
        let script: VideoScript = serde_json::from_str(json).unwrap();
        assert_eq!(script.scenes.len(), 1);
        assert!(script.scenes[0].narration.is_none());
    }

    #[test]
    fn prompt_embeds_scene_budget() {
        let prompt = script_prompt("harvest festival", VideoFormat::Short, 6);
        assert!(prompt.contains("Number of scenes/images: 6"));
        assert!(prompt.contains("~10 seconds"));
    }
}
