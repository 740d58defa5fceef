use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client::GeminiTextClient;
use crate::util::strip_code_blocks;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoIdea {
    pub title: String,
    pub hook: String,
    pub theme: String,
    pub viral_reason: String,
    pub music_mood: String,
    pub audience: String,
    pub format: String,
}

/// Brainstorm video ideas for a niche. Best effort: without a configured
/// client, or on any provider/parse failure, a curated default list is
/// returned instead of an error.
pub async fn viral_ideas(
    client: Option<&GeminiTextClient>,
    niche: &str,
    count: usize,
) -> Vec<VideoIdea> {
    let Some(client) = client else {
        return default_ideas(niche);
    };

    let prompt = ideas_prompt(niche, count);
    match client.generate(&prompt).await {
        Ok(text) => match serde_json::from_str::<Vec<VideoIdea>>(strip_code_blocks(&text)) {
            Ok(ideas) if !ideas.is_empty() => ideas,
            Ok(_) => {
                warn!(niche, "Idea generation returned an empty list, using defaults");
                default_ideas(niche)
            }
            Err(e) => {
                warn!(niche, error = %e, "Idea generation returned unparseable JSON, using defaults");
                default_ideas(niche)
            }
        },
        Err(e) => {
            warn!(niche, error = %e, "Idea generation failed, using defaults");
            default_ideas(niche)
        }
    }
}

fn ideas_prompt(niche: &str, count: usize) -> String {
    format!(
        r#"You are a short-form video content strategist.
Generate {count} viral video ideas for a channel focused on "{niche}".
The channel produces visual stories from AI-generated images and background music.

For each idea provide:
1. title (catchy, viral-worthy)
2. hook (first 3 seconds concept to grab attention)
3. theme
4. viralReason (the psychology behind it)
5. musicMood (folk/devotional/cinematic/upbeat)
6. audience
7. format (short/long)

Focus on emotional storytelling, visual spectacle, and relatable everyday moments.
Return as a JSON array with fields: title, hook, theme, viralReason, musicMood, audience, format.
Return ONLY the JSON array, no markdown formatting."#
    )
}

/// Curated fallback suggestions used whenever the model is unavailable.
fn default_ideas(niche: &str) -> Vec<VideoIdea> {
    vec![
        VideoIdea {
            title: format!("The Side of {niche} Nobody Shows You"),
            hook: "Open on an unexpected close-up that contradicts the title".into(),
            theme: format!("Behind the scenes of {niche}"),
            viral_reason: "Curiosity gap plus insider framing drives completion rate".into(),
            music_mood: "upbeat".into(),
            audience: format!("People already following {niche} content"),
            format: "short".into(),
        },
        VideoIdea {
            title: "Sunrise Rituals That Start the Perfect Day".into(),
            hook: "Golden-hour time-lapse over a quiet landscape".into(),
            theme: "Morning routines and calm beginnings".into(),
            viral_reason: "Aspirational calm content performs in morning scroll hours".into(),
            music_mood: "folk".into(),
            audience: "Lifestyle and wellness viewers".into(),
            format: "short".into(),
        },
        VideoIdea {
            title: "Festivals You Have to See Once in Your Life".into(),
            hook: "Rapid montage of color and light".into(),
            theme: "Celebration and cultural spectacle".into(),
            viral_reason: "Visual spectacle plus bucket-list framing invites shares".into(),
            music_mood: "cinematic".into(),
            audience: "Travel and culture enthusiasts".into(),
            format: "long".into(),
        },
        VideoIdea {
            title: "Grandmother's Kitchen: Recipes Without a Cookbook".into(),
            hook: "Steam rising from a traditional dish, hands at work".into(),
            theme: "Heritage cooking and family memory".into(),
            viral_reason: "Nostalgia and food content compound each other".into(),
            music_mood: "devotional".into(),
            audience: "Food lovers and families".into(),
            format: "short".into(),
        },
        VideoIdea {
            title: "Hidden Places Locals Keep to Themselves".into(),
            hook: "Aerial reveal of an untouched landscape".into(),
            theme: "Off-the-map travel destinations".into(),
            viral_reason: "Discovery content with beautiful visuals earns saves".into(),
            music_mood: "upbeat".into(),
            audience: "Travel planners and daydreamers".into(),
            format: "long".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_client_yields_defaults() {
        let ideas = viral_ideas(None, "street food", 5).await;
        assert_eq!(ideas.len(), 5);
        assert!(ideas[0].theme.contains("street food"));
    }

    #[test]
    fn idea_json_round_trips_camel_case() {
        let json = r#"[{"title":"t","hook":"h","theme":"x","viralReason":"r","musicMood":"folk","audience":"a","format":"short"}]"#;
        let ideas: Vec<VideoIdea> = serde_json::from_str(json).unwrap();
        assert_eq!(ideas[0].viral_reason, "r");
    }
}
