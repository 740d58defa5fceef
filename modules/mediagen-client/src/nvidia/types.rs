use serde::{Deserialize, Serialize};
use serde_json::Value;

use reelforge_common::ProviderError;

// --- SDXL image generation ---

#[derive(Debug, Serialize)]
pub struct TextPrompt {
    pub text: String,
    pub weight: f32,
}

#[derive(Debug, Serialize)]
pub struct SdxlRequest {
    pub text_prompts: Vec<TextPrompt>,
    pub cfg_scale: f32,
    pub sampler: String,
    pub seed: u64,
    pub steps: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize)]
pub struct SdxlResponse {
    #[serde(default)]
    pub artifacts: Vec<SdxlArtifact>,
}

#[derive(Debug, Deserialize)]
pub struct SdxlArtifact {
    pub base64: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default, rename = "finishReason")]
    pub finish_reason: Option<String>,
}

// --- Gateway video generation ---

#[derive(Debug, Serialize)]
pub struct VideoSubmitRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub seed: u64,
    pub guidance_scale: f32,
    pub num_inference_steps: u32,
}

/// The request identifier of an accepted asynchronous job. Gateway models
/// disagree on the field name.
pub fn extract_request_id(body: &Value) -> Option<String> {
    for key in ["requestId", "request_id", "id"] {
        if let Some(id) = body.get(key).and_then(Value::as_str) {
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }
    }
    None
}

/// Known result payload shapes across gateway video models, each with one
/// extraction rule. Decoding is an ordered check against this closed set,
/// not field sniffing scattered through the adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoResult {
    /// `video` already carries a full data URI.
    InlineDataUri { data: String, mime: String },
    /// `video` or `artifacts[0].base64` carries bare base64 payload.
    InlineBase64 { base64: String, mime: String },
    /// The result lives behind a URL and needs a second fetch.
    RemoteUrl { url: String },
}

pub fn decode_video_result(body: &Value) -> Result<VideoResult, ProviderError> {
    if let Some(video) = body.get("video").and_then(Value::as_str) {
        if video.starts_with("data:") {
            let mime = video
                .strip_prefix("data:")
                .and_then(|rest| rest.split(';').next())
                .filter(|m| !m.is_empty())
                .unwrap_or("video/mp4")
                .to_string();
            return Ok(VideoResult::InlineDataUri {
                data: video.to_string(),
                mime,
            });
        }
        return Ok(VideoResult::InlineBase64 {
            base64: video.to_string(),
            mime: mime_field(body).unwrap_or_else(|| "video/mp4".to_string()),
        });
    }

    if let Some(first) = body
        .get("artifacts")
        .and_then(Value::as_array)
        .and_then(|a| a.first())
    {
        if let Some(base64) = first.get("base64").and_then(Value::as_str) {
            return Ok(VideoResult::InlineBase64 {
                base64: base64.to_string(),
                mime: mime_field(first).unwrap_or_else(|| "video/mp4".to_string()),
            });
        }
    }

    for key in ["result_url", "resultUrl", "url"] {
        if let Some(url) = body.get(key).and_then(Value::as_str) {
            return Ok(VideoResult::RemoteUrl {
                url: url.to_string(),
            });
        }
    }

    Err(ProviderError::MalformedResponse(
        "no recognized video payload field in result".into(),
    ))
}

fn mime_field(value: &Value) -> Option<String> {
    for key in ["mimeType", "mime_type", "contentType"] {
        if let Some(mime) = value.get(key).and_then(Value::as_str) {
            return Some(mime.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_id_field_variants() {
        assert_eq!(
            extract_request_id(&json!({ "requestId": "abc" })).as_deref(),
            Some("abc")
        );
        assert_eq!(
            extract_request_id(&json!({ "request_id": "def" })).as_deref(),
            Some("def")
        );
        assert_eq!(
            extract_request_id(&json!({ "id": "ghi" })).as_deref(),
            Some("ghi")
        );
        assert_eq!(extract_request_id(&json!({ "video": "AAAA" })), None);
    }

    #[test]
    fn decodes_inline_data_uri() {
        let result =
            decode_video_result(&json!({ "video": "data:video/webm;base64,AAAA" })).unwrap();
        assert_eq!(
            result,
            VideoResult::InlineDataUri {
                data: "data:video/webm;base64,AAAA".into(),
                mime: "video/webm".into()
            }
        );
    }

    #[test]
    fn decodes_bare_base64_video() {
        let result = decode_video_result(&json!({ "video": "AAAA" })).unwrap();
        assert_eq!(
            result,
            VideoResult::InlineBase64 {
                base64: "AAAA".into(),
                mime: "video/mp4".into()
            }
        );
    }

    #[test]
    fn decodes_artifact_list() {
        let body = json!({ "artifacts": [{ "base64": "BBBB", "mimeType": "video/mp4" }] });
        let result = decode_video_result(&body).unwrap();
        assert_eq!(
            result,
            VideoResult::InlineBase64 {
                base64: "BBBB".into(),
                mime: "video/mp4".into()
            }
        );
    }

    #[test]
    fn decodes_result_url() {
        let body = json!({ "status": "completed", "result_url": "https://cdn.example/clip.mp4" });
        let result = decode_video_result(&body).unwrap();
        assert_eq!(
            result,
            VideoResult::RemoteUrl {
                url: "https://cdn.example/clip.mp4".into()
            }
        );
    }

    #[test]
    fn unrecognized_payload_is_malformed() {
        let err = decode_video_result(&json!({ "status": "completed" })).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }
}
