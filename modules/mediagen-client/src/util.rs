use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use uuid::Uuid;

use reelforge_common::{GenerationRequest, MediaArtifact, ProviderError, ProviderProfile};

/// Wrap raw payload bytes in a self-describing data URI.
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// Build an artifact from raw payload bytes.
pub fn artifact_from_bytes(
    profile: &ProviderProfile,
    request: &GenerationRequest,
    mime: &str,
    bytes: &[u8],
) -> MediaArtifact {
    MediaArtifact {
        id: Uuid::new_v4().to_string(),
        data: to_data_uri(mime, bytes),
        mime_type: mime.to_string(),
        prompt: request.prompt.clone(),
        source: profile.provider,
        model: profile.model_id.clone(),
        seed: Some(request.seed),
        resolution_degraded: profile.resolution_degraded,
    }
}

/// Build an artifact from a payload the provider already base64-encoded,
/// without a decode/re-encode round trip.
pub fn artifact_from_base64(
    profile: &ProviderProfile,
    request: &GenerationRequest,
    mime: &str,
    base64_payload: &str,
    seed_override: Option<u64>,
) -> MediaArtifact {
    MediaArtifact {
        id: Uuid::new_v4().to_string(),
        data: format!("data:{mime};base64,{base64_payload}"),
        mime_type: mime.to_string(),
        prompt: request.prompt.clone(),
        source: profile.provider,
        model: profile.model_id.clone(),
        seed: seed_override.or(Some(request.seed)),
        resolution_degraded: profile.resolution_degraded,
    }
}

/// Translate a transport-level reqwest failure into the taxonomy. The
/// deadline is the profile's per-call timeout, reported back in timeout
/// errors.
pub fn net_error(err: reqwest::Error, deadline: Duration) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(deadline)
    } else {
        ProviderError::Unavailable {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            message: err.to_string(),
        }
    }
}

/// Content-Type of a response, with a fallback when absent or unreadable.
pub fn content_type_or(response: &reqwest::Response, fallback: &str) -> String {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_is_self_describing() {
        let uri = to_data_uri("image/png", b"abc");
        assert!(uri.starts_with("data:image/png;base64,"));
        assert!(uri.ends_with("YWJj"));
    }
}
