pub mod generate;
pub mod music;
pub mod viral;

use axum::http::StatusCode;

use reelforge_common::ProviderError;
use reelforge_engine::BatchError;

/// HTTP status mirroring the dominant upstream failure class. Auth and
/// quota statuses pass through so the client can tell a configuration
/// problem from a provider outage.
pub fn provider_status(err: &ProviderError) -> StatusCode {
    match err {
        ProviderError::Auth(_) => StatusCode::UNAUTHORIZED,
        ProviderError::QuotaExhausted(_) => StatusCode::PAYMENT_REQUIRED,
        ProviderError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ProviderError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        ProviderError::Unavailable { .. } => StatusCode::BAD_GATEWAY,
        ProviderError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
        ProviderError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
    }
}

pub fn batch_status(err: &BatchError) -> StatusCode {
    match err {
        BatchError::NoProviders => StatusCode::INTERNAL_SERVER_ERROR,
        BatchError::NoArtifacts { primary, .. } => provider_status(primary),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reelforge_common::SceneError;

    use super::*;

    #[test]
    fn auth_maps_to_401_not_500() {
        assert_eq!(
            provider_status(&ProviderError::Auth("bad key".into())),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn quota_maps_to_402() {
        assert_eq!(
            provider_status(&ProviderError::QuotaExhausted("no credits".into())),
            StatusCode::PAYMENT_REQUIRED
        );
    }

    #[test]
    fn timeout_maps_to_504() {
        assert_eq!(
            provider_status(&ProviderError::Timeout(Duration::from_secs(120))),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn malformed_upstream_payload_maps_to_502() {
        assert_eq!(
            provider_status(&ProviderError::MalformedResponse("json instead of bytes".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn batch_failure_takes_primary_class() {
        let err = BatchError::NoArtifacts {
            primary: ProviderError::Auth("invalid API key".into()),
            scene_errors: vec![SceneError {
                scene_index: 0,
                provider: reelforge_common::ProviderId::NvidiaSdxl,
                message: "authentication rejected: invalid API key".into(),
            }],
        };
        assert_eq!(batch_status(&err), StatusCode::UNAUTHORIZED);
    }
}
