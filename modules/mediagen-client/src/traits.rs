use async_trait::async_trait;

use reelforge_common::{GenerationRequest, MediaArtifact, ProviderError, ProviderId, ProviderProfile};

/// Uniform contract for one external generation provider.
///
/// An adapter is a pure protocol translator: it builds the provider's
/// request body from the resolved profile, sets the provider's auth
/// headers, enforces the profile's wall-clock timeout, and translates the
/// provider's status/body into the common error taxonomy. Exactly one
/// outbound call per invocation (two where the vendor returns a result URL
/// that needs a second fetch). Retries belong to the caller, never here.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    async fn generate(
        &self,
        profile: &ProviderProfile,
        request: &GenerationRequest,
    ) -> Result<MediaArtifact, ProviderError>;
}
