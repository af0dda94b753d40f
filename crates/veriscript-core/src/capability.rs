//! The external generative capability, as seen by the Generation Client.
//!
//! Given a prompt, a system instruction and a response schema, a capability returns either a
//! body of text (expected to be a schema-conformant JSON document) or fails.

use crate::contract::GenerationRequest;
use crate::credential::Credential;
use crate::error::CapabilityError;
use async_trait::async_trait;

/// What came back from one call. `text` is `None` when the service produced no text at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityResponse {
    pub text: Option<String>,
}

impl CapabilityResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()) }
    }

    pub fn empty() -> Self {
        Self { text: None }
    }
}

/// Black-box text generation service. One call per generation; implementations must not retry.
#[async_trait]
pub trait ContentCapability: Send + Sync {
    /// Short identifier for logs (e.g. "gemini", "mock").
    fn name(&self) -> &str;

    async fn generate_content(
        &self,
        request: &GenerationRequest,
        credential: &Credential,
    ) -> Result<CapabilityResponse, CapabilityError>;
}
