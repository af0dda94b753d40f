//! Generation Client: one structured request per run, staged progress around it.
//!
//! The four progress stages are synthesized around a single call to the capability:
//! `merging` and `fact-checking` before dispatch, `writing` on receipt, `translating` once the
//! document has parsed. A failure stops the sequence, so listeners see a strict prefix.

use crate::blog::BlogData;
use crate::capability::ContentCapability;
use crate::contract::{GenerationRequest, SCRIPT_COUNT};
use crate::credential::Credential;
use crate::error::{GenerationError, GenerationResult};
use crate::progress::{ProgressSink, Stage};
use std::sync::Arc;

/// Builds, issues and validates generation requests against a capability.
#[derive(Clone)]
pub struct GenerationClient {
    capability: Arc<dyn ContentCapability>,
    search_grounding: bool,
}

impl GenerationClient {
    pub fn new(capability: Arc<dyn ContentCapability>) -> Self {
        Self {
            capability,
            search_grounding: true,
        }
    }

    pub fn with_search_grounding(mut self, enabled: bool) -> Self {
        self.search_grounding = enabled;
        self
    }

    pub fn capability_name(&self) -> &str {
        self.capability.name()
    }

    /// Run one generation. Exactly one capability call; no retry; all-or-nothing result.
    pub async fn generate(
        &self,
        scripts: [&str; SCRIPT_COUNT],
        credential: &Credential,
        progress: &dyn ProgressSink,
    ) -> GenerationResult<BlogData> {
        let mut request = GenerationRequest::assemble(scripts);
        if !self.search_grounding {
            request = request.without_search_grounding();
        }
        progress.on_stage(Stage::Merging);

        progress.on_stage(Stage::FactChecking);
        tracing::info!(
            target: "veriscript::generation",
            capability = self.capability.name(),
            prompt_chars = request.prompt.len(),
            search_grounding = request.search_grounding,
            "Dispatching generation request"
        );

        let response = match self.capability.generate_content(&request, credential).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(target: "veriscript::generation", error = %e, "Generation service failed");
                return Err(GenerationError::CapabilityFailure(e));
            }
        };
        progress.on_stage(Stage::Writing);

        let text = match response.text {
            Some(t) if !t.is_empty() => t,
            _ => {
                tracing::warn!(target: "veriscript::generation", "Generation service returned no text");
                return Err(GenerationError::EmptyResponse);
            }
        };

        let data = match BlogData::from_json(&text) {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(
                    target: "veriscript::generation",
                    reason = %e,
                    raw = %text,
                    "Response does not conform to the content contract"
                );
                return Err(GenerationError::MalformedResponse {
                    raw: text,
                    reason: e.to_string(),
                });
            }
        };

        progress.on_stage(Stage::Translating);
        tracing::info!(
            target: "veriscript::generation",
            claims = data.verification_report.len(),
            sections = data.table_of_contents.len(),
            "Generation response parsed"
        );
        Ok(data)
    }
}
