//! Mock capability: offline stand-in for the generation service.
//!
//! `llm_mode = "mock"` serves [`SAMPLE_DOCUMENT`] so the dashboard can be exercised without a key
//! or network. Tests script other replies (raw text, no text, failure) and inspect what was sent.

use crate::capability::{CapabilityResponse, ContentCapability};
use crate::contract::GenerationRequest;
use crate::credential::Credential;
use crate::error::CapabilityError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A schema-conformant document used by mock mode.
pub const SAMPLE_DOCUMENT: &str = r###"{
  "seo": {
    "title": "City Council Approves Riverfront Flood Barrier Plan",
    "metaDescription": "The council voted 7-2 to fund a riverfront flood barrier after two seasons of flooding. Officials cite federal matching funds; critics question the timeline."
  },
  "tableOfContents": [
    "The Vote",
    "What the Barrier Will Do",
    "Funding and Open Questions"
  ],
  "blogContent": "## The Vote\n\nThe city council voted **7-2** on Tuesday to fund a flood barrier along the eastern riverfront, according to the published meeting record.\n\n## What the Barrier Will Do\n\nOfficial planning documents describe a 2.4 km barrier designed for a 100-year flood event. [REFERENCE SIGNAL]\n\n### Timeline\n\nConstruction is expected to begin next spring, reports suggest, though no contract has been signed.\n\n## Funding and Open Questions\n\nCouncil members said federal matching funds would cover roughly half of the cost. [BACKLINK OPPORTUNITY]",
  "urduContent": "## ووٹ\n\nسٹی کونسل نے منگل کو مشرقی دریائی کنارے پر سیلابی رکاوٹ کے لیے **7-2** سے منظوری دے دی۔\n\n## رکاوٹ کا مقصد\n\nسرکاری منصوبہ بندی کی دستاویزات کے مطابق یہ رکاوٹ 2.4 کلومیٹر طویل ہوگی۔\n\n## فنڈنگ اور باقی سوالات\n\nکونسل ارکان کے مطابق وفاقی فنڈز تقریباً نصف لاگت پوری کریں گے۔",
  "verificationReport": [
    { "claim": "The council vote was 7-2.", "status": "Verified", "sourceNote": "Published meeting minutes." },
    { "claim": "Construction begins next spring.", "status": "Partially Verified", "sourceNote": "Stated by one council member; no signed contract found." },
    { "claim": "Federal funds cover half the cost.", "status": "Unverified", "sourceNote": "No federal grant record located." }
  ],
  "imagePrompts": [
    { "type": "Feature", "context": "Header", "prompt": "Wide-angle photograph of a city riverfront at dusk, low clouds, high water line on stone embankment, documentary style." },
    { "type": "Topic", "context": "What the Barrier Will Do", "prompt": "Engineering site along a river with survey stakes and orange fencing, overcast daylight, photorealistic." }
  ],
  "internalLinks": [
    { "anchorText": "last year's flood damage report", "placementContext": "After the first paragraph of The Vote" },
    { "anchorText": "municipal budget explainer", "placementContext": "Funding and Open Questions section" }
  ]
}"###;

/// Scripted reply for a [`MockCapability`].
#[derive(Debug, Clone)]
pub enum MockReply {
    /// [`SAMPLE_DOCUMENT`].
    Sample,
    /// Exactly this text.
    Text(String),
    /// No text at all.
    Empty,
    /// Capability-level failure.
    Fail(CapabilityError),
}

/// Offline capability with a fixed reply, optional latency, and call recording.
#[derive(Debug)]
pub struct MockCapability {
    reply: MockReply,
    latency: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl Default for MockCapability {
    fn default() -> Self {
        Self::new(MockReply::Sample)
    }
}

impl MockCapability {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            latency: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Sleep before replying, so progress stages are visible in the UI.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency).filter(|d| !d.is_zero());
        self
    }

    /// Number of `generate_content` calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

#[async_trait]
impl ContentCapability for MockCapability {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate_content(
        &self,
        request: &GenerationRequest,
        _credential: &Credential,
    ) -> Result<CapabilityResponse, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap_or_else(|p| p.into_inner()) = Some(request.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match &self.reply {
            MockReply::Sample => Ok(CapabilityResponse::text(SAMPLE_DOCUMENT)),
            MockReply::Text(text) => Ok(CapabilityResponse::text(text.clone())),
            MockReply::Empty => Ok(CapabilityResponse::empty()),
            MockReply::Fail(err) => Err(err.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::{BlogData, VerificationStatus};

    #[test]
    fn sample_document_conforms() {
        let data = BlogData::from_json(SAMPLE_DOCUMENT).unwrap();
        assert_eq!(data.table_of_contents.len(), 3);
        let summary = data.verification_summary();
        assert_eq!(summary.verified, 1);
        assert_eq!(summary.partially_verified, 1);
        assert_eq!(summary.unverified, 1);
        assert_eq!(
            data.verification_report[1].status,
            VerificationStatus::PartiallyVerified
        );
    }

    #[tokio::test]
    async fn records_calls_and_requests() {
        let mock = MockCapability::new(MockReply::Empty);
        let credential = Credential::new("k").unwrap();
        let request = GenerationRequest::assemble(["x", "y", "z"]);
        let res = mock.generate_content(&request, &credential).await.unwrap();
        assert_eq!(res, CapabilityResponse::empty());
        assert_eq!(mock.calls(), 1);
        assert_eq!(mock.last_request().unwrap().prompt, request.prompt);
    }
}
