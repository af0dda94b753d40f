//! Gemini bridge: the live capability, over the `generateContent` REST endpoint.
//!
//! API key: passed per call as a [`Credential`] (header `x-goog-api-key`), never stored here.
//! Default model: `gemini-3-pro-preview`, with Google Search grounding for fact-checking.

use crate::capability::{CapabilityResponse, ContentCapability};
use crate::contract::GenerationRequest;
use crate::credential::Credential;
use crate::error::CapabilityError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

// generateContent request body (camelCase on the wire)
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize, Debug)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: serde_json::Map<String, Value>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
}

#[derive(Deserialize, Debug, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug, Default)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

fn build_body(request: &GenerationRequest) -> GenerateContentRequest<'_> {
    let tools = if request.search_grounding {
        vec![Tool { google_search: serde_json::Map::new() }]
    } else {
        Vec::new()
    };
    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part { text: request.system_instruction }],
        },
        contents: vec![Content {
            role: Some("user"),
            parts: vec![Part { text: &request.prompt }],
        }],
        tools,
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: &request.response_schema,
        },
    }
}

/// Text of the first candidate: all text parts concatenated. `None` if there is no text.
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let parts = response.candidates.into_iter().next()?.content?.parts;
    let text: String = parts.into_iter().filter_map(|p| p.text).collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Prefer the API's own `error.message`; fall back to the raw body.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) if !env.error.message.trim().is_empty() => env.error.message,
        _ => body.trim().to_string(),
    }
}

/// Live Gemini capability.
pub struct GeminiBridge {
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiBridge {
    /// Bridge with a request timeout; `None` waits indefinitely.
    pub fn new(timeout: Option<Duration>) -> Self {
        let builder = reqwest::Client::builder();
        let builder = match timeout {
            Some(t) => builder.timeout(t),
            None => builder,
        };
        let client = builder.build().unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_base: GEMINI_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            client,
        }
    }

    /// Set the model (e.g. `gemini-3-pro-preview`, `gemini-2.5-flash`).
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.trim().to_string();
        self
    }

    /// Override the API base URL (proxies, regional endpoints, test servers).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl ContentCapability for GeminiBridge {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_content(
        &self,
        request: &GenerationRequest,
        credential: &Credential,
    ) -> Result<CapabilityResponse, CapabilityError> {
        let url = self.endpoint();
        let body = build_body(request);

        tracing::debug!(
            target: "veriscript::gemini",
            model = %self.model,
            search_grounding = request.search_grounding,
            "POST generateContent"
        );

        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", credential.expose())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CapabilityError::Transport(format!("timed out waiting for {}", self.model))
                } else {
                    CapabilityError::Transport(e.to_string())
                }
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(CapabilityError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let parsed: GenerateContentResponse = res
            .json()
            .await
            .map_err(|e| CapabilityError::Envelope(e.to_string()))?;

        Ok(CapabilityResponse { text: extract_text(parsed) })
    }
}
