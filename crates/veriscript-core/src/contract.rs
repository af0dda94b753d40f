//! Content Contract: the fixed system instruction, the response schema, and request assembly.
//!
//! The schema uses the Gemini OpenAPI-subset dialect (`OBJECT`, `ARRAY`, `STRING`). Enum values
//! are taken from [`VerificationStatus`] and [`ImageKind`] so the schema and the parser cannot
//! drift apart.

use crate::blog::{ImageKind, VerificationStatus};
use crate::prompts::{newsroom_user_prompt, NEWSROOM_SYSTEM};
use serde_json::{json, Value};

/// Number of transcripts a request carries.
pub const SCRIPT_COUNT: usize = 3;

/// Top-level fields every conforming response must carry.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "seo",
    "tableOfContents",
    "blogContent",
    "urduContent",
    "verificationReport",
    "imagePrompts",
    "internalLinks",
];

/// Response schema sent with every request.
pub fn response_schema() -> Value {
    let statuses: Vec<&str> = VerificationStatus::ALL.iter().map(|s| s.as_str()).collect();
    let kinds: Vec<&str> = ImageKind::ALL.iter().map(|k| k.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "seo": {
                "type": "OBJECT",
                "properties": {
                    "title": { "type": "STRING", "description": "SEO optimized title, max 60 chars" },
                    "metaDescription": { "type": "STRING", "description": "SEO meta description, 150-160 chars" }
                },
                "required": ["title", "metaDescription"]
            },
            "tableOfContents": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of H2/H3 headings"
            },
            "blogContent": {
                "type": "STRING",
                "description": "The full English blog post in Markdown format. Use H2, H3, bolding. Include [BACKLINK OPPORTUNITY] and [REFERENCE SIGNAL] markers."
            },
            "urduContent": {
                "type": "STRING",
                "description": "The full Urdu translation in Markdown format."
            },
            "verificationReport": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "claim": { "type": "STRING" },
                        "status": { "type": "STRING", "enum": statuses },
                        "sourceNote": { "type": "STRING", "description": "Brief note on the source or reason for status" }
                    },
                    "required": ["claim", "status", "sourceNote"]
                }
            },
            "imagePrompts": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "type": { "type": "STRING", "enum": kinds },
                        "context": { "type": "STRING" },
                        "prompt": { "type": "STRING", "description": "Highly detailed, photorealistic prompt. No text in image." }
                    },
                    "required": ["type", "prompt"]
                }
            },
            "internalLinks": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "anchorText": { "type": "STRING" },
                        "placementContext": { "type": "STRING" }
                    },
                    "required": ["anchorText", "placementContext"]
                }
            }
        },
        "required": REQUIRED_FIELDS
    })
}

/// One generation request. Built fresh per call; never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_instruction: &'static str,
    pub response_schema: Value,
    pub prompt: String,
    /// Search augmentation (Google Search grounding) for fact-checking.
    pub search_grounding: bool,
}

impl GenerationRequest {
    /// Assemble the request from the three transcripts, in order.
    pub fn assemble(scripts: [&str; SCRIPT_COUNT]) -> Self {
        Self {
            system_instruction: NEWSROOM_SYSTEM,
            response_schema: response_schema(),
            prompt: newsroom_user_prompt(scripts),
            search_grounding: true,
        }
    }

    pub fn without_search_grounding(mut self) -> Self {
        self.search_grounding = false;
        self
    }
}
