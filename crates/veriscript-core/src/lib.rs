//! veriscript-core: turns three raw transcripts into a fact-checked, bilingual article.
//!
//! One structured request to a generative capability (Gemini, or the offline mock) produces a
//! [`BlogData`]: English and Urdu articles, SEO metadata, a verification report, image prompts and
//! internal links. Progress is reported in four stages and a small state machine owns the run.

mod blog;
mod capability;
mod config;
mod contract;
mod controller;
mod credential;
mod error;
mod gemini;
mod generation;
mod mock;
mod progress;
mod session;
pub mod prompts;

// Content Contract + result document
pub use blog::{
    BlogData, Edition, ImageKind, ImagePrompt, InternalLink, SeoMeta, VerificationItem,
    VerificationStatus, VerificationSummary,
};
pub use contract::{response_schema, GenerationRequest, REQUIRED_FIELDS, SCRIPT_COUNT};

// Generation Client + capability seam
pub use capability::{CapabilityResponse, ContentCapability};
pub use credential::{Credential, CREDENTIAL_ENV_VARS};
pub use error::{CapabilityError, GenerationError, GenerationResult};
pub use gemini::{GeminiBridge, DEFAULT_MODEL, GEMINI_API_BASE};
pub use generation::GenerationClient;
pub use mock::{MockCapability, MockReply, SAMPLE_DOCUMENT};
pub use progress::{NoProgress, ProgressSink, Stage};

// Application state
pub use controller::{
    ControllerError, GenerationState, RunTicket, ScriptInputs, ScriptSlot, StateController,
};
pub use session::GenerationSession;

// Configuration
pub use config::{ConfigError, LlmMode, VeriScriptConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
