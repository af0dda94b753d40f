//! Error taxonomy for generation runs.

use thiserror::Error;

/// Result type alias for generation operations
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Failure raised by the external capability itself (transport, auth, quota, timeout).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("Request to generation service failed: {0}")]
    Transport(String),

    #[error("Generation service error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Generation service returned an unreadable envelope: {0}")]
    Envelope(String),

    #[error("{0}")]
    Other(String),
}

/// Why a generation run ended without a result.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Credential missing or blank; detected before any request is attempted.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No response generated from AI.")]
    EmptyResponse,

    /// Text present but not a conforming document. `raw` is for operators, not end users.
    #[error("Failed to parse the AI response: {reason}")]
    MalformedResponse { raw: String, reason: String },

    #[error(transparent)]
    CapabilityFailure(#[from] CapabilityError),
}

impl GenerationError {
    /// Message safe to show the end user.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Configuration(msg) => format!("Configuration error: {}", msg),
            GenerationError::EmptyResponse => "No response generated from AI.".to_string(),
            GenerationError::MalformedResponse { .. } => {
                "Failed to parse the AI response. It might not be valid JSON.".to_string()
            }
            GenerationError::CapabilityFailure(e) => e.to_string(),
        }
    }

    /// Stable machine-readable kind for API payloads and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Configuration(_) => "configuration",
            GenerationError::EmptyResponse => "empty_response",
            GenerationError::MalformedResponse { .. } => "malformed_response",
            GenerationError::CapabilityFailure(_) => "capability_failure",
        }
    }

    /// Raw response text retained for diagnostics, when the failure was a parse failure.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            GenerationError::MalformedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_user_message_hides_raw_text() {
        let err = GenerationError::MalformedResponse {
            raw: "{\"secret\": 1".to_string(),
            reason: "EOF while parsing".to_string(),
        };
        assert!(!err.user_message().contains("secret"));
        assert!(!err.to_string().contains("secret"));
        assert_eq!(err.raw_response(), Some("{\"secret\": 1"));
        assert_eq!(err.kind(), "malformed_response");
    }

    #[test]
    fn capability_failure_keeps_original_message() {
        let err: GenerationError = CapabilityError::Other("network unreachable".to_string()).into();
        assert_eq!(err.user_message(), "network unreachable");
        assert_eq!(err.kind(), "capability_failure");
        assert!(err.raw_response().is_none());
    }

    #[test]
    fn every_user_message_is_non_empty() {
        let errs = [
            GenerationError::Configuration("API key missing".to_string()),
            GenerationError::EmptyResponse,
            GenerationError::MalformedResponse { raw: String::new(), reason: String::new() },
            GenerationError::CapabilityFailure(CapabilityError::Api {
                status: 429,
                message: "quota".to_string(),
            }),
        ];
        for err in errs {
            assert!(!err.user_message().trim().is_empty());
        }
    }
}
