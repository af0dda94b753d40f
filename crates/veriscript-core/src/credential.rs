//! Credential for the generation service: an opaque, non-empty token.
//!
//! Read from process environment at the edge and passed explicitly into every call.
//!
//! | Env | Priority |
//! |-----|----------|
//! | VERISCRIPT_API_KEY | 1 |
//! | GEMINI_API_KEY | 2 |
//! | API_KEY | 3 |

use crate::error::{GenerationError, GenerationResult};
use std::fmt;

pub const CREDENTIAL_ENV_VARS: [&str; 3] = ["VERISCRIPT_API_KEY", "GEMINI_API_KEY", "API_KEY"];

/// Opaque API key. Never blank; `Debug` does not print the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for blank input.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let key = raw.as_ref().trim();
        if key.is_empty() {
            return None;
        }
        Some(Self(key.to_string()))
    }

    /// First non-blank value among [`CREDENTIAL_ENV_VARS`].
    pub fn from_env() -> Option<Self> {
        CREDENTIAL_ENV_VARS
            .iter()
            .find_map(|name| std::env::var(name).ok().and_then(Self::new))
    }

    /// Like [`Credential::new`], but a blank key is a configuration error.
    pub fn require(raw: impl AsRef<str>) -> GenerationResult<Self> {
        Self::new(raw).ok_or_else(|| {
            GenerationError::Configuration(format!(
                "API key missing; set one of {}",
                CREDENTIAL_ENV_VARS.join(", ")
            ))
        })
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
