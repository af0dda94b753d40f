//! Application configuration loaded from TOML and environment.
//!
//! | Key | Env | Default |
//! |-----|-----|---------|
//! | app_name | VERISCRIPT__APP_NAME | VeriScript AI |
//! | port | VERISCRIPT__PORT | 8010 |
//! | llm_mode | VERISCRIPT__LLM_MODE | live (`live` \| `mock`) |
//! | model | VERISCRIPT__MODEL | gemini-3-pro-preview |
//! | api_base | VERISCRIPT__API_BASE | Gemini v1beta endpoint |
//! | request_timeout_secs | VERISCRIPT__REQUEST_TIMEOUT_SECS | 300 (0 disables) |
//! | search_grounding | VERISCRIPT__SEARCH_GROUNDING | true |
//! | mock_latency_ms | VERISCRIPT__MOCK_LATENCY_MS | 1500 |
//!
//! The API credential is not part of this file; see [`crate::Credential::from_env`].

use crate::gemini::{GeminiBridge, DEFAULT_MODEL, GEMINI_API_BASE};
use crate::generation::GenerationClient;
use crate::mock::MockCapability;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Env var naming an explicit config file. When set, the file must exist.
pub const CONFIG_PATH_ENV: &str = "VERISCRIPT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/veriscript.toml";
const ENV_PREFIX: &str = "VERISCRIPT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which capability backs the Generation Client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmMode {
    #[default]
    Live,
    Mock,
}

impl LlmMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LlmMode::Live => "live",
            LlmMode::Mock => "mock",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VeriScriptConfig {
    pub app_name: String,
    pub port: u16,
    pub llm_mode: LlmMode,
    pub model: String,
    pub api_base: String,
    pub request_timeout_secs: u64,
    pub search_grounding: bool,
    pub mock_latency_ms: u64,
}

impl Default for VeriScriptConfig {
    fn default() -> Self {
        Self {
            app_name: "VeriScript AI".to_string(),
            port: 8010,
            llm_mode: LlmMode::Live,
            model: DEFAULT_MODEL.to_string(),
            api_base: GEMINI_API_BASE.to_string(),
            request_timeout_secs: 300,
            search_grounding: true,
            mock_latency_ms: 1500,
        }
    }
}

impl VeriScriptConfig {
    /// Load config. Precedence: env `VERISCRIPT__*` > file (`VERISCRIPT_CONFIG` or
    /// `config/veriscript.toml`) > defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::build(Path::new(path.trim()), true),
            _ => Self::build(Path::new(DEFAULT_CONFIG_PATH), false),
        }
    }

    /// Load with an explicit file that must exist (env overrides still apply).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::build(path, true)
    }

    fn build(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let d = Self::default();
        let built = config::Config::builder()
            .set_default("app_name", d.app_name)?
            .set_default("port", i64::from(d.port))?
            .set_default("llm_mode", d.llm_mode.as_str())?
            .set_default("model", d.model)?
            .set_default("api_base", d.api_base)?
            .set_default("request_timeout_secs", d.request_timeout_secs)?
            .set_default("search_grounding", d.search_grounding)?
            .set_default("mock_latency_ms", d.mock_latency_ms)?
            .add_source(config::File::from(path).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = built.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_base must be an http(s) URL, got {:?}",
                self.api_base
            )));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be non-zero".to_string()));
        }
        Ok(())
    }

    /// `None` when the timeout is disabled (`request_timeout_secs = 0`).
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Generation Client backed by the configured capability.
    pub fn build_client(&self) -> GenerationClient {
        let client = match self.llm_mode {
            LlmMode::Live => {
                let bridge = GeminiBridge::new(self.request_timeout())
                    .with_model(&self.model)
                    .with_api_base(&self.api_base);
                GenerationClient::new(Arc::new(bridge))
            }
            LlmMode::Mock => {
                let mock = MockCapability::default()
                    .with_latency(Duration::from_millis(self.mock_latency_ms));
                GenerationClient::new(Arc::new(mock))
            }
        };
        client.with_search_grounding(self.search_grounding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "app_name = \"Newsroom\"\nport = 9100\nllm_mode = \"mock\"\nrequest_timeout_secs = 0\nsearch_grounding = false"
        )
        .unwrap();

        let cfg = VeriScriptConfig::load_from(file.path()).unwrap();
        assert_eq!(cfg.app_name, "Newsroom");
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.llm_mode, LlmMode::Mock);
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert!(cfg.request_timeout().is_none());
        assert!(!cfg.search_grounding);
        assert_eq!(cfg.build_client().capability_name(), "mock");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            VeriScriptConfig::load_from(&missing),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn unknown_llm_mode_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "llm_mode = \"openai\"").unwrap();
        assert!(VeriScriptConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn validate_rejects_non_http_base() {
        let cfg = VeriScriptConfig {
            api_base: "ftp://example".to_string(),
            ..VeriScriptConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn defaults_select_live_gemini() {
        let cfg = VeriScriptConfig::default();
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(300)));
        assert_eq!(cfg.build_client().capability_name(), "gemini");
    }
}
