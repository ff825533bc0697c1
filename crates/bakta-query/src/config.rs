//! Chat model configuration
//!
//! Read from the environment (a `.env` file is loaded first by the binary):
//!
//! | Variable              | Default                     |
//! |-----------------------|-----------------------------|
//! | `OPENAI_API_KEY`      | prompted for on a terminal  |
//! | `OPENAI_BASE_URL`     | `https://api.openai.com/v1` |
//! | `OPENAI_MODEL`        | `gpt-4.1`                   |
//! | `OPENAI_TIMEOUT_SECS` | `60`                        |
//! | `BAKTA_TOP_K`         | `10`                        |

use crate::error::{QueryError, Result};
use std::io::IsTerminal;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Row limit the model is told to apply unless the question asks otherwise
pub const DEFAULT_TOP_K: usize = 10;

#[derive(Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub top_k: usize,
}

// The API key stays out of logs
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("top_k", &self.top_k)
            .finish()
    }
}

impl LlmConfig {
    /// Defaults for everything but the key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Load from environment variables, prompting for a missing API key when
    /// stdin is a terminal
    pub fn from_env() -> Result<Self> {
        let api_key = match non_empty_var("OPENAI_API_KEY") {
            Some(key) => key,
            None if std::io::stdin().is_terminal() => prompt_api_key()?,
            None => return Err(QueryError::config("OPENAI_API_KEY not set")),
        };

        Self::new(api_key).with_env_overrides()
    }

    /// Apply everything except the key from the environment
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(base_url) = non_empty_var("OPENAI_BASE_URL") {
            self.base_url = base_url;
        }

        if let Some(model) = non_empty_var("OPENAI_MODEL") {
            self.model = model;
        }

        if let Some(secs) = non_empty_var("OPENAI_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                QueryError::config(format!("OPENAI_TIMEOUT_SECS must be a number of seconds, got '{}'", secs))
            })?;
            self.timeout = Duration::from_secs(secs);
        }

        if let Some(top_k) = non_empty_var("BAKTA_TOP_K") {
            self.top_k = parse_top_k(&top_k)?;
        }

        Ok(self)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_top_k(value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(QueryError::config(format!(
            "BAKTA_TOP_K must be a positive integer, got '{}'",
            value
        ))),
    }
}

fn prompt_api_key() -> Result<String> {
    let key = inquire::Password::new("Enter API key for OpenAI:")
        .without_confirmation()
        .prompt()?;

    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(QueryError::config("no OpenAI API key entered"));
    }
    Ok(key)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            "OPENAI_API_KEY",
            "OPENAI_BASE_URL",
            "OPENAI_MODEL",
            "OPENAI_TIMEOUT_SECS",
            "BAKTA_TOP_K",
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_defaults() {
        let config = LlmConfig::new("sk-test");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4.1");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.top_k, 10);
    }

    #[test]
    fn test_debug_hides_key() {
        let rendered = format!("{:?}", LlmConfig::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("OPENAI_BASE_URL", "http://localhost:9999/v1");
        std::env::set_var("OPENAI_MODEL", "gpt-4.1-mini");
        std::env::set_var("OPENAI_TIMEOUT_SECS", "5");
        std::env::set_var("BAKTA_TOP_K", "25");

        let config = LlmConfig::new("sk-test").with_env_overrides().unwrap();
        assert_eq!(config.base_url, "http://localhost:9999/v1");
        assert_eq!(config.model, "gpt-4.1-mini");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.top_k, 25);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_top_k() {
        clear_env();
        std::env::set_var("BAKTA_TOP_K", "0");
        assert!(LlmConfig::new("sk-test").with_env_overrides().is_err());

        std::env::set_var("BAKTA_TOP_K", "ten");
        assert!(LlmConfig::new("sk-test").with_env_overrides().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_key_from_env() {
        clear_env();
        std::env::set_var("OPENAI_API_KEY", "  sk-from-env  ");
        let config = LlmConfig::from_env().unwrap();
        assert_eq!(config.api_key, "sk-from-env");
        clear_env();
    }
}
