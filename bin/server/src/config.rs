//! Centralized server configuration.
//!
//! Loaded via the `config` crate from environment variables. Top-level keys
//! map directly (`OPENAI_API_KEY`, `PORT`); relay tuning is nested under
//! `RELAY__` (for example `RELAY__MODEL`).

use chatai_llm::{DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT, OpenAiConfig};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Secret key for the upstream completion API.
    pub openai_api_key: String,

    /// Upstream organization id, sent as `OpenAI-Organization` when set.
    #[serde(default, alias = "openai_organization")]
    pub organization: Option<String>,

    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Relay behaviour.
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Relay-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Model identifier sent upstream.
    #[serde(default = "default_model")]
    pub model: String,

    /// System instruction prefixed to every conversation.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Upstream request timeout. Unset waits indefinitely.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_upstream_url() -> String {
    "https://api.openai.com".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            system_prompt: default_system_prompt(),
            upstream_url: default_upstream_url(),
            timeout_seconds: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    /// Loads configuration from the given environment source.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Address the listener binds to.
    ///
    /// # Errors
    ///
    /// Returns an error if `host` is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Upstream client settings derived from this configuration.
    #[must_use]
    pub fn openai_config(&self) -> OpenAiConfig {
        let mut openai = OpenAiConfig::new(self.openai_api_key.clone(), self.relay.model.clone())
            .with_base_url(self.relay.upstream_url.clone());
        if let Some(organization) = self.organization.as_deref().filter(|o| !o.is_empty()) {
            openai = openai.with_organization(organization);
        }
        if let Some(seconds) = self.relay.timeout_seconds {
            openai = openai.with_timeout(Duration::from_secs(seconds));
        }
        openai
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, config::ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_environment(config::Environment::default().source(Some(map)))
    }

    #[test]
    fn relay_config_has_correct_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.system_prompt, "Answer the below queries.");
        assert_eq!(config.upstream_url, "https://api.openai.com");
        assert_eq!(config.timeout_seconds, None);
    }

    #[test]
    fn loads_minimal_environment() {
        let config = load(&[("OPENAI_API_KEY", "sk-test")]).expect("config");
        assert_eq!(config.openai_api_key, "sk-test");
        assert_eq!(config.organization, None);
        assert_eq!(config.port, 8000);
        assert_eq!(config.bind_addr().expect("addr").to_string(), "0.0.0.0:8000");
        assert_eq!(config.relay.model, "gpt-3.5-turbo");
    }

    #[test]
    fn missing_api_key_is_an_error() {
        assert!(load(&[("PORT", "9000")]).is_err());
    }

    #[test]
    fn loads_overrides_and_nested_relay_keys() {
        let config = load(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("ORGANIZATION", "org-123"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("RELAY__MODEL", "gpt-4o-mini"),
            ("RELAY__TIMEOUT_SECONDS", "30"),
        ])
        .expect("config");

        assert_eq!(config.organization.as_deref(), Some("org-123"));
        assert_eq!(config.bind_addr().expect("addr").to_string(), "127.0.0.1:9000");
        assert_eq!(config.relay.model, "gpt-4o-mini");
        assert_eq!(config.relay.timeout_seconds, Some(30));
        assert_eq!(config.relay.system_prompt, "Answer the below queries.");
    }

    #[test]
    fn lowercase_organization_is_accepted() {
        let config =
            load(&[("OPENAI_API_KEY", "sk-test"), ("organization", "org-abc")]).expect("config");
        assert_eq!(config.organization.as_deref(), Some("org-abc"));
    }

    #[test]
    fn openai_config_carries_relay_settings() {
        let config = load(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("RELAY__UPSTREAM_URL", "http://127.0.0.1:9999"),
            ("RELAY__TIMEOUT_SECONDS", "5"),
        ])
        .expect("config");

        let openai = config.openai_config();
        assert_eq!(openai.model, "gpt-3.5-turbo");
        assert_eq!(openai.base_url, "http://127.0.0.1:9999");
        assert_eq!(openai.timeout, Some(Duration::from_secs(5)));
        assert_eq!(openai.organization, None);
    }
}
