//! Client configuration, loaded from `CHATAI_*` environment variables.

use chatai_conversation::ResubmitPolicy;
use serde::Deserialize;
use std::time::Duration;

/// Terminal client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Relay endpoint receiving `POST { chats }`.
    #[serde(default = "default_relay_url")]
    pub relay_url: String,

    /// Which dictation endings auto-submit.
    #[serde(default)]
    pub resubmit: ResubmitPolicy,

    /// Start with speech output paused.
    #[serde(default)]
    pub start_paused: bool,

    /// Relay request timeout. Unset waits indefinitely.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_relay_url() -> String {
    "http://127.0.0.1:8000/".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            resubmit: ResubmitPolicy::default(),
            start_paused: false,
            timeout_seconds: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::with_prefix("CHATAI"))
    }

    /// Loads configuration from the given environment source.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                environment
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}
