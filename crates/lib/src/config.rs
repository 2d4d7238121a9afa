//! Configuration types and loading.
//!
//! Non-secret settings come from a JSON file (e.g. `~/.slackbridge/config.json`);
//! the Slack access token and signing secret come from the environment only.

use crate::slack::signature::DEFAULT_REPLAY_WINDOW_SECS;
use crate::slack::DEFAULT_API_BASE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Webhook listener settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Slack API and delivery settings.
    #[serde(default)]
    pub slack: SlackConfig,
}

/// Webhook listener bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for the webhook endpoint (default 1323).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; Slack must be able to reach it).
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    1323
}

fn default_gateway_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackConfig {
    /// Web API base URL (default https://slack.com/api).
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Maximum characters (code points) per outbound message (default 50000).
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Accepted distance between a request's timestamp and now, in seconds (default 300).
    #[serde(default = "default_replay_window_secs")]
    pub replay_window_secs: u64,

    /// Prefix of the secret env vars: `{prefix}_SLACK_OAUTH_ACCESS_TOKEN` (default "LXBOT").
    #[serde(default = "default_env_prefix")]
    pub env_prefix: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_chunk_size() -> usize {
    50_000
}

fn default_replay_window_secs() -> u64 {
    DEFAULT_REPLAY_WINDOW_SECS
}

fn default_env_prefix() -> String {
    "LXBOT".to_string()
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            chunk_size: default_chunk_size(),
            replay_window_secs: default_replay_window_secs(),
            env_prefix: default_env_prefix(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set; set it to the Slack app's value")]
    MissingEnv(String),
}

/// Secrets required to talk to Slack. Both are mandatory.
#[derive(Clone)]
pub struct Credentials {
    pub access_token: String,
    pub signing_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("signing_secret", &"<redacted>")
            .finish()
    }
}

pub fn access_token_var(prefix: &str) -> String {
    format!("{}_SLACK_OAUTH_ACCESS_TOKEN", prefix)
}

pub fn signing_secret_var(prefix: &str) -> String {
    format!("{}_SLACK_SIGNING_SECRET", prefix)
}

impl Credentials {
    /// Read `{prefix}_SLACK_OAUTH_ACCESS_TOKEN` and `{prefix}_SLACK_SIGNING_SECRET` from the process environment.
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(prefix, |name| std::env::var(name).ok())
    }

    /// Like [`Credentials::from_env`] with an arbitrary variable source. Blank values count as missing.
    pub fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: String| {
            lookup(&name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or(ConfigError::MissingEnv(name))
        };
        let access_token = read(access_token_var(prefix))?;
        let signing_secret = read(signing_secret_var(prefix))?;
        Ok(Self {
            access_token,
            signing_secret,
        })
    }
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("SLACKBRIDGE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".slackbridge").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, or the default path (or SLACKBRIDGE_CONFIG_PATH). Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
