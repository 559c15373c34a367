// src/config.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::session::{SessionLimits, DEFAULT_IDLE_TTL_MINUTES, DEFAULT_MAX_SESSIONS};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_MODEL_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub sessions: SessionLimits,
    pub port: u16,
}

#[derive(Clone)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl ModelConfig {
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().map_or(false, |key| !key.trim().is_empty())
    }
}

/// Optional `config.yaml` contents. Environment variables win over these.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    model: ModelSection,
    #[serde(default)]
    sessions: SessionSection,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct ModelSection {
    api_key: Option<String>,
    name: Option<String>,
    base_url: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionSection {
    max: Option<usize>,
    ttl_minutes: Option<i64>,
}

impl AppConfig {
    /// Load from `CONFIG_PATH` (default `config.yaml`, if present) and the environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.yaml"));

        let file = if path.exists() {
            info!("Loading configuration file: {}", path.display());
            Some(Self::read_file(&path)?)
        } else {
            None
        };

        Self::resolve(|name| std::env::var(name).ok(), file.unwrap_or_default())
    }

    fn read_file(path: &Path) -> Result<ConfigFile> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn resolve(env: impl Fn(&str) -> Option<String>, file: ConfigFile) -> Result<Self> {
        let api_key = env("GEMINI_API_KEY")
            .or_else(|| env("API_KEY"))
            .or(file.model.api_key)
            .filter(|key| !key.trim().is_empty());

        let model = env("GEMINI_MODEL")
            .or(file.model.name)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = env("GEMINI_API_URL")
            .or(file.model.base_url)
            .unwrap_or_else(|| DEFAULT_MODEL_URL.to_string());

        let timeout_seconds = match env("MODEL_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("MODEL_TIMEOUT_SECS must be a number of seconds"))?,
            None => file.model.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        let max_sessions = match env("MAX_SESSIONS") {
            Some(value) => value
                .parse::<usize>()
                .ok()
                .filter(|max| *max > 0)
                .context("MAX_SESSIONS must be a positive number")?,
            None => file.sessions.max.unwrap_or(DEFAULT_MAX_SESSIONS),
        };

        let ttl_minutes = match env("SESSION_TTL_MINUTES") {
            Some(value) => value
                .parse::<i64>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .context("SESSION_TTL_MINUTES must be a positive number of minutes")?,
            None => file.sessions.ttl_minutes.unwrap_or(DEFAULT_IDLE_TTL_MINUTES),
        };

        let port = match env("ROCKET_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number"))?,
            None => file.port.unwrap_or(DEFAULT_PORT),
        };

        Ok(Self {
            model: ModelConfig {
                api_key,
                model,
                base_url,
                timeout_seconds,
            },
            sessions: SessionLimits {
                max_sessions,
                idle_ttl: chrono::Duration::minutes(ttl_minutes),
            },
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_env_or_file() {
        let config = AppConfig::resolve(env_of(&[]), ConfigFile::default()).unwrap();
        assert!(!config.model.has_credential());
        assert_eq!(config.model.model, DEFAULT_MODEL);
        assert_eq!(config.model.base_url, DEFAULT_MODEL_URL);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn api_key_falls_back_to_generic_variable() {
        let config = AppConfig::resolve(env_of(&[("API_KEY", "k1")]), ConfigFile::default()).unwrap();
        assert_eq!(config.model.api_key.as_deref(), Some("k1"));
    }

    #[test]
    fn env_overrides_file() {
        let file: ConfigFile = serde_yaml::from_str(
            "port: 9000\nmodel:\n  name: gemini-2.0-flash\n  timeout_seconds: 5\n",
        )
        .unwrap();
        let config = AppConfig::resolve(env_of(&[("ROCKET_PORT", "8100")]), file).unwrap();
        assert_eq!(config.port, 8100);
        assert_eq!(config.model.model, "gemini-2.0-flash");
        assert_eq!(config.model.timeout_seconds, 5);
    }

    #[test]
    fn session_limits_come_from_env_or_file() {
        let config = AppConfig::resolve(env_of(&[]), ConfigFile::default()).unwrap();
        assert_eq!(config.sessions, SessionLimits::default());

        let file: ConfigFile =
            serde_yaml::from_str("sessions:\n  max: 50\n  ttl_minutes: 15\n").unwrap();
        let config = AppConfig::resolve(env_of(&[("MAX_SESSIONS", "20")]), file).unwrap();
        assert_eq!(config.sessions.max_sessions, 20);
        assert_eq!(config.sessions.idle_ttl, chrono::Duration::minutes(15));

        assert!(AppConfig::resolve(env_of(&[("MAX_SESSIONS", "0")]), ConfigFile::default()).is_err());
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(AppConfig::resolve(env_of(&[("ROCKET_PORT", "http")]), ConfigFile::default()).is_err());
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let config = AppConfig::resolve(env_of(&[("GEMINI_API_KEY", "secret")]), ConfigFile::default()).unwrap();
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
