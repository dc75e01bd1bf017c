//! Runtime configuration loaded from the environment and an optional `sahay.toml`.
//!
//! Environment values override file values; unset or blank values fall back to defaults.
//! The completion credential is the only required setting.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-maverick-17b-128e-instruct";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_DATA_DIR: &str = "data";

/// Keys accepted in `sahay.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_capacity: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_capacity: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_db_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Every setting at its default except the credential, which stays unset.
    pub fn starter() -> Self {
        Self {
            api_key: None,
            api_base_url: Some(DEFAULT_API_URL.to_string()),
            model: Some(DEFAULT_MODEL.to_string()),
            cache_capacity: Some(crate::cache::DEFAULT_CACHE_CAPACITY),
            history_capacity: Some(crate::history::DEFAULT_HISTORY_CAPACITY),
            request_timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            vector_db_url: None,
            data_dir: Some(PathBuf::from(DEFAULT_DATA_DIR)),
        }
    }

    /// Missing file reads as an empty config.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            name: "sahay.toml",
            value: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}

/// Resolved configuration.
///
/// | Env | Default | Description |
/// |-----|---------|-------------|
/// | SAHAY_LLM_API_KEY / GROQ_API_KEY | required | Completion credential. |
/// | SAHAY_LLM_API_URL | https://api.groq.com/openai/v1 | OpenAI-compatible base URL. |
/// | SAHAY_LLM_MODEL / MODEL_NAME | meta-llama/llama-4-maverick-17b-128e-instruct | Model id. |
/// | SAHAY_CACHE_CAPACITY | 256 | Per-agent response cache bound. |
/// | SAHAY_HISTORY_CAPACITY | 10 | Per-agent conversation history bound. |
/// | SAHAY_REQUEST_TIMEOUT_SECS | 60 | HTTP client timeout. |
/// | SAHAY_VECTOR_DB_URL | unset | Knowledge-base sidecar for RAG chat. |
/// | SAHAY_DATA_DIR | data | Root for logs, profiles, and audio. |
#[derive(Debug, Clone, PartialEq)]
pub struct SahayConfig {
    pub api_key: String,
    pub api_base_url: String,
    pub model: String,
    pub cache_capacity: usize,
    pub history_capacity: usize,
    pub request_timeout_secs: u64,
    pub vector_db_url: Option<String>,
    pub data_dir: PathBuf,
}

impl SahayConfig {
    /// Defaults around an explicit credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into().trim().to_string(),
            api_base_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            cache_capacity: crate::cache::DEFAULT_CACHE_CAPACITY,
            history_capacity: crate::history::DEFAULT_HISTORY_CAPACITY,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            vector_db_url: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }

    /// Environment only.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(FileConfig::default(), |name| std::env::var(name).ok())
    }

    /// `sahay.toml` at `path` (if present) overlaid by the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = FileConfig::load_from_path(path)?;
        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Resolve against an arbitrary variable source.
    pub fn resolve<F>(file: FileConfig, var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let opt = |name: &str| {
            var(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let api_key = opt("SAHAY_LLM_API_KEY")
            .or_else(|| opt("GROQ_API_KEY"))
            .or(file.api_key.filter(|k| !k.trim().is_empty()))
            .ok_or(ConfigError::MissingCredential("SAHAY_LLM_API_KEY or GROQ_API_KEY"))?;

        let mut config = Self::new(api_key);
        if let Some(url) = opt("SAHAY_LLM_API_URL").or(file.api_base_url) {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = opt("SAHAY_LLM_MODEL")
            .or_else(|| opt("MODEL_NAME"))
            .or(file.model)
        {
            config.model = model;
        }
        config.cache_capacity = parse_or(
            "SAHAY_CACHE_CAPACITY",
            opt("SAHAY_CACHE_CAPACITY"),
            file.cache_capacity,
            config.cache_capacity,
        )?;
        config.history_capacity = parse_or(
            "SAHAY_HISTORY_CAPACITY",
            opt("SAHAY_HISTORY_CAPACITY"),
            file.history_capacity,
            config.history_capacity,
        )?;
        config.request_timeout_secs = parse_or(
            "SAHAY_REQUEST_TIMEOUT_SECS",
            opt("SAHAY_REQUEST_TIMEOUT_SECS"),
            file.request_timeout_secs,
            config.request_timeout_secs,
        )?;
        config.vector_db_url = opt("SAHAY_VECTOR_DB_URL").or(file.vector_db_url);
        if let Some(dir) = opt("SAHAY_DATA_DIR").map(PathBuf::from).or(file.data_dir) {
            config.data_dir = dir;
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    env: Option<String>,
    file: Option<T>,
    default: T,
) -> Result<T, ConfigError> {
    match env {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(file.unwrap_or(default)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_credential_is_fatal() {
        let err = SahayConfig::resolve(FileConfig::default(), vars(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(_)));
    }

    #[test]
    fn groq_key_and_defaults() {
        let config =
            SahayConfig::resolve(FileConfig::default(), vars(&[("GROQ_API_KEY", " gsk_x ")]))
                .unwrap();
        assert_eq!(config.api_key, "gsk_x");
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.cache_capacity, 256);
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.vector_db_url, None);
    }

    #[test]
    fn env_overrides_file() {
        let file = FileConfig {
            api_key: Some("file-key".into()),
            model: Some("file-model".into()),
            cache_capacity: Some(8),
            ..Default::default()
        };
        let config = SahayConfig::resolve(
            file,
            vars(&[("MODEL_NAME", "env-model"), ("SAHAY_HISTORY_CAPACITY", "4")]),
        )
        .unwrap();
        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.model, "env-model");
        assert_eq!(config.cache_capacity, 8);
        assert_eq!(config.history_capacity, 4);
    }

    #[test]
    fn bad_number_is_reported() {
        let err = SahayConfig::resolve(
            FileConfig::default(),
            vars(&[("GROQ_API_KEY", "k"), ("SAHAY_CACHE_CAPACITY", "lots")]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "SAHAY_CACHE_CAPACITY",
                ..
            }
        ));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sahay.toml");
        let file = FileConfig {
            api_key: Some("k".into()),
            vector_db_url: Some("http://localhost:8900".into()),
            ..Default::default()
        };
        file.save_to_path(&path).unwrap();
        assert_eq!(FileConfig::load_from_path(&path).unwrap(), file);
        assert_eq!(
            FileConfig::load_from_path(&dir.path().join("missing.toml")).unwrap(),
            FileConfig::default()
        );
    }
}
