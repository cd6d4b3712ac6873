//! Configuration for model paths, naming services and score weights
//!
//! See [`user_config`] for the file layout and load order.

mod user_config;

pub use user_config::{
    init_config_file, user_config_path, ConfigLayer, ConfigSources, EXAMPLE_CONFIG,
    PROJECT_CONFIG_FILE,
};

use crate::scoring::ScoringWeights;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),

    #[error("Missing config value '{key}' (set it in the config file or via {env})")]
    Missing { key: &'static str, env: &'static str },
}

/// Model artifact locations
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelPaths {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_class: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_method: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_score: Option<PathBuf>,
}

/// Embedding and vector index settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamingConfig {
    pub similarity_threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_url: Option<String>,
    pub embedding_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl NamingConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn index_host(&self) -> Result<&str, ConfigError> {
        self.index_host.as_deref().ok_or(ConfigError::Missing {
            key: "naming.index_host",
            env: "PINECONE_INDEX_HOST",
        })
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::Missing {
            key: "naming.api_key",
            env: "PINECONE_API_KEY",
        })
    }

    pub fn embedding_url(&self) -> Result<&str, ConfigError> {
        self.embedding_url.as_deref().ok_or(ConfigError::Missing {
            key: "naming.embedding_url",
            env: "CODEQUAL_EMBEDDING_URL",
        })
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub models: ModelPaths,
    pub naming: NamingConfig,
    pub scoring: ScoringWeights,
}

impl Config {
    /// Load from the standard locations plus the process environment
    pub fn load(explicit_file: Option<&Path>) -> Result<Self, ConfigError> {
        ConfigSources::standard(explicit_file).load(|name| std::env::var(name).ok())
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.naming.similarity_threshold;
        if !(-1.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Invalid(format!(
                "naming.similarity_threshold must be within [-1, 1], got {threshold}"
            )));
        }

        let weights = [
            ("scoring.maintainability_weight", self.scoring.maintainability_weight),
            ("scoring.naming_weight", self.scoring.naming_weight),
            ("scoring.smell_penalty", self.scoring.smell_penalty),
        ];
        for (key, value) in weights {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{key} must be a finite number")));
            }
        }
        Ok(())
    }

    /// TOML rendering with API keys masked, for `config show`
    pub fn to_masked_toml(&self) -> Result<String, toml::ser::Error> {
        let mut masked = self.clone();
        masked.naming.api_key = masked.naming.api_key.as_deref().map(mask_secret);
        masked.naming.embedding_api_key = masked.naming.embedding_api_key.as_deref().map(mask_secret);
        toml::to_string_pretty(&masked)
    }
}

/// Keep the first four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= 8 {
        return "****".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}****")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        ConfigLayer::default().resolve().unwrap()
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("short"), "****");
        assert_eq!(mask_secret("pcsk_1234567890"), "pcsk****");
    }

    #[test]
    fn test_masked_toml_hides_keys() {
        let mut config = config();
        config.naming.api_key = Some("pcsk_supersecret".into());
        config.naming.index_host = Some("words.svc.pinecone.io".into());

        let shown = config.to_masked_toml().unwrap();
        assert!(shown.contains("pcsk****"));
        assert!(!shown.contains("supersecret"));
        assert!(shown.contains("words.svc.pinecone.io"));
        assert!(shown.contains("[scoring]"));
    }

    #[test]
    fn test_missing_service_values() {
        let config = config();
        assert!(matches!(
            config.naming.index_host(),
            Err(ConfigError::Missing { env: "PINECONE_INDEX_HOST", .. })
        ));
        assert!(config.naming.api_key().is_err());
        assert!(config.naming.embedding_url().is_err());
        assert!(config.naming.timeout().is_none());
    }

    #[test]
    fn test_non_finite_weight_rejected() {
        let mut config = config();
        config.scoring.naming_weight = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
