//! Layered configuration loading
//!
//! Every source is parsed into a [`ConfigLayer`] where each field is
//! optional. Layers are merged lowest priority first and the result is
//! resolved against the built-in defaults:
//!
//! 1. built-in defaults
//! 2. `~/.config/codequal/config.toml`
//! 3. `./codequal.toml`, or the file given with `--config`
//! 4. environment variables

use super::{Config, ConfigError, ModelPaths, NamingConfig};
use crate::naming::embedding::DEFAULT_EMBEDDING_MODEL;
use crate::naming::DEFAULT_SIMILARITY_THRESHOLD;
use crate::scoring::ScoringWeights;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "codequal.toml";

/// Environment variables checked after all files
pub const ENV_OVERRIDES: [&str; 8] = [
    "CODEQUAL_LARGE_CLASS_MODEL",
    "CODEQUAL_LONG_METHOD_MODEL",
    "CODEQUAL_GENERAL_MODEL",
    "PINECONE_API_KEY",
    "PINECONE_INDEX_HOST",
    "CODEQUAL_EMBEDDING_URL",
    "CODEQUAL_EMBEDDING_MODEL",
    "CODEQUAL_EMBEDDING_API_KEY",
];

/// One configuration source; unset fields defer to lower layers
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub models: ModelsLayer,
    pub naming: NamingLayer,
    pub scoring: ScoringLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ModelsLayer {
    pub large_class: Option<PathBuf>,
    pub long_method: Option<PathBuf>,
    pub general_score: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NamingLayer {
    pub similarity_threshold: Option<f64>,
    pub index_host: Option<String>,
    pub api_key: Option<String>,
    pub embedding_url: Option<String>,
    pub embedding_model: Option<String>,
    pub embedding_api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScoringLayer {
    pub maintainability_weight: Option<f64>,
    pub naming_weight: Option<f64>,
    pub smell_penalty: Option<f64>,
}

impl ModelsLayer {
    fn anchor_at(&mut self, base: &Path) {
        for path in [&mut self.large_class, &mut self.long_method, &mut self.general_score]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

fn overwrite<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

impl ConfigLayer {
    /// Parse one TOML file.
    ///
    /// Relative model paths are taken relative to the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut layer = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(base) = path.parent() {
            layer.models.anchor_at(base);
        }
        Ok(layer)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Overlay `other` on top of `self`
    pub fn merge(&mut self, other: ConfigLayer) {
        overwrite(&mut self.models.large_class, other.models.large_class);
        overwrite(&mut self.models.long_method, other.models.long_method);
        overwrite(&mut self.models.general_score, other.models.general_score);

        overwrite(&mut self.naming.similarity_threshold, other.naming.similarity_threshold);
        overwrite(&mut self.naming.index_host, other.naming.index_host);
        overwrite(&mut self.naming.api_key, other.naming.api_key);
        overwrite(&mut self.naming.embedding_url, other.naming.embedding_url);
        overwrite(&mut self.naming.embedding_model, other.naming.embedding_model);
        overwrite(&mut self.naming.embedding_api_key, other.naming.embedding_api_key);
        overwrite(&mut self.naming.timeout_secs, other.naming.timeout_secs);

        overwrite(&mut self.scoring.maintainability_weight, other.scoring.maintainability_weight);
        overwrite(&mut self.scoring.naming_weight, other.scoring.naming_weight);
        overwrite(&mut self.scoring.smell_penalty, other.scoring.smell_penalty);
    }

    /// Apply environment overrides. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for name in ENV_OVERRIDES {
            if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                debug!("Config override from {}", name);
                self.set_from_env(name, value);
            }
        }
    }

    fn set_from_env(&mut self, name: &str, value: String) {
        match name {
            "CODEQUAL_LARGE_CLASS_MODEL" => self.models.large_class = Some(value.into()),
            "CODEQUAL_LONG_METHOD_MODEL" => self.models.long_method = Some(value.into()),
            "CODEQUAL_GENERAL_MODEL" => self.models.general_score = Some(value.into()),
            "PINECONE_API_KEY" => self.naming.api_key = Some(value),
            "PINECONE_INDEX_HOST" => self.naming.index_host = Some(value),
            "CODEQUAL_EMBEDDING_URL" => self.naming.embedding_url = Some(value),
            "CODEQUAL_EMBEDDING_MODEL" => self.naming.embedding_model = Some(value),
            "CODEQUAL_EMBEDDING_API_KEY" => self.naming.embedding_api_key = Some(value),
            _ => {}
        }
    }

    /// Fill unset fields with defaults and validate
    pub fn resolve(self) -> Result<Config, ConfigError> {
        let defaults = ScoringWeights::default();
        let config = Config {
            models: ModelPaths {
                large_class: self.models.large_class,
                long_method: self.models.long_method,
                general_score: self.models.general_score,
            },
            naming: NamingConfig {
                similarity_threshold: self
                    .naming
                    .similarity_threshold
                    .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD),
                index_host: self.naming.index_host,
                api_key: self.naming.api_key,
                embedding_url: self.naming.embedding_url,
                embedding_model: self
                    .naming
                    .embedding_model
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
                embedding_api_key: self.naming.embedding_api_key,
                timeout_secs: self.naming.timeout_secs,
            },
            scoring: ScoringWeights {
                maintainability_weight: self
                    .scoring
                    .maintainability_weight
                    .unwrap_or(defaults.maintainability_weight),
                naming_weight: self.scoring.naming_weight.unwrap_or(defaults.naming_weight),
                smell_penalty: self.scoring.smell_penalty.unwrap_or(defaults.smell_penalty),
            },
        };
        config.validate()?;
        Ok(config)
    }
}

/// Path of the per-user config file
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("codequal").join("config.toml"))
}

/// Parse an implicit config file; a broken file is logged and skipped
fn load_optional(path: &Path) -> Option<ConfigLayer> {
    if !path.exists() {
        return None;
    }
    match ConfigLayer::from_file(path) {
        Ok(layer) => {
            debug!("Loaded config from {}", path.display());
            Some(layer)
        }
        Err(e) => {
            warn!("Ignoring config file: {}", e);
            None
        }
    }
}

/// Where each file layer comes from
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub user_file: Option<PathBuf>,
    /// `--config`; must exist and parse
    pub explicit_file: Option<PathBuf>,
    /// Directory searched for [`PROJECT_CONFIG_FILE`] when no explicit file is given
    pub project_dir: Option<PathBuf>,
}

impl ConfigSources {
    /// Standard locations for a CLI run
    pub fn standard(explicit_file: Option<&Path>) -> Self {
        Self {
            user_file: user_config_path(),
            explicit_file: explicit_file.map(Path::to_path_buf),
            project_dir: std::env::current_dir().ok(),
        }
    }

    pub fn load<F>(&self, env: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut layer = ConfigLayer::default();

        if let Some(user) = self.user_file.as_deref().and_then(load_optional) {
            layer.merge(user);
        }

        match (&self.explicit_file, &self.project_dir) {
            (Some(path), _) => {
                let explicit = ConfigLayer::from_file(path)?;
                debug!("Loaded config from {}", path.display());
                layer.merge(explicit);
            }
            (None, Some(dir)) => {
                if let Some(project) = load_optional(&dir.join(PROJECT_CONFIG_FILE)) {
                    layer.merge(project);
                }
            }
            (None, None) => {}
        }

        layer.apply_env(env);
        layer.resolve()
    }
}

/// Example written by `config init`
pub const EXAMPLE_CONFIG: &str = r#"# codequal configuration
#
# Environment variables override these values:
#   CODEQUAL_LARGE_CLASS_MODEL, CODEQUAL_LONG_METHOD_MODEL, CODEQUAL_GENERAL_MODEL,
#   PINECONE_API_KEY, PINECONE_INDEX_HOST,
#   CODEQUAL_EMBEDDING_URL, CODEQUAL_EMBEDDING_MODEL, CODEQUAL_EMBEDDING_API_KEY

[models]
# gbdt model files (JSON)
# large_class = "/path/to/large_class.json"
# long_method = "/path/to/long_method.json"
# general_score = "/path/to/general_score.json"

[naming]
# similarity_threshold = 0.94
# index_host = "https://english-words-xxxx.svc.pinecone.io"
# api_key = "..."
# embedding_url = "http://localhost:8080/v1/embeddings"
# embedding_model = "intfloat/e5-small-v2"
# embedding_api_key = "..."
# timeout_secs = 30

[scoring]
# maintainability_weight = 0.08
# naming_weight = 0.2
# smell_penalty = 0.2
"#;

/// Write [`EXAMPLE_CONFIG`] to `path` unless a file is already there.
///
/// Returns `true` when the file was created.
pub fn init_config_file(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    let io_error = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, EXAMPLE_CONFIG).map_err(io_error)?;
    Ok(true)
}
