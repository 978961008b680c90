use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::core::naming::TitleReplacer;

const DEFAULT_CONFIG_PATH: &str = "./config.toml";

impl Config {
    pub fn init(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        // explicit path wins over env, with default
        let config_path = match path {
            Some(p) => p.to_string_lossy().into_owned(),
            None => std::env::var("SUBARR_CONFIG_PATH")
                .unwrap_or_else(|_| String::from(DEFAULT_CONFIG_PATH)),
        };

        let config = config::Config::builder()
            // Add in config toml
            .add_source(config::File::with_name(&config_path).required(path.is_some()))
            // Add in settings from the environment (with a prefix of SUBARR)
            .add_source(config::Environment::with_prefix("SUBARR").separator("__"))
            .build()?;

        Self::finish(config.try_deserialize()?)
    }

    /// Like `init`, but a broken config file found through the env or default path yields
    /// the default config. The error is handed back so it can be logged once logging is up.
    pub fn init_or_default(
        path: Option<&Path>,
    ) -> Result<(Self, Option<config::ConfigError>), config::ConfigError> {
        match Self::init(path) {
            Ok(config) => Ok((config, None)),
            Err(e) if path.is_none() => Ok((Self::default(), Some(e))),
            Err(e) => Err(e),
        }
    }

    #[cfg(test)]
    pub fn from_toml_str(raw: &str) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?;

        Self::finish(config.try_deserialize()?)
    }

    fn finish(mut config: Config) -> Result<Self, config::ConfigError> {
        config.media.replace_pairs = config
            .media
            .replace_pairs
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v.to_lowercase()))
            .collect();
        tracing::debug!(
            "Replace pairs ({}): {}",
            config.media.replace_pairs.len(),
            config
                .media
                .replace_pairs
                .iter()
                .map(|(k, v)| format!("{k} => {v}"))
                .collect::<Vec<_>>()
                .join("; ")
        );
        Ok(config)
    }

    pub fn log_level(&self) -> &str {
        &self.logs.level
    }
}

// ================================================================================================
// Models
// ================================================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[allow(unused)]
pub struct Config {
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

// ===============================================================================
// Logs
// ===============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Append logs to this file instead of stdout.
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String { "info".to_string() }

// ===============================================================================
// Media
// ===============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Media file extensions picked up when the input is a folder.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Language tag inserted in the subtitle file name: `<name>.<language_code>.srt`
    #[serde(default = "default_language_code")]
    pub language_code: String,
    /// Title aliases applied to classified names before querying the catalog.
    #[serde(default)]
    pub replace_pairs: HashMap<String, String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            language_code: default_language_code(),
            replace_pairs: HashMap::new(),
        }
    }
}

impl MediaConfig {
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn language_code(&self) -> &str {
        &self.language_code
    }
}

impl TitleReplacer for MediaConfig {
    fn replace_title_if_needed(&self, text: &str) -> String {
        match self.replace_pairs.get(&text.to_lowercase()) {
            Some(replacement) => {
                tracing::info!("Replaced \"{text}\" with \"{replacement}\" for query");
                replacement.clone()
            }
            None => text.to_string(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["mkv".to_string(), "mp4".to_string(), "avi".to_string()]
}

fn default_language_code() -> String { "Hebrew".to_string() }

// ===============================================================================
// Provider
// ===============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Ktuvit,
    Screwzira,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,
    /// Override the catalog base URL (mostly useful against a local mirror).
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Courtesy delay between two catalog calls when processing a folder.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            base_url: None,
            email: None,
            password: None,
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

fn default_request_delay_ms() -> u64 { 2000 }

// ===============================================================================
// Cache
// ===============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { dir: default_cache_dir() }
    }
}

fn default_cache_dir() -> String { "./cache".to_string() }
