use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_DB_NAME: &str = "avito_ads.db";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {0} not found")]
    NotFound(String),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SaveFormat {
    Excel,
    #[serde(rename = "CSV")]
    Csv,
    #[serde(rename = "SQLite")]
    Sqlite,
}

impl SaveFormat {
    /// The name as written in the config file.
    pub fn name(self) -> &'static str {
        match self {
            SaveFormat::Excel => "Excel",
            SaveFormat::Csv => "CSV",
            SaveFormat::Sqlite => "SQLite",
        }
    }
}

impl fmt::Display for SaveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub pages: u32,
    pub max_ads: usize,
    pub save_format: SaveFormat,
    #[serde(default)]
    pub output_file: Option<String>,
    #[serde(default = "default_db_name")]
    pub db_name: String,

    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

fn default_db_name() -> String {
    DEFAULT_DB_NAME.to_string()
}

fn default_webdriver_url() -> String {
    DEFAULT_WEBDRIVER_URL.to_string()
}

fn default_headless() -> bool {
    true
}

fn default_request_delay_ms() -> u64 {
    1000
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_json(&text)?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.search_url()?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ConfigError::Invalid(format!(
                "base_url must be an http(s) URL, got {}",
                self.base_url
            )));
        }
        if self.pages == 0 {
            return Err(ConfigError::Invalid("pages must be a positive integer".into()));
        }
        if self.max_ads == 0 {
            return Err(ConfigError::Invalid("max_ads must be a positive integer".into()));
        }
        if matches!(self.save_format, SaveFormat::Excel | SaveFormat::Csv)
            && self.output_file.as_deref().map_or(true, |f| f.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "output_file is required when save_format is Excel or CSV".into(),
            ));
        }
        Ok(())
    }

    pub fn search_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url {}: {e}", self.base_url)))
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}
