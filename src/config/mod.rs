use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Configuration {
    pub omdb: Option<OmdbConfig>,
    pub search: Option<SearchConfig>,
    pub rating: Option<RatingConfig>,
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OmdbConfig {
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,
    #[serde(rename = "apikey", default)]
    pub api_key: String,
    #[serde(rename = "timeoutSeconds")]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(rename = "minQueryLength")]
    pub min_query_length: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RatingConfig {
    #[serde(rename = "maxStars")]
    pub max_stars: Option<u8>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
}

impl Configuration {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Configuration = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise falls back to the defaults.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if !Path::new(path).exists() {
            debug!("No configuration file at {}, using defaults", path);
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn set_api_key(&mut self, api_key: String) {
        match self.omdb {
            Some(ref mut omdb) => omdb.api_key = api_key,
            None => {
                self.omdb = Some(OmdbConfig {
                    base_url: None,
                    api_key,
                    timeout_seconds: None,
                })
            }
        }
    }

    pub fn api_key(&self) -> &str {
        self.omdb.as_ref().map(|o| o.api_key.as_str()).unwrap_or("")
    }

    pub fn base_url(&self) -> &str {
        self.omdb
            .as_ref()
            .and_then(|o| o.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.omdb
                .as_ref()
                .and_then(|o| o.timeout_seconds)
                .unwrap_or(30),
        )
    }

    pub fn min_query_length(&self) -> usize {
        self.search
            .as_ref()
            .and_then(|s| s.min_query_length)
            .unwrap_or(3)
    }

    pub fn max_stars(&self) -> u8 {
        match self.rating.as_ref().and_then(|r| r.max_stars) {
            Some(0) => {
                warn!("rating.maxStars must be at least 1, using 10");
                10
            }
            Some(n) => n,
            None => 10,
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage
            .as_ref()
            .and_then(|s| s.path.clone())
            .unwrap_or_else(|| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("moviez")
                    .join("storage.json")
            })
    }
}
