use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::source::DataSource;

pub const CONFIG_FILE: &str = "subsetter.toml";
pub const ENV_DATA_PATH: &str = "SUBSETTER_DATA";
pub const ENV_DATA_URL: &str = "SUBSETTER_URL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Local data file; the download target when `url` is set.
    pub path: PathBuf,
    /// Remote location (e.g. a Google Drive share link).
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Maximum number of rows drawn in the preview table.
    pub preview_rows: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("survey_data.csv"),
            url: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { preview_rows: 500 }
    }
}

impl AppConfig {
    /// Read `subsetter.toml` from the working directory, then apply
    /// environment overrides. Falls back to defaults on any problem.
    pub fn load() -> Self {
        let mut config = Self::from_file(Path::new(CONFIG_FILE));
        if let Ok(path) = std::env::var(ENV_DATA_PATH) {
            config.source.path = PathBuf::from(path);
        }
        if let Ok(url) = std::env::var(ENV_DATA_URL) {
            config.source.url = Some(url).filter(|u| !u.trim().is_empty());
        }
        config
    }

    pub fn from_file(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            log::debug!("No {} found, using defaults", path.display());
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to parse {}: {e}. Using defaults.", path.display());
                Self::default()
            }
        }
    }

    pub fn data_source(&self) -> DataSource {
        match &self.source.url {
            Some(url) => DataSource::Remote {
                url: url.clone(),
                cache_path: self.source.path.clone(),
            },
            None => DataSource::Local(self.source.path.clone()),
        }
    }
}
