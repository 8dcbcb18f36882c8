use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::registry::DEFAULT_SEARCHES;
use crate::tags::{SupportedTags, TagDescriptor};

const DEFAULT_DEBOUNCE_MS: u64 = 300;
const DEFAULT_MAX_SEARCH_ITEMS: usize = 10;
const DEFAULT_API_URL: &str = "https://sentry.io/api/0";

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_max_search_items() -> usize {
    DEFAULT_MAX_SEARCH_ITEMS
}

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

/// Which saved-search namespace recent searches are read from and written to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Issues,
    Events,
}

impl SearchType {
    #[must_use]
    pub fn as_param(self) -> u8 {
        match self {
            Self::Issues => 0,
            Self::Events => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSearchConfig {
    pub value: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,
    pub organization: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub search_type: SearchType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Boilerplate query that does not suppress default suggestions
    #[serde(default)]
    pub default_query: Option<String>,
    /// Items per group; 0 disables the limit
    #[serde(default = "default_max_search_items")]
    pub max_search_items: usize,
    #[serde(default)]
    pub max_query_length: Option<usize>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_true")]
    pub recent_searches: bool,
    #[serde(default)]
    pub exclude_environment: bool,
    /// Overrides the built-in defaults; an empty list shows tag keys instead
    #[serde(default)]
    pub default_searches: Option<Vec<DefaultSearchConfig>>,
    #[serde(default)]
    pub api: Option<ApiConfig>,
    #[serde(default)]
    pub tags: BTreeMap<String, TagDescriptor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_query: None,
            max_search_items: DEFAULT_MAX_SEARCH_ITEMS,
            max_query_length: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            recent_searches: true,
            exclude_environment: false,
            default_searches: None,
            api: None,
            tags: BTreeMap::new(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub fn item_limit(&self) -> Option<usize> {
        (self.max_search_items > 0).then_some(self.max_search_items)
    }

    /// Built-in tags with the config's `[tags]` table layered on top.
    #[must_use]
    pub fn supported_tags(&self) -> SupportedTags {
        let mut tags = SupportedTags::builtin();
        tags.extend(&self.tags);
        tags
    }

    #[must_use]
    pub fn default_search_items(&self) -> Vec<DefaultSearchConfig> {
        match &self.default_searches {
            Some(searches) => searches.clone(),
            None => DEFAULT_SEARCHES
                .iter()
                .map(|d| DefaultSearchConfig {
                    value: d.value.to_string(),
                    description: d.description.to_string(),
                })
                .collect(),
        }
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&get_config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn init() -> Result<bool, ConfigError> {
        let path = get_config_path();
        if path.exists() {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, "")?;
        Ok(true)
    }
}

pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("querybar")
}

pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.toml")
}
