//! Backends that supply tag values, recent searches and releases.

mod api;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

pub use api::ApiSource;

/// Extra scoping sent with tag value lookups.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub project: Option<String>,
    pub environment: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub query: String,
    #[serde(default, rename = "lastSeen")]
    pub last_seen: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    #[serde(rename = "shortVersion")]
    pub short_version: String,
}

#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Values of `tag` matching `query`.
    async fn tag_values(
        &self,
        tag: &str,
        query: &str,
        params: &QueryParams,
    ) -> Result<Vec<String>, FetchError>;

    async fn recent_searches(&self, query: &str) -> Result<Vec<RecentSearch>, FetchError>;

    /// Newest releases whose version matches `query`, at most `limit`.
    async fn releases(&self, query: &str, limit: usize) -> Result<Vec<Release>, FetchError>;

    async fn save_recent_search(&self, query: &str) -> Result<(), FetchError>;
}

/// Source with nothing behind it. Only local suggestions are produced.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineSource;

#[async_trait]
impl SuggestionSource for OfflineSource {
    async fn tag_values(
        &self,
        _tag: &str,
        _query: &str,
        _params: &QueryParams,
    ) -> Result<Vec<String>, FetchError> {
        Ok(Vec::new())
    }

    async fn recent_searches(&self, _query: &str) -> Result<Vec<RecentSearch>, FetchError> {
        Ok(Vec::new())
    }

    async fn releases(&self, _query: &str, _limit: usize) -> Result<Vec<Release>, FetchError> {
        Ok(Vec::new())
    }

    async fn save_recent_search(&self, _query: &str) -> Result<(), FetchError> {
        Ok(())
    }
}
