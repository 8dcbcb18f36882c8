use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::{ApiConfig, SearchType};
use crate::error::FetchError;

use super::{QueryParams, RecentSearch, Release, SuggestionSource};

const RECENT_SEARCH_LIMIT: usize = 3;

static HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("querybar/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
});

#[derive(Deserialize)]
struct TagValue {
    value: String,
}

/// Organization-scoped REST backend.
#[derive(Clone, Debug)]
pub struct ApiSource {
    base_url: Url,
    organization: String,
    token: Option<String>,
    project: Option<String>,
    search_type: SearchType,
}

impl ApiSource {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(config.base_url.clone()));
        }

        Ok(Self {
            base_url,
            organization: config.organization.clone(),
            token: config.token.clone(),
            project: config.project.clone(),
            search_type: config.search_type,
        })
    }

    /// `{base}/organizations/{org}/{segments...}/` with each segment escaped.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("organizations")
                .push(&self.organization)
                .extend(segments)
                .push("");
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        tracing::debug!(%url, "GET");
        let response = self
            .authorize(HTTP_CLIENT.get(url.clone()).query(query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                endpoint: url.path().to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl SuggestionSource for ApiSource {
    async fn tag_values(
        &self,
        tag: &str,
        query: &str,
        params: &QueryParams,
    ) -> Result<Vec<String>, FetchError> {
        let url = self.endpoint(&["tags", tag, "values"]);
        let mut args = vec![("query", query.to_string())];
        if let Some(project) = params.project.as_ref().or(self.project.as_ref()) {
            args.push(("project", project.clone()));
        }
        if let Some(environment) = &params.environment {
            args.push(("environment", environment.clone()));
        }

        let values: Vec<TagValue> = self.get_json(url, &args).await?;
        Ok(values.into_iter().map(|v| v.value).collect())
    }

    async fn recent_searches(&self, query: &str) -> Result<Vec<RecentSearch>, FetchError> {
        let url = self.endpoint(&["recent-searches"]);
        let mut args = vec![
            ("type", self.search_type.as_param().to_string()),
            ("limit", RECENT_SEARCH_LIMIT.to_string()),
        ];
        if !query.is_empty() {
            args.push(("query", query.to_string()));
        }

        self.get_json(url, &args).await
    }

    async fn releases(&self, query: &str, limit: usize) -> Result<Vec<Release>, FetchError> {
        let url = self.endpoint(&["releases"]);
        let mut args = vec![("per_page", limit.to_string())];
        if !query.is_empty() {
            args.push(("query", query.to_string()));
        }
        if let Some(project) = &self.project {
            args.push(("project", project.clone()));
        }

        let mut releases: Vec<Release> = self.get_json(url, &args).await?;
        releases.truncate(limit);
        Ok(releases)
    }

    async fn save_recent_search(&self, query: &str) -> Result<(), FetchError> {
        let url = self.endpoint(&["recent-searches"]);
        tracing::debug!(%url, "POST");
        let body = serde_json::json!({
            "query": query,
            "type": self.search_type.as_param(),
        });

        let response = self
            .authorize(HTTP_CLIENT.post(url.clone()).json(&body))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                endpoint: url.path().to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}
