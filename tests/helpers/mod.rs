#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use querybar::autocomplete::{Autocompleter, CandidateGroup, GroupKind};
use querybar::config::Config;
use querybar::error::FetchError;
use querybar::session::SearchSession;
use querybar::source::{QueryParams, RecentSearch, Release, SuggestionSource};

/// In-memory backend that records every call.
#[derive(Default)]
pub struct FakeSource {
    pub tag_values: Mutex<HashMap<String, Vec<String>>>,
    pub recent: Mutex<Vec<String>>,
    pub releases: Mutex<Vec<String>>,
    pub fail: AtomicBool,
    pub value_calls: Mutex<Vec<(String, String)>>,
    pub recent_calls: AtomicUsize,
    pub release_calls: AtomicUsize,
    pub saved: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn with_values(self, tag: &str, values: &[&str]) -> Self {
        self.tag_values.lock().unwrap().insert(
            tag.to_string(),
            values.iter().map(ToString::to_string).collect(),
        );
        self
    }

    pub fn with_recent(self, searches: &[&str]) -> Self {
        *self.recent.lock().unwrap() = searches.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_releases(self, versions: &[&str]) -> Self {
        *self.releases.lock().unwrap() = versions.iter().map(ToString::to_string).collect();
        self
    }

    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn value_call_count(&self) -> usize {
        self.value_calls.lock().unwrap().len()
    }

    pub fn value_calls(&self) -> Vec<(String, String)> {
        self.value_calls.lock().unwrap().clone()
    }

    fn check(&self, endpoint: &str) -> Result<(), FetchError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::Status {
                endpoint: endpoint.to_string(),
                status: 500,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SuggestionSource for FakeSource {
    async fn tag_values(
        &self,
        tag: &str,
        query: &str,
        _params: &QueryParams,
    ) -> Result<Vec<String>, FetchError> {
        self.value_calls
            .lock()
            .unwrap()
            .push((tag.to_string(), query.to_string()));
        self.check("tag_values")?;

        Ok(self
            .tag_values
            .lock()
            .unwrap()
            .get(tag)
            .map(|values| values.iter().filter(|v| v.contains(query)).cloned().collect())
            .unwrap_or_default())
    }

    async fn recent_searches(&self, _query: &str) -> Result<Vec<RecentSearch>, FetchError> {
        self.recent_calls.fetch_add(1, Ordering::SeqCst);
        self.check("recent_searches")?;

        Ok(self
            .recent
            .lock()
            .unwrap()
            .iter()
            .map(|query| RecentSearch {
                query: query.clone(),
                last_seen: None,
            })
            .collect())
    }

    async fn releases(&self, query: &str, limit: usize) -> Result<Vec<Release>, FetchError> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        self.check("releases")?;

        Ok(self
            .releases
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.contains(query))
            .take(limit)
            .map(|v| Release {
                short_version: v.clone(),
            })
            .collect())
    }

    async fn save_recent_search(&self, query: &str) -> Result<(), FetchError> {
        self.check("save_recent_search")?;
        self.saved.lock().unwrap().push(query.to_string());
        Ok(())
    }
}

pub struct TestContext {
    pub session: SearchSession,
    pub engine: Arc<Autocompleter>,
    pub source: Arc<FakeSource>,
    pub searched: Arc<Mutex<Vec<String>>>,
    pub members: watch::Sender<Vec<String>>,
}

impl TestContext {
    pub fn new(source: FakeSource) -> Self {
        Self::with_config(source, Config::default())
    }

    pub fn with_config(source: FakeSource, config: Config) -> Self {
        let source = Arc::new(source);
        let (members, members_rx) = watch::channel(Vec::new());
        let engine = Arc::new(
            Autocompleter::from_config(source.clone(), &config).with_members(members_rx),
        );

        let searched = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&searched);
        let session = SearchSession::new(Arc::clone(&engine), None)
            .on_search(move |query| sink.lock().unwrap().push(query.to_string()));

        Self {
            session,
            engine,
            source,
            searched,
            members,
        }
    }

    /// Replaces the query, cursor at the end, and refreshes.
    pub async fn set_query(&mut self, query: &str) {
        self.session.buffer_mut().set_content(query);
        self.session.refresh().await;
    }

    pub async fn type_str(&mut self, text: &str) {
        self.session.type_str(text).await;
    }

    pub fn query(&self) -> &str {
        self.session.query()
    }

    pub fn groups(&self) -> &[CandidateGroup] {
        self.session.dropdown().groups()
    }

    pub fn kinds(&self) -> Vec<GroupKind> {
        self.groups().iter().map(|g| g.kind).collect()
    }

    pub fn group(&self, kind: GroupKind) -> Option<&CandidateGroup> {
        self.groups().iter().find(|g| g.kind == kind)
    }

    pub fn values(&self, kind: GroupKind) -> Vec<String> {
        self.group(kind)
            .map(|g| g.items.iter().map(|i| i.value.clone()).collect())
            .unwrap_or_default()
    }

    /// Accepts the first dropdown item with this value.
    pub async fn pick_value(&mut self, value: &str) {
        let index = self
            .session
            .dropdown()
            .items()
            .position(|item| item.value == value)
            .unwrap_or_else(|| panic!("{value} not in dropdown: {:?}", self.groups()));
        self.session.pick(index).await;
    }

    pub fn searched(&self) -> Vec<String> {
        self.searched.lock().unwrap().clone()
    }
}

pub async fn wait(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
}
