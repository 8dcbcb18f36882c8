use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};

use crate::config::{Config, DefaultSearchConfig};
use crate::query::{Clause, Filter, active_clause, clamp_cursor, unquote_value};
use crate::source::{QueryParams, SuggestionSource};
use crate::tags::{SupportedTags, TagDescriptor, ValueSource};

use super::debounce::{Debouncer, NoResultCache};
use super::groups::{GroupLimits, create_search_groups};
use super::operators::operator_group;
use super::types::{AutocompleteGroup, CandidateGroup, CandidateItem, GroupKind, ItemKind};

const MAX_AUTOCOMPLETE_RELEASES: usize = 5;
const ENVIRONMENT_TAG: &str = "environment";
const RELEASE_TAG: &str = "release";
const LATEST_RELEASE: &str = "latest";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutocompleteSettings {
    pub default_query: Option<String>,
    pub max_items: Option<usize>,
    pub max_query_length: Option<usize>,
    pub debounce: Duration,
    pub recent_searches: bool,
    pub exclude_environment: bool,
    pub default_searches: Vec<DefaultSearchConfig>,
    pub params: QueryParams,
}

impl Default for AutocompleteSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for AutocompleteSettings {
    fn from(config: &Config) -> Self {
        let params = config
            .api
            .as_ref()
            .map(|api| QueryParams {
                project: api.project.clone(),
                environment: api.environment.clone(),
            })
            .unwrap_or_default();

        Self {
            default_query: config.default_query.clone(),
            max_items: config.item_limit(),
            max_query_length: config.max_query_length,
            debounce: config.debounce(),
            recent_searches: config.recent_searches,
            exclude_environment: config.exclude_environment,
            default_searches: config.default_search_items(),
            params,
        }
    }
}

struct ValueState {
    debouncer: Debouncer,
    no_results: NoResultCache,
    last_tag: String,
    last: Vec<String>,
}

struct FetchState<T> {
    debouncer: Debouncer,
    last: Vec<T>,
}

impl<T> FetchState<T> {
    fn new(wait: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(wait),
            last: Vec::new(),
        }
    }
}

/// Produces dropdown groups for a query and cursor.
///
/// Remote lookups are debounced per kind (tag values, recent searches,
/// releases). A call that lands inside the debounce window reuses what the
/// last admitted call fetched; a tag value lookup for another tag than the
/// last one is never suppressed. The engine is `Send + Sync`; share it behind
/// an `Arc`.
pub struct Autocompleter {
    source: Arc<dyn SuggestionSource>,
    tags: SupportedTags,
    settings: AutocompleteSettings,
    members: Option<watch::Receiver<Vec<String>>>,
    values: Mutex<ValueState>,
    recent: Mutex<FetchState<CandidateItem>>,
    releases: Mutex<FetchState<String>>,
}

impl Autocompleter {
    #[must_use]
    pub fn new(
        source: Arc<dyn SuggestionSource>,
        tags: SupportedTags,
        settings: AutocompleteSettings,
    ) -> Self {
        let wait = settings.debounce;
        Self {
            source,
            tags,
            settings,
            members: None,
            values: Mutex::new(ValueState {
                debouncer: Debouncer::new(wait),
                no_results: NoResultCache::default(),
                last_tag: String::new(),
                last: Vec::new(),
            }),
            recent: Mutex::new(FetchState::new(wait)),
            releases: Mutex::new(FetchState::new(wait)),
        }
    }

    #[must_use]
    pub fn from_config(source: Arc<dyn SuggestionSource>, config: &Config) -> Self {
        Self::new(source, config.supported_tags(), AutocompleteSettings::from(config))
    }

    /// Feeds `members`-sourced tags from a live list.
    #[must_use]
    pub fn with_members(mut self, members: watch::Receiver<Vec<String>>) -> Self {
        self.members = Some(members);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &AutocompleteSettings {
        &self.settings
    }

    #[must_use]
    pub fn tags(&self) -> &SupportedTags {
        &self.tags
    }

    /// Groups for the clause under `cursor` (a byte offset).
    pub async fn generate(&self, query: &str, cursor: usize) -> Vec<CandidateGroup> {
        let cursor = clamp_cursor(query, cursor);
        let limits = GroupLimits::for_query(
            query,
            self.settings.max_items,
            self.settings.max_query_length,
        );

        let clause = active_clause(query, cursor, self.settings.default_query.as_deref());
        tracing::trace!(query, cursor, ?clause, "generating suggestions");

        match clause {
            None => create_search_groups(self.default_group(query).await, &limits),
            Some(Clause::FreeText(free)) => {
                create_search_groups(self.tag_key_group(query, free.text()).await, &limits)
            }
            Some(Clause::Filter(filter)) => self.filter_groups(query, cursor, &filter, &limits).await,
        }
    }

    async fn filter_groups(
        &self,
        query: &str,
        cursor: usize,
        filter: &Filter,
        limits: &GroupLimits,
    ) -> Vec<CandidateGroup> {
        let tag_name = filter.key_text();
        let operators = || {
            create_search_groups(operator_group(self.tags.get(tag_name), tag_name), limits)
        };

        if filter.value.contains(cursor) {
            let mut groups = if cursor == filter.value.start {
                operators()
            } else {
                Vec::new()
            };
            if let Some(values) = self.value_group(query, filter).await {
                groups.extend(create_search_groups(values, limits));
            }
            return groups;
        }

        if filter.key.contains(cursor) {
            let mut groups = if cursor == filter.key.end {
                operators()
            } else {
                Vec::new()
            };
            let keys = self.tag_key_group(query, tag_name).await;
            groups.extend(create_search_groups(keys, limits));
            return groups;
        }

        // negation marker or operator token
        operators()
    }

    async fn default_group(&self, query: &str) -> AutocompleteGroup {
        if self.settings.default_searches.is_empty() {
            return self.tag_key_group(query, "").await;
        }

        let items = self
            .settings
            .default_searches
            .iter()
            .map(|d| CandidateItem::new(&d.value, &d.description, ItemKind::Default))
            .collect();

        AutocompleteGroup {
            items,
            recent: self.recent_items(query).await,
            tag_name: String::new(),
            kind: GroupKind::Default,
        }
    }

    async fn tag_key_group(&self, query: &str, typed: &str) -> AutocompleteGroup {
        let items = self
            .tags
            .keys()
            .filter(|key| !(self.settings.exclude_environment && *key == ENVIRONMENT_TAG))
            .map(|key| format!("{key}:"))
            .filter(|key| key.contains(typed))
            .map(|key| CandidateItem::plain(key, ItemKind::TagKey))
            .collect();

        AutocompleteGroup {
            items,
            recent: self.recent_items(query).await,
            tag_name: String::new(),
            kind: GroupKind::TagKey,
        }
    }

    /// `None` when the tag's values are hidden entirely.
    async fn value_group(&self, query: &str, filter: &Filter) -> Option<AutocompleteGroup> {
        let tag_name = filter.key_text();
        if self.settings.exclude_environment && tag_name == ENVIRONMENT_TAG {
            return None;
        }

        let Some(tag) = self.tags.get(tag_name) else {
            tracing::debug!(tag = tag_name, "unknown tag");
            return Some(AutocompleteGroup::invalid(tag_name));
        };

        let typed = unquote_value(filter.value_text());
        let (items, recent) = futures::join!(
            self.tag_value_items(tag, &typed),
            self.recent_items(query)
        );

        Some(AutocompleteGroup {
            items,
            recent,
            tag_name: tag_name.to_string(),
            kind: GroupKind::TagValue,
        })
    }

    async fn tag_value_items(&self, tag: &TagDescriptor, typed: &str) -> Vec<CandidateItem> {
        match tag.source {
            ValueSource::Predefined => predefined_items(tag, &tag.values, typed),
            ValueSource::Members => {
                let mut values = tag.values.clone();
                if let Some(members) = &self.members {
                    values.extend(members.borrow().iter().cloned());
                }
                predefined_items(tag, &values, typed)
            }
            ValueSource::Releases => {
                let predefined = predefined_items(tag, &tag.values, typed);
                let releases = self.release_values(typed).await;
                predefined
                    .into_iter()
                    .chain(releases.into_iter().map(value_item))
                    .collect()
            }
            ValueSource::Lookup => self
                .lookup_values(tag, typed)
                .await
                .into_iter()
                .map(value_item)
                .collect(),
        }
    }

    async fn lookup_values(&self, tag: &TagDescriptor, typed: &str) -> Vec<String> {
        {
            let mut state = self.values.lock().await;
            if state.no_results.covers(&tag.key, typed) {
                tracing::debug!(tag = %tag.key, typed, "prefix known to have no values");
                return Vec::new();
            }
            // a different tag has nothing to reuse, so it always fetches
            let admitted = state.debouncer.admit();
            if !admitted && state.last_tag == tag.key {
                return state
                    .last
                    .iter()
                    .filter(|v| v.contains(typed))
                    .cloned()
                    .collect();
            }
        }

        let mut values = match self
            .source
            .tag_values(&tag.key, typed, &self.settings.params)
            .await
        {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!(tag = %tag.key, error = %err, "tag value lookup failed");
                return Vec::new();
            }
        };

        if tag.key == RELEASE_TAG && !values.iter().any(|v| v == LATEST_RELEASE) {
            values.insert(0, LATEST_RELEASE.to_string());
        }

        let mut state = self.values.lock().await;
        state.no_results.record(&tag.key, typed, values.is_empty());
        state.last_tag.clone_from(&tag.key);
        state.last.clone_from(&values);
        values
    }

    async fn release_values(&self, typed: &str) -> Vec<String> {
        {
            let mut state = self.releases.lock().await;
            if !state.debouncer.admit() {
                return state
                    .last
                    .iter()
                    .filter(|v| v.contains(typed))
                    .cloned()
                    .collect();
            }
        }

        let versions: Vec<String> = match self
            .source
            .releases(typed, MAX_AUTOCOMPLETE_RELEASES)
            .await
        {
            Ok(releases) => releases
                .into_iter()
                .take(MAX_AUTOCOMPLETE_RELEASES)
                .map(|r| r.short_version)
                .collect(),
            Err(err) => {
                tracing::warn!(error = %err, "release lookup failed");
                return Vec::new();
            }
        };

        self.releases.lock().await.last.clone_from(&versions);
        versions
    }

    async fn recent_items(&self, query: &str) -> Vec<CandidateItem> {
        if !self.settings.recent_searches {
            return Vec::new();
        }

        {
            let mut state = self.recent.lock().await;
            if !state.debouncer.admit() {
                return state.last.clone();
            }
        }

        let items: Vec<CandidateItem> = match self.source.recent_searches(query).await {
            Ok(searches) => searches
                .into_iter()
                .map(|s| CandidateItem::plain(s.query, ItemKind::RecentSearch))
                .collect(),
            Err(err) => {
                tracing::warn!(error = %err, "recent search lookup failed");
                return Vec::new();
            }
        };

        self.recent.lock().await.last.clone_from(&items);
        items
    }

    /// Records a submitted query. Failures are logged and otherwise ignored.
    pub async fn save_recent_search(&self, query: &str) {
        if !self.settings.recent_searches || query.trim().is_empty() {
            return;
        }
        if let Err(err) = self.source.save_recent_search(query).await {
            tracing::warn!(query, error = %err, "could not save recent search");
        }
    }
}

fn value_item(value: String) -> CandidateItem {
    CandidateItem::plain(value, ItemKind::TagValue)
}

/// Substring matches from a fixed list; the first `max_suggested_values`
/// matches are kept past the item limit.
fn predefined_items(tag: &TagDescriptor, values: &[String], typed: &str) -> Vec<CandidateItem> {
    let pinned = tag.max_suggested_values.unwrap_or(0);
    values
        .iter()
        .filter(|v| v.contains(typed))
        .enumerate()
        .map(|(i, v)| value_item(v.clone()).ignoring_max_items(i < pinned))
        .collect()
}
