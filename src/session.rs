use std::sync::Arc;

use crate::autocomplete::{Autocompleter, CandidateGroup, CandidateItem, Dropdown, apply_candidate};
use crate::cursor::{QueryBuffer, add_space, remove_space};
use crate::query::active_clause;

pub type SearchCallback = Box<dyn FnMut(&str) + Send>;

/// Snapshot of the input a completion was generated for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionRequest {
    pub generation: u64,
    pub query: String,
    /// Byte offset
    pub cursor: usize,
}

/// Cursor movement inside the query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    WordLeft,
    WordRight,
    Start,
    End,
}

/// One search bar: the input, its dropdown and the engine feeding it.
///
/// Completions can be generated off-task with [`begin_completion`] and
/// [`apply_completion`]; a result is only shown if no newer request was made
/// and the text has not changed since.
///
/// [`begin_completion`]: SearchSession::begin_completion
/// [`apply_completion`]: SearchSession::apply_completion
pub struct SearchSession {
    buffer: QueryBuffer,
    engine: Arc<Autocompleter>,
    dropdown: Dropdown,
    generation: u64,
    on_search: Option<SearchCallback>,
}

impl SearchSession {
    /// Starts from `initial_query`, or the configured default query.
    #[must_use]
    pub fn new(engine: Arc<Autocompleter>, initial_query: Option<&str>) -> Self {
        let settings = engine.settings();
        let content = initial_query
            .or(settings.default_query.as_deref())
            .map(add_space)
            .unwrap_or_default();
        let buffer = QueryBuffer::new(content).with_max_len(settings.max_query_length);

        Self {
            buffer,
            engine,
            dropdown: Dropdown::default(),
            generation: 0,
            on_search: None,
        }
    }

    #[must_use]
    pub fn on_search(mut self, callback: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_search = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn query(&self) -> &str {
        self.buffer.content()
    }

    #[must_use]
    pub fn buffer(&self) -> &QueryBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut QueryBuffer {
        &mut self.buffer
    }

    #[must_use]
    pub fn dropdown(&self) -> &Dropdown {
        &self.dropdown
    }

    pub fn dropdown_mut(&mut self) -> &mut Dropdown {
        &mut self.dropdown
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Invalidates any completion still in flight and snapshots the input.
    pub fn begin_completion(&mut self) -> CompletionRequest {
        self.generation += 1;
        CompletionRequest {
            generation: self.generation,
            query: self.buffer.content().to_string(),
            cursor: self.buffer.cursor_byte_pos(),
        }
    }

    /// Shows `groups` unless the request went stale. Returns whether they were applied.
    pub fn apply_completion(
        &mut self,
        request: &CompletionRequest,
        groups: Vec<CandidateGroup>,
    ) -> bool {
        if request.generation != self.generation || request.query != self.buffer.content() {
            tracing::debug!(
                generation = request.generation,
                current = self.generation,
                "discarding stale completion"
            );
            return false;
        }
        self.dropdown.set_groups(groups);
        true
    }

    /// Regenerates the dropdown for the current text and cursor.
    pub async fn refresh(&mut self) {
        let request = self.begin_completion();
        let groups = self.engine.generate(&request.query, request.cursor).await;
        self.apply_completion(&request, groups);
    }

    /// Types `text` at the cursor and refreshes. Returns false if the length
    /// limit rejected it.
    pub async fn type_str(&mut self, text: &str) -> bool {
        let inserted = self.buffer.insert_str(text);
        if inserted {
            self.refresh().await;
        }
        inserted
    }

    pub async fn set_cursor(&mut self, byte_pos: usize) {
        self.buffer.set_cursor_byte(byte_pos);
        self.refresh().await;
    }

    /// Moves the cursor and refreshes, since the clause under it may change.
    pub async fn move_cursor(&mut self, motion: Motion) {
        match motion {
            Motion::Left => self.buffer.move_left(),
            Motion::Right => self.buffer.move_right(),
            Motion::WordLeft => self.buffer.move_word_left(),
            Motion::WordRight => self.buffer.move_word_right(),
            Motion::Start => self.buffer.move_to_start(),
            Motion::End => self.buffer.move_to_end(),
        }
        self.refresh().await;
    }

    /// Deletes the character before the cursor, or after it with `forward`.
    pub async fn delete_char(&mut self, forward: bool) -> bool {
        let deleted = if forward {
            self.buffer.delete_char_after()
        } else {
            self.buffer.delete_char_before()
        };
        if deleted {
            self.refresh().await;
        }
        deleted
    }

    /// Writes `item` into the query. Recent searches submit immediately.
    pub async fn accept(&mut self, item: &CandidateItem) {
        let query = self.buffer.content();
        let cursor = self.buffer.cursor_byte_pos();
        let clause = active_clause(query, cursor, self.engine.settings().default_query.as_deref());
        let splice = apply_candidate(query, cursor, clause.as_ref(), item);

        self.buffer.replace(&splice.query, splice.cursor);
        self.dropdown.clear_selection();

        if splice.submit {
            self.submit().await;
        } else {
            self.refresh().await;
        }
    }

    /// Accepts the item at a flat dropdown position.
    pub async fn pick(&mut self, index: usize) -> bool {
        let Some(item) = self.dropdown.item(index).cloned() else {
            return false;
        };
        self.accept(&item).await;
        true
    }

    /// Accepts the highlighted item, if it can be accepted from the keyboard.
    pub async fn accept_active(&mut self) -> bool {
        let Some(item) = self.dropdown.accept_target().cloned() else {
            return false;
        };
        self.accept(&item).await;
        true
    }

    /// Runs the search and records it as a recent search.
    pub async fn submit(&mut self) -> String {
        let query = remove_space(self.buffer.content()).to_string();
        self.buffer.set_content(&query);
        self.generation += 1;
        self.dropdown.set_groups(Vec::new());

        tracing::info!(query = %query, "search submitted");
        if let Some(callback) = self.on_search.as_mut() {
            callback(&query);
        }
        self.engine.save_recent_search(&query).await;
        query
    }

    /// Empties the input and searches for everything.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.generation += 1;
        self.dropdown.set_groups(Vec::new());
        if let Some(callback) = self.on_search.as_mut() {
            callback("");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::autocomplete::{AutocompleteSettings, GroupKind, ItemKind};
    use crate::source::OfflineSource;
    use crate::tags::SupportedTags;

    fn engine(settings: AutocompleteSettings) -> Arc<Autocompleter> {
        Arc::new(Autocompleter::new(
            Arc::new(OfflineSource),
            SupportedTags::builtin(),
            settings,
        ))
    }

    #[test]
    fn initial_query_gets_trailing_space() {
        let session = SearchSession::new(engine(AutocompleteSettings::default()), Some("is:unresolved"));
        assert_eq!(session.query(), "is:unresolved ");
        assert_eq!(session.buffer().cursor_byte_pos(), 14);
    }

    #[test]
    fn falls_back_to_default_query() {
        let settings = AutocompleteSettings {
            default_query: Some("is:unresolved".to_string()),
            ..Default::default()
        };
        let session = SearchSession::new(engine(settings), None);
        assert_eq!(session.query(), "is:unresolved ");

        let session = SearchSession::new(engine(AutocompleteSettings::default()), None);
        assert_eq!(session.query(), "");
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut session = SearchSession::new(engine(AutocompleteSettings::default()), None);
        let first = session.begin_completion();
        let second = session.begin_completion();
        let group = CandidateGroup {
            title: GroupKind::TagKey.title(),
            kind: GroupKind::TagKey,
            icon: crate::autocomplete::Icon::Tag,
            tag_name: String::new(),
            items: vec![CandidateItem::plain("browser:", ItemKind::TagKey)],
        };

        assert!(!session.apply_completion(&first, vec![group.clone()]));
        assert!(session.dropdown().is_empty());
        assert!(session.apply_completion(&second, vec![group]));
        assert_eq!(session.dropdown().len(), 1);
    }

    #[test]
    fn edited_text_makes_completion_stale() {
        let mut session = SearchSession::new(engine(AutocompleteSettings::default()), None);
        let request = session.begin_completion();
        session.buffer_mut().insert_char('a');
        assert!(!session.apply_completion(&request, Vec::new()));
    }

    #[tokio::test]
    async fn accepting_key_refreshes_to_values() {
        let mut session = SearchSession::new(engine(AutocompleteSettings::default()), None);
        session.type_str("lev").await;
        assert_eq!(session.dropdown().groups()[0].kind, GroupKind::TagKey);

        assert!(session.pick(0).await);
        assert_eq!(session.query(), "level:");
        let kinds: Vec<GroupKind> = session.dropdown().groups().iter().map(|g| g.kind).collect();
        assert_eq!(kinds, vec![GroupKind::TagOperator, GroupKind::TagValue]);
    }

    #[tokio::test]
    async fn moving_cursor_changes_clause() {
        let mut session = SearchSession::new(engine(AutocompleteSettings::default()), None);
        session.type_str("is:unresolved lev").await;
        assert_eq!(session.dropdown().groups()[0].kind, GroupKind::TagKey);

        session.move_cursor(Motion::WordLeft).await;
        session.move_cursor(Motion::WordLeft).await;
        assert_eq!(session.buffer().cursor_byte_pos(), 0);
        session.move_cursor(Motion::Right).await;
        session.move_cursor(Motion::Right).await;
        assert_eq!(session.dropdown().groups()[0].kind, GroupKind::TagOperator);

        session.move_cursor(Motion::End).await;
        assert_eq!(session.buffer().cursor_byte_pos(), 17);
        session.move_cursor(Motion::Start).await;
        session.move_cursor(Motion::WordRight).await;
        session.move_cursor(Motion::Left).await;
        assert_eq!(session.buffer().cursor_byte_pos(), 13);
    }

    #[tokio::test]
    async fn deleting_refreshes_suggestions() {
        let mut session = SearchSession::new(engine(AutocompleteSettings::default()), None);
        session.type_str("levx").await;
        assert!(session.dropdown().is_empty());

        assert!(session.delete_char(false).await);
        assert_eq!(session.query(), "lev");
        assert_eq!(session.dropdown().groups()[0].kind, GroupKind::TagKey);
        assert!(!session.delete_char(true).await);
    }

    #[tokio::test]
    async fn submit_trims_and_notifies() {
        let searched = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&searched);
        let mut session = SearchSession::new(engine(AutocompleteSettings::default()), Some("is:unresolved"))
            .on_search(move |q| sink.lock().unwrap().push(q.to_string()));

        let query = session.submit().await;
        assert_eq!(query, "is:unresolved");
        assert_eq!(session.query(), "is:unresolved");
        assert_eq!(*searched.lock().unwrap(), vec!["is:unresolved".to_string()]);

        session.clear();
        assert_eq!(searched.lock().unwrap().last().map(String::as_str), Some(""));
    }

    #[tokio::test]
    async fn recent_search_item_submits() {
        let searched = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&searched);
        let mut session = SearchSession::new(engine(AutocompleteSettings::default()), None)
            .on_search(move |q| sink.lock().unwrap().push(q.to_string()));

        session
            .accept(&CandidateItem::plain("is:ignored", ItemKind::RecentSearch))
            .await;
        assert_eq!(*searched.lock().unwrap(), vec!["is:ignored".to_string()]);
        assert!(session.dropdown().is_empty());
    }
}
