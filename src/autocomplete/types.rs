/// What accepting an item does to the query
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    TagKey,
    TagValue,
    TagOperator,
    RecentSearch,
    Default,
}

/// What a dropdown group holds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupKind {
    TagKey,
    TagValue,
    TagOperator,
    RecentSearch,
    Default,
    /// The typed key is not a known tag
    InvalidTag,
}

impl GroupKind {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::TagKey => "Tags",
            Self::TagValue => "Tag Values",
            Self::TagOperator => "Operator Helpers",
            Self::RecentSearch => "Recent Searches",
            Self::Default => "Common Search Terms",
            Self::InvalidTag => "Invalid Tag",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Icon {
    Tag,
    Clock,
    Star,
    Toggle,
    User,
}

impl Icon {
    #[must_use]
    pub fn for_group(kind: GroupKind, tag_name: &str) -> Self {
        match kind {
            GroupKind::RecentSearch => return Self::Clock,
            GroupKind::Default => return Self::Star,
            _ => {}
        }
        match tag_name {
            "is" => Self::Toggle,
            "assigned" | "bookmarks" => Self::User,
            "firstSeen" | "lastSeen" | "event.timestamp" => Self::Clock,
            _ => Self::Tag,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateItem {
    pub value: String,
    pub description: String,
    pub kind: ItemKind,
    /// Shown even past the per-group item limit
    pub ignore_max_items: bool,
}

impl CandidateItem {
    #[must_use]
    pub fn new(value: impl Into<String>, description: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            value: value.into(),
            description: description.into(),
            kind,
            ignore_max_items: false,
        }
    }

    /// Item whose description is its value.
    #[must_use]
    pub fn plain(value: impl Into<String>, kind: ItemKind) -> Self {
        let value = value.into();
        Self::new(value.clone(), value, kind)
    }

    #[must_use]
    pub fn ignoring_max_items(mut self, ignore: bool) -> Self {
        self.ignore_max_items = ignore;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateGroup {
    pub title: &'static str,
    pub kind: GroupKind,
    pub icon: Icon,
    pub tag_name: String,
    pub items: Vec<CandidateItem>,
}

/// Items for one group before limits are applied, with the recent searches
/// that render beneath it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutocompleteGroup {
    pub items: Vec<CandidateItem>,
    pub recent: Vec<CandidateItem>,
    pub tag_name: String,
    pub kind: GroupKind,
}

impl AutocompleteGroup {
    #[must_use]
    pub fn invalid(tag_name: &str) -> Self {
        Self {
            items: Vec::new(),
            recent: Vec::new(),
            tag_name: tag_name.to_string(),
            kind: GroupKind::InvalidTag,
        }
    }
}
